use crate::domain::entities::BucketEntry;
use crate::shared::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The part of the requisite state that survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedBucket {
    pub bucket: Vec<BucketEntry>,
    pub sales_order: String,
    pub cabinet_position: String,
}

impl PersistedBucket {
    pub fn is_empty(&self) -> bool {
        self.bucket.is_empty() && self.sales_order.is_empty() && self.cabinet_position.is_empty()
    }
}

#[async_trait]
pub trait BucketPersistence: Send + Sync {
    async fn load(&self) -> Result<Option<PersistedBucket>>;
    async fn save(&self, state: &PersistedBucket) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}
