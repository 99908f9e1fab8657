use crate::domain::entities::{
    ChecklistItemPatch, ChecklistItemUpdate, ChecklistSnapshot, ChecklistStats,
};
use crate::domain::value_objects::{ChecklistItemId, ChecklistKey};
use crate::shared::error::Result;
use async_trait::async_trait;

/// Remote owner of checklist items.
#[async_trait]
pub trait ChecklistGateway: Send + Sync {
    async fn fetch_checklist(&self, key: ChecklistKey) -> Result<ChecklistSnapshot>;

    /// All-or-nothing batch write. Returns the server-computed stats.
    async fn batch_update(
        &self,
        key: ChecklistKey,
        updates: Vec<ChecklistItemUpdate>,
    ) -> Result<ChecklistStats>;

    async fn commit_item(
        &self,
        key: ChecklistKey,
        id: ChecklistItemId,
        changes: ChecklistItemPatch,
    ) -> Result<()>;
}
