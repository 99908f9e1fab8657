use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::{fs, sync::Mutex};
use tracing::debug;

use crate::{
    application::ports::{BucketPersistence, PersistedBucket},
    shared::AppError,
};

const FILE_NAME: &str = "bucket.json";

/// Keeps the staged requisite bucket in `<data_dir>/bucket.json`.
pub struct BucketFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl BucketFileStore {
    pub async fn new(data_dir: PathBuf) -> Result<Self, AppError> {
        fs::create_dir_all(&data_dir)
            .await
            .map_err(|err| AppError::Storage(format!("Failed to create data dir: {err}")))?;

        Ok(Self {
            path: data_dir.join(FILE_NAME),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl BucketPersistence for BucketFileStore {
    async fn load(&self) -> Result<Option<PersistedBucket>, AppError> {
        if fs::metadata(&self.path).await.is_err() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)
            .await
            .map_err(|err| AppError::Storage(format!("Failed to read bucket: {err}")))?;
        if bytes.is_empty() {
            return Ok(None);
        }
        let state: PersistedBucket = serde_json::from_slice(&bytes).map_err(|err| {
            AppError::DeserializationError(format!("Failed to parse bucket: {err}"))
        })?;
        Ok((!state.is_empty()).then_some(state))
    }

    async fn save(&self, state: &PersistedBucket) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let bytes = serde_json::to_vec_pretty(state).map_err(|err| {
            AppError::SerializationError(format!("Failed to serialize bucket: {err}"))
        })?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, bytes)
            .await
            .map_err(|err| AppError::Storage(format!("Failed to write bucket: {err}")))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|err| AppError::Storage(format!("Failed to replace bucket: {err}")))?;
        debug!(entries = state.bucket.len(), "bucket persisted");
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::Storage(format!("Failed to remove bucket: {err}"))),
        }
    }
}
