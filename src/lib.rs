pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use application::services::{
    ChecklistOptions, ChecklistService, ChecklistView, EditSession, RequisiteService,
    RequisiteView, SaveOutcome,
};
pub use domain::entities::{
    BomNode, BucketEntry, BucketEntryPatch, ChecklistItem, ChecklistItemPatch, ChecklistStats,
    RequisiteRecord,
};
pub use domain::value_objects::{ChecklistItemId, ChecklistKey, ProductName, RequisiteStatus};
pub use infrastructure::{ApiClient, BucketFileStore, HttpChecklistGateway, HttpRequisiteGateway};
pub use shared::{init_logging, AppConfig, AppError};

use std::sync::Arc;

/// Services wired to the HTTP gateways and the on-disk bucket.
pub struct AppServices {
    pub checklist: ChecklistService,
    pub requisites: RequisiteService,
}

impl AppServices {
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        config.validate().map_err(AppError::ConfigurationError)?;

        let client = ApiClient::new(&config.api)?;
        let checklist = ChecklistService::with_options(
            Arc::new(HttpChecklistGateway::new(client.clone())),
            ChecklistOptions {
                refetch_after_save: config.editor.refetch_after_save,
            },
        );
        let store = BucketFileStore::new(config.storage.data_dir.clone()).await?;
        let requisites = RequisiteService::new(
            Arc::new(HttpRequisiteGateway::new(client)),
            Arc::new(store),
            config.editor.history_page_size,
        );

        Ok(Self {
            checklist,
            requisites,
        })
    }
}
