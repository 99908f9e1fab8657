use super::api_client::ApiClient;
use super::dto::{ChecklistResponseDto, ChecklistStatsDto};
use super::mappers;
use crate::application::ports::ChecklistGateway;
use crate::domain::entities::{
    ChecklistItemPatch, ChecklistItemUpdate, ChecklistSnapshot, ChecklistStats,
};
use crate::domain::value_objects::{ChecklistItemId, ChecklistKey};
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::Method;

pub struct HttpChecklistGateway {
    client: ApiClient,
}

impl HttpChecklistGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn checklist_path(key: ChecklistKey) -> String {
        format!(
            "/dashboard/jobs/{}/checklist/{}",
            key.job_id, key.checklist_id
        )
    }
}

#[async_trait]
impl ChecklistGateway for HttpChecklistGateway {
    async fn fetch_checklist(&self, key: ChecklistKey) -> Result<ChecklistSnapshot, AppError> {
        let dto: ChecklistResponseDto = self
            .client
            .get_json(&Self::checklist_path(key), &[])
            .await?;
        Ok(mappers::checklist_snapshot_from_dto(key, dto))
    }

    async fn batch_update(
        &self,
        key: ChecklistKey,
        updates: Vec<ChecklistItemUpdate>,
    ) -> Result<ChecklistStats, AppError> {
        let body = mappers::batch_request_from_updates(updates);
        let path = format!("{}/batch-update", Self::checklist_path(key));
        let stats: ChecklistStatsDto = self.client.send_json(Method::POST, &path, &body).await?;
        Ok(mappers::checklist_stats_from_dto(stats))
    }

    async fn commit_item(
        &self,
        key: ChecklistKey,
        id: ChecklistItemId,
        changes: ChecklistItemPatch,
    ) -> Result<(), AppError> {
        let body = mappers::item_change_from_patch(changes);
        let path = format!("{}/items/{}", Self::checklist_path(key), id);
        self.client
            .send_unit(Method::PATCH, &path, &[], Some(&body))
            .await
    }
}
