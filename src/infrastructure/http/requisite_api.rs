use super::api_client::ApiClient;
use super::dto::{BomResponseDto, RequisiteRecordDto};
use super::mappers;
use crate::application::ports::RequisiteGateway;
use crate::domain::entities::{BomNode, RequisiteRecord, RequisiteSubmission};
use crate::domain::value_objects::RequisiteStatus;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::Method;
use tracing::info;

pub struct HttpRequisiteGateway {
    client: ApiClient,
}

impl HttpRequisiteGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RequisiteGateway for HttpRequisiteGateway {
    async fn fetch_bom(
        &self,
        sales_order: &str,
        cabinet_position: &str,
    ) -> Result<Vec<BomNode>, AppError> {
        let path = format!("/dashboard/bom/{sales_order}/{cabinet_position}");
        let dto: BomResponseDto = self.client.get_json(&path, &[]).await?;
        Ok(mappers::bom_from_dto(dto))
    }

    async fn submit(&self, submission: RequisiteSubmission) -> Result<(), AppError> {
        let body = mappers::submit_request_from_domain(submission);
        info!(
            sales_order = %body.sales_order,
            items = body.items.len(),
            "submitting requisite"
        );
        self.client
            .send_unit(Method::POST, "/dashboard/bom/submit", &[], Some(&body))
            .await
    }

    async fn history(&self, limit: u32, offset: u32) -> Result<Vec<RequisiteRecord>, AppError> {
        let query = [("limit", limit.to_string()), ("offset", offset.to_string())];
        let records: Vec<RequisiteRecordDto> =
            self.client.get_json("/dashboard/bom/history", &query).await?;
        Ok(records
            .into_iter()
            .map(mappers::requisite_record_from_dto)
            .collect())
    }

    async fn history_for_sales_order(
        &self,
        sales_order: &str,
    ) -> Result<Vec<RequisiteRecord>, AppError> {
        let path = format!("/dashboard/bom/history/{sales_order}");
        let records: Vec<RequisiteRecordDto> = self.client.get_json(&path, &[]).await?;
        Ok(records
            .into_iter()
            .map(mappers::requisite_record_from_dto)
            .collect())
    }

    async fn update_status(&self, id: i64, status: RequisiteStatus) -> Result<(), AppError> {
        let path = format!("/dashboard/bom/status/{id}");
        let query = [("status", status.as_str().to_string())];
        self.client
            .send_unit::<()>(Method::PATCH, &path, &query, None)
            .await
    }
}
