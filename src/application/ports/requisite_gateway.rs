use crate::domain::entities::{BomNode, RequisiteRecord, RequisiteSubmission};
use crate::domain::value_objects::RequisiteStatus;
use crate::shared::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait RequisiteGateway: Send + Sync {
    async fn fetch_bom(
        &self,
        sales_order: &str,
        cabinet_position: &str,
    ) -> Result<Vec<BomNode>>;

    async fn submit(&self, submission: RequisiteSubmission) -> Result<()>;

    async fn history(&self, limit: u32, offset: u32) -> Result<Vec<RequisiteRecord>>;

    async fn history_for_sales_order(
        &self,
        sales_order: &str,
    ) -> Result<Vec<RequisiteRecord>>;

    async fn update_status(&self, id: i64, status: RequisiteStatus) -> Result<()>;
}
