use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ChecklistHeaderDto {
    pub id: i64,
    #[serde(default, alias = "name")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChecklistItemDto {
    pub id: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub document_link: Option<String>,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChecklistStatsDto {
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub checked_count: u32,
    #[serde(default)]
    pub pending_count: u32,
    #[serde(default)]
    pub approved_count: u32,
    #[serde(default)]
    pub completion_percentage: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChecklistResponseDto {
    pub checklist: ChecklistHeaderDto,
    #[serde(default)]
    pub items: Vec<ChecklistItemDto>,
    #[serde(flatten)]
    pub stats: ChecklistStatsDto,
    #[serde(default)]
    pub job_id: Option<i64>,
    #[serde(default)]
    pub job_title: Option<String>,
}

/// Only fields that are `Some` are written; `document_link: Some(None)`
/// is sent as an explicit null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistItemChangeDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_link: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistUpdateDto {
    pub checklist_item_id: i64,
    #[serde(flatten)]
    pub changes: ChecklistItemChangeDto,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchUpdateRequestDto {
    pub updates: Vec<ChecklistUpdateDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BomNodeDto {
    pub product_name: String,
    #[serde(default)]
    pub cabinet_position: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub children: Option<Vec<BomNodeDto>>,
}

/// The BOM endpoint answers with either a bare array or `{ "bom": [...] }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BomResponseDto {
    Nodes(Vec<BomNodeDto>),
    Wrapped { bom: Vec<BomNodeDto> },
}

#[derive(Debug, Clone, Serialize)]
pub struct RequisiteItemDto {
    pub product_name: String,
    pub quantity: f64,
    pub issue_description: String,
    pub responsible_department: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitRequisiteDto {
    pub sales_order: String,
    pub cabinet_position: String,
    pub sr_poc: Option<String>,
    pub items: Vec<RequisiteItemDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequisiteLineDto {
    #[serde(default)]
    pub id: Option<i64>,
    pub product_name: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub issue_description: Option<String>,
    #[serde(default)]
    pub responsible_department: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequisiteRecordDto {
    pub id: i64,
    pub sales_order: String,
    #[serde(default)]
    pub sr_poc: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub closed_date: Option<String>,
    #[serde(default)]
    pub site_requisites: Vec<RequisiteLineDto>,
}
