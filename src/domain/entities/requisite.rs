use super::bucket::BucketEntry;
use crate::domain::value_objects::RequisiteStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequisiteDetails {
    pub sales_order: String,
    pub cabinet_position: String,
    pub sr_poc: Option<String>,
}

/// Everything sent when a bucket is submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct RequisiteSubmission {
    pub details: RequisiteDetails,
    pub items: Vec<BucketEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequisiteLine {
    pub id: Option<i64>,
    pub product_name: String,
    pub quantity: f64,
    pub issue_description: String,
    pub responsible_department: String,
}

/// A submitted requisite as listed in the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequisiteRecord {
    pub id: i64,
    pub sales_order: String,
    pub sr_poc: Option<String>,
    pub status: RequisiteStatus,
    pub created_date: Option<DateTime<Utc>>,
    pub closed_date: Option<DateTime<Utc>>,
    pub site_requisites: Vec<RequisiteLine>,
}

impl RequisiteRecord {
    pub fn line_count(&self) -> usize {
        self.site_requisites.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Case-insensitive match on sales order, point of contact or product.
    pub search: Option<String>,
    pub status: Option<RequisiteStatus>,
}

impl HistoryFilter {
    pub fn matches(&self, record: &RequisiteRecord) -> bool {
        if let Some(status) = &self.status {
            if &record.status != status {
                return false;
            }
        }

        let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            return true;
        };
        let term = term.to_lowercase();

        record.sales_order.to_lowercase().contains(&term)
            || record
                .sr_poc
                .as_deref()
                .is_some_and(|poc| poc.to_lowercase().contains(&term))
            || record
                .site_requisites
                .iter()
                .any(|line| line.product_name.to_lowercase().contains(&term))
    }

    pub fn apply<'a>(&self, records: &'a [RequisiteRecord]) -> Vec<&'a RequisiteRecord> {
        records.iter().filter(|record| self.matches(record)).collect()
    }
}
