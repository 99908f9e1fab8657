use super::editable::{EditableRecord, RecordPatch};
use crate::domain::value_objects::ProductName;
use serde::{Deserialize, Serialize};

pub const DEFAULT_QUANTITY: f64 = 1.0;

/// A product staged in the requisite bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketEntry {
    pub product_name: ProductName,
    pub quantity: f64,
    #[serde(default)]
    pub issue_description: String,
    #[serde(default)]
    pub responsible_department: String,
}

impl BucketEntry {
    pub fn new(product_name: ProductName) -> Self {
        Self {
            product_name,
            quantity: DEFAULT_QUANTITY,
            issue_description: String::new(),
            responsible_department: String::new(),
        }
    }

    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_issue(mut self, description: impl Into<String>) -> Self {
        self.issue_description = description.into();
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.responsible_department = department.into();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketEntryPatch {
    pub quantity: Option<f64>,
    pub issue_description: Option<String>,
    pub responsible_department: Option<String>,
}

impl BucketEntryPatch {
    pub fn quantity(value: f64) -> Self {
        Self {
            quantity: Some(value),
            ..Self::default()
        }
    }

    pub fn with_issue(mut self, description: impl Into<String>) -> Self {
        self.issue_description = Some(description.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.responsible_department = Some(department.into());
        self
    }
}

impl RecordPatch for BucketEntryPatch {
    fn merge(&mut self, later: Self) {
        if later.quantity.is_some() {
            self.quantity = later.quantity;
        }
        if later.issue_description.is_some() {
            self.issue_description = later.issue_description;
        }
        if later.responsible_department.is_some() {
            self.responsible_department = later.responsible_department;
        }
    }

    fn is_empty(&self) -> bool {
        self.quantity.is_none()
            && self.issue_description.is_none()
            && self.responsible_department.is_none()
    }
}

impl EditableRecord for BucketEntry {
    type Id = ProductName;
    type Patch = BucketEntryPatch;

    fn record_id(&self) -> &ProductName {
        &self.product_name
    }

    fn apply(&mut self, patch: &BucketEntryPatch) {
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(description) = &patch.issue_description {
            self.issue_description = description.clone();
        }
        if let Some(department) = &patch.responsible_department {
            self.responsible_department = department.clone();
        }
    }
}
