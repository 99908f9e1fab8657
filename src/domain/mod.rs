pub mod entities;
pub mod value_objects;

pub use entities::{BucketEntry, ChecklistItem, ChecklistStats};
pub use value_objects::{ChecklistItemId, ChecklistKey, ProductName, RequisiteStatus};
