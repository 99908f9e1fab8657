pub mod checklist_item_id;
pub mod checklist_key;
pub mod product_name;
pub mod requisite_status;

pub use checklist_item_id::ChecklistItemId;
pub use checklist_key::ChecklistKey;
pub use product_name::ProductName;
pub use requisite_status::RequisiteStatus;
