pub mod bom;
pub mod bucket;
pub mod checklist;
pub mod checklist_stats;
pub mod editable;
pub mod requisite;

pub use bom::BomNode;
pub use bucket::{BucketEntry, BucketEntryPatch};
pub use checklist::{
    ChecklistItem, ChecklistItemPatch, ChecklistItemUpdate, ChecklistMeta, ChecklistSnapshot,
};
pub use checklist_stats::ChecklistStats;
pub use editable::{EditableRecord, RecordPatch};
pub use requisite::{
    HistoryFilter, RequisiteDetails, RequisiteLine, RequisiteRecord, RequisiteSubmission,
};
