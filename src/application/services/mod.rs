pub mod checklist_service;
pub mod edit_session;
pub mod requisite_service;

pub use checklist_service::{ChecklistOptions, ChecklistService, ChecklistView, SaveOutcome};
pub use edit_session::EditSession;
pub use requisite_service::{RequisiteService, RequisiteView};
