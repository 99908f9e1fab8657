pub mod bucket_store;
pub mod checklist_gateway;
pub mod requisite_gateway;

pub use bucket_store::{BucketPersistence, PersistedBucket};
pub use checklist_gateway::ChecklistGateway;
pub use requisite_gateway::RequisiteGateway;
