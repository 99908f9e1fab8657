pub mod http;
pub mod storage;

pub use http::{ApiClient, HttpChecklistGateway, HttpRequisiteGateway};
pub use storage::BucketFileStore;
