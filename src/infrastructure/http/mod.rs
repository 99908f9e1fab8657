pub mod api_client;
pub mod checklist_api;
pub mod dto;
pub mod mappers;
pub mod requisite_api;

pub use api_client::ApiClient;
pub use checklist_api::HttpChecklistGateway;
pub use requisite_api::HttpRequisiteGateway;
