pub mod ports;
pub mod services;

pub use services::{ChecklistService, RequisiteService};
