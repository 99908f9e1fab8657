use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequisiteStatus {
    Pending,
    Completed,
    Unknown(String),
}

impl RequisiteStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RequisiteStatus::Pending => "pending",
            RequisiteStatus::Completed => "completed",
            RequisiteStatus::Unknown(value) => value.as_str(),
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, RequisiteStatus::Completed)
    }
}

impl fmt::Display for RequisiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for RequisiteStatus {
    fn from(value: &str) -> Self {
        match value {
            "pending" => RequisiteStatus::Pending,
            "completed" => RequisiteStatus::Completed,
            other => RequisiteStatus::Unknown(other.to_string()),
        }
    }
}

impl From<String> for RequisiteStatus {
    fn from(value: String) -> Self {
        RequisiteStatus::from(value.as_str())
    }
}

impl From<RequisiteStatus> for String {
    fn from(value: RequisiteStatus) -> Self {
        value.as_str().to_string()
    }
}
