use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one checklist of one job; the unit a checklist editor loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChecklistKey {
    pub job_id: i64,
    pub checklist_id: i64,
}

impl ChecklistKey {
    pub fn new(job_id: i64, checklist_id: i64) -> Self {
        Self {
            job_id,
            checklist_id,
        }
    }
}

impl fmt::Display for ChecklistKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job {} / checklist {}", self.job_id, self.checklist_id)
    }
}
