use super::checklist::ChecklistItem;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistStats {
    pub total_items: u32,
    pub checked_count: u32,
    /// Checked but not yet approved.
    pub pending_count: u32,
    pub approved_count: u32,
    pub completion_percentage: u32,
}

impl ChecklistStats {
    /// Single pass over the items. Depends only on current field values.
    pub fn from_items(items: &[ChecklistItem]) -> Self {
        let mut stats = items.iter().fold(Self::default(), |mut acc, item| {
            acc.total_items += 1;
            if item.checked {
                acc.checked_count += 1;
            }
            if item.is_approved {
                acc.approved_count += 1;
            }
            if item.is_pending_review() {
                acc.pending_count += 1;
            }
            acc
        });
        stats.completion_percentage = completion_percentage(stats.approved_count, stats.total_items);
        stats
    }
}

/// round(100 * approved / total), rounding halves up; 0 for an empty list.
pub fn completion_percentage(approved: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let approved = u64::from(approved);
    let total = u64::from(total);
    ((200 * approved + total) / (2 * total)) as u32
}
