use super::checklist_stats::ChecklistStats;
use super::editable::{EditableRecord, RecordPatch};
use crate::domain::value_objects::{ChecklistItemId, ChecklistKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChecklistItem {
    pub id: ChecklistItemId,
    pub text: String,
    pub checked: bool,
    pub comment: Option<String>,
    pub document_link: Option<String>,
    /// Set by a reviewer on the server; never changed locally.
    pub is_approved: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ChecklistItem {
    pub fn new(id: impl Into<ChecklistItemId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            checked: false,
            comment: None,
            document_link: None,
            is_approved: false,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_pending_review(&self) -> bool {
        self.checked && !self.is_approved
    }
}

/// Mutable fields of a checklist item. `document_link` is doubly optional so
/// a link can be explicitly cleared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItemPatch {
    pub checked: Option<bool>,
    pub comment: Option<String>,
    pub document_link: Option<Option<String>>,
}

impl ChecklistItemPatch {
    pub fn checked(value: bool) -> Self {
        Self {
            checked: Some(value),
            ..Self::default()
        }
    }

    pub fn comment(value: impl Into<String>) -> Self {
        Self {
            comment: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn document_link(value: Option<String>) -> Self {
        Self {
            document_link: Some(value),
            ..Self::default()
        }
    }

    pub fn with_checked(mut self, value: bool) -> Self {
        self.checked = Some(value);
        self
    }

    pub fn with_comment(mut self, value: impl Into<String>) -> Self {
        self.comment = Some(value.into());
        self
    }
}

impl RecordPatch for ChecklistItemPatch {
    fn merge(&mut self, later: Self) {
        if later.checked.is_some() {
            self.checked = later.checked;
        }
        if later.comment.is_some() {
            self.comment = later.comment;
        }
        if later.document_link.is_some() {
            self.document_link = later.document_link;
        }
    }

    fn is_empty(&self) -> bool {
        self.checked.is_none() && self.comment.is_none() && self.document_link.is_none()
    }
}

impl EditableRecord for ChecklistItem {
    type Id = ChecklistItemId;
    type Patch = ChecklistItemPatch;

    fn record_id(&self) -> &ChecklistItemId {
        &self.id
    }

    fn apply(&mut self, patch: &ChecklistItemPatch) {
        if let Some(checked) = patch.checked {
            self.checked = checked;
        }
        if let Some(comment) = &patch.comment {
            self.comment = Some(comment.clone());
        }
        if let Some(link) = &patch.document_link {
            self.document_link = link.clone();
        }
    }
}

/// One entry of a batch update: the id plus only the fields that changed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistItemUpdate {
    pub id: ChecklistItemId,
    pub changes: ChecklistItemPatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistMeta {
    pub key: ChecklistKey,
    pub title: String,
    pub job_title: String,
}

/// Authoritative state of a checklist as returned by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistSnapshot {
    pub meta: ChecklistMeta,
    pub items: Vec<ChecklistItem>,
    pub stats: ChecklistStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_patch_overwrites_only_named_fields() {
        let mut patch = ChecklistItemPatch::checked(false).with_comment("first");
        patch.merge(ChecklistItemPatch::checked(true));

        assert_eq!(patch.checked, Some(true));
        assert_eq!(patch.comment.as_deref(), Some("first"));
        assert!(patch.document_link.is_none());
    }

    #[test]
    fn apply_can_clear_document_link() {
        let mut item = ChecklistItem::new(1, "Earthing verified");
        item.document_link = Some("https://files/1.pdf".into());

        item.apply(&ChecklistItemPatch::document_link(None));

        assert!(item.document_link.is_none());
        assert!(!item.checked);
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(ChecklistItemPatch::default().is_empty());
        assert!(!ChecklistItemPatch::comment("").is_empty());
    }
}
