use crate::domain::entities::{EditableRecord, RecordPatch};
use crate::shared::error::AppError;
use std::collections::{BTreeMap, HashMap};


#[derive(Debug, Clone)]
enum EditState<R: EditableRecord> {
    Clean,
    /// Entered on the first edit after a clean state. `backup` is the
    /// collection as it was at that moment; `pending` holds the net change
    /// per record. The dirty set is the key set of `pending`.
    Dirty {
        backup: Vec<R>,
        pending: BTreeMap<R::Id, R::Patch>,
    },
}

/// Local mirror of a remotely owned collection with field-level edit
/// tracking and rollback. Purely synchronous; the services wrap it with the
/// remote calls.
#[derive(Debug, Clone)]
pub struct EditSession<R: EditableRecord> {
    records: Vec<R>,
    index: HashMap<R::Id, usize>,
    state: EditState<R>,
}

impl<R: EditableRecord> Default for EditSession<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: EditableRecord> EditSession<R> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            state: EditState::Clean,
        }
    }

    pub fn from_records(records: Vec<R>) -> Result<Self, AppError> {
        let mut session = Self::new();
        session.replace(records)?;
        Ok(session)
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn get(&self, id: &R::Id) -> Option<&R> {
        self.index.get(id).map(|&pos| &self.records[pos])
    }

    pub fn contains(&self, id: &R::Id) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        matches!(self.state, EditState::Dirty { .. })
    }

    pub fn dirty_count(&self) -> usize {
        match &self.state {
            EditState::Clean => 0,
            EditState::Dirty { pending, .. } => pending.len(),
        }
    }

    pub fn is_record_dirty(&self, id: &R::Id) -> bool {
        self.pending(id).is_some()
    }

    pub fn pending(&self, id: &R::Id) -> Option<&R::Patch> {
        match &self.state {
            EditState::Clean => None,
            EditState::Dirty { pending, .. } => pending.get(id),
        }
    }

    /// Net changes ordered by record id.
    pub fn pending_changes(&self) -> Vec<(R::Id, R::Patch)> {
        match &self.state {
            EditState::Clean => Vec::new(),
            EditState::Dirty { pending, .. } => pending
                .iter()
                .map(|(id, patch)| (id.clone(), patch.clone()))
                .collect(),
        }
    }

    pub fn backup(&self) -> Option<&[R]> {
        match &self.state {
            EditState::Clean => None,
            EditState::Dirty { backup, .. } => Some(backup),
        }
    }

    /// Supersede the whole collection and drop all edit tracking.
    pub fn replace(&mut self, records: Vec<R>) -> Result<(), AppError> {
        let index = build_index(&records)?;
        self.records = records;
        self.index = index;
        self.state = EditState::Clean;
        Ok(())
    }

    /// Apply a patch locally and record it as pending.
    pub fn mutate(&mut self, id: &R::Id, patch: R::Patch) -> Result<(), AppError> {
        let Some(&pos) = self.index.get(id) else {
            return Err(AppError::InvalidOperation(format!(
                "record {id} is not part of the loaded collection"
            )));
        };
        if patch.is_empty() {
            return Ok(());
        }

        if let EditState::Clean = self.state {
            self.state = EditState::Dirty {
                backup: self.records.clone(),
                pending: BTreeMap::new(),
            };
        }

        self.records[pos].apply(&patch);

        if let EditState::Dirty { pending, .. } = &mut self.state {
            pending.entry(id.clone()).or_default().merge(patch);
        }
        Ok(())
    }

    /// Accept the current records as the new clean state.
    pub fn commit(&mut self) {
        self.state = EditState::Clean;
    }

    /// Restore the pre-edit snapshot. Returns `false` when there was nothing
    /// to roll back.
    pub fn rollback(&mut self) -> bool {
        match std::mem::replace(&mut self.state, EditState::Clean) {
            EditState::Clean => false,
            EditState::Dirty { backup, .. } => {
                // The backup was a valid collection when taken.
                self.index = build_index(&backup).unwrap_or_default();
                self.records = backup;
                true
            }
        }
    }

    /// Take a fresh authoritative collection while keeping pending edits:
    /// the fresh records become the backup and the pending patches are
    /// re-applied on top. Pending edits for records that no longer exist
    /// are dropped.
    pub fn rebase(&mut self, fresh: Vec<R>) -> Result<(), AppError> {
        let index = build_index(&fresh)?;
        let pending = match std::mem::replace(&mut self.state, EditState::Clean) {
            EditState::Clean => BTreeMap::new(),
            EditState::Dirty { pending, .. } => pending,
        };

        self.records = fresh;
        self.index = index;

        let kept: BTreeMap<R::Id, R::Patch> = pending
            .into_iter()
            .filter(|(id, _)| self.index.contains_key(id))
            .collect();
        if kept.is_empty() {
            return Ok(());
        }

        let backup = self.records.clone();
        for (id, patch) in &kept {
            if let Some(&pos) = self.index.get(id) {
                self.records[pos].apply(patch);
            }
        }
        self.state = EditState::Dirty {
            backup,
            pending: kept,
        };
        Ok(())
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
        self.state = EditState::Clean;
    }
}

fn build_index<R: EditableRecord>(records: &[R]) -> Result<HashMap<R::Id, usize>, AppError> {
    let mut index = HashMap::with_capacity(records.len());
    for (pos, record) in records.iter().enumerate() {
        let id = record.record_id();
        if index.insert(id.clone(), pos).is_some() {
            return Err(AppError::InvalidInput(format!("duplicate record id {id}")));
        }
    }
    Ok(index)
}
