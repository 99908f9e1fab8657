use super::edit_session::EditSession;
use crate::application::ports::checklist_gateway::ChecklistGateway;
use crate::domain::entities::{
    ChecklistItem, ChecklistItemPatch, ChecklistItemUpdate, ChecklistMeta, ChecklistSnapshot,
    ChecklistStats,
};
use crate::domain::value_objects::{ChecklistItemId, ChecklistKey};
use crate::shared::error::AppError;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct ChecklistOptions {
    pub refetch_after_save: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveOutcome {
    NothingToSave,
    Saved {
        updated: usize,
        stats: ChecklistStats,
    },
    /// The checklist was reloaded or reset while the save was in flight.
    Superseded,
}

/// Point-in-time copy of everything a checklist view renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistView {
    pub key: Option<ChecklistKey>,
    pub meta: Option<ChecklistMeta>,
    pub items: Vec<ChecklistItem>,
    pub stats: ChecklistStats,
    pub dirty_items: Vec<ChecklistItemId>,
    pub is_loading: bool,
    pub is_saving: bool,
    pub error: Option<String>,
}

impl ChecklistView {
    pub fn has_unsaved_changes(&self) -> bool {
        !self.dirty_items.is_empty()
    }
}

#[derive(Default)]
struct ChecklistState {
    /// Bumped whenever the collection is superseded (load success, reset).
    generation: u64,
    /// Bumped on every load request; only the latest request may apply.
    load_ticket: u64,
    key: Option<ChecklistKey>,
    meta: Option<ChecklistMeta>,
    session: EditSession<ChecklistItem>,
    stats: ChecklistStats,
    is_loading: bool,
    is_saving: bool,
    error: Option<String>,
}

impl ChecklistState {
    fn recompute_stats(&mut self) {
        self.stats = ChecklistStats::from_items(self.session.records());
    }

    fn view(&self) -> ChecklistView {
        ChecklistView {
            key: self.key,
            meta: self.meta.clone(),
            items: self.session.records().to_vec(),
            stats: self.stats,
            dirty_items: self
                .session
                .pending_changes()
                .into_iter()
                .map(|(id, _)| id)
                .collect(),
            is_loading: self.is_loading,
            is_saving: self.is_saving,
            error: self.error.clone(),
        }
    }
}

/// Optimistic editor for one checklist at a time.
pub struct ChecklistService {
    gateway: Arc<dyn ChecklistGateway>,
    options: ChecklistOptions,
    state: Mutex<ChecklistState>,
}

impl ChecklistService {
    pub fn new(gateway: Arc<dyn ChecklistGateway>) -> Self {
        Self::with_options(gateway, ChecklistOptions::default())
    }

    pub fn with_options(gateway: Arc<dyn ChecklistGateway>, options: ChecklistOptions) -> Self {
        Self {
            gateway,
            options,
            state: Mutex::new(ChecklistState::default()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ChecklistState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the authoritative checklist for `key`, superseding whatever was
    /// loaded before. On failure the previous state is kept.
    pub async fn load(&self, key: ChecklistKey) -> Result<ChecklistView, AppError> {
        let ticket = {
            let mut state = self.lock_state();
            state.load_ticket += 1;
            state.is_loading = true;
            state.error = None;
            state.load_ticket
        };

        debug!(%key, "fetching checklist");
        let result = self.gateway.fetch_checklist(key).await;

        let mut state = self.lock_state();
        if state.load_ticket != ticket {
            debug!(%key, "dropping stale checklist response");
            return Ok(state.view());
        }
        state.is_loading = false;

        match result.and_then(|snapshot| Self::apply_snapshot(&mut state, key, snapshot)) {
            Ok(()) => {
                info!(
                    %key,
                    items = state.session.len(),
                    completion = state.stats.completion_percentage,
                    "checklist loaded"
                );
                Ok(state.view())
            }
            Err(err) => {
                let message = err.user_message();
                warn!(%key, error = %message, "failed to load checklist");
                state.error = Some(message.clone());
                Err(AppError::LoadFailed(message))
            }
        }
    }

    fn apply_snapshot(
        state: &mut ChecklistState,
        key: ChecklistKey,
        snapshot: ChecklistSnapshot,
    ) -> Result<(), AppError> {
        state.session.replace(snapshot.items)?;
        state.generation += 1;
        state.key = Some(key);
        state.meta = Some(snapshot.meta);
        state.stats = snapshot.stats;
        state.is_saving = false;
        Ok(())
    }

    /// Apply `changes` to one item locally. Nothing is sent until `save`.
    pub fn mutate(&self, id: ChecklistItemId, changes: ChecklistItemPatch) -> Result<(), AppError> {
        let mut state = self.lock_state();
        if state.is_saving {
            return Err(AppError::InvalidOperation(
                "cannot edit while changes are being saved".to_string(),
            ));
        }
        if let Err(err) = state.session.mutate(&id, changes) {
            warn!(item = %id, error = %err, "rejected checklist edit");
            return Err(err);
        }
        state.recompute_stats();
        Ok(())
    }

    pub fn toggle_checked(&self, id: ChecklistItemId) -> Result<bool, AppError> {
        let current = {
            let state = self.lock_state();
            state.session.get(&id).map(|item| item.checked)
        };
        let Some(current) = current else {
            return Err(AppError::InvalidOperation(format!(
                "record {id} is not part of the loaded collection"
            )));
        };
        self.mutate(id, ChecklistItemPatch::checked(!current))?;
        Ok(!current)
    }

    pub fn set_comment(&self, id: ChecklistItemId, comment: impl Into<String>) -> Result<(), AppError> {
        self.mutate(id, ChecklistItemPatch::comment(comment))
    }

    /// Send every pending change as one batch. On failure all local edits are
    /// rolled back.
    pub async fn save(&self) -> Result<SaveOutcome, AppError> {
        let (key, generation, updates) = {
            let mut state = self.lock_state();
            if state.is_saving {
                return Err(AppError::InvalidOperation(
                    "a save is already in progress".to_string(),
                ));
            }
            if !state.session.is_dirty() {
                return Ok(SaveOutcome::NothingToSave);
            }
            let Some(key) = state.key else {
                return Err(AppError::InvalidOperation(
                    "no checklist is loaded".to_string(),
                ));
            };
            state.is_saving = true;
            state.error = None;

            let updates: Vec<ChecklistItemUpdate> = state
                .session
                .pending_changes()
                .into_iter()
                .map(|(id, changes)| ChecklistItemUpdate { id, changes })
                .collect();
            (key, state.generation, updates)
        };

        let updated = updates.len();
        debug!(%key, updated, "saving checklist changes");
        let result = self.gateway.batch_update(key, updates).await;

        let stats = {
            let mut state = self.lock_state();
            if state.generation != generation {
                debug!(%key, "dropping save response for superseded checklist");
                return Ok(SaveOutcome::Superseded);
            }
            state.is_saving = false;

            match result {
                Ok(server_stats) => {
                    state.session.commit();
                    state.stats = server_stats;
                    info!(%key, updated, "checklist changes saved");
                    server_stats
                }
                Err(err) => {
                    state.session.rollback();
                    state.recompute_stats();
                    let message = err.user_message();
                    warn!(%key, updated, error = %message, "save failed, local edits rolled back");
                    state.error = Some(message.clone());
                    return Err(AppError::SaveFailed(message));
                }
            }
        };

        if self.options.refetch_after_save {
            return Ok(self.refresh_after_save(key, generation, updated, stats).await);
        }
        Ok(SaveOutcome::Saved { updated, stats })
    }

    async fn refresh_after_save(
        &self,
        key: ChecklistKey,
        generation: u64,
        updated: usize,
        stats: ChecklistStats,
    ) -> SaveOutcome {
        let result = self.gateway.fetch_checklist(key).await;
        let mut state = self.lock_state();
        if state.generation != generation || state.session.is_dirty() {
            debug!(%key, "skipping post-save refresh");
            return SaveOutcome::Saved { updated, stats };
        }
        match result.and_then(|snapshot| Self::apply_snapshot(&mut state, key, snapshot)) {
            Ok(()) => SaveOutcome::Saved {
                updated,
                stats: state.stats,
            },
            Err(err) => {
                warn!(%key, error = %err, "post-save refresh failed; keeping local items");
                SaveOutcome::Saved { updated, stats }
            }
        }
    }

    /// Throw away every unsaved edit.
    pub fn discard(&self) {
        let mut state = self.lock_state();
        if state.session.rollback() {
            state.recompute_stats();
            debug!("discarded unsaved checklist changes");
        }
    }

    /// Send one item's change immediately, then reload the checklist so
    /// server-computed fields reflect it. Pending batch edits are kept and
    /// re-applied on top of the reloaded items.
    pub async fn commit_single(
        &self,
        id: ChecklistItemId,
        changes: ChecklistItemPatch,
    ) -> Result<ChecklistView, AppError> {
        let (key, generation) = {
            let mut state = self.lock_state();
            if state.is_saving {
                return Err(AppError::InvalidOperation(
                    "a save is already in progress".to_string(),
                ));
            }
            let Some(key) = state.key else {
                return Err(AppError::InvalidOperation(
                    "no checklist is loaded".to_string(),
                ));
            };
            if !state.session.contains(&id) {
                return Err(AppError::InvalidOperation(format!(
                    "record {id} is not part of the loaded collection"
                )));
            }
            state.is_saving = true;
            state.error = None;
            (key, state.generation)
        };

        debug!(%key, item = %id, "committing single checklist item");
        let committed = self.gateway.commit_item(key, id, changes).await;
        if let Err(err) = committed {
            let mut state = self.lock_state();
            if state.generation == generation {
                state.is_saving = false;
                state.error = Some(err.user_message());
            }
            warn!(%key, item = %id, error = %err, "single item commit failed");
            return Err(AppError::SaveFailed(err.user_message()));
        }

        let refreshed = self.gateway.fetch_checklist(key).await;

        let mut state = self.lock_state();
        if state.generation != generation {
            debug!(%key, "dropping refresh for superseded checklist");
            return Ok(state.view());
        }
        state.is_saving = false;

        let applied = refreshed.and_then(|snapshot| {
            state.session.rebase(snapshot.items)?;
            state.meta = Some(snapshot.meta);
            if state.session.is_dirty() {
                state.recompute_stats();
            } else {
                state.stats = snapshot.stats;
            }
            Ok(())
        });

        match applied {
            Ok(()) => {
                info!(%key, item = %id, "checklist item committed");
                Ok(state.view())
            }
            Err(err) => {
                let message = err.user_message();
                warn!(%key, item = %id, error = %message, "refresh after commit failed");
                state.error = Some(message.clone());
                Err(AppError::LoadFailed(message))
            }
        }
    }

    /// Record the link of a document already uploaded through the upload API.
    pub async fn attach_document(
        &self,
        id: ChecklistItemId,
        link: String,
        comment: Option<String>,
    ) -> Result<ChecklistView, AppError> {
        let mut changes = ChecklistItemPatch::document_link(Some(link));
        changes.comment = comment.filter(|c| !c.trim().is_empty());
        self.commit_single(id, changes).await
    }

    /// Forget the loaded checklist. Responses still in flight are dropped.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        let generation = state.generation + 1;
        let load_ticket = state.load_ticket + 1;
        *state = ChecklistState {
            generation,
            load_ticket,
            ..ChecklistState::default()
        };
    }

    pub fn view(&self) -> ChecklistView {
        self.lock_state().view()
    }

    pub fn stats(&self) -> ChecklistStats {
        self.lock_state().stats
    }

    pub fn items(&self) -> Vec<ChecklistItem> {
        self.lock_state().session.records().to_vec()
    }

    pub fn pending_changes(&self) -> Vec<(ChecklistItemId, ChecklistItemPatch)> {
        self.lock_state().session.pending_changes()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.lock_state().session.is_dirty()
    }

    pub fn unsaved_count(&self) -> usize {
        self.lock_state().session.dirty_count()
    }

    pub fn is_loading(&self) -> bool {
        self.lock_state().is_loading
    }

    pub fn is_saving(&self) -> bool {
        self.lock_state().is_saving
    }

    pub fn error(&self) -> Option<String> {
        self.lock_state().error.clone()
    }

    pub fn clear_error(&self) {
        self.lock_state().error = None;
    }
}
