use crate::application::ports::bucket_store::{BucketPersistence, PersistedBucket};
use crate::application::ports::requisite_gateway::RequisiteGateway;
use crate::domain::entities::{
    BomNode, BucketEntry, BucketEntryPatch, EditableRecord, RequisiteDetails, RequisiteRecord,
    RequisiteSubmission,
};
use crate::domain::value_objects::{ProductName, RequisiteStatus};
use crate::shared::error::{AppError, Result};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequisiteView {
    pub bom: Vec<BomNode>,
    pub sales_order: String,
    pub cabinet_position: String,
    pub bucket: Vec<BucketEntry>,
    pub history: Vec<RequisiteRecord>,
    pub is_loading: bool,
    pub is_submitting: bool,
    pub error: Option<String>,
}

#[derive(Default)]
struct RequisiteState {
    bom: Vec<BomNode>,
    sales_order: String,
    cabinet_position: String,
    bucket: Vec<BucketEntry>,
    history: Vec<RequisiteRecord>,
    bom_ticket: u64,
    history_ticket: u64,
    is_loading: bool,
    is_submitting: bool,
    error: Option<String>,
}

impl RequisiteState {
    fn persisted(&self) -> PersistedBucket {
        PersistedBucket {
            bucket: self.bucket.clone(),
            sales_order: self.sales_order.clone(),
            cabinet_position: self.cabinet_position.clone(),
        }
    }

    fn reset_selection(&mut self) {
        self.bucket.clear();
        self.bom.clear();
        self.sales_order.clear();
        self.cabinet_position.clear();
    }

    fn position(&self, product_name: &ProductName) -> Option<usize> {
        self.bucket
            .iter()
            .position(|entry| entry.record_id() == product_name)
    }

    fn view(&self) -> RequisiteView {
        RequisiteView {
            bom: self.bom.clone(),
            sales_order: self.sales_order.clone(),
            cabinet_position: self.cabinet_position.clone(),
            bucket: self.bucket.clone(),
            history: self.history.clone(),
            is_loading: self.is_loading,
            is_submitting: self.is_submitting,
            error: self.error.clone(),
        }
    }
}

/// BOM picker and requisite bucket.
pub struct RequisiteService {
    gateway: Arc<dyn RequisiteGateway>,
    persistence: Arc<dyn BucketPersistence>,
    history_page_size: u32,
    state: Mutex<RequisiteState>,
    /// Held from taking a bucket snapshot until it has been written, so saves
    /// land in the order the mutations happened.
    persist_lock: AsyncMutex<()>,
}

impl RequisiteService {
    pub fn new(
        gateway: Arc<dyn RequisiteGateway>,
        persistence: Arc<dyn BucketPersistence>,
        history_page_size: u32,
    ) -> Self {
        Self {
            gateway,
            persistence,
            history_page_size: history_page_size.max(1),
            state: Mutex::new(RequisiteState::default()),
            persist_lock: AsyncMutex::new(()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, RequisiteState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the state for a bucket edit, refusing while a submission is in flight.
    fn lock_editable(&self) -> Result<MutexGuard<'_, RequisiteState>> {
        let state = self.lock_state();
        if state.is_submitting {
            return Err(AppError::InvalidOperation(
                "cannot edit the bucket while it is being submitted".to_string(),
            ));
        }
        Ok(state)
    }

    async fn persist(&self, snapshot: PersistedBucket) {
        if let Err(err) = self.persistence.save(&snapshot).await {
            warn!(error = %err, "failed to persist requisite bucket");
        }
    }

    async fn forget_persisted(&self) {
        if let Err(err) = self.persistence.clear().await {
            warn!(error = %err, "failed to clear persisted requisite bucket");
        }
    }

    /// Bring back the bucket saved by a previous session.
    pub async fn restore(&self) -> Result<bool> {
        let _persisting = self.persist_lock.lock().await;
        let Some(saved) = self.persistence.load().await? else {
            return Ok(false);
        };
        let mut state = self.lock_editable()?;
        let restored = saved.bucket.len();
        state.bucket = saved.bucket;
        state.sales_order = saved.sales_order;
        state.cabinet_position = saved.cabinet_position;
        debug!(entries = restored, "requisite bucket restored");
        Ok(true)
    }

    pub async fn load_bom(
        &self,
        sales_order: &str,
        cabinet_position: &str,
    ) -> Result<Vec<BomNode>> {
        let sales_order = sales_order.trim();
        let cabinet_position = cabinet_position.trim();
        if sales_order.is_empty() || cabinet_position.is_empty() {
            return Err(AppError::InvalidInput(
                "sales order and cabinet position are required".to_string(),
            ));
        }

        let ticket = {
            let mut state = self.lock_editable()?;
            state.bom_ticket += 1;
            state.is_loading = true;
            state.error = None;
            state.bom_ticket
        };

        let result = self.gateway.fetch_bom(sales_order, cabinet_position).await;

        let _persisting = self.persist_lock.lock().await;
        let snapshot = {
            let mut state = self.lock_state();
            if state.bom_ticket != ticket {
                debug!(sales_order, cabinet_position, "dropping stale BOM response");
                return Ok(state.bom.clone());
            }
            state.is_loading = false;
            match result {
                Ok(nodes) => {
                    info!(sales_order, cabinet_position, roots = nodes.len(), "BOM loaded");
                    state.bom = nodes;
                    state.sales_order = sales_order.to_string();
                    state.cabinet_position = cabinet_position.to_string();
                    state.persisted()
                }
                Err(err) => {
                    let message = err.user_message();
                    warn!(sales_order, cabinet_position, error = %message, "failed to fetch BOM");
                    state.error = Some(message.clone());
                    return Err(AppError::LoadFailed(message));
                }
            }
        };

        self.persist(snapshot).await;
        Ok(self.lock_state().bom.clone())
    }

    /// Stage a product. Returns `false` if the product is already staged.
    pub async fn stage(&self, entry: BucketEntry) -> Result<bool> {
        validate_quantity(entry.quantity)?;
        let _persisting = self.persist_lock.lock().await;
        let snapshot = {
            let mut state = self.lock_editable()?;
            if state.position(&entry.product_name).is_some() {
                debug!(product = %entry.product_name, "product already in bucket");
                return Ok(false);
            }
            state.bucket.push(entry);
            state.persisted()
        };
        self.persist(snapshot).await;
        Ok(true)
    }

    pub async fn update(
        &self,
        product_name: &ProductName,
        changes: BucketEntryPatch,
    ) -> Result<()> {
        if let Some(quantity) = changes.quantity {
            validate_quantity(quantity)?;
        }
        let _persisting = self.persist_lock.lock().await;
        let snapshot = {
            let mut state = self.lock_editable()?;
            let Some(pos) = state.position(product_name) else {
                return Err(AppError::InvalidOperation(format!(
                    "{product_name} is not in the bucket"
                )));
            };
            state.bucket[pos].apply(&changes);
            state.persisted()
        };
        self.persist(snapshot).await;
        Ok(())
    }

    /// Returns `false` if the product was not staged.
    pub async fn remove(&self, product_name: &ProductName) -> Result<bool> {
        let _persisting = self.persist_lock.lock().await;
        let snapshot = {
            let mut state = self.lock_editable()?;
            let Some(pos) = state.position(product_name) else {
                return Ok(false);
            };
            state.bucket.remove(pos);
            state.persisted()
        };
        self.persist(snapshot).await;
        Ok(true)
    }

    /// Empty the bucket and forget the BOM selection.
    pub async fn clear(&self) -> Result<()> {
        let _persisting = self.persist_lock.lock().await;
        self.lock_editable()?.reset_selection();
        self.forget_persisted().await;
        Ok(())
    }

    /// Submit the whole bucket as one requisite. The bucket is kept if the
    /// request fails; bucket edits are refused until the request settles.
    pub async fn submit(&self, sr_poc: Option<String>) -> Result<usize> {
        let submission = {
            let mut state = self.lock_state();
            if state.is_submitting {
                return Err(AppError::InvalidOperation(
                    "a submission is already in progress".to_string(),
                ));
            }
            if state.bucket.is_empty() {
                let message = "Bucket is empty. Please add items before submitting.".to_string();
                state.error = Some(message.clone());
                return Err(AppError::InvalidInput(message));
            }
            if state.sales_order.is_empty() || state.cabinet_position.is_empty() {
                let message = "Sales order and cabinet position are required.".to_string();
                state.error = Some(message.clone());
                return Err(AppError::InvalidInput(message));
            }
            state.is_submitting = true;
            state.error = None;
            // Invalidate any BOM load still in flight.
            state.bom_ticket += 1;
            state.is_loading = false;
            RequisiteSubmission {
                details: RequisiteDetails {
                    sales_order: state.sales_order.clone(),
                    cabinet_position: state.cabinet_position.clone(),
                    sr_poc: sr_poc.filter(|poc| !poc.trim().is_empty()),
                },
                items: state.bucket.clone(),
            }
        };

        let count = submission.items.len();
        let sales_order = submission.details.sales_order.clone();
        let result = self.gateway.submit(submission).await;

        let _persisting = self.persist_lock.lock().await;
        {
            let mut state = self.lock_state();
            state.is_submitting = false;
            if let Err(err) = result {
                let message = err.user_message();
                warn!(%sales_order, items = count, error = %message, "requisite submission failed");
                state.error = Some(message.clone());
                return Err(AppError::SaveFailed(message));
            }
            info!(%sales_order, items = count, "requisite submitted");
            state.reset_selection();
        }
        self.forget_persisted().await;
        Ok(count)
    }

    /// Load one history page. A page that arrives after a newer request was
    /// issued is dropped and the newer page is kept.
    pub async fn load_history(&self, offset: u32) -> Result<Vec<RequisiteRecord>> {
        let ticket = {
            let mut state = self.lock_state();
            state.history_ticket += 1;
            state.history_ticket
        };

        let result = self.gateway.history(self.history_page_size, offset).await;

        let mut state = self.lock_state();
        if state.history_ticket != ticket {
            debug!(offset, "dropping stale history page");
            return Ok(state.history.clone());
        }
        match result {
            Ok(records) => {
                debug!(count = records.len(), offset, "requisite history loaded");
                state.history = records.clone();
                Ok(records)
            }
            Err(err) => {
                let message = err.user_message();
                warn!(error = %message, "failed to fetch requisite history");
                state.error = Some(message.clone());
                Err(AppError::LoadFailed(message))
            }
        }
    }

    pub async fn history_for_sales_order(
        &self,
        sales_order: &str,
    ) -> Result<Vec<RequisiteRecord>> {
        let sales_order = sales_order.trim();
        match self.gateway.history_for_sales_order(sales_order).await {
            Ok(records) => {
                debug!(sales_order, count = records.len(), "sales order history loaded");
                Ok(records)
            }
            Err(err) => {
                let message = err.user_message();
                warn!(sales_order, error = %message, "failed to fetch sales order history");
                self.lock_state().error = Some(message.clone());
                Err(AppError::LoadFailed(message))
            }
        }
    }

    /// Change a submitted requisite's status, then refresh the first history page.
    pub async fn update_status(
        &self,
        id: i64,
        status: RequisiteStatus,
    ) -> Result<Vec<RequisiteRecord>> {
        if let Err(err) = self.gateway.update_status(id, status.clone()).await {
            let message = err.user_message();
            warn!(requisite = id, %status, error = %message, "failed to update requisite status");
            self.lock_state().error = Some(message.clone());
            return Err(AppError::SaveFailed(message));
        }
        info!(requisite = id, %status, "requisite status updated");
        self.load_history(0).await
    }

    pub fn bucket(&self) -> Vec<BucketEntry> {
        self.lock_state().bucket.clone()
    }

    pub fn bucket_count(&self) -> usize {
        self.lock_state().bucket.len()
    }

    pub fn view(&self) -> RequisiteView {
        self.lock_state().view()
    }

    pub fn is_submitting(&self) -> bool {
        self.lock_state().is_submitting
    }

    pub fn error(&self) -> Option<String> {
        self.lock_state().error.clone()
    }

    pub fn clear_error(&self) {
        self.lock_state().error = None;
    }
}

fn validate_quantity(quantity: f64) -> Result<()> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(AppError::InvalidInput(format!(
            "quantity must be greater than 0, got {quantity}"
        )));
    }
    Ok(())
}
