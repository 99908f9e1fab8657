#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use fieldops::application::ports::{
    BucketPersistence, ChecklistGateway, PersistedBucket, RequisiteGateway,
};
use fieldops::domain::entities::{
    BomNode, ChecklistItem, ChecklistItemPatch, ChecklistItemUpdate, ChecklistMeta,
    ChecklistSnapshot, ChecklistStats, EditableRecord, RequisiteLine, RequisiteRecord,
    RequisiteSubmission,
};
use fieldops::domain::value_objects::{ChecklistItemId, ChecklistKey, RequisiteStatus};
use fieldops::shared::error::AppError;

pub const KEY: ChecklistKey = ChecklistKey {
    job_id: 41,
    checklist_id: 7,
};

/// Holds one gateway call until the test releases it.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

impl Gate {
    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

pub fn item(id: i64, text: &str) -> ChecklistItem {
    ChecklistItem::new(id, text)
}

#[derive(Default)]
struct ChecklistServer {
    items: Vec<ChecklistItem>,
    batches: Vec<Vec<ChecklistItemUpdate>>,
    commits: Vec<(ChecklistItemId, ChecklistItemPatch)>,
    fail_next_batch: Option<AppError>,
    fetch_gate: Option<Arc<Gate>>,
    batch_gate: Option<Arc<Gate>>,
}

/// Checklist backend kept in memory. Batches apply atomically and approvals
/// are only ever set by the test, as a reviewer would.
#[derive(Default)]
pub struct InMemoryChecklistGateway {
    server: Mutex<ChecklistServer>,
}

impl InMemoryChecklistGateway {
    pub fn with_items(items: Vec<ChecklistItem>) -> Arc<Self> {
        let gateway = Self::default();
        gateway.server.lock().unwrap().items = items;
        Arc::new(gateway)
    }

    pub fn set_items(&self, items: Vec<ChecklistItem>) {
        self.server.lock().unwrap().items = items;
    }

    pub fn approve(&self, id: i64) {
        let mut server = self.server.lock().unwrap();
        if let Some(item) = server.items.iter_mut().find(|i| i.id.value() == id) {
            item.is_approved = true;
        }
    }

    pub fn server_items(&self) -> Vec<ChecklistItem> {
        self.server.lock().unwrap().items.clone()
    }

    pub fn batches(&self) -> Vec<Vec<ChecklistItemUpdate>> {
        self.server.lock().unwrap().batches.clone()
    }

    pub fn commits(&self) -> Vec<(ChecklistItemId, ChecklistItemPatch)> {
        self.server.lock().unwrap().commits.clone()
    }

    pub fn fail_next_batch(&self, err: AppError) {
        self.server.lock().unwrap().fail_next_batch = Some(err);
    }

    pub fn hold_next_fetch(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.server.lock().unwrap().fetch_gate = Some(gate.clone());
        gate
    }

    pub fn hold_next_batch(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.server.lock().unwrap().batch_gate = Some(gate.clone());
        gate
    }

    fn snapshot(items: Vec<ChecklistItem>) -> ChecklistSnapshot {
        ChecklistSnapshot {
            meta: ChecklistMeta {
                key: KEY,
                title: "LT panel inspection".into(),
                job_title: "Warehouse 3 electrification".into(),
            },
            stats: ChecklistStats::from_items(&items),
            items,
        }
    }
}

#[async_trait]
impl ChecklistGateway for InMemoryChecklistGateway {
    async fn fetch_checklist(&self, key: ChecklistKey) -> Result<ChecklistSnapshot, AppError> {
        if key != KEY {
            return Err(AppError::NotFound("Checklist not found".into()));
        }
        // A held fetch answers with the items as of the request.
        let (items, gate) = {
            let mut server = self.server.lock().unwrap();
            (server.items.clone(), server.fetch_gate.take())
        };
        if let Some(gate) = gate {
            gate.pass().await;
        }
        Ok(Self::snapshot(items))
    }

    async fn batch_update(
        &self,
        _key: ChecklistKey,
        updates: Vec<ChecklistItemUpdate>,
    ) -> Result<ChecklistStats, AppError> {
        let gate = self.server.lock().unwrap().batch_gate.take();
        if let Some(gate) = gate {
            gate.pass().await;
        }

        let mut server = self.server.lock().unwrap();
        server.batches.push(updates.clone());
        if let Some(err) = server.fail_next_batch.take() {
            return Err(err);
        }
        let ids: Vec<i64> = server.items.iter().map(|i| i.id.value()).collect();
        if let Some(missing) = updates.iter().find(|u| !ids.contains(&u.id.value())) {
            return Err(AppError::Api {
                status: 422,
                message: format!("unknown item {}", missing.id),
            });
        }
        for update in &updates {
            if let Some(item) = server.items.iter_mut().find(|i| i.id == update.id) {
                item.apply(&update.changes);
            }
        }
        Ok(ChecklistStats::from_items(&server.items))
    }

    async fn commit_item(
        &self,
        _key: ChecklistKey,
        id: ChecklistItemId,
        changes: ChecklistItemPatch,
    ) -> Result<(), AppError> {
        let mut server = self.server.lock().unwrap();
        server.commits.push((id, changes.clone()));
        match server.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.apply(&changes);
                Ok(())
            }
            None => Err(AppError::NotFound(format!("item {id}"))),
        }
    }
}

#[derive(Default)]
struct RequisiteServer {
    boms: BTreeMap<(String, String), Vec<BomNode>>,
    records: Vec<RequisiteRecord>,
    submissions: Vec<RequisiteSubmission>,
    fail_next_submit: Option<AppError>,
    next_id: i64,
    submit_gate: Option<Arc<Gate>>,
    history_gate: Option<Arc<Gate>>,
}

#[derive(Default)]
pub struct InMemoryRequisiteGateway {
    server: Mutex<RequisiteServer>,
}

impl InMemoryRequisiteGateway {
    pub fn with_bom(sales_order: &str, cabinet: &str, nodes: Vec<BomNode>) -> Arc<Self> {
        let gateway = Self::default();
        gateway
            .server
            .lock()
            .unwrap()
            .boms
            .insert((sales_order.into(), cabinet.into()), nodes);
        Arc::new(gateway)
    }

    pub fn submissions(&self) -> Vec<RequisiteSubmission> {
        self.server.lock().unwrap().submissions.clone()
    }

    pub fn fail_next_submit(&self, err: AppError) {
        self.server.lock().unwrap().fail_next_submit = Some(err);
    }

    pub fn hold_next_submit(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.server.lock().unwrap().submit_gate = Some(gate.clone());
        gate
    }

    pub fn hold_next_history(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.server.lock().unwrap().history_gate = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl RequisiteGateway for InMemoryRequisiteGateway {
    async fn fetch_bom(
        &self,
        sales_order: &str,
        cabinet_position: &str,
    ) -> Result<Vec<BomNode>, AppError> {
        self.server
            .lock()
            .unwrap()
            .boms
            .get(&(sales_order.to_string(), cabinet_position.to_string()))
            .cloned()
            .ok_or_else(|| AppError::NotFound("BOM not found".into()))
    }

    async fn submit(&self, submission: RequisiteSubmission) -> Result<(), AppError> {
        let gate = self.server.lock().unwrap().submit_gate.take();
        if let Some(gate) = gate {
            gate.pass().await;
        }

        let mut server = self.server.lock().unwrap();
        if let Some(err) = server.fail_next_submit.take() {
            return Err(err);
        }
        server.next_id += 1;
        let record = RequisiteRecord {
            id: server.next_id,
            sales_order: submission.details.sales_order.clone(),
            sr_poc: submission.details.sr_poc.clone(),
            status: RequisiteStatus::Pending,
            created_date: None,
            closed_date: None,
            site_requisites: submission
                .items
                .iter()
                .map(|entry| RequisiteLine {
                    id: None,
                    product_name: entry.product_name.to_string(),
                    quantity: entry.quantity,
                    issue_description: entry.issue_description.clone(),
                    responsible_department: entry.responsible_department.clone(),
                })
                .collect(),
        };
        server.records.insert(0, record);
        server.submissions.push(submission);
        Ok(())
    }

    async fn history(&self, limit: u32, offset: u32) -> Result<Vec<RequisiteRecord>, AppError> {
        // A held page answers with the records as of the request.
        let (page, gate) = {
            let mut server = self.server.lock().unwrap();
            let page = server
                .records
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect();
            (page, server.history_gate.take())
        };
        if let Some(gate) = gate {
            gate.pass().await;
        }
        Ok(page)
    }

    async fn history_for_sales_order(
        &self,
        sales_order: &str,
    ) -> Result<Vec<RequisiteRecord>, AppError> {
        Ok(self
            .server
            .lock()
            .unwrap()
            .records
            .iter()
            .filter(|record| record.sales_order == sales_order)
            .cloned()
            .collect())
    }

    async fn update_status(&self, id: i64, status: RequisiteStatus) -> Result<(), AppError> {
        let mut server = self.server.lock().unwrap();
        let record = server
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| AppError::NotFound(format!("requisite {id}")))?;
        record.status = status;
        Ok(())
    }
}

#[derive(Default)]
struct SavedBucket {
    current: Option<PersistedBucket>,
    writes: usize,
    save_gate: Option<Arc<Gate>>,
}

/// Bucket persistence kept in memory, with a gate to hold one write.
#[derive(Default)]
pub struct InMemoryBucketStore {
    saved: Mutex<SavedBucket>,
}

impl InMemoryBucketStore {
    pub fn saved(&self) -> Option<PersistedBucket> {
        self.saved.lock().unwrap().current.clone()
    }

    pub fn writes(&self) -> usize {
        self.saved.lock().unwrap().writes
    }

    pub fn hold_next_save(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.saved.lock().unwrap().save_gate = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl BucketPersistence for InMemoryBucketStore {
    async fn load(&self) -> Result<Option<PersistedBucket>, AppError> {
        Ok(self.saved())
    }

    async fn save(&self, state: &PersistedBucket) -> Result<(), AppError> {
        let gate = self.saved.lock().unwrap().save_gate.take();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        let mut saved = self.saved.lock().unwrap();
        saved.current = Some(state.clone());
        saved.writes += 1;
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        let mut saved = self.saved.lock().unwrap();
        saved.current = None;
        saved.writes += 1;
        Ok(())
    }
}
