mod common;

use std::path::Path;
use std::sync::Arc;

use common::{InMemoryBucketStore, InMemoryRequisiteGateway};
use fieldops::application::ports::BucketPersistence;
use fieldops::application::services::RequisiteService;
use fieldops::domain::entities::{BomNode, BucketEntry, BucketEntryPatch};
use fieldops::domain::value_objects::{ProductName, RequisiteStatus};
use fieldops::infrastructure::storage::BucketFileStore;
use fieldops::shared::error::AppError;

fn product(name: &str) -> ProductName {
    ProductName::new(name.to_string()).expect("product name")
}

fn bom() -> Vec<BomNode> {
    vec![BomNode {
        product_name: "MCC Panel".into(),
        cabinet_position: Some("C4".into()),
        quantity: Some(1.0),
        children: vec![BomNode::leaf("Contactor 40A"), BomNode::leaf("Cable lug 16sq")],
    }]
}

async fn service_at(
    gateway: Arc<InMemoryRequisiteGateway>,
    dir: &Path,
) -> (RequisiteService, Arc<BucketFileStore>) {
    let store = Arc::new(
        BucketFileStore::new(dir.to_path_buf())
            .await
            .expect("bucket store"),
    );
    (RequisiteService::new(gateway, store.clone(), 20), store)
}

#[tokio::test]
async fn bucket_survives_restart_and_submits_once() {
    let dir = tempfile::tempdir().expect("data dir");
    let gateway = InMemoryRequisiteGateway::with_bom("SO-4410", "C4", bom());

    let (service, _) = service_at(gateway.clone(), dir.path()).await;
    let nodes = service.load_bom(" SO-4410 ", "C4").await.expect("bom");
    assert_eq!(nodes[0].node_count(), 3);

    assert!(service
        .stage(BucketEntry::new(product("Contactor 40A")).with_issue("coil burnt"))
        .await
        .expect("stage"));
    assert!(!service
        .stage(BucketEntry::new(product("Contactor 40A")))
        .await
        .expect("duplicate stage"));
    service
        .stage(BucketEntry::new(product("Cable lug 16sq")).with_quantity(12.0))
        .await
        .expect("stage lug");
    service
        .update(
            &product("Cable lug 16sq"),
            BucketEntryPatch::quantity(10.0).with_department("Stores"),
        )
        .await
        .expect("update");
    drop(service);

    let (restored, store) = service_at(gateway.clone(), dir.path()).await;
    assert!(restored.restore().await.expect("restore"));
    let view = restored.view();
    assert_eq!(view.sales_order, "SO-4410");
    assert_eq!(view.cabinet_position, "C4");
    assert_eq!(view.bucket.len(), 2);
    assert_eq!(view.bucket[1].quantity, 10.0);
    assert_eq!(view.bucket[1].responsible_department, "Stores");

    let submitted = restored
        .submit(Some("A. Mehta".into()))
        .await
        .expect("submit");

    assert_eq!(submitted, 2);
    assert_eq!(gateway.submissions().len(), 1);
    assert_eq!(
        gateway.submissions()[0].details.sr_poc.as_deref(),
        Some("A. Mehta")
    );
    assert_eq!(restored.bucket_count(), 0);
    assert!(store.load().await.expect("load store").is_none());

    let history = restored.load_history(0).await.expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].line_count(), 2);

    let history = restored
        .update_status(history[0].id, RequisiteStatus::Completed)
        .await
        .expect("status");
    assert!(history[0].status.is_closed());
}

#[tokio::test]
async fn failed_submit_keeps_bucket_for_retry() {
    let dir = tempfile::tempdir().expect("data dir");
    let gateway = InMemoryRequisiteGateway::with_bom("SO-1", "A1", bom());
    let (service, store) = service_at(gateway.clone(), dir.path()).await;
    service.load_bom("SO-1", "A1").await.expect("bom");
    service
        .stage(BucketEntry::new(product("Contactor 40A")))
        .await
        .expect("stage");

    gateway.fail_next_submit(AppError::Network("connection refused".into()));
    let err = service.submit(None).await.expect_err("submit fails");

    assert!(matches!(err, AppError::SaveFailed(_)));
    assert_eq!(service.bucket_count(), 1);
    assert!(!service.is_submitting());
    assert_eq!(service.error().as_deref(), Some("connection refused"));
    assert_eq!(
        store.load().await.expect("load store").map(|s| s.bucket.len()),
        Some(1)
    );

    assert_eq!(service.submit(None).await.expect("retry"), 1);
    assert!(gateway.submissions()[0].details.sr_poc.is_none());
}

#[tokio::test]
async fn submit_requires_items_and_selection() {
    let dir = tempfile::tempdir().expect("data dir");
    let gateway = Arc::new(InMemoryRequisiteGateway::default());
    let (service, _) = service_at(gateway.clone(), dir.path()).await;

    assert!(matches!(
        service.submit(None).await,
        Err(AppError::InvalidInput(_))
    ));
    assert!(matches!(
        service.load_bom("SO-9", "Z9").await,
        Err(AppError::LoadFailed(_))
    ));

    service
        .stage(BucketEntry::new(product("Spare fuse")))
        .await
        .expect("stage");
    assert!(matches!(
        service.submit(None).await,
        Err(AppError::InvalidInput(_))
    ));
    assert!(gateway.submissions().is_empty());
}

fn names(bucket: &[BucketEntry]) -> Vec<String> {
    bucket
        .iter()
        .map(|entry| entry.product_name.to_string())
        .collect()
}

#[tokio::test]
async fn bucket_edits_are_rejected_while_submitting() {
    let dir = tempfile::tempdir().expect("data dir");
    let gateway = InMemoryRequisiteGateway::with_bom("SO-7", "B2", bom());
    let (service, store) = service_at(gateway.clone(), dir.path()).await;
    let service = Arc::new(service);
    service.load_bom("SO-7", "B2").await.expect("bom");
    service
        .stage(BucketEntry::new(product("Contactor 40A")))
        .await
        .expect("stage");

    let gate = gateway.hold_next_submit();
    let submitting = tokio::spawn({
        let service = service.clone();
        async move { service.submit(None).await }
    });
    gate.entered.notified().await;

    assert!(service.is_submitting());
    assert!(matches!(
        service.stage(BucketEntry::new(product("Cable lug 16sq"))).await,
        Err(AppError::InvalidOperation(_))
    ));
    assert!(matches!(
        service
            .update(&product("Contactor 40A"), BucketEntryPatch::quantity(3.0))
            .await,
        Err(AppError::InvalidOperation(_))
    ));
    assert!(matches!(
        service.remove(&product("Contactor 40A")).await,
        Err(AppError::InvalidOperation(_))
    ));
    assert!(matches!(
        service.load_bom("SO-7", "B2").await,
        Err(AppError::InvalidOperation(_))
    ));
    assert!(matches!(service.clear().await, Err(AppError::InvalidOperation(_))));
    assert_eq!(service.bucket_count(), 1);

    gate.release.notify_one();
    let submitted = submitting.await.expect("join").expect("submit");

    assert_eq!(submitted, 1);
    assert_eq!(gateway.submissions()[0].items.len(), 1);
    assert_eq!(service.bucket_count(), 0);
    assert!(store.load().await.expect("load store").is_none());

    service
        .stage(BucketEntry::new(product("Cable lug 16sq")))
        .await
        .expect("stage after submit");
}

#[tokio::test]
async fn concurrent_stages_persist_in_mutation_order() {
    let gateway = Arc::new(InMemoryRequisiteGateway::default());
    let store = Arc::new(InMemoryBucketStore::default());
    let service = Arc::new(RequisiteService::new(gateway, store.clone(), 20));

    let gate = store.hold_next_save();
    let first = tokio::spawn({
        let service = service.clone();
        async move { service.stage(BucketEntry::new(product("Relay 24V"))).await }
    });
    gate.entered.notified().await;

    let second = tokio::spawn({
        let service = service.clone();
        async move { service.stage(BucketEntry::new(product("Fuse 6A"))).await }
    });
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }

    gate.release.notify_one();
    assert!(first.await.expect("join first").expect("stage first"));
    assert!(second.await.expect("join second").expect("stage second"));

    let saved = store.saved().expect("persisted bucket");
    assert_eq!(names(&saved.bucket), vec!["Relay 24V", "Fuse 6A"]);
    assert_eq!(saved.bucket, service.bucket());
    assert_eq!(store.writes(), 2);
}

#[tokio::test]
async fn stale_history_page_is_dropped() {
    let dir = tempfile::tempdir().expect("data dir");
    let gateway = InMemoryRequisiteGateway::with_bom("SO-3", "D1", bom());
    let (service, _) = service_at(gateway.clone(), dir.path()).await;
    let service = Arc::new(service);
    service.load_bom("SO-3", "D1").await.expect("bom");
    service
        .stage(BucketEntry::new(product("Cable lug 16sq")))
        .await
        .expect("stage");
    service.submit(None).await.expect("submit");

    let gate = gateway.hold_next_history();
    let first_page = tokio::spawn({
        let service = service.clone();
        async move { service.load_history(0).await }
    });
    gate.entered.notified().await;

    let later_page = service.load_history(20).await.expect("later page");
    assert!(later_page.is_empty());

    gate.release.notify_one();
    let stale = first_page.await.expect("join").expect("first page");

    assert!(stale.is_empty());
    assert!(service.view().history.is_empty());

    let fresh = service.load_history(0).await.expect("reload");
    assert_eq!(fresh.len(), 1);
    assert_eq!(service.view().history, fresh);
}
