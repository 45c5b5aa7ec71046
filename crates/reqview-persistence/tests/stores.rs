//! Contract tests run against every backend, the remote one through an
//! in-process table server.

mod common;

use std::sync::Arc;

use chrono::Utc;
use reqview_model::{Report, ReportId, ReportPatch, sort_newest_first};
use reqview_persistence::{
    AnyReportStore, AnyScreenshotStore, JsonFileReportStore, LocalReportStore,
    MemoryScreenshotStore, PersistenceError, ReportStore, ScreenshotStore, StorageArea,
};
use tempfile::TempDir;

fn sample(name: &str, rows: usize) -> Report {
    let data = (0..rows)
        .map(|i| vec![format!("REQ-{i}"), "To be approved".to_string(), "C-1".to_string()])
        .collect();
    Report::new(
        ReportId::new(0),
        name,
        vec![
            "Requisition #".to_string(),
            "Status".to_string(),
            "Requisition".to_string(),
        ],
        data,
        Utc::now(),
    )
    .unwrap()
}

async fn backends() -> (TempDir, Vec<AnyReportStore>) {
    let dir = tempfile::tempdir().unwrap();
    let (_server, config) = common::FakeRest::spawn().await;
    let stores = vec![
        AnyReportStore::File(JsonFileReportStore::in_dir(dir.path())),
        AnyReportStore::Local(LocalReportStore::new(StorageArea::in_memory())),
        AnyReportStore::Remote(common::FakeRest::report_store(&config)),
    ];
    (dir, stores)
}

#[tokio::test]
async fn saved_report_is_returned_by_get_all() {
    let (_dir, stores) = backends().await;
    for store in stores {
        let original = sample("ROUND TRIP", 3);
        let saved = store.save(original.clone()).await.unwrap();
        assert!(saved.id().get() > 0);

        let all = store.get_all().await.unwrap();
        let found = all.iter().find(|r| r.id() == saved.id()).unwrap();
        assert_eq!(found.headers(), original.headers());
        assert_eq!(found.data(), original.data());
        assert_eq!(found.record_count(), 3);
        assert_eq!(found.name(), "ROUND TRIP");
    }
}

#[tokio::test]
async fn deleting_twice_succeeds() {
    let (_dir, stores) = backends().await;
    for store in stores {
        let saved = store.save(sample("GONE", 1)).await.unwrap();
        store.delete(saved.id()).await.unwrap();
        store.delete(saved.id()).await.unwrap();
        store.delete(ReportId::new(123)).await.unwrap();
        assert!(store.get_all().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn update_of_missing_id_is_not_found() {
    let (_dir, stores) = backends().await;
    for store in stores {
        let err = store
            .update(ReportId::new(99), ReportPatch::rename("x").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::NotFound { id: 99 }));
        assert!(!err.is_store_io());
    }
}

#[tokio::test]
async fn rename_normalizes_and_keeps_data() {
    let (_dir, stores) = backends().await;
    for store in stores {
        let saved = store.save(sample("OLD", 2)).await.unwrap();
        let renamed = store.rename(saved.id(), "  new name ").await.unwrap();
        assert_eq!(renamed.name(), "NEW NAME");
        assert_eq!(renamed.data(), saved.data());

        let err = store.rename(saved.id(), "   ").await.unwrap_err();
        assert!(matches!(err, PersistenceError::InvalidPatch { .. }));

        let all = store.get_all().await.unwrap();
        assert_eq!(all[0].name(), "NEW NAME");
    }
}

#[tokio::test]
async fn delete_all_empties_the_store() {
    let (_dir, stores) = backends().await;
    for store in stores {
        store.save(sample("A", 1)).await.unwrap();
        store.save(sample("B", 1)).await.unwrap();
        store.delete_all().await.unwrap();
        assert!(store.get_all().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn backends_produce_identical_shapes() {
    let (_dir, stores) = backends().await;
    let report = sample("SAME", 2).with_id(ReportId::new(1_700_000_000_000));
    let mut shapes = Vec::new();
    for store in stores {
        store.save(report.clone()).await.unwrap();
        let all = store.get_all().await.unwrap();
        shapes.push(serde_json::to_value(&all).unwrap());
    }
    assert!(shapes.iter().all(|shape| *shape == shapes[0]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_saves_are_all_kept() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileReportStore::in_dir(dir.path()));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.save(sample(&format!("R{i}"), 1)).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let mut all = store.get_all().await.unwrap();
    assert_eq!(all.len(), 16);
    sort_newest_first(&mut all);
    assert!(all.windows(2).all(|w| w[0].id() > w[1].id()));
}

#[tokio::test]
async fn screenshots_outlive_their_report() {
    let (_dir, stores) = backends().await;
    let shots = AnyScreenshotStore::Memory(MemoryScreenshotStore::new());
    let store = &stores[0];

    let saved = store.save(sample("WITH SHOTS", 1)).await.unwrap();
    let requisition = saved.data()[0][0].clone();
    let first = shots.save(&requisition, vec![1, 2], "one.png").await.unwrap();
    let second = shots.save(&requisition, vec![3], "").await.unwrap();
    assert_ne!(first, second);

    store.delete(saved.id()).await.unwrap();
    let attached = shots.get_by_requisition(&requisition).await.unwrap();
    assert_eq!(attached.len(), 2);

    shots.delete(first).await.unwrap();
    shots.delete(first).await.unwrap();
    let attached = shots.get_by_requisition(&requisition).await.unwrap();
    assert_eq!(attached.len(), 1);
    assert_eq!(attached[0].filename, "screenshot.png");
}
