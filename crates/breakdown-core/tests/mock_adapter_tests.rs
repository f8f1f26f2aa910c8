//! Adapter-contract tests with a mocked scene adapter: call counts,
//! argument pass-through, and the paths that must never reach the engine.

use async_trait::async_trait;
use breakdown_core::{BreakdownManager, CancelFlag, ScanError, UpdateError};
use breakdown_hooks::{AdapterError, RawReference, SceneAdapter, SceneChangeEvent};
use breakdown_model::{BreakdownConfig, NodeId, PublishedFile, ScanScope};
use breakdown_test_utils::{published_file, raw_reference, MemoryTrackingSource};
use mockall::mock;
use mockall::predicate::eq;
use std::sync::Arc;
use tokio::sync::mpsc;

mock! {
    Adapter {}

    #[async_trait]
    impl SceneAdapter for Adapter {
        async fn enumerate_references(
            &self,
            scope: ScanScope,
        ) -> Result<Vec<RawReference>, AdapterError>;

        async fn update_reference(
            &self,
            node_id: &NodeId,
            target: &PublishedFile,
        ) -> Result<(), AdapterError>;

        async fn resolve_path(&self, node_id: &NodeId) -> Result<String, AdapterError>;

        fn is_reentrant(&self) -> bool;

        fn watch_scene_changes(&self) -> Option<mpsc::Receiver<SceneChangeEvent>>;
    }
}

fn manager_with(adapter: MockAdapter) -> BreakdownManager {
    let source = Arc::new(MemoryTrackingSource::with_records(vec![
        published_file(1, "asset_a", 1),
        published_file(2, "asset_a", 2),
    ]));
    BreakdownManager::new(Arc::new(adapter), source, BreakdownConfig::new())
}

#[tokio::test]
async fn scan_enumerates_exactly_once_with_the_given_scope() {
    let mut adapter = MockAdapter::new();
    adapter
        .expect_enumerate_references()
        .with(eq(ScanScope::ScenePath("/proj/shot.ma".into())))
        .times(1)
        .returning(|_| Ok(vec![raw_reference("a", "asset_a", 1)]));

    let mut manager = manager_with(adapter);
    let cancel = CancelFlag::new();
    manager
        .scan(ScanScope::ScenePath("/proj/shot.ma".into()), &cancel)
        .await
        .unwrap();
    assert_eq!(manager.len(), 1);
}

#[tokio::test]
async fn no_scene_surfaces_as_a_scan_error() {
    let mut adapter = MockAdapter::new();
    adapter
        .expect_enumerate_references()
        .times(1)
        .returning(|_| Err(AdapterError::NoScene));

    let mut manager = manager_with(adapter);
    let cancel = CancelFlag::new();
    let err = manager
        .scan(ScanScope::CurrentScene, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::Adapter(AdapterError::NoScene)));
}

#[tokio::test]
async fn noop_update_never_reaches_the_adapter() {
    let mut adapter = MockAdapter::new();
    adapter
        .expect_enumerate_references()
        .returning(|_| Ok(vec![raw_reference("a", "asset_a", 2)]));
    // bound record equals the latest record: the engine must not be asked
    adapter.expect_update_reference().never();

    let mut manager = manager_with(adapter);
    let cancel = CancelFlag::new();
    manager.scan(ScanScope::CurrentScene, &cancel).await.unwrap();
    manager
        .update_item(&NodeId::from("a"), None)
        .await
        .unwrap();
}

#[tokio::test]
async fn untracked_update_never_reaches_the_adapter() {
    let mut adapter = MockAdapter::new();
    adapter
        .expect_enumerate_references()
        .returning(|_| Ok(vec![raw_reference("a", "nobody_knows_this", 1)]));
    adapter.expect_update_reference().never();

    let mut manager = manager_with(adapter);
    let cancel = CancelFlag::new();
    manager.scan(ScanScope::CurrentScene, &cancel).await.unwrap();
    let err = manager
        .update_item(&NodeId::from("a"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, UpdateError::Untracked(_)));
}

#[tokio::test]
async fn update_passes_node_and_target_through() {
    let mut adapter = MockAdapter::new();
    adapter
        .expect_enumerate_references()
        .returning(|_| Ok(vec![raw_reference("a", "asset_a", 1)]));
    adapter.expect_is_reentrant().return_const(false);
    adapter
        .expect_update_reference()
        .withf(|node_id, target| {
            node_id == &NodeId::from("a") && target.id == 2 && target.version == 2
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let mut manager = manager_with(adapter);
    let cancel = CancelFlag::new();
    manager.scan(ScanScope::CurrentScene, &cancel).await.unwrap();
    manager
        .update_item(&NodeId::from("a"), None)
        .await
        .unwrap();
}
