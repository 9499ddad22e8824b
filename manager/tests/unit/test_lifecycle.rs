//! Lifecycle unit tests

use adapter_models::ServiceState;
use stackman::deploy::OverallStatus;
use stackman::errors::ManagerError;
use stackman::storage::DeploymentStore;
use tokio_test::{assert_err, assert_ok};

use crate::support::{setup, FakeOrchestrator, TEMPLATE};

#[tokio::test]
async fn test_status_after_deploy_is_started() {
    let (_adapter, _store, manager) = setup();
    let deployment = manager.deploy(TEMPLATE).await.unwrap();

    let status = assert_ok!(manager.status(&deployment).await);

    assert_eq!(status.overall, OverallStatus::Started);
    let ids: Vec<&str> = status.services.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["db-0", "wp-1", "data-2"]);
}

#[tokio::test]
async fn test_status_precedence() {
    let (adapter, _store, manager) = setup();
    let deployment = manager.deploy(TEMPLATE).await.unwrap();

    adapter.set_state("wp-1", ServiceState::Error);
    adapter.set_state("data-2", ServiceState::Stopped);
    let status = manager.status(&deployment).await.unwrap();
    assert_eq!(status.overall, OverallStatus::Error);

    adapter.set_state("wp-1", ServiceState::Started);
    let status = manager.status(&deployment).await.unwrap();
    assert_eq!(status.overall, OverallStatus::Stopped);
    assert_eq!(status.services[2].actual_state, ServiceState::Stopped);
}

#[tokio::test]
async fn test_status_retries_timeouts() {
    let (adapter, _store, manager) = setup();
    let deployment = manager.deploy(TEMPLATE).await.unwrap();
    adapter
        .get_timeouts
        .lock()
        .unwrap()
        .insert("wp-1".to_string(), 2);

    let status = assert_ok!(manager.status(&deployment).await);

    assert_eq!(status.services.len(), 3);
    // 3 services plus 2 retries of wp-1
    assert_eq!(FakeOrchestrator::count(&adapter.get_calls), 5);
}

#[tokio::test]
async fn test_status_reports_missing_services() {
    let (adapter, _store, manager) = setup();
    let deployment = manager.deploy(TEMPLATE).await.unwrap();
    adapter.forget("db-0");

    let err = assert_err!(manager.status(&deployment).await);

    match &err {
        ManagerError::Fanout(fanout) => assert_eq!(fanout.failed_ids(), vec!["db-0"]),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_stop_then_start() {
    let (adapter, _store, manager) = setup();
    let deployment = manager.deploy(TEMPLATE).await.unwrap();

    assert_ok!(manager.stop(&deployment).await);
    for id in &deployment.service_ids {
        assert_eq!(adapter.state_of(id), Some(ServiceState::Stopped));
    }
    assert_eq!(
        manager.status(&deployment).await.unwrap().overall,
        OverallStatus::Stopped
    );

    assert_ok!(manager.start(&deployment).await);
    assert_eq!(
        manager.status(&deployment).await.unwrap().overall,
        OverallStatus::Started
    );
    assert_eq!(FakeOrchestrator::count(&adapter.update_calls), 6);
}

#[tokio::test]
async fn test_stop_attempts_every_service() {
    let (adapter, _store, manager) = setup();
    let deployment = manager.deploy(TEMPLATE).await.unwrap();
    adapter.fail_update_of("db-0");

    let err = assert_err!(manager.stop(&deployment).await);

    match err {
        ManagerError::Fanout(fanout) => {
            assert_eq!(fanout.operation, "stop");
            assert_eq!(fanout.failed_ids(), vec!["db-0"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(FakeOrchestrator::count(&adapter.update_calls), 3);
    assert_eq!(adapter.state_of("wp-1"), Some(ServiceState::Stopped));
    assert_eq!(adapter.state_of("data-2"), Some(ServiceState::Stopped));
}

#[tokio::test]
async fn test_teardown_attempts_every_deletion() {
    let (adapter, store, manager) = setup();
    let deployment = manager.deploy(TEMPLATE).await.unwrap();
    adapter.fail_delete_of("db-0");

    let err = assert_err!(manager.teardown(&deployment).await);

    assert!(matches!(err, ManagerError::Fanout(_)));
    assert_eq!(FakeOrchestrator::count(&adapter.delete_calls), 3);
    assert_eq!(adapter.ids(), vec!["db-0"]);
    // the record still owns db-0
    assert!(store.load(&deployment.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_teardown_tolerates_already_deleted_services() {
    let (adapter, _store, manager) = setup();
    let deployment = manager.deploy(TEMPLATE).await.unwrap();
    adapter.forget("wp-1");

    let receipt = assert_ok!(manager.teardown(&deployment).await);

    assert_eq!(receipt.deployment_id(), deployment.id);
    assert!(adapter.ids().is_empty());
}

#[tokio::test]
async fn test_remove_record_after_teardown() {
    let (_adapter, store, manager) = setup();
    let deployment = manager.deploy(TEMPLATE).await.unwrap();

    let receipt = manager.teardown(&deployment).await.unwrap();
    assert!(store.load(&deployment.id).await.unwrap().is_some());

    assert_ok!(manager.remove_record(receipt).await);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_undeploy() {
    let (adapter, _store, manager) = setup();
    let deployment = manager.deploy(TEMPLATE).await.unwrap();

    assert_ok!(manager.undeploy(&deployment.id).await);

    assert!(adapter.ids().is_empty());
    assert!(matches!(
        manager.get(&deployment.id).await,
        Err(ManagerError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_undeploy_keeps_record_on_failure() {
    let (adapter, _store, manager) = setup();
    let deployment = manager.deploy(TEMPLATE).await.unwrap();
    adapter.fail_delete_of("data-2");

    assert_err!(manager.undeploy(&deployment.id).await);

    let still_there = manager.get(&deployment.id).await.unwrap();
    assert_eq!(still_there.service_ids, deployment.service_ids);
}

#[tokio::test]
async fn test_undeploy_unknown_deployment() {
    let (adapter, _store, manager) = setup();

    let err = assert_err!(manager.undeploy("nope").await);

    assert!(matches!(err, ManagerError::NotFound(_)));
    assert_eq!(FakeOrchestrator::count(&adapter.delete_calls), 0);
}
