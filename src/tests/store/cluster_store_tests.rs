use crate::{
    ClusterPatch, ConsoleError, ErrorKind, NewCluster, SuitableHostRequest,
    store::{
        cluster_slice::ClusterOperation,
        selectors::{
            select_cluster_error, select_cluster_loading, select_cluster_operation_status,
            select_cluster_success, select_clusters, select_selected_cluster,
            select_suitable_host,
        },
        slice::OperationStatus,
    },
    tests::{cluster_json, create_test_store},
};
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const BASE: &str = "/SERVICE-CLUSTER/api/service-clusters";

fn list_body(ids: &[u64]) -> serde_json::Value {
    let clusters: Vec<_> = ids
        .iter()
        .map(|id| cluster_json(*id, &format!("cluster-{id}")))
        .collect();
    serde_json::json!({ "data": { "clusters": clusters } })
}

async fn mount_list(mock_server: &MockServer, ids: &[u64]) {
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(ids)))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_clusters() {
    let mock_server = MockServer::start().await;
    let store = create_test_store(&mock_server);

    Mock::given(method("GET"))
        .and(path(format!("{BASE}/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(&[1, 2])))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/")))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({ "message": "db down" })),
        )
        .mount(&mock_server)
        .await;

    store.clusters().fetch_clusters().await.unwrap();
    let error = store.clusters().fetch_clusters().await.unwrap_err();
    assert_eq!(error.status(), Some(500));

    let state = store.clusters().snapshot().await;
    let state = state.as_ref();
    assert_eq!(select_clusters(state).len(), 2);
    assert!(!select_cluster_loading(state));
    assert!(!select_cluster_success(state));
    let error = select_cluster_error(state).unwrap();
    assert_eq!(error.status, 500);
    assert_eq!(error.message, "db down");
}

#[tokio::test]
async fn test_network_failure_is_normalized() {
    let mock_server = MockServer::start().await;
    let store = create_test_store(&mock_server);
    drop(mock_server);

    let result = store.clusters().fetch_clusters().await;
    assert!(matches!(result, Err(ConsoleError::Network(_))));

    let state = store.clusters().snapshot().await;
    let error = select_cluster_error(state.as_ref()).unwrap();
    assert_eq!(error.kind, ErrorKind::Network);
    assert_eq!(error.status, 0);
}

#[tokio::test]
async fn test_create_cluster_prepends_and_reports_success() {
    let mock_server = MockServer::start().await;
    let store = create_test_store(&mock_server);
    mount_list(&mock_server, &[1, 2]).await;

    Mock::given(method("POST"))
        .and(path(format!("{BASE}/")))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(serde_json::json!({ "data": cluster_json(7, "new") })),
        )
        .mount(&mock_server)
        .await;

    store.clusters().fetch_clusters().await.unwrap();
    let created = store
        .clusters()
        .create_cluster(&NewCluster::new("new").with_cores(64, 64))
        .await
        .unwrap();
    assert_eq!(created.id, 7);

    let state = store.clusters().snapshot().await;
    let state = state.as_ref();
    let clusters = select_clusters(state);
    assert_eq!(clusters.len(), 3);
    assert_eq!(clusters[0].id, 7);
    assert!(!select_cluster_loading(state));
    assert!(select_cluster_success(state));
    assert!(select_cluster_error(state).is_none());
}

#[tokio::test]
async fn test_rejected_create_leaves_list_untouched() {
    let mock_server = MockServer::start().await;
    let store = create_test_store(&mock_server);
    mount_list(&mock_server, &[1]).await;

    Mock::given(method("POST"))
        .and(path(format!("{BASE}/")))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(serde_json::json!({ "message": "name already used" })),
        )
        .mount(&mock_server)
        .await;

    store.clusters().fetch_clusters().await.unwrap();
    let before = store.clusters().snapshot().await.unwrap().clusters;
    assert!(store
        .clusters()
        .create_cluster(&NewCluster::new("cluster-1"))
        .await
        .is_err());

    let state = store.clusters().snapshot().await.unwrap();
    assert_eq!(state.clusters, before);
    assert!(!state.flags.success);
    assert_eq!(state.flags.error.as_ref().map(|e| e.status), Some(409));
}

#[tokio::test]
async fn test_update_replaces_cluster_in_place() {
    let mock_server = MockServer::start().await;
    let store = create_test_store(&mock_server);
    mount_list(&mock_server, &[1, 2, 3]).await;

    Mock::given(method("PATCH"))
        .and(path(format!("{BASE}/2")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": cluster_json(2, "renamed") })),
        )
        .mount(&mock_server)
        .await;

    store.clusters().fetch_clusters().await.unwrap();
    assert!(store.clusters().select(2).await);
    let before = store.clusters().snapshot().await.unwrap().clusters;

    store
        .clusters()
        .update_cluster(2, &ClusterPatch::new().nom("renamed"))
        .await
        .unwrap();

    let state = store.clusters().snapshot().await;
    let clusters = select_clusters(state.as_ref());
    assert_eq!(clusters.len(), 3);
    assert_eq!(clusters[1].nom, "renamed");
    assert_eq!(clusters[0], before[0]);
    assert_eq!(clusters[2], before[2]);
    assert_eq!(
        select_selected_cluster(state.as_ref()).map(|c| c.nom.as_str()),
        Some("renamed")
    );
}

#[tokio::test]
async fn test_delete_removes_cluster_and_selection() {
    let mock_server = MockServer::start().await;
    let store = create_test_store(&mock_server);
    mount_list(&mock_server, &[1, 2]).await;

    Mock::given(method("DELETE"))
        .and(path(format!("{BASE}/2")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "deleted"
        })))
        .mount(&mock_server)
        .await;

    store.clusters().fetch_clusters().await.unwrap();
    store.clusters().select(2).await;
    store.clusters().delete_cluster(2).await.unwrap();

    let state = store.clusters().snapshot().await;
    let state = state.as_ref();
    assert!(select_clusters(state).iter().all(|c| c.id != 2));
    assert!(select_selected_cluster(state).is_none());
    assert!(select_cluster_success(state));
}

#[tokio::test]
async fn test_repeated_fetch_is_idempotent() {
    let mock_server = MockServer::start().await;
    let store = create_test_store(&mock_server);
    mount_list(&mock_server, &[1, 2, 3]).await;

    store.clusters().fetch_clusters().await.unwrap();
    let first = store.clusters().snapshot().await.unwrap();
    store.clusters().fetch_clusters().await.unwrap();
    let second = store.clusters().snapshot().await.unwrap();

    assert_eq!(first.clusters, second.clusters);
    assert_eq!(first.flags, second.flags);
}

#[tokio::test]
async fn test_fetch_cluster_selects_it() {
    let mock_server = MockServer::start().await;
    let store = create_test_store(&mock_server);

    Mock::given(method("GET"))
        .and(path(format!("{BASE}/4")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": cluster_json(4, "four") })),
        )
        .mount(&mock_server)
        .await;

    store.clusters().fetch_cluster(4).await.unwrap();
    let state = store.clusters().snapshot().await;
    assert_eq!(select_selected_cluster(state.as_ref()).map(|c| c.id), Some(4));

    store.clusters().clear_selection().await;
    let state = store.clusters().snapshot().await;
    assert!(select_selected_cluster(state.as_ref()).is_none());
}

#[tokio::test]
async fn test_rejected_placement_keeps_slot_empty() {
    let mock_server = MockServer::start().await;
    let store = create_test_store(&mock_server);

    Mock::given(method("POST"))
        .and(path(format!("{BASE}/find-suitable-host")))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "message": "No cluster can host the requested resources"
        })))
        .mount(&mock_server)
        .await;

    let request = SuitableHostRequest {
        rom: 10_000,
        ram: 512,
        processor: 64,
        number_of_core: 256,
    };
    assert!(store.clusters().find_suitable_host(&request).await.is_err());

    let state = store.clusters().snapshot().await;
    let state = state.as_ref();
    assert!(select_suitable_host(state).is_none());
    let error = select_cluster_error(state).unwrap();
    assert_eq!(error.status, 404);
    assert_eq!(error.message, "No cluster can host the requested resources");
    assert_eq!(
        select_cluster_operation_status(state, ClusterOperation::FindSuitableHost),
        OperationStatus::Rejected
    );
}

#[tokio::test]
async fn test_shared_flags_follow_last_settlement() {
    let mock_server = MockServer::start().await;
    let store = create_test_store(&mock_server);

    Mock::given(method("GET"))
        .and(path(format!("{BASE}/")))
        .respond_with(
            ResponseTemplate::new(502)
                .set_body_json(serde_json::json!({ "message": "upstream" }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{BASE}/")))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(serde_json::json!({ "data": cluster_json(7, "fast") })),
        )
        .mount(&mock_server)
        .await;

    let clusters = store.clusters();
    let (fetched, created) = tokio::join!(clusters.fetch_clusters(), async {
        let created = clusters.create_cluster(&NewCluster::new("fast")).await;
        // The create has settled while the fetch is still in flight.
        let state = clusters.snapshot().await;
        assert!(!select_cluster_loading(state.as_ref()));
        assert!(select_cluster_success(state.as_ref()));
        assert_eq!(
            select_cluster_operation_status(state.as_ref(), ClusterOperation::FetchAll),
            OperationStatus::Pending
        );
        created
    });
    assert!(fetched.is_err());
    assert!(created.is_ok());

    let state = clusters.snapshot().await;
    let state = state.as_ref();
    assert!(!select_cluster_success(state));
    assert_eq!(select_cluster_error(state).map(|e| e.status), Some(502));
    assert_eq!(select_clusters(state).len(), 1);
    assert_eq!(
        select_cluster_operation_status(state, ClusterOperation::Create),
        OperationStatus::Fulfilled
    );
    assert_eq!(
        select_cluster_operation_status(state, ClusterOperation::FetchAll),
        OperationStatus::Rejected
    );
}

#[tokio::test]
async fn test_newer_fetch_supersedes_older() {
    let mock_server = MockServer::start().await;
    let store = create_test_store(&mock_server);

    Mock::given(method("GET"))
        .and(path(format!("{BASE}/")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_body(&[1]))
                .set_delay(Duration::from_millis(500)),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(&[2, 3])))
        .mount(&mock_server)
        .await;

    let clusters = store.clusters();
    let (older, newer) = tokio::join!(clusters.fetch_clusters(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        clusters.fetch_clusters().await
    });

    assert!(matches!(older, Err(ConsoleError::Cancelled)));
    assert_eq!(newer.unwrap().len(), 2);

    let state = clusters.snapshot().await;
    let ids: Vec<u64> = select_clusters(state.as_ref()).iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![2, 3]);
    assert!(!select_cluster_loading(state.as_ref()));
    assert!(select_cluster_error(state.as_ref()).is_none());
}

#[tokio::test]
async fn test_concurrent_loads_of_different_clusters_both_apply() {
    let mock_server = MockServer::start().await;
    let store = create_test_store(&mock_server);

    Mock::given(method("GET"))
        .and(path(format!("{BASE}/4")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": cluster_json(4, "four") }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/5")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": cluster_json(5, "five") })),
        )
        .mount(&mock_server)
        .await;

    let clusters = store.clusters();
    let (slow, fast) = tokio::join!(clusters.fetch_cluster(4), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        clusters.fetch_cluster(5).await
    });

    assert_eq!(slow.unwrap().nom, "four");
    assert_eq!(fast.unwrap().nom, "five");

    let state = clusters.snapshot().await;
    let state = state.as_ref();
    // The slower load settles last and keeps the selection.
    assert_eq!(select_selected_cluster(state).map(|c| c.id), Some(4));
    assert!(!select_cluster_loading(state));
    assert_eq!(
        select_cluster_operation_status(state, ClusterOperation::FetchOne),
        OperationStatus::Fulfilled
    );
}

#[tokio::test]
async fn test_cancel_pending_fetch() {
    let mock_server = MockServer::start().await;
    let store = create_test_store(&mock_server);

    Mock::given(method("GET"))
        .and(path(format!("{BASE}/")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_body(&[1]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let clusters = store.clusters();
    let (result, ()) = tokio::join!(clusters.fetch_clusters(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        clusters.cancel(ClusterOperation::FetchAll).await;
    });

    assert!(matches!(result, Err(ConsoleError::Cancelled)));
    let state = clusters.snapshot().await;
    let state = state.as_ref();
    assert!(select_clusters(state).is_empty());
    assert!(!select_cluster_loading(state));
    assert!(select_cluster_error(state).is_none());
    assert_eq!(
        select_cluster_operation_status(state, ClusterOperation::FetchAll),
        OperationStatus::Cancelled
    );
}
