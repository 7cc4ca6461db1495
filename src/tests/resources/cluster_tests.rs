use crate::{
    ClusterPatch, ConsoleError, ErrorKind, NewCluster, SuitableHostRequest,
    core::domain::model::cluster::CapacityDimension,
    tests::{cluster_json, cluster_service},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path},
};

const BASE: &str = "/SERVICE-CLUSTER/api/service-clusters";

#[tokio::test]
async fn test_list_all_clusters() {
    let mock_server = MockServer::start().await;
    let service = cluster_service(&mock_server);

    Mock::given(method("GET"))
        .and(path(format!("{BASE}/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "clusters": [cluster_json(1, "paris"), cluster_json(2, "lyon")] }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let clusters = service.list_all().await.unwrap();
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0].id, 1);
    assert_eq!(clusters[0].nom, "paris");
    assert_eq!(clusters[0].adresse_ip.as_deref(), Some("10.0.0.1"));
    assert_eq!(clusters[1].available_number_of_core, 32);
}

#[tokio::test]
async fn test_null_cluster_list_reads_as_empty() {
    let mock_server = MockServer::start().await;
    let service = cluster_service(&mock_server);

    Mock::given(method("GET"))
        .and(path(format!("{BASE}/available")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "clusters": null }
            })),
        )
        .mount(&mock_server)
        .await;

    assert!(service.list_available().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_with_wrong_shape_is_rejected() {
    let mock_server = MockServer::start().await;
    let service = cluster_service(&mock_server);

    Mock::given(method("GET"))
        .and(path(format!("{BASE}/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "clusters": "not-a-list" }
        })))
        .mount(&mock_server)
        .await;

    let error = service.list_all().await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Shape);
    assert_eq!(error.status(), Some(200));
}

#[tokio::test]
async fn test_get_cluster_by_id() {
    let mock_server = MockServer::start().await;
    let service = cluster_service(&mock_server);

    Mock::given(method("GET"))
        .and(path(format!("{BASE}/5")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": cluster_json(5, "nantes") })),
        )
        .mount(&mock_server)
        .await;

    let cluster = service.get_by_id(5).await.unwrap();
    assert_eq!(cluster.nom, "nantes");
    assert!(cluster.capacity_violations().is_empty());
}

#[tokio::test]
async fn test_get_missing_cluster() {
    let mock_server = MockServer::start().await;
    let service = cluster_service(&mock_server);

    Mock::given(method("GET"))
        .and(path(format!("{BASE}/99")))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({ "message": "Cluster 99 not found" })),
        )
        .mount(&mock_server)
        .await;

    match service.get_by_id(99).await {
        Err(ConsoleError::Http {
            status, message, ..
        }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Cluster 99 not found");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_create_cluster_sends_capacity() {
    let mock_server = MockServer::start().await;
    let service = cluster_service(&mock_server);

    Mock::given(method("POST"))
        .and(path(format!("{BASE}/")))
        .and(body_json(serde_json::json!({
            "nom": "marseille",
            "adresse_ip": "10.0.0.9",
            "ram": 256,
            "available_ram": 256
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "data": cluster_json(7, "marseille"),
            "message": "created"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let params = NewCluster::new("marseille")
        .with_address("10.0.0.9")
        .with_ram(256, 256);
    let cluster = service.create(&params).await.unwrap();
    assert_eq!(cluster.id, 7);
}

#[tokio::test]
async fn test_create_cluster_validates_before_sending() {
    let mock_server = MockServer::start().await;
    let service = cluster_service(&mock_server);

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let over_allocated = NewCluster::new("bad").with_rom(10, 20);
    let error = service.create(&over_allocated).await.unwrap_err();
    assert!(matches!(error, ConsoleError::Validation(_)));

    let unnamed = NewCluster::new("  ");
    assert!(matches!(
        service.create(&unnamed).await,
        Err(ConsoleError::Validation(_))
    ));
}

#[tokio::test]
async fn test_update_cluster_sends_only_changed_fields() {
    let mock_server = MockServer::start().await;
    let service = cluster_service(&mock_server);

    Mock::given(method("PATCH"))
        .and(path(format!("{BASE}/3")))
        .and(body_json(serde_json::json!({
            "nom": "renamed",
            "available_processor": 2
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": cluster_json(3, "renamed") })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let patch = ClusterPatch::new()
        .nom("renamed")
        .available(CapacityDimension::Processor, 2);
    let updated = service.update(3, &patch).await.unwrap();
    assert_eq!(updated.nom, "renamed");
}

#[tokio::test]
async fn test_delete_cluster_accepts_empty_body() {
    let mock_server = MockServer::start().await;
    let service = cluster_service(&mock_server);

    Mock::given(method("DELETE"))
        .and(path(format!("{BASE}/4")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    service.delete(4).await.unwrap();
}

#[tokio::test]
async fn test_find_suitable_host() {
    let mock_server = MockServer::start().await;
    let service = cluster_service(&mock_server);

    Mock::given(method("POST"))
        .and(path(format!("{BASE}/find-suitable-host")))
        .and(body_json(serde_json::json!({
            "rom": 20,
            "ram": 4,
            "processor": 1,
            "number_of_core": 2
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "service_cluster_id": 2, "nom": "lyon", "host_ip": "10.0.1.4" }
        })))
        .mount(&mock_server)
        .await;

    let request = SuitableHostRequest {
        rom: 20,
        ram: 4,
        processor: 1,
        number_of_core: 2,
    };
    let decision = service.find_suitable_host(&request).await.unwrap();
    assert_eq!(decision.service_cluster_id, 2);
    assert_eq!(decision.host_ip.as_deref(), Some("10.0.1.4"));
    assert!(decision.reason.is_none());
}

#[tokio::test]
async fn test_health_and_info_are_bare() {
    let mock_server = MockServer::start().await;
    let service = cluster_service(&mock_server);

    Mock::given(method("GET"))
        .and(path(format!("{BASE}/health")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "UP" })),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/info")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "service-cluster",
            "version": "1.4.0",
            "instances": 2
        })))
        .mount(&mock_server)
        .await;

    assert!(service.health().await.unwrap().is_healthy());
    let info = service.service_info().await.unwrap();
    assert_eq!(info.version.as_deref(), Some("1.4.0"));
    assert_eq!(info.details.get("instances"), Some(&serde_json::json!(2)));
}
