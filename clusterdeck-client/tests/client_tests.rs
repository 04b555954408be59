//! Provisioning API client tests against the fake service
//!
//! Run with: cargo test --test client_tests

mod common;

use clusterdeck_client::{ClientError, ProvisioningClient};
use clusterdeck_common::{ClusterConfig, ClusterState, JobState};
use common::FakeProvisioner;

async fn client_for_fake() -> (std::sync::Arc<FakeProvisioner>, ProvisioningClient) {
    let fake = FakeProvisioner::new();
    let url = common::serve(fake.clone()).await;
    (fake, ProvisioningClient::new(&url))
}

#[tokio::test]
async fn cluster_crud_round_trip() {
    let (_fake, client) = client_for_fake().await;

    let created = client
        .create_cluster(&ClusterConfig::new("demo"))
        .await
        .unwrap();
    assert_eq!(created.cluster_id, "c-1");
    let job_id = created.job_id.clone().expect("create returns a job id");

    let clusters = client.list_clusters().await.unwrap();
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].config.name, "demo");
    assert_eq!(clusters[0].status, ClusterState::Creating);

    let detail = client.get_cluster(&created.cluster_id).await.unwrap();
    assert_eq!(detail.cluster.id, created.cluster_id);
    assert_eq!(detail.job.expect("detail includes the job").id, job_id);

    let deleted = client.delete_cluster(&created.cluster_id).await.unwrap();
    assert!(!deleted.job_id.is_empty());
    assert!(client.list_clusters().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_cluster_maps_to_not_found() {
    let (_fake, client) = client_for_fake().await;

    let err = client.get_cluster("no-such-cluster").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
    assert!(!err.is_transport());
}

#[tokio::test]
async fn job_status_and_logs() {
    let (_fake, client) = client_for_fake().await;

    let created = client
        .create_cluster(&ClusterConfig::new("demo"))
        .await
        .unwrap();
    let job_id = created.job_id.unwrap();

    let job = client.job_status(&job_id).await.unwrap();
    assert_eq!(job.status, JobState::Pending);
    assert_eq!(job.progress, 0);
    assert_eq!(job.cluster_id.as_deref(), Some(created.cluster_id.as_str()));

    let logs = client.job_logs(&job_id).await.unwrap();
    assert!(logs.is_empty());
}

#[tokio::test]
async fn remote_validator_applies_contract_rules() {
    let (_fake, client) = client_for_fake().await;

    // Long name and old version: valid, but with warnings
    let config = ClusterConfig::new("a-very-long-cluster-name").with_version("4.19");
    let outcome = client.validate(&config).await.unwrap();
    assert!(outcome.valid);
    assert_eq!(outcome.warnings.len(), 2);

    // Replica ordering violation: a hard error
    let config = ClusterConfig::new("demo").with_replicas(5, 2);
    let outcome = client.validate(&config).await.unwrap();
    assert!(!outcome.valid);
    assert!(!outcome.errors.is_empty());
}

#[tokio::test]
async fn platform_metadata_endpoints() {
    let (_fake, client) = client_for_fake().await;

    let versions = client.supported_versions().await.unwrap();
    assert_eq!(versions.supported_versions, ["4.18", "4.19", "4.20"]);
    assert_eq!(versions.recommended_version, "4.20.0");

    let templates = client.templates().await.unwrap();
    assert_eq!(templates.len(), 2);
    assert!(templates.iter().any(|t| t.id == "rosa-network-basic"));

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "healthy");
}
