//! In-process fake of the Provisioning API.
//!
//! Implements the same HTTP contract the real service exposes, plus knobs
//! the tests use: a forced validation verdict, a forced creation failure,
//! an undecodable-response mode, and a gate that parks handlers so call
//! sequencing can be observed from outside.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use clusterdeck_common::{
    ClusterConfig, ClusterRecord, ClusterState, JobState, JobStatus, ValidationOutcome,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

pub struct FakeProvisioner {
    pub validate_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    /// Every cluster name the create endpoint has been asked for
    pub created_names: Mutex<Vec<String>>,
    pub clusters: Mutex<Vec<ClusterRecord>>,
    pub jobs: Mutex<Vec<JobStatus>>,
    /// Forces the validator's verdict instead of the rule-based one
    pub validate_override: Mutex<Option<ValidationOutcome>>,
    /// Makes the create endpoint answer with this status and detail string
    pub create_failure: Mutex<Option<(u16, String)>>,
    /// Makes the validate endpoint answer 200 with a non-JSON body
    pub garbled_validate: AtomicBool,
    /// When set, validate/create handlers park until a permit arrives
    pub gated: AtomicBool,
    pub gate: Semaphore,
}

impl FakeProvisioner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            validate_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            created_names: Mutex::new(Vec::new()),
            clusters: Mutex::new(Vec::new()),
            jobs: Mutex::new(Vec::new()),
            validate_override: Mutex::new(None),
            create_failure: Mutex::new(None),
            garbled_validate: AtomicBool::new(false),
            gated: AtomicBool::new(false),
            gate: Semaphore::new(0),
        })
    }

    async fn park_if_gated(&self) {
        if self.gated.load(Ordering::SeqCst) {
            self.gate.acquire().await.expect("gate closed").forget();
        }
    }
}

/// Serve the fake on an ephemeral port and return its base URL
pub async fn serve(state: Arc<FakeProvisioner>) -> String {
    let app = Router::new()
        .route("/api/validate", post(validate_config))
        .route("/api/clusters", post(create_cluster).get(list_clusters))
        .route("/api/clusters/:id", get(get_cluster).delete(remove_cluster))
        .route("/api/jobs/:id", get(job_status))
        .route("/api/jobs/:id/logs", get(job_logs))
        .route("/api/versions", get(versions))
        .route("/api/templates", get(templates))
        .route("/api/health", get(health))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake API");
    let addr = listener.local_addr().expect("fake API address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake API serve");
    });

    format!("http://{}", addr)
}

/// The validator's rules, matching the real service
fn rule_based_outcome(config: &ClusterConfig) -> ValidationOutcome {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let squashed: String = config.name.chars().filter(|c| *c != '-').collect();
    if squashed.is_empty() || !squashed.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push("Cluster name must contain only alphanumeric characters and hyphens".to_string());
    }
    if config.name.len() > 15 {
        warnings.push("Cluster name longer than 15 characters may cause issues".to_string());
    }
    if config.min_replicas > config.max_replicas {
        errors.push("Min replicas cannot be greater than max replicas".to_string());
    }
    if !config.version.starts_with("4.20") {
        warnings.push("Only OpenShift 4.20 is fully supported by this automation".to_string());
    }

    ValidationOutcome {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

async fn validate_config(
    State(state): State<Arc<FakeProvisioner>>,
    Json(config): Json<ClusterConfig>,
) -> Response {
    state.validate_calls.fetch_add(1, Ordering::SeqCst);
    state.park_if_gated().await;

    if state.garbled_validate.load(Ordering::SeqCst) {
        return (StatusCode::OK, "this is not json").into_response();
    }

    let forced = state.validate_override.lock().unwrap().clone();
    let outcome = forced.unwrap_or_else(|| rule_based_outcome(&config));
    Json(outcome).into_response()
}

async fn create_cluster(
    State(state): State<Arc<FakeProvisioner>>,
    Json(config): Json<ClusterConfig>,
) -> Response {
    let n = state.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
    state.park_if_gated().await;

    state.created_names.lock().unwrap().push(config.name.clone());

    let failure = state.create_failure.lock().unwrap().clone();
    if let Some((status, detail)) = failure {
        let status = StatusCode::from_u16(status).expect("valid status code");
        return (status, Json(json!({ "detail": detail }))).into_response();
    }

    let cluster_id = format!("c-{}", n);
    let job_id = format!("j-{}", n);
    let now = Utc::now();

    state.jobs.lock().unwrap().push(JobStatus {
        id: job_id.clone(),
        cluster_id: Some(cluster_id.clone()),
        status: JobState::Pending,
        progress: 0,
        message: "Job queued for execution".to_string(),
        started_at: now,
        completed_at: None,
        logs: Vec::new(),
    });
    state.clusters.lock().unwrap().push(ClusterRecord {
        id: cluster_id.clone(),
        config,
        job_id: job_id.clone(),
        created_at: now,
        status: ClusterState::Creating,
    });

    Json(json!({
        "cluster_id": cluster_id,
        "job_id": job_id,
        "message": "Cluster creation started",
    }))
    .into_response()
}

async fn list_clusters(State(state): State<Arc<FakeProvisioner>>) -> Response {
    let clusters = state.clusters.lock().unwrap().clone();
    Json(json!({ "clusters": clusters })).into_response()
}

async fn get_cluster(State(state): State<Arc<FakeProvisioner>>, Path(id): Path<String>) -> Response {
    let cluster = state
        .clusters
        .lock()
        .unwrap()
        .iter()
        .find(|c| c.id == id)
        .cloned();

    match cluster {
        Some(cluster) => {
            let job = state
                .jobs
                .lock()
                .unwrap()
                .iter()
                .find(|j| j.id == cluster.job_id)
                .cloned();
            Json(json!({ "cluster": cluster, "job": job })).into_response()
        }
        None => not_found("Cluster not found"),
    }
}

async fn remove_cluster(
    State(state): State<Arc<FakeProvisioner>>,
    Path(id): Path<String>,
) -> Response {
    let mut clusters = state.clusters.lock().unwrap();
    match clusters.iter().position(|c| c.id == id) {
        Some(pos) => {
            clusters.remove(pos);
            Json(json!({
                "job_id": format!("j-del-{}", id),
                "message": "Cluster deletion started",
            }))
            .into_response()
        }
        None => not_found("Cluster not found"),
    }
}

async fn job_status(State(state): State<Arc<FakeProvisioner>>, Path(id): Path<String>) -> Response {
    let job = state.jobs.lock().unwrap().iter().find(|j| j.id == id).cloned();
    match job {
        Some(job) => Json(job).into_response(),
        None => not_found("Job not found"),
    }
}

async fn job_logs(State(state): State<Arc<FakeProvisioner>>, Path(id): Path<String>) -> Response {
    let job = state.jobs.lock().unwrap().iter().find(|j| j.id == id).cloned();
    match job {
        Some(job) => Json(json!({ "logs": job.logs })).into_response(),
        None => not_found("Job not found"),
    }
}

async fn versions() -> Response {
    Json(json!({
        "supported_versions": ["4.18", "4.19", "4.20"],
        "default_version": "4.20",
        "recommended_version": "4.20.0",
    }))
    .into_response()
}

async fn templates() -> Response {
    Json(json!({
        "templates": [
            {
                "id": "rosa-network-basic",
                "name": "ROSA with Network Automation",
                "description": "Basic ROSA HCP cluster with automated VPC/subnet creation",
                "features": ["network_automation"],
                "version": "4.20",
            },
            {
                "id": "rosa-full-automation",
                "name": "ROSA Full Automation",
                "description": "ROSA HCP cluster with network and role automation",
                "features": ["network_automation", "role_automation"],
                "version": "4.20",
            },
        ]
    }))
    .into_response()
}

async fn health() -> Response {
    Json(json!({ "status": "healthy", "timestamp": Utc::now() })).into_response()
}

fn not_found(detail: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": detail }))).into_response()
}
