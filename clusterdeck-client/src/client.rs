//! HTTP client for the cluster Provisioning API

use chrono::{DateTime, Utc};
use clusterdeck_common::{
    ClusterConfig, ClusterDetail, ClusterRecord, ClusterTemplate, JobStatus, ValidationOutcome,
};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Client errors
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Undecodable response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// True when the failure never produced a structured API response
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Http(_) | ClientError::Decode(_))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Pull the `detail` string out of a structured error body, if there is one
fn extract_detail(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        detail: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
}

/// Provisioning API client
#[derive(Clone)]
pub struct ProvisioningClient {
    client: reqwest::Client,
    base_url: String,
}

impl ProvisioningClient {
    /// Create a new client
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build headers for requests
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    /// GET request
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);
        let response = self.client.get(&url).headers(self.headers()).send().await?;

        self.handle_response(response).await
    }

    /// POST request
    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// DELETE request
    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("DELETE {}", url);
        let response = self
            .client
            .delete(&url)
            .headers(self.headers())
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle API response
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = response.text().await.unwrap_or_default();
            let message = extract_detail(&body)
                .or_else(|| if body.is_empty() { None } else { Some(body) })
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });

            tracing::debug!("API error {}: {}", status, message);

            if status.as_u16() == 404 {
                Err(ClientError::NotFound(message))
            } else {
                Err(ClientError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

// ============================================================================
// API Data Types
// ============================================================================

/// Response to a successful cluster creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterCreated {
    /// Opaque identifier of the new cluster
    pub cluster_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response to a cluster deletion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterDeleted {
    pub job_id: String,
    pub message: String,
}

/// Supported platform versions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub supported_versions: Vec<String>,
    pub default_version: String,
    pub recommended_version: String,
}

/// API health report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ClusterList {
    clusters: Vec<ClusterRecord>,
}

#[derive(Deserialize)]
struct TemplateList {
    templates: Vec<ClusterTemplate>,
}

#[derive(Deserialize)]
struct JobLogs {
    logs: Vec<String>,
}

// ============================================================================
// API Methods
// ============================================================================

impl ProvisioningClient {
    /// Dry-run validation of a cluster configuration
    pub async fn validate(&self, config: &ClusterConfig) -> Result<ValidationOutcome> {
        self.post("/api/validate", config).await
    }

    /// Request creation of a new cluster
    pub async fn create_cluster(&self, config: &ClusterConfig) -> Result<ClusterCreated> {
        self.post("/api/clusters", config).await
    }

    pub async fn list_clusters(&self) -> Result<Vec<ClusterRecord>> {
        let list: ClusterList = self.get("/api/clusters").await?;
        Ok(list.clusters)
    }

    pub async fn get_cluster(&self, id: &str) -> Result<ClusterDetail> {
        self.get(&format!("/api/clusters/{}", id)).await
    }

    pub async fn delete_cluster(&self, id: &str) -> Result<ClusterDeleted> {
        self.delete(&format!("/api/clusters/{}", id)).await
    }

    pub async fn job_status(&self, id: &str) -> Result<JobStatus> {
        self.get(&format!("/api/jobs/{}", id)).await
    }

    pub async fn job_logs(&self, id: &str) -> Result<Vec<String>> {
        let logs: JobLogs = self.get(&format!("/api/jobs/{}/logs", id)).await?;
        Ok(logs.logs)
    }

    pub async fn supported_versions(&self) -> Result<VersionInfo> {
        self.get("/api/versions").await
    }

    pub async fn templates(&self) -> Result<Vec<ClusterTemplate>> {
        let list: TemplateList = self.get("/api/templates").await?;
        Ok(list.templates)
    }

    pub async fn health(&self) -> Result<Health> {
        self.get("/api/health").await
    }
}
