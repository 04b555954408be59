//! Common types shared between the clusterdeck console and the Provisioning API client

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OpenShift minor versions the provisioning automation supports
pub const SUPPORTED_VERSIONS: &[&str] = &["4.18", "4.19", "4.20"];

/// Version applied to freshly started configurations
pub const DEFAULT_VERSION: &str = "4.20.0";

/// Regions the managed-cluster service is offered in
pub const SUPPORTED_REGIONS: &[&str] = &["us-west-2", "us-east-1", "eu-west-1", "ap-southeast-1"];

/// Desired-cluster configuration, submitted as-is to the Provisioning API.
///
/// Field names match the API's wire format. A config is built fresh per
/// form session, filled in through the typed `with_*` setters, and consumed
/// read-only by a single submission attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub name: String,
    pub version: String,
    pub region: String,
    pub instance_type: String,
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub network_automation: bool,
    pub role_automation: bool,
    pub availability_zones: Vec<String>,
    pub cidr_block: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub s3_log_forwarding_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_bucket_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_bucket_prefix: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub s3_log_applications: Vec<String>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: DEFAULT_VERSION.to_string(),
            region: "us-west-2".to_string(),
            instance_type: "m5.xlarge".to_string(),
            min_replicas: 2,
            max_replicas: 3,
            network_automation: true,
            role_automation: false,
            availability_zones: vec!["us-west-2a".to_string(), "us-west-2b".to_string()],
            cidr_block: "10.0.0.0/16".to_string(),
            tags: HashMap::new(),
            s3_log_forwarding_enabled: false,
            s3_bucket_name: None,
            s3_bucket_prefix: None,
            s3_log_applications: Vec::new(),
        }
    }
}

impl ClusterConfig {
    /// New configuration with platform defaults
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_instance_type(mut self, instance_type: impl Into<String>) -> Self {
        self.instance_type = instance_type.into();
        self
    }

    pub fn with_replicas(mut self, min: u32, max: u32) -> Self {
        self.min_replicas = min;
        self.max_replicas = max;
        self
    }

    pub fn with_network_automation(mut self, enabled: bool) -> Self {
        self.network_automation = enabled;
        self
    }

    pub fn with_cidr_block(mut self, cidr: impl Into<String>) -> Self {
        self.cidr_block = cidr.into();
        self
    }

    pub fn with_role_automation(mut self, enabled: bool) -> Self {
        self.role_automation = enabled;
        self
    }

    pub fn with_availability_zones(mut self, zones: Vec<String>) -> Self {
        self.availability_zones = zones;
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Enable S3 log forwarding for the given bucket and application set
    pub fn with_log_forwarding(
        mut self,
        bucket: impl Into<String>,
        prefix: Option<String>,
        applications: Vec<String>,
    ) -> Self {
        self.s3_log_forwarding_enabled = true;
        self.s3_bucket_name = Some(bucket.into());
        self.s3_bucket_prefix = prefix;
        self.s3_log_applications = applications;
        self
    }

    /// Advisory client-side checks run by the console before a submission.
    ///
    /// These mirror what the form refuses to send; the authoritative
    /// validation is the remote `/api/validate` call.
    pub fn precheck(&self) -> Vec<PrecheckError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(PrecheckError::EmptyName);
        }

        if self.min_replicas == 0 || self.max_replicas == 0 {
            errors.push(PrecheckError::ZeroReplicas);
        } else if self.min_replicas > self.max_replicas {
            errors.push(PrecheckError::ReplicaOrder {
                min: self.min_replicas,
                max: self.max_replicas,
            });
        }

        if self.network_automation && self.cidr_block.trim().is_empty() {
            errors.push(PrecheckError::MissingCidrBlock);
        }

        if self.s3_log_forwarding_enabled {
            if self
                .s3_bucket_name
                .as_deref()
                .map(str::trim)
                .unwrap_or("")
                .is_empty()
            {
                errors.push(PrecheckError::MissingLogBucket);
            }
            if self.s3_log_applications.is_empty() {
                errors.push(PrecheckError::NoLogApplications);
            }
        }

        errors
    }

    pub fn is_submittable(&self) -> bool {
        self.precheck().is_empty()
    }
}

/// Reasons the console refuses to submit a configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrecheckError {
    #[error("cluster name must not be empty")]
    EmptyName,

    #[error("replica counts must be at least 1")]
    ZeroReplicas,

    #[error("min replicas ({min}) cannot be greater than max replicas ({max})")]
    ReplicaOrder { min: u32, max: u32 },

    #[error("CIDR block is required when network automation is enabled")]
    MissingCidrBlock,

    #[error("S3 bucket name is required when log forwarding is enabled")]
    MissingLogBucket,

    #[error("at least one log application must be selected when log forwarding is enabled")]
    NoLogApplications,
}

/// Result of a remote dry-run validation.
///
/// Produced once per submission attempt. Errors block creation; warnings
/// are informational and shown regardless of the overall outcome.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Provisioning job lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Pending => write!(f, "pending"),
            JobState::Running => write!(f, "running"),
            JobState::Completed => write!(f, "completed"),
            JobState::Failed => write!(f, "failed"),
        }
    }
}

/// Status of a provisioning job as reported by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,
    pub status: JobState,
    /// Completion percentage, 0-100
    pub progress: u8,
    pub message: String,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub logs: Vec<String>,
}

/// Cluster lifecycle state as reported by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterState {
    Creating,
    Ready,
    Failed,
    Deleting,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ClusterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterState::Creating => write!(f, "creating"),
            ClusterState::Ready => write!(f, "ready"),
            ClusterState::Failed => write!(f, "failed"),
            ClusterState::Deleting => write!(f, "deleting"),
            ClusterState::Unknown => write!(f, "unknown"),
        }
    }
}

/// A provisioned (or provisioning) cluster record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub id: String,
    pub config: ClusterConfig,
    pub job_id: String,
    pub created_at: DateTime<Utc>,
    pub status: ClusterState,
}

/// Cluster record together with its most recent provisioning job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterDetail {
    pub cluster: ClusterRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<JobStatus>,
}

/// A predefined cluster template offered by the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    pub version: String,
}
