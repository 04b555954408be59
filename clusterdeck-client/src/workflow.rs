//! Cluster submission workflow
//!
//! Orchestrates the validate-then-create sequence a submission runs against
//! the Provisioning API, and exposes the phase changes the console binds
//! its progress display to.

use std::sync::atomic::{AtomicBool, Ordering};

use clusterdeck_common::ClusterConfig;
use thiserror::Error;
use tokio::sync::watch;

use crate::client::{ClientError, ClusterCreated, ProvisioningClient};

/// Where a submission attempt currently stands.
///
/// `Rejected` and `Failed` end the attempt but not the configuration: the
/// operator can edit and resubmit, which starts the sequence over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Validating,
    Creating,
    Succeeded,
    /// The remote validator refused the configuration
    Rejected,
    Failed,
}

impl std::fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionPhase::Idle => write!(f, "idle"),
            SubmissionPhase::Validating => write!(f, "validating configuration"),
            SubmissionPhase::Creating => write!(f, "creating cluster"),
            SubmissionPhase::Succeeded => write!(f, "cluster created"),
            SubmissionPhase::Rejected => write!(f, "configuration rejected"),
            SubmissionPhase::Failed => write!(f, "submission failed"),
        }
    }
}

/// Why a submission attempt did not produce a cluster
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The service was unreachable or its response could not be decoded
    #[error("failed to reach the provisioning service: {0}")]
    Transport(#[source] ClientError),

    /// The remote validator reported the configuration invalid
    #[error("configuration rejected by the validation service")]
    ValidationRejected { errors: Vec<String> },

    /// The create call was answered with a structured failure
    #[error("cluster creation failed: {0}")]
    CreationRejected(String),

    /// A submission is already running on this workflow
    #[error("another submission is already in flight")]
    AlreadyInFlight,
}

impl SubmissionError {
    /// Operator-facing message list for this failure
    pub fn messages(&self) -> Vec<String> {
        match self {
            SubmissionError::ValidationRejected { errors } => errors.clone(),
            other => vec![other.to_string()],
        }
    }
}

/// Everything a single submission attempt produced.
///
/// Warnings ride alongside the result rather than inside it: a rejected
/// configuration still surfaces the validator's warnings, since they often
/// explain near-misses.
#[derive(Debug)]
pub struct SubmissionReport {
    pub result: Result<ClusterCreated, SubmissionError>,
    pub warnings: Vec<String>,
}

impl SubmissionReport {
    fn failure(error: SubmissionError) -> Self {
        Self {
            result: Err(error),
            warnings: Vec::new(),
        }
    }

    pub fn cluster_id(&self) -> Option<&str> {
        self.result.as_ref().ok().map(|c| c.cluster_id.as_str())
    }
}

/// Drives cluster submissions against the Provisioning API.
///
/// One workflow instance belongs to one form session; at most one
/// submission runs on it at a time.
pub struct SubmissionWorkflow {
    client: ProvisioningClient,
    phase: watch::Sender<SubmissionPhase>,
    in_flight: AtomicBool,
}

impl SubmissionWorkflow {
    pub fn new(client: ProvisioningClient) -> Self {
        Self {
            client,
            phase: watch::Sender::new(SubmissionPhase::Idle),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Current phase snapshot
    pub fn phase(&self) -> SubmissionPhase {
        *self.phase.borrow()
    }

    /// Observe phase transitions across submission attempts
    pub fn subscribe(&self) -> watch::Receiver<SubmissionPhase> {
        self.phase.subscribe()
    }

    /// Validate the configuration against the Provisioning API and, if the
    /// validator passes it, create the cluster.
    ///
    /// Exactly one validate call is issued per attempt, and a create call
    /// only follows a `valid` verdict. Nothing is retried. Submitting again
    /// starts an independent attempt: no idempotency key is sent, so a
    /// resubmission after a failed create may duplicate provider-side work.
    pub async fn submit(&self, config: &ClusterConfig) -> SubmissionReport {
        let _guard = match InFlightGuard::acquire(&self.in_flight) {
            Some(guard) => guard,
            None => return SubmissionReport::failure(SubmissionError::AlreadyInFlight),
        };

        self.phase.send_replace(SubmissionPhase::Validating);

        let outcome = match self.client.validate(config).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!("validation request failed: {}", err);
                self.phase.send_replace(SubmissionPhase::Failed);
                return SubmissionReport::failure(SubmissionError::Transport(err));
            }
        };

        let warnings = outcome.warnings;

        if !outcome.valid {
            self.phase.send_replace(SubmissionPhase::Rejected);
            return SubmissionReport {
                result: Err(SubmissionError::ValidationRejected {
                    errors: outcome.errors,
                }),
                warnings,
            };
        }

        self.phase.send_replace(SubmissionPhase::Creating);

        match self.client.create_cluster(config).await {
            Ok(created) => {
                tracing::debug!("cluster {} creation started", created.cluster_id);
                self.phase.send_replace(SubmissionPhase::Succeeded);
                SubmissionReport {
                    result: Ok(created),
                    warnings,
                }
            }
            Err(ClientError::Api { message, .. }) | Err(ClientError::NotFound(message)) => {
                self.phase.send_replace(SubmissionPhase::Failed);
                SubmissionReport {
                    result: Err(SubmissionError::CreationRejected(message)),
                    warnings,
                }
            }
            Err(err) => {
                tracing::error!("creation request failed: {}", err);
                self.phase.send_replace(SubmissionPhase::Failed);
                SubmissionReport {
                    result: Err(SubmissionError::Transport(err)),
                    warnings,
                }
            }
        }
    }
}

/// Clears the in-flight flag when the submission ends, on every path
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_flatten_validation_errors() {
        let err = SubmissionError::ValidationRejected {
            errors: vec!["E1".to_string(), "E2".to_string()],
        };
        assert_eq!(err.messages(), vec!["E1", "E2"]);

        let err = SubmissionError::CreationRejected("quota exceeded".to_string());
        assert_eq!(err.messages(), vec!["cluster creation failed: quota exceeded"]);
    }

    #[test]
    fn test_in_flight_guard_is_exclusive_and_releases() {
        let flag = AtomicBool::new(false);

        let guard = InFlightGuard::acquire(&flag);
        assert!(guard.is_some());
        assert!(InFlightGuard::acquire(&flag).is_none());

        drop(guard);
        assert!(InFlightGuard::acquire(&flag).is_some());
    }

    #[test]
    fn test_new_workflow_starts_idle() {
        let workflow = SubmissionWorkflow::new(ProvisioningClient::new("http://localhost:8000"));
        assert_eq!(workflow.phase(), SubmissionPhase::Idle);
    }

    #[test]
    fn test_phase_display_for_progress_line() {
        assert_eq!(SubmissionPhase::Validating.to_string(), "validating configuration");
        assert_eq!(SubmissionPhase::Creating.to_string(), "creating cluster");
    }
}
