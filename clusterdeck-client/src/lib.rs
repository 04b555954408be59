//! Client for the cluster Provisioning API
//!
//! `ProvisioningClient` speaks the API's HTTP contract; `SubmissionWorkflow`
//! drives the validate-then-create sequence the console runs when an
//! operator submits a cluster configuration.

pub mod client;
pub mod workflow;

pub use client::{
    ClientError, ClusterCreated, ClusterDeleted, Health, ProvisioningClient, VersionInfo,
};
pub use workflow::{SubmissionError, SubmissionPhase, SubmissionReport, SubmissionWorkflow};
