///! Cluster management commands

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clusterdeck_client::{ProvisioningClient, SubmissionWorkflow};
use clusterdeck_common::{
    ClusterConfig, ClusterDetail, ClusterRecord, DEFAULT_VERSION, SUPPORTED_REGIONS,
    SUPPORTED_VERSIONS,
};
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use crate::{ClusterCommands, ConfigArgs};

#[derive(Tabled)]
struct ClusterRow {
    id: String,
    name: String,
    region: String,
    version: String,
    status: String,
    created: String,
}

impl From<&ClusterRecord> for ClusterRow {
    fn from(record: &ClusterRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.config.name.clone(),
            region: record.config.region.clone(),
            version: record.config.version.clone(),
            status: record.status.to_string(),
            created: record.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

pub async fn handle_cluster_command(
    command: ClusterCommands,
    api: &ProvisioningClient,
    format: OutputFormat,
) -> Result<()> {
    match command {
        ClusterCommands::List => {
            let clusters = api.list_clusters().await?;

            match format {
                OutputFormat::Json => output::print_json(&clusters)?,
                OutputFormat::Yaml => output::print_yaml(&clusters)?,
                OutputFormat::Table => {
                    let rows: Vec<ClusterRow> = clusters.iter().map(ClusterRow::from).collect();
                    output::print_table(rows);
                }
            }
        }

        ClusterCommands::Show { id } => {
            let detail = api.get_cluster(&id).await?;

            if format == OutputFormat::Table {
                print_cluster_detail(&detail);
            } else {
                output::print_single(&detail, format)?;
            }
        }

        ClusterCommands::Create {
            config,
            interactive,
        } => {
            let config = if interactive {
                prompt_config()?
            } else {
                build_config(&config)?
            };
            create_cluster(config, api, format).await?;
        }

        ClusterCommands::Validate { config } => {
            let config = build_config(&config)?;
            let outcome = api.validate(&config).await?;

            if format == OutputFormat::Table {
                for warning in &outcome.warnings {
                    output::print_warning(warning);
                }
                if outcome.valid {
                    output::print_success("Configuration is valid");
                } else {
                    for error in &outcome.errors {
                        output::print_error(error);
                    }
                    bail!("configuration failed remote validation");
                }
            } else {
                output::print_single(&outcome, format)?;
            }
        }

        ClusterCommands::Delete { id, yes } => {
            use dialoguer::Confirm;

            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!("Are you sure you want to delete cluster {}?", id))
                    .interact()?;

            if confirmed {
                let deleted = api.delete_cluster(&id).await?;
                output::print_success(&format!(
                    "Cluster '{}' deletion started (job {})",
                    id, deleted.job_id
                ));
            } else {
                output::print_info("Deletion cancelled");
            }
        }
    }

    Ok(())
}

/// Run a full submission: advisory prechecks, the remote validate-then-create
/// sequence, then the details view for the new cluster.
async fn create_cluster(
    config: ClusterConfig,
    api: &ProvisioningClient,
    format: OutputFormat,
) -> Result<()> {
    let precheck = config.precheck();
    if !precheck.is_empty() {
        for error in &precheck {
            output::print_error(&error.to_string());
        }
        bail!("configuration is incomplete; nothing was submitted");
    }

    if !SUPPORTED_VERSIONS
        .iter()
        .any(|v| config.version.starts_with(v))
    {
        output::print_warning(&format!(
            "version {} is outside the supported set ({})",
            config.version,
            SUPPORTED_VERSIONS.join(", ")
        ));
    }

    let workflow = SubmissionWorkflow::new(api.clone());

    // Spinner message follows the workflow's phase changes
    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(120));
    let mut phases = workflow.subscribe();
    let progress = spinner.clone();
    let watcher = tokio::spawn(async move {
        while phases.changed().await.is_ok() {
            let phase = *phases.borrow_and_update();
            progress.set_message(phase.to_string());
        }
    });

    let report = workflow.submit(&config).await;

    spinner.finish_and_clear();
    watcher.abort();

    for warning in &report.warnings {
        output::print_warning(warning);
    }

    match report.result {
        Ok(created) => {
            output::print_created("Cluster", &config.name, &created.cluster_id);
            if let Some(job_id) = &created.job_id {
                output::print_info(&format!(
                    "provisioning job {} started; follow it with 'clusterdeck job watch {}'",
                    job_id, job_id
                ));
            }

            // Hand focus over to the details view for the new cluster
            match api.get_cluster(&created.cluster_id).await {
                Ok(detail) if format == OutputFormat::Table => print_cluster_detail(&detail),
                Ok(detail) => output::print_single(&detail, format)?,
                Err(err) => output::print_warning(&format!(
                    "cluster created, but fetching details failed: {}",
                    err
                )),
            }
            Ok(())
        }
        Err(error) => {
            for message in error.messages() {
                output::print_error(&message);
            }
            Err(error).context("cluster submission failed")
        }
    }
}

fn print_cluster_detail(detail: &ClusterDetail) {
    let cluster = &detail.cluster;
    println!("Cluster Details:");
    println!("  ID:       {}", cluster.id);
    println!("  Name:     {}", cluster.config.name);
    println!("  Version:  {}", cluster.config.version);
    println!("  Region:   {}", cluster.config.region);
    println!("  Instance: {}", cluster.config.instance_type);
    println!(
        "  Replicas: {}-{}",
        cluster.config.min_replicas, cluster.config.max_replicas
    );
    println!("  Status:   {}", cluster.status);
    println!(
        "  Created:  {}",
        cluster.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    if let Some(job) = &detail.job {
        println!("  Job:      {} ({}, {}%)", job.id, job.status, job.progress);
        println!("            {}", job.message);
    }
}

/// Build a configuration from command-line flags
fn build_config(args: &ConfigArgs) -> Result<ClusterConfig> {
    let mut config = ClusterConfig::new(args.name.clone().unwrap_or_default());

    if let Some(version) = &args.version {
        config = config.with_version(version);
    }
    if let Some(region) = &args.region {
        config = config.with_region(region);
    }
    if let Some(instance_type) = &args.instance_type {
        config = config.with_instance_type(instance_type);
    }
    if let Some(min) = args.min_replicas {
        config.min_replicas = min;
    }
    if let Some(max) = args.max_replicas {
        config.max_replicas = max;
    }
    if args.no_network_automation {
        config = config.with_network_automation(false);
    }
    if args.role_automation {
        config = config.with_role_automation(true);
    }
    if let Some(cidr) = &args.cidr_block {
        config = config.with_cidr_block(cidr);
    }
    if let Some(zones) = &args.availability_zones {
        config = config.with_availability_zones(split_list(zones));
    }

    for tag in &args.tags {
        let (key, value) = tag
            .split_once('=')
            .with_context(|| format!("invalid tag '{}', expected key=value", tag))?;
        config = config.with_tag(key, value);
    }

    if let Some(bucket) = &args.log_bucket {
        let applications = args
            .log_applications
            .as_deref()
            .map(split_list)
            .unwrap_or_default();
        config = config.with_log_forwarding(bucket, args.log_prefix.clone(), applications);
    }

    Ok(config)
}

/// Interactive form covering the same fields as the creation flags
fn prompt_config() -> Result<ClusterConfig> {
    use dialoguer::{Confirm, Input, Select};

    let name: String = Input::new().with_prompt("Cluster name").interact_text()?;

    let version: String = Input::new()
        .with_prompt("OpenShift version")
        .default(DEFAULT_VERSION.to_string())
        .interact_text()?;

    let region_index = Select::new()
        .with_prompt("Region")
        .items(SUPPORTED_REGIONS)
        .default(0)
        .interact()?;

    let instance_type: String = Input::new()
        .with_prompt("Worker instance type")
        .default("m5.xlarge".to_string())
        .interact_text()?;

    let min_replicas: u32 = Input::new()
        .with_prompt("Minimum replicas")
        .default(2)
        .interact_text()?;
    let max_replicas: u32 = Input::new()
        .with_prompt("Maximum replicas")
        .default(3)
        .interact_text()?;

    let mut config = ClusterConfig::new(name)
        .with_version(version)
        .with_region(SUPPORTED_REGIONS[region_index])
        .with_instance_type(instance_type)
        .with_replicas(min_replicas, max_replicas);

    let network_automation = Confirm::new()
        .with_prompt("Enable automated VPC/subnet creation?")
        .default(true)
        .interact()?;
    config = config.with_network_automation(network_automation);
    if network_automation {
        let cidr: String = Input::new()
            .with_prompt("VPC CIDR block")
            .default("10.0.0.0/16".to_string())
            .interact_text()?;
        config = config.with_cidr_block(cidr);
    }

    config = config.with_role_automation(
        Confirm::new()
            .with_prompt("Enable automated IAM role setup?")
            .default(false)
            .interact()?,
    );

    if Confirm::new()
        .with_prompt("Forward cluster logs to S3?")
        .default(false)
        .interact()?
    {
        let bucket: String = Input::new().with_prompt("S3 bucket name").interact_text()?;
        let prefix: String = Input::new()
            .with_prompt("Bucket prefix (empty for none)")
            .allow_empty(true)
            .interact_text()?;
        let applications: String = Input::new()
            .with_prompt("Log applications (comma-separated)")
            .default("kube-apiserver,openshift-apiserver".to_string())
            .interact_text()?;

        let prefix = if prefix.is_empty() { None } else { Some(prefix) };
        config = config.with_log_forwarding(bucket, prefix, split_list(&applications));
    }

    Ok(config)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}
