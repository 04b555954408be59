///! Provisioning job commands

use std::time::Duration;

use anyhow::Result;
use clusterdeck_client::ProvisioningClient;
use clusterdeck_common::{JobState, JobStatus};
use indicatif::{ProgressBar, ProgressStyle};

use crate::output::{self, OutputFormat};
use crate::JobCommands;

pub async fn handle_job_command(
    command: JobCommands,
    api: &ProvisioningClient,
    format: OutputFormat,
) -> Result<()> {
    match command {
        JobCommands::Show { id } => {
            let job = api.job_status(&id).await?;

            if format == OutputFormat::Table {
                print_job(&job);
            } else {
                output::print_single(&job, format)?;
            }
        }

        JobCommands::Logs { id } => {
            let logs = api.job_logs(&id).await?;

            if format == OutputFormat::Table {
                for line in logs {
                    println!("{}", line);
                }
            } else {
                output::print_single(&logs, format)?;
            }
        }

        JobCommands::Watch { id, interval } => {
            watch_job(&id, interval, api).await?;
        }
    }

    Ok(())
}

fn print_job(job: &JobStatus) {
    println!("Job Details:");
    println!("  ID:       {}", job.id);
    if let Some(cluster_id) = &job.cluster_id {
        println!("  Cluster:  {}", cluster_id);
    }
    println!("  Status:   {}", job.status);
    println!("  Progress: {}%", job.progress);
    println!("  Message:  {}", job.message);

    let finished = job.completed_at.unwrap_or_else(chrono::Utc::now);
    let elapsed = (finished - job.started_at).num_seconds().max(0) as u64;
    println!("  Elapsed:  {}", output::format_duration(elapsed));
}

/// Poll the job until it reaches a terminal state
async fn watch_job(id: &str, interval: u64, api: &ProvisioningClient) -> Result<()> {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
            .expect("valid progress template"),
    );

    loop {
        let job = api.job_status(id).await?;
        bar.set_position(job.progress as u64);
        bar.set_message(job.message.clone());

        if job.status.is_terminal() {
            bar.finish_and_clear();
            if job.status == JobState::Completed {
                output::print_success(&format!("Job {} completed: {}", job.id, job.message));
            } else {
                output::print_error(&format!("Job {} failed: {}", job.id, job.message));
                anyhow::bail!("job did not complete successfully");
            }
            return Ok(());
        }

        tokio::time::sleep(Duration::from_secs(interval)).await;
    }
}
