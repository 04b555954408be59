///! Clusterdeck CLI
///!
///! Operator console for provisioning and monitoring managed OpenShift clusters

mod commands;
mod config;
mod output;
mod store;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use clusterdeck_client::ProvisioningClient;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Provisioning API address (overrides the selected environment)
    #[arg(short, long)]
    server: Option<String>,

    /// Output format (table, json, yaml)
    #[arg(short, long)]
    output: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage clusters
    Cluster {
        #[command(subcommand)]
        command: ClusterCommands,
    },
    /// Inspect provisioning jobs
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Manage console environments
    Env {
        #[command(subcommand)]
        command: EnvCommands,
    },
    /// Show supported OpenShift versions
    Versions,
    /// List available cluster templates
    Templates,
    /// Check Provisioning API health
    Health,
    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Cluster configuration fields, shared by create and validate
#[derive(Args, Debug, Default)]
struct ConfigArgs {
    /// Cluster name
    #[arg(short, long)]
    name: Option<String>,
    /// OpenShift version
    #[arg(long)]
    version: Option<String>,
    /// Cloud region
    #[arg(long)]
    region: Option<String>,
    /// Worker instance type
    #[arg(long)]
    instance_type: Option<String>,
    /// Minimum worker replicas
    #[arg(long)]
    min_replicas: Option<u32>,
    /// Maximum worker replicas
    #[arg(long)]
    max_replicas: Option<u32>,
    /// Disable automated VPC/subnet creation
    #[arg(long)]
    no_network_automation: bool,
    /// Enable automated IAM role setup
    #[arg(long)]
    role_automation: bool,
    /// VPC CIDR block
    #[arg(long)]
    cidr_block: Option<String>,
    /// Availability zones (comma-separated)
    #[arg(long)]
    availability_zones: Option<String>,
    /// Resource tag as key=value (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,
    /// Forward cluster logs to this S3 bucket
    #[arg(long)]
    log_bucket: Option<String>,
    /// Key prefix inside the log bucket
    #[arg(long)]
    log_prefix: Option<String>,
    /// Log applications to forward (comma-separated)
    #[arg(long)]
    log_applications: Option<String>,
}

#[derive(Subcommand)]
enum ClusterCommands {
    /// List clusters
    List,
    /// Show cluster details
    Show { id: String },
    /// Create a new cluster
    Create {
        #[command(flatten)]
        config: ConfigArgs,
        /// Fill in the configuration interactively
        #[arg(short, long)]
        interactive: bool,
    },
    /// Dry-run a configuration against the remote validator
    Validate {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Delete a cluster
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum JobCommands {
    /// Show job status
    Show { id: String },
    /// Print job logs
    Logs { id: String },
    /// Follow a job until it finishes
    Watch {
        id: String,
        /// Poll interval in seconds
        #[arg(short, long, default_value = "2")]
        interval: u64,
    },
}

#[derive(Subcommand)]
enum EnvCommands {
    /// List configured environments
    List,
    /// Show the selected environment
    Show,
    /// Select an environment (interactively when no name is given)
    Select { name: Option<String> },
    /// Add or update an environment
    Add { name: String, server: String },
    /// Remove an environment
    Remove { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load config and seed the console view state from it
    let mut config = config::Config::load().unwrap_or_default();
    let store = store::Store::new(store::ConsoleState::from_config(&config));

    // Log view-state transitions at debug level
    let mut view_changes = store.subscribe();
    tokio::spawn(async move {
        while view_changes.changed().await.is_ok() {
            tracing::debug!("console state: {:?}", *view_changes.borrow_and_update());
        }
    });

    let format = output::OutputFormat::from_str(
        cli.output.as_deref().unwrap_or(&config.default_output),
    );

    // --server beats the selected environment, which beats the default
    let server = cli.server.clone().unwrap_or_else(|| {
        store
            .state()
            .environment
            .as_deref()
            .and_then(|name| config.environments.get(name).cloned())
            .unwrap_or_else(|| config.default_server.clone())
    });

    let api = ProvisioningClient::new(&server);
    tracing::debug!("targeting provisioning API at {}", api.base_url());

    match cli.command {
        Commands::Cluster { command } => {
            commands::cluster::handle_cluster_command(command, &api, format).await?
        }
        Commands::Job { command } => {
            commands::job::handle_job_command(command, &api, format).await?
        }
        Commands::Env { command } => {
            commands::environment::handle_env_command(command, &store, &mut config).await?
        }
        Commands::Versions => commands::platform::show_versions(&api, format).await?,
        Commands::Templates => commands::platform::show_templates(&api, format).await?,
        Commands::Health => commands::platform::show_health(&api, format).await?,
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

/// Generate shell completions
fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut io::stdout());
}
