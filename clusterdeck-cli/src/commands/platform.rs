///! Platform information commands

use anyhow::Result;
use clusterdeck_client::ProvisioningClient;
use tabled::Tabled;

use crate::output::{self, OutputFormat};

#[derive(Tabled)]
struct TemplateRow {
    id: String,
    name: String,
    version: String,
    features: String,
    description: String,
}

pub async fn show_versions(api: &ProvisioningClient, format: OutputFormat) -> Result<()> {
    let versions = api.supported_versions().await?;

    if format == OutputFormat::Table {
        println!("Supported versions: {}", versions.supported_versions.join(", "));
        println!("Default:            {}", versions.default_version);
        println!("Recommended:        {}", versions.recommended_version);
    } else {
        output::print_single(&versions, format)?;
    }

    Ok(())
}

pub async fn show_templates(api: &ProvisioningClient, format: OutputFormat) -> Result<()> {
    let templates = api.templates().await?;

    match format {
        OutputFormat::Json => output::print_json(&templates)?,
        OutputFormat::Yaml => output::print_yaml(&templates)?,
        OutputFormat::Table => {
            let rows: Vec<TemplateRow> = templates
                .iter()
                .map(|template| TemplateRow {
                    id: template.id.clone(),
                    name: template.name.clone(),
                    version: template.version.clone(),
                    features: template.features.join(","),
                    description: output::truncate(&template.description, 48),
                })
                .collect();
            output::print_table(rows);
        }
    }

    Ok(())
}

pub async fn show_health(api: &ProvisioningClient, format: OutputFormat) -> Result<()> {
    let health = api.health().await?;

    if format == OutputFormat::Table {
        if health.status == "healthy" {
            output::print_success(&format!(
                "Provisioning API is {} (as of {})",
                health.status,
                health.timestamp.format("%Y-%m-%d %H:%M:%S")
            ));
        } else {
            output::print_error(&format!("Provisioning API reports {}", health.status));
        }
    } else {
        output::print_single(&health, format)?;
    }

    Ok(())
}
