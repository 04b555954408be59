///! Console environment commands

use anyhow::{bail, Result};
use tabled::Tabled;

use crate::config::Config;
use crate::output;
use crate::store::{ConsoleAction, Store};
use crate::EnvCommands;

#[derive(Tabled)]
struct EnvRow {
    name: String,
    server: String,
    selected: String,
}

pub async fn handle_env_command(
    command: EnvCommands,
    store: &Store,
    config: &mut Config,
) -> Result<()> {
    match command {
        EnvCommands::List => {
            let state = store.state();
            let rows: Vec<EnvRow> = config
                .environments
                .iter()
                .map(|(name, server)| EnvRow {
                    name: name.clone(),
                    server: server.clone(),
                    selected: if state.environment.as_deref() == Some(name.as_str()) {
                        "*".to_string()
                    } else {
                        String::new()
                    },
                })
                .collect();
            output::print_table(rows);
        }

        EnvCommands::Show => {
            let state = store.state();
            match &state.environment {
                Some(name) => match config.environments.get(name) {
                    Some(server) => println!("{} ({})", name, server),
                    None => output::print_warning(&format!(
                        "selected environment '{}' is not configured",
                        name
                    )),
                },
                None => output::print_info(&format!(
                    "no environment selected; using {}",
                    config.default_server
                )),
            }
        }

        EnvCommands::Select { name } => {
            let name = match name {
                Some(name) => name,
                None => pick_environment(store, config)?,
            };

            if !config.environments.contains_key(&name) {
                bail!(
                    "unknown environment '{}'; add it with 'clusterdeck env add'",
                    name
                );
            }

            let state = store.dispatch(ConsoleAction::SelectEnvironment(name.clone()));
            config.environment = state.environment.clone();
            config.save()?;
            output::print_success(&format!("Environment '{}' selected", name));
        }

        EnvCommands::Add { name, server } => {
            config.environments.insert(name.clone(), server);
            config.save()?;
            output::print_success(&format!("Environment '{}' saved", name));
        }

        EnvCommands::Remove { name } => {
            if config.environments.remove(&name).is_none() {
                bail!("unknown environment '{}'", name);
            }
            if config.environment.as_deref() == Some(name.as_str()) {
                let state = store.dispatch(ConsoleAction::ClearEnvironment);
                config.environment = state.environment.clone();
            }
            config.save()?;
            output::print_success(&format!("Environment '{}' removed", name));
        }
    }

    Ok(())
}

/// Interactive environment picker; the selector menu state lives in the store
fn pick_environment(store: &Store, config: &Config) -> Result<String> {
    use dialoguer::Select;

    if config.environments.is_empty() {
        bail!("no environments configured; add one with 'clusterdeck env add'");
    }

    let opened = store.dispatch(ConsoleAction::ToggleEnvironmentMenu);
    if !opened.environment_menu_open {
        bail!("environment selector is already open");
    }

    let names: Vec<&String> = config.environments.keys().collect();
    let current = opened
        .environment
        .as_ref()
        .and_then(|name| names.iter().position(|n| *n == name))
        .unwrap_or(0);

    let picked = Select::new()
        .with_prompt("Environment")
        .items(&names)
        .default(current)
        .interact();

    store.dispatch(ConsoleAction::CloseEnvironmentMenu);

    Ok(names[picked?].clone())
}
