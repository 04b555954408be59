///! Console view state
///!
///! Explicit state container for the console shell: which environment is
///! selected and whether the environment selector is open. Every change
///! goes through the `reduce` transition function, and the containing
///! `Store` publishes the resulting state on a watch channel. The store is
///! handed to command handlers by reference; nothing reads it ambiently.

use tokio::sync::watch;

use crate::config::Config;

/// Snapshot of the console shell's view state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConsoleState {
    /// Name of the selected environment, if any
    pub environment: Option<String>,
    /// Whether the environment selector menu is open
    pub environment_menu_open: bool,
}

impl ConsoleState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            environment: config.environment.clone(),
            environment_menu_open: false,
        }
    }
}

/// Transitions the console shell can perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleAction {
    /// Pick an environment; closes the selector menu
    SelectEnvironment(String),
    /// Drop the selection, falling back to the default server
    ClearEnvironment,
    ToggleEnvironmentMenu,
    CloseEnvironmentMenu,
}

/// Pure transition function: current state and an action produce the next state
pub fn reduce(state: &ConsoleState, action: ConsoleAction) -> ConsoleState {
    let mut next = state.clone();
    match action {
        ConsoleAction::SelectEnvironment(name) => {
            next.environment = Some(name);
            next.environment_menu_open = false;
        }
        ConsoleAction::ClearEnvironment => {
            next.environment = None;
        }
        ConsoleAction::ToggleEnvironmentMenu => {
            next.environment_menu_open = !state.environment_menu_open;
        }
        ConsoleAction::CloseEnvironmentMenu => {
            next.environment_menu_open = false;
        }
    }
    next
}

/// Holds the current view state and publishes every transition
pub struct Store {
    tx: watch::Sender<ConsoleState>,
}

impl Store {
    pub fn new(initial: ConsoleState) -> Self {
        Self {
            tx: watch::Sender::new(initial),
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> ConsoleState {
        self.tx.borrow().clone()
    }

    /// Apply an action and return the resulting state
    pub fn dispatch(&self, action: ConsoleAction) -> ConsoleState {
        let current = self.tx.borrow().clone();
        let next = reduce(&current, action);
        self.tx.send_replace(next.clone());
        next
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<ConsoleState> {
        self.tx.subscribe()
    }
}
