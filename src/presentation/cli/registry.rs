use clap::{ArgMatches, Command};
use std::collections::BTreeMap;

use crate::application::services::tree_command::TreeCommand;
use crate::common::error::WcError;
use crate::common::result::WcResult;
use crate::infrastructure::filesystem::config_store::ToolConfig;

/// Builds a command from its parsed subcommand arguments
pub type CommandFactory = fn(&ArgMatches, &ToolConfig) -> WcResult<Box<dyn TreeCommand>>;

/// Everything the CLI needs to offer one subcommand
#[derive(Clone, Copy)]
pub struct CommandRegistration {
    pub name: &'static str,
    pub about: &'static str,
    /// Adds the subcommand's arguments
    pub configure: fn(Command) -> Command,
    pub factory: CommandFactory,
}

impl std::fmt::Debug for CommandRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistration")
            .field("name", &self.name)
            .field("about", &self.about)
            .finish()
    }
}

/// A set of commands contributed to a [`CommandRegistry`]
pub trait CommandPlugin {
    fn register(&self, registry: &mut CommandRegistry);
}

/// Name → registration table the CLI is generated from
#[derive(Debug, Default, Clone)]
pub struct CommandRegistry {
    entries: BTreeMap<&'static str, CommandRegistration>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin_commands() -> Self {
        let mut registry = Self::new();
        registry.install(&super::commands::BuiltinCommands);
        registry
    }

    /// Later registrations replace earlier ones of the same name
    pub fn register(&mut self, registration: CommandRegistration) -> Option<CommandRegistration> {
        let previous = self.entries.insert(registration.name, registration);
        if previous.is_some() {
            tracing::debug!(command = registration.name, "replacing registered command");
        }
        previous
    }

    pub fn install(&mut self, plugin: &dyn CommandPlugin) {
        plugin.register(self);
    }

    pub fn get(&self, name: &str) -> Option<&CommandRegistration> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add every registered command to `command` as a subcommand
    pub fn augment(&self, command: Command) -> Command {
        self.entries.values().fold(command, |command, registration| {
            let subcommand = Command::new(registration.name).about(registration.about);
            command.subcommand((registration.configure)(subcommand))
        })
    }

    pub fn build(
        &self,
        name: &str,
        matches: &ArgMatches,
        config: &ToolConfig,
    ) -> WcResult<Box<dyn TreeCommand>> {
        let registration = self
            .get(name)
            .ok_or_else(|| WcError::config_error(format!("Unknown command '{}'", name)))?;
        (registration.factory)(matches, config)
    }
}
