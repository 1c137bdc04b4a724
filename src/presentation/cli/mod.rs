pub mod commands;
pub mod registry;

use anyhow::Context;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use colored::Colorize;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::application::services::traversal::{Traversal, TraversalReport};
use crate::application::services::tree_command::RunContext;
use crate::domain::entities::working_copy::{WorkingCopy, WorkingCopySettings};
use crate::infrastructure::console::{ConsoleSink, OutputSink};
use crate::infrastructure::filesystem::config_store::ConfigStore;

pub use registry::{CommandPlugin, CommandRegistration, CommandRegistry};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("WCTREE_GIT_HASH"),
    " ",
    env!("WCTREE_BUILD_DATE"),
    ", ",
    env!("WCTREE_BUILD_TARGET"),
    ")"
);

/// wctree - run git operations across a tree of nested working copies
#[derive(Debug, Parser)]
#[command(name = "wctree")]
#[command(about = "Run git and git-svn operations across a tree of nested working copies")]
#[command(version, long_version = LONG_VERSION)]
#[command(propagate_version = true)]
#[command(subcommand_required = true, arg_required_else_help = true)]
#[command(infer_subcommands = true)]
pub struct GlobalArgs {
    /// Path to the root working copy (defaults to the current directory)
    #[arg(long, global = true, env = "WCTREE_ROOT", value_name = "PATH")]
    pub root_path: Option<PathBuf>,

    /// Rediscover nested working copies instead of using the cached list
    #[arg(long, global = true)]
    pub refresh: bool,

    /// Neither read nor write the discovery cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Configuration file (defaults to .wctree.yml in the root working copy)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Parsed command line: global options plus the chosen subcommand
#[derive(Debug)]
pub struct Invocation {
    pub globals: GlobalArgs,
    pub command_name: String,
    pub command_matches: ArgMatches,
}

/// Logs go to stderr; `RUST_LOG` wins over `--verbose`
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// CLI application runner
pub struct CliApp {
    registry: CommandRegistry,
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}

impl CliApp {
    pub fn new() -> Self {
        Self::with_registry(CommandRegistry::with_builtin_commands())
    }

    pub fn with_registry(registry: CommandRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// The full clap command: global options plus one subcommand per registration
    pub fn command(&self) -> clap::Command {
        self.registry.augment(GlobalArgs::command())
    }

    /// Parse the process arguments, exiting with usage on error
    pub fn parse(&self) -> Invocation {
        match self.try_parse_from(env::args_os()) {
            Ok(invocation) => invocation,
            Err(e) => e.exit(),
        }
    }

    pub fn try_parse_from<I, T>(&self, args: I) -> Result<Invocation, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command().try_get_matches_from(args)?;
        let globals = GlobalArgs::from_arg_matches(&matches)?;
        let (command_name, command_matches) = match matches.subcommand() {
            Some((name, sub_matches)) => (name.to_string(), sub_matches.clone()),
            None => {
                return Err(self
                    .command()
                    .error(clap::error::ErrorKind::MissingSubcommand, "a subcommand is required"))
            }
        };
        Ok(Invocation {
            globals,
            command_name,
            command_matches,
        })
    }

    /// Run the invocation against the console; returns the process exit code
    pub async fn run(&self, invocation: Invocation) -> i32 {
        if invocation.globals.no_color {
            colored::control::set_override(false);
        }

        match self.execute(invocation, Arc::new(ConsoleSink)).await {
            Ok(report) if report.is_success() => 0,
            Ok(report) => {
                print_failures(&report);
                1
            }
            Err(e) => {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
                1
            }
        }
    }

    pub async fn execute(
        &self,
        invocation: Invocation,
        sink: Arc<dyn OutputSink>,
    ) -> anyhow::Result<TraversalReport> {
        let globals = &invocation.globals;
        let root_path = match &globals.root_path {
            Some(path) => path.clone(),
            None => env::current_dir().context("Cannot determine the current directory")?,
        };

        let config = ConfigStore::new().load(globals.config.as_deref(), &root_path)?;
        let settings = WorkingCopySettings::from_config(&config)
            .with_cache_enabled(config.cache.enabled && !globals.no_cache)
            .with_refresh_cache(globals.refresh);

        let root = WorkingCopy::open(&root_path, settings).await?;
        let command = self.registry.build(
            &invocation.command_name,
            &invocation.command_matches,
            &config,
        )?;

        let traversal = Traversal::new(RunContext::new(sink, config));
        let report = traversal.run(&root, command).await?;
        tracing::debug!(
            visited = report.visited,
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "traversal finished"
        );
        Ok(report)
    }
}

fn print_failures(report: &TraversalReport) {
    if report.failed.is_empty() {
        return;
    }
    let cwd = env::current_dir().ok();
    let count = report.failed.len();
    eprintln!(
        "{} {} working cop{} failed:",
        "::".red().bold(),
        count,
        if count == 1 { "y" } else { "ies" }
    );
    for failure in &report.failed {
        let shown = cwd
            .as_ref()
            .and_then(|cwd| pathdiff::diff_paths(&failure.path, cwd))
            .filter(|relative| !relative.as_os_str().is_empty())
            .unwrap_or_else(|| failure.path.clone());
        eprintln!("  {} ({})", shown.display(), failure.command);
    }
}
