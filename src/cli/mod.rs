//! Command-line interface for tplinc.
//!
//! # Commands
//!
//! - `compile` - Compile a template into a parameterized module
//! - `render` - Compile and evaluate a template against an options record
//! - `tree` - Show the include tree of a template
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug logging
//! - `--quiet` - Only log errors
//! - `--config` - Use a specific `tplinc.toml` (also `TPLINC_CONFIG`)
//!
//! Logging goes to stderr so compiled output on stdout stays clean.
//! `RUST_LOG` overrides the level chosen by the flags.
//!
//! # Examples
//!
//! ```bash
//! tplinc compile src/index.tpl -o dist/index.js --dep-file dist/index.d
//! tplinc render src/index.tpl --options '{"debug": true}'
//! tplinc tree src/index.tpl --depth 2
//! ```

mod common;
mod compile;
mod render;
mod tree;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::constants::CONFIG_ENV_VAR;

pub use compile::CompileCommand;
pub use render::RenderCommand;
pub use tree::TreeCommand;

/// Runtime settings derived from the global flags.
///
/// Separated from [`Cli`] so tests can run commands with an explicit
/// configuration instead of parsing arguments.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Default log filter when `RUST_LOG` is not set; `None` leaves logging off.
    pub log_level: Option<String>,

    /// Explicit configuration file.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Install the stderr tracing subscriber. Later calls are no-ops.
    pub fn init_logging(&self) {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => match &self.log_level {
                Some(level) => EnvFilter::new(level),
                None => return,
            },
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Text-inclusion preprocessor for templates.
#[derive(Parser, Debug)]
#[command(
    name = "tplinc",
    about = "Inline #include directives into a single parameterized template function",
    version,
    long_about = "tplinc expands `#include <file> [if <condition>]` lines recursively and \
                  emits a function of an options record whose conditions are evaluated at runtime."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to tplinc.toml (defaults to the nearest one above the template)
    #[arg(short, long, global = true, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a template into a module
    Compile(CompileCommand),

    /// Compile a template and evaluate it with concrete options
    Render(RenderCommand),

    /// Show the include tree of a template
    Tree(TreeCommand),
}

impl Cli {
    /// Execute with a configuration built from the parsed flags.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    ///
    /// `--verbose` maps to `debug`, `--quiet` to `error`, and the default is `warn`.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: Some(log_level.to_string()),
            config_path: self.config.clone(),
        }
    }

    /// Execute with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();
        let config_path = config.config_path.as_deref();

        match self.command {
            Commands::Compile(cmd) => cmd.execute(config_path).await,
            Commands::Render(cmd) => cmd.execute(config_path).await,
            Commands::Tree(cmd) => cmd.execute(config_path).await,
        }
    }
}
