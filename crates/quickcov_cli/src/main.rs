//! Incremental test coverage for jest projects.
//!
//! The first invocation runs the whole suite with coverage and caches the
//! per-file results. Later invocations only re-run tests related to files that
//! changed since, merge the fresh coverage into the cache, and print the
//! project-wide totals.

#![warn(missing_docs)]

mod project;
mod render;
mod run;
mod runner;

use std::io::IsTerminal;
use std::process;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Only re-run the tests your changes touch.
#[derive(Parser, Debug)]
#[command(name = "quickcov", version, about = "Incremental test coverage cache")]
pub struct Cli {
    /// Suppress all output except errors and the coverage table.
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `quickcov.toml`. Its directory becomes the project root.
    #[arg(long)]
    pub config: Option<String>,

    /// Ignore the cached snapshot and rebuild it with a full run.
    #[arg(long)]
    pub reset: bool,

    /// Print the runner invocation that would be made without running it.
    #[arg(long)]
    pub dry_run: bool,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress status output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
    /// Whether to rebuild the snapshot with a full run.
    pub reset: bool,
    /// Whether to stop after planning.
    pub dry_run: bool,
}

impl From<Cli> for GlobalArgs {
    fn from(cli: Cli) -> Self {
        let color = match cli.color {
            ColorChoice::Auto => std::io::stdout().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };
        Self {
            quiet: cli.quiet,
            verbose: cli.verbose,
            color,
            config: cli.config,
            reset: cli.reset,
            dry_run: cli.dry_run,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);
    let global = GlobalArgs::from(cli);

    match run::run(&global) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over the flags.
fn init_tracing(quiet: bool, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_no_flags() {
        let cli = Cli::parse_from(["quickcov"]);
        assert!(!cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Auto);
        assert!(cli.config.is_none());
        assert!(!cli.reset);
        assert!(!cli.dry_run);
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["quickcov", "--quiet", "--color", "never"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn parse_short_flags() {
        let cli = Cli::parse_from(["quickcov", "-v"]);
        assert!(cli.verbose);
        let cli = Cli::parse_from(["quickcov", "-q"]);
        assert!(cli.quiet);
    }

    #[test]
    fn parse_color_always() {
        let cli = Cli::parse_from(["quickcov", "--color", "always"]);
        assert_eq!(cli.color, ColorChoice::Always);
    }

    #[test]
    fn parse_config_path() {
        let cli = Cli::parse_from(["quickcov", "--config", "/path/to/quickcov.toml"]);
        assert_eq!(cli.config.as_deref(), Some("/path/to/quickcov.toml"));
    }

    #[test]
    fn parse_reset_and_dry_run() {
        let cli = Cli::parse_from(["quickcov", "--reset", "--dry-run"]);
        assert!(cli.reset);
        assert!(cli.dry_run);
    }

    #[test]
    fn unknown_color_rejected() {
        assert!(Cli::try_parse_from(["quickcov", "--color", "sometimes"]).is_err());
    }

    #[test]
    fn explicit_color_choice_is_respected() {
        let global = GlobalArgs::from(Cli::parse_from(["quickcov", "--color", "never"]));
        assert!(!global.color);
        let global = GlobalArgs::from(Cli::parse_from(["quickcov", "--color", "always"]));
        assert!(global.color);
    }
}
