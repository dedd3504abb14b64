pub mod config;
pub mod validate;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use sg_domain::config::Config;

/// schedgen: project schedules to XLSX, with short-lived download links.
#[derive(Debug, Parser)]
#[command(name = "schedgen", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server (default when no subcommand is given).
    Serve,
    /// Serve MCP tools over stdin/stdout; the HTTP server runs alongside
    /// so download links resolve.
    Mcp,
    /// Validate a payload file offline and print the preview or the issues.
    Validate {
        /// Path to a JSON payload (`-` reads stdin).
        file: PathBuf,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults and env overrides) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `SCHEDGEN_CONFIG` (or
/// `config.toml` by default), then apply the `SCHEDGEN_*` environment
/// overrides.  A missing file means all defaults.
pub fn load_config() -> anyhow::Result<(Config, String)> {
    let config_path = std::env::var("SCHEDGEN_CONFIG").unwrap_or_else(|_| "config.toml".into());

    let mut config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .with_context(|| format!("reading {config_path}"))?;
        Config::from_toml_str(&raw).with_context(|| format!("parsing {config_path}"))?
    } else {
        Config::default()
    };
    config.apply_env_overrides();

    Ok((config, config_path))
}
