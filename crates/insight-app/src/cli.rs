//! CLI argument definitions for the Insight terminal host.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use insight_core::types::Credential;
use std::path::PathBuf;

/// Insight: a terminal front end for the Insights Assistant chat widget.
#[derive(Parser, Debug)]
#[command(name = "insight", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Bearer credential for the remote chat endpoint.
    #[arg(long = "api-key")]
    pub api_key: Option<String>,

    /// Remote chat endpoint URL.
    #[arg(short = 'e', long = "endpoint")]
    pub endpoint: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Print the full session view as JSON after every command.
    #[arg(long = "json")]
    pub json: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > INSIGHT_CONFIG env var > ~/.insight/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("INSIGHT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the remote credential.
    ///
    /// Priority: --api-key flag > INSIGHT_API_KEY env var.
    /// Returns `None` if neither is set (keep the config file value).
    pub fn resolve_credential(&self) -> Option<Credential> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("INSIGHT_API_KEY").ok())
            .map(Credential::new)
            .filter(|c| !c.is_empty())
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > INSIGHT_LOG env var > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        if let Some(ref level) = self.log_level {
            return level.clone();
        }
        if let Ok(level) = std::env::var("INSIGHT_LOG") {
            if !level.trim().is_empty() {
                return level;
            }
        }
        config_level.to_string()
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".insight").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".insight").join("config.toml");
    }
    PathBuf::from("config.toml")
}
