/// `load_config` module: Loads a static YAML config file into the CLI's [`CliConfig`].
///
/// This is the only place where user-supplied YAML is parsed.
///
/// # Responsibilities
/// - Parse the YAML file into type-safe structs
/// - Fill every omitted aggregator setting with its default
/// - Give clear diagnostics for unreadable or malformed files
///
/// Secrets never live in this file: the access token comes from `--token`,
/// `GITHUB_TOKEN` or a `.env` file. An unknown `token` key is rejected.
///
/// # Accepted schema
/// ```yaml
/// repositories:
///   - https://github.com/owner/name
/// aggregator:          # optional, every key optional
///   content_limit: 12
///   fetch_concurrency: 4
/// ```
use anyhow::{Context, Result};
use repo_lens_core::config::AggregatorConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub repositories: Vec<String>,
    #[serde(default)]
    pub aggregator: AggregatorConfig,
}

impl CliConfig {
    pub fn trace_loaded(&self) {
        info!(
            repositories = self.repositories.len(),
            "Loaded CLI config"
        );
        self.aggregator.trace_loaded();
    }
}

/// Reads and parses the YAML config at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = fs::read_to_string(path_ref)
        .map_err(|e| {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            e
        })
        .with_context(|| format!("Failed to read config file {path_ref:?}"))?;

    let config: CliConfig = serde_yaml::from_str(&config_content)
        .map_err(|e| {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            e
        })
        .context("Failed to parse config YAML")?;

    info!(config_path = ?path_ref, "Parsed config YAML successfully");
    config.trace_loaded();
    Ok(config)
}
