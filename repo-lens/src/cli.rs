///
/// This module implements the CLI interface for repo-lens: command parsing,
/// argument validation, the async entrypoint and output rendering.
///
/// All aggregation logic (parsing, ranking, fetching, joining) lives in the
/// [`repo-lens-core`] crate. This module is glue only.
///
/// ## How To Use
/// - From a shell: `repo-lens aggregate https://github.com/owner/name --format json`.
/// - Programmatically: call [`run`] with a constructed [`Cli`].
///
/// [`repo-lens-core`]: ../../repo-lens-core/
use crate::load_config::{load_config, CliConfig};
use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use repo_lens_core::AggregatedContext;
use std::path::PathBuf;

/// CLI for repo-lens: bounded, prioritised context from source repositories.
#[derive(Parser, Debug)]
#[clap(
    name = "repo-lens",
    version,
    about = "Summarise the structure and most relevant files of remote repositories for automated review"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch and aggregate context for one or more repositories
    Aggregate {
        /// Repository URLs, appended after those listed in the config file
        urls: Vec<String>,

        /// Path to a YAML config file
        #[clap(long)]
        config: Option<PathBuf>,

        /// Access token for the hosting API
        #[clap(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Output format
        #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Renders the aggregated context for stdout.
pub fn render(context: &AggregatedContext, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format!(
            "=== Summary ===\n{}\n\n=== Structure ===\n{}\n\n=== File Contents ===\n{}\n",
            context.summary, context.structure, context.file_contents
        )),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(context)?),
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Aggregate {
            urls,
            config,
            token,
            format,
        } => {
            let mut settings = match config {
                Some(path) => load_config(path)?,
                None => CliConfig::default(),
            };
            settings.repositories.extend(urls);
            if settings.repositories.is_empty() {
                bail!("at least one repository URL is required (as an argument or under `repositories` in --config)");
            }

            tracing::info!(
                command = "aggregate",
                repositories = settings.repositories.len(),
                authenticated = token.as_deref().is_some_and(|t| !t.trim().is_empty()),
                "Starting aggregation"
            );
            match repo_lens_core::aggregate_urls(
                &settings.repositories,
                token.as_deref(),
                &settings.aggregator,
            )
            .await
            {
                Ok(context) => {
                    tracing::info!(command = "aggregate", summary = %context.summary, "Aggregation complete");
                    print!("{}", render(&context, format)?);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "aggregate", error = %e, kind = ?e.kind(), "Aggregation failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
    }
}
