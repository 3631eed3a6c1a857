#![doc = "repo-lens-core: core logic library for repo-lens."]

//! This crate turns a list of repository URLs into one bounded, prioritised
//! text bundle describing each repository's layout and its most relevant files.
//! It holds the remote API client, the ranking heuristics and the aggregation
//! pipeline. Terminal handling lives in the `repo-lens` binary crate.
//!
//! # Pipeline
//! [`reference`] → [`discover`] (default branch, tree listing) → [`score`] →
//! [`select`] → [`fetch`] → [`aggregate`].
//!
//! # Usage
//! Call [`aggregate::aggregate`] with any [`contract::SourceHost`], or the
//! [`aggregate_urls`] shortcut which builds a [`github::GitHubClient`] from config.

pub mod aggregate;
pub mod config;
pub mod contract;
pub mod discover;
pub mod error;
pub mod fetch;
pub mod github;
pub mod reference;
pub mod score;
pub mod select;

pub use aggregate::{aggregate, build_context, AggregatedContext, RepositoryContext};
pub use config::AggregatorConfig;
pub use contract::Access;
pub use error::{AggregateError, ErrorKind};
pub use reference::RepositoryIdentity;

/// Aggregates `urls` against the GitHub API described by `config`.
pub async fn aggregate_urls(
    urls: &[String],
    credential: Option<&str>,
    config: &AggregatorConfig,
) -> Result<AggregatedContext, AggregateError> {
    let client = github::GitHubClient::new(config)?;
    let access = Access::new(credential);
    aggregate::aggregate(&client, urls, &access, config).await
}
