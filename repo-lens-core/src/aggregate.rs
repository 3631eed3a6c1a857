//! High-level pipeline: one repository, then many.
//!
//! [`build_context`] runs metadata → tree → selection → content fetch for a
//! single repository and renders its [`RepositoryContext`]. [`aggregate`] does
//! that for every requested URL at once and joins the results in the order the
//! URLs were given.
//!
//! # Error Handling
//! - A file that cannot be fetched shows up inline and does not stop anything.
//! - A repository whose metadata or tree cannot be read fails, and so does the
//!   whole batch: there is no partial batch result.
//! - Malformed URLs are rejected before the first request goes out.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::AggregatorConfig;
use crate::contract::{Access, FileKind, SourceHost};
use crate::discover::{list_tree, resolve_default_branch};
use crate::error::AggregateError;
use crate::fetch::{fetch_contents, FetchOptions};
use crate::reference::{self, RepositoryIdentity};
use crate::select::{select, Budget};

/// One repository's contribution to the aggregated text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryContext {
    pub structure: String,
    pub file_contents: String,
    pub summary: String,
}

/// The text handed to the downstream analysis step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedContext {
    pub structure: String,
    pub file_contents: String,
    pub summary: String,
}

impl AggregatedContext {
    /// Joins per-repository contexts, keeping their order.
    pub fn merge(contexts: &[RepositoryContext]) -> Self {
        let structure: Vec<&str> = contexts.iter().map(|c| c.structure.as_str()).collect();
        let file_contents: Vec<&str> = contexts.iter().map(|c| c.file_contents.as_str()).collect();
        let summary: Vec<&str> = contexts.iter().map(|c| c.summary.as_str()).collect();
        Self {
            structure: structure.join("\n\n"),
            file_contents: file_contents.join("\n"),
            summary: summary.join(", "),
        }
    }
}

/// Builds the context of a single repository.
pub async fn build_context<H>(
    host: &H,
    identity: &RepositoryIdentity,
    access: &Access,
    config: &AggregatorConfig,
) -> Result<RepositoryContext, AggregateError>
where
    H: SourceHost + ?Sized,
{
    info!(repository = %identity, authenticated = access.is_authenticated(), "[AGGREGATE] Building repository context");

    let branch = resolve_default_branch(host, identity, access).await?;
    let entries = list_tree(host, identity, &branch, access).await?;

    let selection = select(
        &entries,
        Budget {
            structure_limit: config.structure_limit,
            content_limit: config.content_limit,
        },
    );
    let blocks = fetch_contents(
        host,
        identity,
        &selection.content,
        access,
        FetchOptions {
            max_file_chars: config.max_file_chars,
            concurrency: config.fetch_concurrency,
        },
    )
    .await;

    let total = entries
        .iter()
        .filter(|e| matches!(e.kind, FileKind::Blob | FileKind::Tree))
        .count();

    info!(
        repository = %identity,
        entries = total,
        listed = selection.structure.len(),
        fetched = blocks.len(),
        "[AGGREGATE] Repository context complete"
    );

    Ok(RepositoryContext {
        structure: format!(
            "Directory Structure (Repo: {identity}):\n{}",
            selection.structure.join("\n")
        ),
        file_contents: blocks.join("\n"),
        summary: format!("Repo {identity}: {total} files."),
    })
}

/// Aggregates every URL in `urls` into one [`AggregatedContext`].
///
/// All URLs are parsed before any request is made. Repositories are then
/// processed concurrently; the first repository-level failure aborts the batch.
pub async fn aggregate<H, S>(
    host: &H,
    urls: &[S],
    access: &Access,
    config: &AggregatorConfig,
) -> Result<AggregatedContext, AggregateError>
where
    H: SourceHost + ?Sized,
    S: AsRef<str>,
{
    let identities = urls
        .iter()
        .map(|url| reference::parse(url.as_ref()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            error!(error = %e, "[AGGREGATE][ERROR] Rejected repository reference");
            e
        })?;

    info!(repositories = identities.len(), "[AGGREGATE] Starting aggregation");

    let contexts = try_join_all(
        identities
            .iter()
            .map(|identity| build_context(host, identity, access, config)),
    )
    .await
    .map_err(|e| {
        error!(error = %e, "[AGGREGATE][ERROR] Aggregation aborted");
        e
    })?;

    Ok(AggregatedContext::merge(&contexts))
}
