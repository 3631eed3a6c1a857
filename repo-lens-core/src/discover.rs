//! Default-branch resolution and tree enumeration.
//!
//! Both steps are single remote reads whose [`HostError`]s are classified into
//! [`AggregateError`] here. Any failure aborts the owning repository.

use tracing::{error, info, warn};

use crate::contract::{Access, HostError, SourceHost, TreeEntry};
use crate::error::AggregateError;
use crate::reference::RepositoryIdentity;

/// Branch used when the host does not declare a default.
pub const FALLBACK_BRANCH: &str = "main";

/// Reads repository metadata and returns its default branch.
///
/// 403 and 429 are rate limiting, 404 is a missing (or private) repository,
/// everything else is a generic API error carrying the status text.
pub async fn resolve_default_branch<H>(
    host: &H,
    identity: &RepositoryIdentity,
    access: &Access,
) -> Result<String, AggregateError>
where
    H: SourceHost + ?Sized,
{
    let repository = identity.to_string();
    let metadata = host.repository(identity, access).await.map_err(|e| {
        error!(repository = %repository, error = %e, "Metadata request failed");
        match e {
            HostError::Status { code: 403 | 429, .. } => AggregateError::RateLimited { repository },
            HostError::Status { code: 404, .. } => AggregateError::NotFound { repository },
            HostError::Status { reason, .. } => AggregateError::Api {
                repository,
                message: reason,
            },
            other => AggregateError::Api {
                repository,
                message: other.to_string(),
            },
        }
    })?;

    let branch = metadata
        .default_branch
        .filter(|b| !b.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_BRANCH.to_string());
    info!(repository = %identity, branch = %branch, "Resolved default branch");
    Ok(branch)
}

/// Lists every entry of `branch`, in the order the host returned them.
///
/// Every failure is a generic API error. For 403 and 429 the message also asks
/// for an access token.
pub async fn list_tree<H>(
    host: &H,
    identity: &RepositoryIdentity,
    branch: &str,
    access: &Access,
) -> Result<Vec<TreeEntry>, AggregateError>
where
    H: SourceHost + ?Sized,
{
    let listing = host.tree(identity, branch, access).await.map_err(|e| {
        error!(repository = %identity, branch = %branch, error = %e, "Tree request failed");
        let message = match e {
            HostError::Status { code: 403 | 429, .. } => format!(
                "failed to retrieve file structure ({e}); the host is rate limiting requests, supply an access token to raise the limit"
            ),
            _ => format!("failed to retrieve file structure ({e})"),
        };
        AggregateError::Api {
            repository: identity.to_string(),
            message,
        }
    })?;

    if listing.truncated {
        warn!(
            repository = %identity,
            branch = %branch,
            entries = listing.entries.len(),
            "Host truncated the recursive tree listing; using the partial listing"
        );
    }
    info!(repository = %identity, entries = listing.entries.len(), "Listed repository tree");
    Ok(listing.entries)
}
