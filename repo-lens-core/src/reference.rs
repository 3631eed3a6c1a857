//! Repository URL parsing.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::AggregateError;

/// Canonical `owner/name` pair of a hosted repository.
///
/// `name` never carries a trailing `.git`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryIdentity {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// scheme://[user@]host/owner/name[/...], host/owner/name[/...] or git@host:owner/name.
// The host is a bracketed IPv6 literal or a name without brackets.
fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?:[A-Za-z][A-Za-z0-9+.\-]*://)?(?:[^@/\s]+@)?(?:\[[0-9A-Fa-f:.]+\]|[^/:\s\[\]]+)(?::\d+)?[/:]([^/\s]+)/([^/\s]+)(?:/.*)?$",
        )
        .expect("reference pattern is valid")
    })
}

/// Splits a repository URL into its [`RepositoryIdentity`].
///
/// Query strings and fragments are ignored. Fails with
/// [`AggregateError::InvalidReference`] when no non-empty `owner/name` pair follows the host.
pub fn parse(url: &str) -> Result<RepositoryIdentity, AggregateError> {
    let invalid = || AggregateError::InvalidReference {
        url: url.to_string(),
    };

    let trimmed = url.trim();
    let without_suffix = trimmed
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');

    let captures = reference_pattern()
        .captures(without_suffix)
        .ok_or_else(invalid)?;
    let owner = &captures[1];
    let raw_name = &captures[2];
    let name = raw_name.strip_suffix(".git").unwrap_or(raw_name);

    if owner.is_empty() || name.is_empty() {
        return Err(invalid());
    }

    Ok(RepositoryIdentity {
        owner: owner.to_string(),
        name: name.to_string(),
    })
}
