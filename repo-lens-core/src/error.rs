//! Error taxonomy for repository aggregation.
//!
//! Only repository-level failures are errors. A file whose content cannot be
//! fetched is reported inline in the output (see [`crate::fetch`]) and never
//! reaches this type.

use thiserror::Error;

/// Failure of a single repository (and therefore of the whole batch).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    /// The URL does not contain an `owner/name` pair.
    #[error("invalid repository reference: {url} (expected a URL of the form https://<host>/<owner>/<name>)")]
    InvalidReference { url: String },

    /// HTTP 403/429 from the metadata endpoint.
    #[error("API rate limit exceeded while reading {repository}; supply an access token to raise the limit")]
    RateLimited { repository: String },

    /// HTTP 404 from the metadata endpoint.
    #[error("repository {repository} not found; it may be private or the name may be misspelled")]
    NotFound { repository: String },

    /// Any other non-success response, timeout or transport failure.
    #[error("API error for {repository}: {message}")]
    Api { repository: String, message: String },

    /// The HTTP client could not be built from configuration.
    #[error("failed to construct API client: {message}")]
    Client { message: String },
}

/// Coarse failure class, for callers that branch on the kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidReference,
    RateLimited,
    NotFound,
    Api,
    Client,
}

impl AggregateError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidReference { .. } => ErrorKind::InvalidReference,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Api { .. } => ErrorKind::Api,
            Self::Client { .. } => ErrorKind::Client,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_repository_and_give_guidance() {
        let rate = AggregateError::RateLimited {
            repository: "octo/cat".into(),
        };
        assert!(rate.to_string().contains("octo/cat"));
        assert!(rate.to_string().contains("token"));

        let missing = AggregateError::NotFound {
            repository: "octo/nonexistent-repo".into(),
        };
        assert!(missing.to_string().contains("private"));
        assert!(missing.to_string().contains("misspelled"));
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }
}
