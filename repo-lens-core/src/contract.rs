//! # contract: the seam between the aggregation pipeline and a source-hosting API
//!
//! This module defines the [`SourceHost`] trait and the plain data types that
//! cross it. The pipeline modules ([`crate::discover`], [`crate::fetch`],
//! [`crate::aggregate`]) only ever talk to a `SourceHost`, so the same code runs
//! against the real GitHub client, a mock, or any other host exposing the three
//! read-only operations.
//!
//! ## Interface
//! - [`SourceHost::repository`]: repository metadata (default branch).
//! - [`SourceHost::tree`]: a fully recursive listing of one branch.
//! - [`SourceHost::blob`]: the encoded payload of one file.
//!
//! Implementations report raw failures as [`HostError`]. Mapping those into
//! user-facing failure classes is the pipeline's job, not the host's.
//!
//! ## Mocking & Testing
//! The trait is annotated for `mockall`; with the `test-export-mocks` feature
//! (on by default) `MockSourceHost` is available to integration tests.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::reference::RepositoryIdentity;

/// Read-only credential for one aggregation call.
///
/// Built once per call and passed by reference into every remote request. A
/// blank token is the same as no token.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Access {
    token: Option<String>,
}

impl Access {
    pub fn new(token: Option<&str>) -> Self {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned);
        Self { token }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl fmt::Debug for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Access")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Repository metadata as far as aggregation cares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryMetadata {
    /// `None` when the API omits the field.
    pub default_branch: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Blob,
    Tree,
    /// A pinned submodule commit. Neither listed nor fetched.
    Submodule,
}

/// One object of a recursive tree listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub kind: FileKind,
    /// Where the blob's content can be retrieved; may be empty.
    pub content_locator: String,
}

impl TreeEntry {
    pub fn is_blob(&self) -> bool {
        self.kind == FileKind::Blob
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeListing {
    pub entries: Vec<TreeEntry>,
    /// The host cut the listing short.
    pub truncated: bool,
}

/// Raw content of one blob, still encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobPayload {
    pub content: Option<String>,
    /// Declared encoding, normally `base64`.
    pub encoding: Option<String>,
}

/// Failure talking to the host, before any classification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("HTTP {code} {reason}")]
    Status { code: u16, reason: String },

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

/// The three read operations aggregation needs from a source-hosting API.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Repository metadata, addressed by owner/name.
    async fn repository(
        &self,
        identity: &RepositoryIdentity,
        access: &Access,
    ) -> Result<RepositoryMetadata, HostError>;

    /// Recursive listing of every object reachable from `branch`.
    async fn tree(
        &self,
        identity: &RepositoryIdentity,
        branch: &str,
        access: &Access,
    ) -> Result<TreeListing, HostError>;

    /// Payload of the blob found at `locator`.
    async fn blob(&self, locator: &str, access: &Access) -> Result<BlobPayload, HostError>;
}
