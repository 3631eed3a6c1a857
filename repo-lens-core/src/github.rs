//! GitHub REST implementation of [`SourceHost`].
//!
//! - `GET {base}/repos/{owner}/{name}` for metadata
//! - `GET {base}/repos/{owner}/{name}/git/trees/{branch}?recursive=1` for the tree
//! - `GET {locator}` for a blob, where the locator is the `url` the tree listing returned
//!
//! Owner, name and branch are percent-encoded per path segment. A branch such as
//! `release/1.x` keeps its slashes as separators.
//!
//! The client holds no per-call state. The credential arrives with every call
//! as an [`Access`] and is turned into an `Authorization` header on that request only.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::AggregatorConfig;
use crate::contract::{
    Access, BlobPayload, FileKind, HostError, RepositoryMetadata, SourceHost, TreeEntry,
    TreeListing,
};
use crate::error::AggregateError;
use crate::reference::RepositoryIdentity;

const GITHUB_V3_JSON: &str = "application/vnd.github.v3+json";

#[derive(Debug, Deserialize)]
struct RepositoryResponse {
    #[serde(default)]
    default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntryResponse>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntryResponse {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    url: Option<String>,
}

impl From<TreeEntryResponse> for TreeEntry {
    fn from(raw: TreeEntryResponse) -> Self {
        let kind = match raw.kind.as_str() {
            "blob" => FileKind::Blob,
            "tree" => FileKind::Tree,
            _ => FileKind::Submodule,
        };
        TreeEntry {
            path: raw.path,
            kind,
            content_locator: raw.url.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BlobResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

pub struct GitHubClient {
    client: Client,
    base_url: Url,
    metadata_timeout: Duration,
    content_timeout: Duration,
}

impl GitHubClient {
    pub fn new(config: &AggregatorConfig) -> Result<Self, AggregateError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_V3_JSON));
        let user_agent =
            HeaderValue::from_str(&config.user_agent).map_err(|e| AggregateError::Client {
                message: format!("invalid user agent {:?}: {e}", config.user_agent),
            })?;
        headers.insert(USER_AGENT, user_agent);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| AggregateError::Client {
                message: e.to_string(),
            })?;

        let base_url = Url::parse(&config.api_base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| AggregateError::Client {
                message: format!("invalid API base URL {:?}", config.api_base_url),
            })?;

        Ok(Self {
            client,
            base_url,
            metadata_timeout: config.metadata_timeout(),
            content_timeout: config.content_timeout(),
        })
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get(
        &self,
        url: &str,
        access: &Access,
        timeout: Duration,
    ) -> Result<RequestBuilder, HostError> {
        let mut request = self.client.get(url).timeout(timeout);
        if let Some(token) = access.token() {
            let mut value = HeaderValue::from_str(&format!("token {token}")).map_err(|_| {
                HostError::Transport("credential is not a valid header value".into())
            })?;
            value.set_sensitive(true);
            request = request.header(AUTHORIZATION, value);
        }
        Ok(request)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        access: &Access,
        timeout: Duration,
    ) -> Result<T, HostError> {
        debug!(url = %url, authenticated = access.is_authenticated(), "GET");
        let response = self
            .get(url, access, timeout)?
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
            warn!(url = %url, status = status.as_u16(), reason = %reason, "Non-success response from host");
            return Err(HostError::Status {
                code: status.as_u16(),
                reason,
            });
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                HostError::Timeout
            } else {
                HostError::Decode(e.to_string())
            }
        })
    }
}

fn transport_error(e: reqwest::Error) -> HostError {
    if e.is_timeout() {
        HostError::Timeout
    } else {
        HostError::Transport(e.to_string())
    }
}

#[async_trait]
impl SourceHost for GitHubClient {
    async fn repository(
        &self,
        identity: &RepositoryIdentity,
        access: &Access,
    ) -> Result<RepositoryMetadata, HostError> {
        let url = self.endpoint(["repos", identity.owner.as_str(), identity.name.as_str()]);
        let raw: RepositoryResponse = self
            .get_json(url.as_str(), access, self.metadata_timeout)
            .await?;
        Ok(RepositoryMetadata {
            default_branch: raw.default_branch,
        })
    }

    async fn tree(
        &self,
        identity: &RepositoryIdentity,
        branch: &str,
        access: &Access,
    ) -> Result<TreeListing, HostError> {
        let mut url = self.endpoint(
            ["repos", identity.owner.as_str(), identity.name.as_str(), "git", "trees"]
                .into_iter()
                .chain(branch.split('/')),
        );
        url.query_pairs_mut().append_pair("recursive", "1");
        let raw: TreeResponse = self
            .get_json(url.as_str(), access, self.metadata_timeout)
            .await?;
        Ok(TreeListing {
            entries: raw.tree.into_iter().map(TreeEntry::from).collect(),
            truncated: raw.truncated,
        })
    }

    async fn blob(&self, locator: &str, access: &Access) -> Result<BlobPayload, HostError> {
        let raw: BlobResponse = self.get_json(locator, access, self.content_timeout).await?;
        Ok(BlobPayload {
            content: raw.content,
            encoding: raw.encoding,
        })
    }
}
