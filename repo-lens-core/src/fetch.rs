//! Concurrent, failure-tolerant retrieval of the selected files.
//!
//! Every file produces exactly one text block, in selection order:
//! - `START OF FILE` / `END OF FILE` around the decoded text on success,
//! - `EMPTY FILE` when the host returned no payload,
//! - `ERROR FETCHING` for any request or decoding failure.
//!
//! A failed file never fails the repository.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::contract::{Access, BlobPayload, HostError, SourceHost};
use crate::reference::RepositoryIdentity;
use crate::select::ScoredEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub max_file_chars: usize,
    /// `None` runs every request at once.
    pub concurrency: Option<usize>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_file_chars: crate::config::DEFAULT_MAX_FILE_CHARS,
            concurrency: None,
        }
    }
}

#[derive(Error, Debug)]
enum FileError {
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("unsupported encoding {0:?}")]
    Encoding(String),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

pub fn file_block(identity: &RepositoryIdentity, path: &str, text: &str) -> String {
    format!("\n--- START OF FILE: {identity}/{path} ---\n{text}\n--- END OF FILE ---")
}

pub fn empty_file_block(path: &str) -> String {
    format!("\n--- EMPTY FILE: {path} ---")
}

pub fn error_block(path: &str) -> String {
    format!("\n--- ERROR FETCHING: {path} ---")
}

/// Decodes a base64 payload as raw bytes, then reads the bytes as UTF-8.
///
/// Line breaks inside the payload are ignored. Invalid UTF-8 sequences become U+FFFD.
pub fn decode_payload(encoded: &str) -> Result<String, base64::DecodeError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Cuts `text` to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

fn decode_blob(payload: BlobPayload) -> Result<Option<String>, FileError> {
    let content = match payload.content {
        Some(c) if !c.trim().is_empty() => c,
        _ => return Ok(None),
    };
    match payload.encoding.as_deref() {
        None | Some("base64") => Ok(Some(decode_payload(&content)?)),
        Some("utf-8") | Some("utf8") => Ok(Some(content)),
        Some(other) => Err(FileError::Encoding(other.to_string())),
    }
}

async fn fetch_one<H>(
    host: &H,
    identity: &RepositoryIdentity,
    scored: &ScoredEntry,
    access: &Access,
    max_file_chars: usize,
) -> String
where
    H: SourceHost + ?Sized,
{
    let path = &scored.entry.path;
    let decoded = match host.blob(&scored.entry.content_locator, access).await {
        Ok(payload) => decode_blob(payload),
        Err(e) => Err(FileError::from(e)),
    };

    match decoded {
        Ok(Some(text)) => {
            debug!(repository = %identity, path = %path, chars = text.chars().count(), "Fetched file");
            file_block(identity, path, truncate_chars(&text, max_file_chars))
        }
        Ok(None) => {
            debug!(repository = %identity, path = %path, "Empty file payload");
            empty_file_block(path)
        }
        Err(e) => {
            warn!(repository = %identity, path = %path, error = %e, "Failed to fetch file; continuing without it");
            error_block(path)
        }
    }
}

/// Fetches every selected file and returns one block per file, in `selected` order.
///
/// Requests run concurrently (bounded by `options.concurrency` when set); the
/// order in which they complete does not affect the output.
pub async fn fetch_contents<H>(
    host: &H,
    identity: &RepositoryIdentity,
    selected: &[ScoredEntry],
    access: &Access,
    options: FetchOptions,
) -> Vec<String>
where
    H: SourceHost + ?Sized,
{
    let limit = options
        .concurrency
        .unwrap_or(selected.len())
        .max(1);
    info!(repository = %identity, files = selected.len(), concurrency = limit, "Fetching file contents");

    stream::iter(selected)
        .map(|scored| fetch_one(host, identity, scored, access, options.max_file_chars))
        .buffered(limit)
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_multibyte_utf8_through_base64() {
        // "// 한글 주석\nfn main() {}\n"
        let encoded = STANDARD.encode("// 한글 주석\nfn main() {}\n");
        let wrapped: String = encoded
            .as_bytes()
            .chunks(8)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(decode_payload(&wrapped).unwrap(), "// 한글 주석\nfn main() {}\n");
    }

    #[test]
    fn invalid_utf8_becomes_replacement_characters() {
        let encoded = STANDARD.encode(b"ok \xff\xfe end");
        assert_eq!(
            decode_payload(&encoded).unwrap(),
            "ok \u{FFFD}\u{FFFD} end"
        );

        let payload = BlobPayload {
            content: Some(encoded),
            encoding: Some("base64".into()),
        };
        assert_eq!(
            decode_blob(payload).unwrap().as_deref(),
            Some("ok \u{FFFD}\u{FFFD} end")
        );
    }

    #[test]
    fn invalid_base64_is_an_error() {
        assert!(decode_payload("!!not base64!!").is_err());
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("한글", 5), "한글");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn blank_or_missing_payloads_are_empty() {
        assert!(decode_blob(BlobPayload::default()).unwrap().is_none());
        let blank = BlobPayload {
            content: Some("\n".into()),
            encoding: Some("base64".into()),
        };
        assert!(decode_blob(blank).unwrap().is_none());
    }

    #[test]
    fn unknown_encodings_are_rejected() {
        let payload = BlobPayload {
            content: Some("abc".into()),
            encoding: Some("rot13".into()),
        };
        assert!(matches!(decode_blob(payload), Err(FileError::Encoding(_))));
    }

    #[test]
    fn markers_have_the_documented_shape() {
        let identity = RepositoryIdentity {
            owner: "octo".into(),
            name: "cat".into(),
        };
        assert_eq!(
            file_block(&identity, "src/a.py", "x = 1"),
            "\n--- START OF FILE: octo/cat/src/a.py ---\nx = 1\n--- END OF FILE ---"
        );
        assert_eq!(empty_file_block("a"), "\n--- EMPTY FILE: a ---");
        assert_eq!(error_block("a"), "\n--- ERROR FETCHING: a ---");
    }
}
