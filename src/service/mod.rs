/*!
External list-service capabilities (opaque collaborators).

parse_target -> TargetSpec { SnapshotFile | RemoteUrl }
Traits: ListService (metadata + paginated rows), IdentityResolver.
SnapshotService implements both over a local JSON snapshot document;
remote HTTP/WS transports are not implemented yet.
*/

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Failure modes of the remote capabilities.
///
/// `Unsupported` is special: the schema resolver treats it as a
/// continuation signal (advance the discovery chain), never as a failure.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("capability not supported: {method}")]
    Unsupported { method: &'static str },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unknown identity reference: {0}")]
    UnknownIdentity(String),
}

impl ServiceError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ServiceError::Unsupported { .. })
    }
}

/// One page of rows from the remote listing capability.
#[derive(Debug, Default)]
pub struct RowPage {
    pub rows: Vec<serde_json::Value>,
    pub next_page_token: Option<String>,
}

/// Remote list metadata + row listing capability.
#[async_trait::async_trait]
pub trait ListService {
    /// Fetch the structured column metadata payload for a list.
    async fn fetch_metadata(&self, list_id: &str) -> Result<serde_json::Value, ServiceError>;

    /// Fetch one page of rows; pass the previous page's token to continue.
    async fn list_rows(
        &self,
        list_id: &str,
        page_token: Option<&str>,
    ) -> Result<RowPage, ServiceError>;
}

/// Maps a human reference (email, mention, name) to a stable id.
/// Used only by the field encoder for user/channel columns.
#[async_trait::async_trait]
pub trait IdentityResolver {
    async fn resolve_user(&self, reference: &str) -> Result<String, ServiceError>;
    async fn resolve_channel(&self, reference: &str) -> Result<String, ServiceError>;
}

/* ---- Target handling ---- */

/// A parsed representation of a user-supplied target string.
#[derive(Debug, Clone)]
pub enum TargetSpec {
    /// Local JSON snapshot of a list service (metadata + rows + identities).
    SnapshotFile { original: String, path: PathBuf },
    /// Remote endpoint specified by URL (http/https or ws/wss).
    RemoteUrl { original: String, url: Url },
}

impl TargetSpec {
    pub fn original(&self) -> &str {
        match self {
            TargetSpec::SnapshotFile { original, .. } => original,
            TargetSpec::RemoteUrl { original, .. } => original,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, TargetSpec::RemoteUrl { .. })
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSpec::SnapshotFile { path, .. } => write!(f, "snapshot: {}", path.display()),
            TargetSpec::RemoteUrl { url, .. } => write!(f, "remote: {url}"),
        }
    }
}

/// Parse a `--target` value into a structured `TargetSpec`.
///
/// Strategy:
/// 1. Try to parse as URL; scheme in {http, https, ws, wss} -> remote.
/// 2. Otherwise treat as a snapshot file path.
/// 3. Reject empty input.
pub fn parse_target(raw: &str) -> Result<TargetSpec> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("Target string is empty");
    }

    if let Ok(url) = Url::parse(trimmed) {
        match url.scheme() {
            "http" | "https" | "ws" | "wss" => {
                return Ok(TargetSpec::RemoteUrl {
                    original: raw.to_string(),
                    url,
                });
            }
            _ => {
                // Non-service scheme (or a bare path that happened to
                // parse); fall through to snapshot handling.
            }
        }
    }

    Ok(TargetSpec::SnapshotFile {
        original: raw.to_string(),
        path: PathBuf::from(trimmed),
    })
}

/* ---- Snapshot-backed implementation ---- */

#[derive(Debug, Deserialize)]
struct SnapshotDoc {
    #[serde(default)]
    metadata: Option<serde_json::Value>,
    #[serde(default)]
    rows: Vec<serde_json::Value>,
    #[serde(default)]
    users: HashMap<String, String>,
    #[serde(default)]
    channels: HashMap<String, String>,
    #[serde(default)]
    page_size: Option<usize>,
}

const DEFAULT_PAGE_SIZE: usize = 25;

/// List service backed by a local JSON snapshot document.
///
/// Snapshot shape:
/// {
///   "metadata": { ...raw metadata payload... },   // absent => Unsupported
///   "rows": [ { "id": "...", "fields": [...] }, ... ],
///   "users": { "alice@example.com": "U01" },
///   "channels": { "#general": "C01" },
///   "page_size": 25
/// }
#[derive(Debug)]
pub struct SnapshotService {
    doc: SnapshotDoc,
}

impl SnapshotService {
    /// Load a snapshot document from disk.
    pub async fn open(path: &std::path::Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read snapshot file: {}", path.display()))?;
        let doc: SnapshotDoc = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse snapshot file: {}", path.display()))?;
        Ok(SnapshotService { doc })
    }

    #[cfg(test)]
    pub fn from_json(raw: &str) -> Self {
        SnapshotService {
            doc: serde_json::from_str(raw).expect("snapshot json"),
        }
    }

    fn page_size(&self) -> usize {
        self.doc.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1)
    }
}

#[async_trait::async_trait]
impl ListService for SnapshotService {
    async fn fetch_metadata(&self, _list_id: &str) -> Result<serde_json::Value, ServiceError> {
        match &self.doc.metadata {
            Some(payload) => Ok(payload.clone()),
            None => Err(ServiceError::Unsupported {
                method: "lists.metadata",
            }),
        }
    }

    async fn list_rows(
        &self,
        _list_id: &str,
        page_token: Option<&str>,
    ) -> Result<RowPage, ServiceError> {
        let offset = match page_token {
            Some(tok) => tok
                .parse::<usize>()
                .map_err(|_| ServiceError::Transport(format!("bad page token: {tok}")))?,
            None => 0,
        };
        let size = self.page_size();
        let end = (offset + size).min(self.doc.rows.len());
        let rows = self
            .doc
            .rows
            .get(offset..end)
            .map(|s| s.to_vec())
            .unwrap_or_default();
        let next_page_token = (end < self.doc.rows.len()).then(|| end.to_string());
        Ok(RowPage {
            rows,
            next_page_token,
        })
    }
}

#[async_trait::async_trait]
impl IdentityResolver for SnapshotService {
    async fn resolve_user(&self, reference: &str) -> Result<String, ServiceError> {
        let wanted = reference.trim();
        if let Some(id) = self.doc.users.get(wanted) {
            return Ok(id.clone());
        }
        // Already-resolved ids pass through unchanged.
        if self.doc.users.values().any(|v| v == wanted) {
            return Ok(wanted.to_string());
        }
        Err(ServiceError::UnknownIdentity(wanted.to_string()))
    }

    async fn resolve_channel(&self, reference: &str) -> Result<String, ServiceError> {
        let wanted = reference.trim();
        if let Some(id) = self.doc.channels.get(wanted) {
            return Ok(id.clone());
        }
        if self.doc.channels.values().any(|v| v == wanted) {
            return Ok(wanted.to_string());
        }
        Err(ServiceError::UnknownIdentity(wanted.to_string()))
    }
}

/* ---- Null implementation ---- */

/// Service used when no target is configured: every remote capability
/// reports `Unsupported`, so schema resolution degrades to explicit files
/// and the cache, and identity references never resolve.
#[derive(Debug, Default)]
pub struct NullService;

#[async_trait::async_trait]
impl ListService for NullService {
    async fn fetch_metadata(&self, _list_id: &str) -> Result<serde_json::Value, ServiceError> {
        Err(ServiceError::Unsupported {
            method: "lists.metadata",
        })
    }

    async fn list_rows(
        &self,
        _list_id: &str,
        _page_token: Option<&str>,
    ) -> Result<RowPage, ServiceError> {
        Err(ServiceError::Unsupported {
            method: "lists.rows",
        })
    }
}

#[async_trait::async_trait]
impl IdentityResolver for NullService {
    async fn resolve_user(&self, reference: &str) -> Result<String, ServiceError> {
        Err(ServiceError::UnknownIdentity(reference.to_string()))
    }

    async fn resolve_channel(&self, reference: &str) -> Result<String, ServiceError> {
        Err(ServiceError::UnknownIdentity(reference.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_remote_http() {
        let spec = parse_target("https://lists.example.com/api").unwrap();
        assert!(spec.is_remote());
    }

    #[test]
    fn parse_snapshot_path() {
        let spec = parse_target("./fixtures/board.json").unwrap();
        assert!(!spec.is_remote());
        if let TargetSpec::SnapshotFile { path, .. } = spec {
            assert_eq!(path, PathBuf::from("./fixtures/board.json"));
        } else {
            panic!("expected SnapshotFile variant");
        }
    }

    #[test]
    fn unknown_scheme_falls_back_to_snapshot() {
        let spec = parse_target("ftp://example.com/resource").unwrap();
        assert!(!spec.is_remote());
    }

    #[test]
    fn empty_target_rejected() {
        let err = parse_target("   ").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[tokio::test]
    async fn snapshot_without_metadata_reports_unsupported() {
        let svc = SnapshotService::from_json(r#"{"rows":[]}"#);
        let err = svc.fetch_metadata("L1").await.unwrap_err();
        assert!(err.is_unsupported());
    }

    #[tokio::test]
    async fn snapshot_rows_paginate_sequentially() {
        let svc = SnapshotService::from_json(
            r#"{"rows":[{"id":"r1"},{"id":"r2"},{"id":"r3"}],"page_size":2}"#,
        );
        let first = svc.list_rows("L1", None).await.unwrap();
        assert_eq!(first.rows.len(), 2);
        let tok = first.next_page_token.expect("more pages");
        let second = svc.list_rows("L1", Some(&tok)).await.unwrap();
        assert_eq!(second.rows.len(), 1);
        assert!(second.next_page_token.is_none());
    }

    #[tokio::test]
    async fn identity_lookup_and_passthrough() {
        let svc =
            SnapshotService::from_json(r#"{"users":{"alice@example.com":"U01"},"channels":{}}"#);
        assert_eq!(svc.resolve_user("alice@example.com").await.unwrap(), "U01");
        assert_eq!(svc.resolve_user("U01").await.unwrap(), "U01");
        assert!(svc.resolve_user("bob@example.com").await.is_err());
    }
}
