/*!
Schema cache: durable per-list storage of the last known schema.

One JSON file per list id under a configurable base directory
(LISTCTL_CACHE_DIR env override, else the OS per-user config dir). No
expiry; correctness depends on explicit refresh requests, not TTLs.

Known property: the cache file has no locking discipline. Two concurrent
processes can interleave read-modify-write merges and the last writer
wins, silently dropping the other's concurrently-learned facts. Accepted
for a single-operator CLI.
*/

use crate::schema::column::Schema;
use crate::schema::error::SchemaError;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SchemaCache {
    base_dir: PathBuf,
}

impl SchemaCache {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        SchemaCache {
            base_dir: base_dir.into(),
        }
    }

    /// Default cache location.
    ///
    /// Priority:
    /// 1. `$LISTCTL_CACHE_DIR`
    /// 2. OS config dir + `listctl/schemas`
    /// 3. `./.listctl/schemas`
    pub fn default_dir() -> PathBuf {
        std::env::var("LISTCTL_CACHE_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from(".listctl"))
                    .join("listctl")
                    .join("schemas")
            })
    }

    pub fn entry_path(&self, list_id: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", sanitize_id(list_id)))
    }

    /// Load the cached schema for a list. Absent (Ok(None)) on not-found;
    /// other I/O and parse failures propagate.
    pub fn load(&self, list_id: &str) -> Result<Option<Schema>, SchemaError> {
        let path = self.entry_path(list_id);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let schema: Schema = serde_json::from_str(&raw)?;
        Ok(Some(schema))
    }

    /// Idempotent overwrite of the cache entry.
    pub fn save(&self, list_id: &str, schema: &Schema) -> Result<(), SchemaError> {
        std::fs::create_dir_all(&self.base_dir)?;
        let raw = serde_json::to_string_pretty(schema)?;
        std::fs::write(self.entry_path(list_id), raw)?;
        Ok(())
    }

    /// Merge newly learned columns into the cached entry (or into an empty
    /// schema when no entry exists) and persist the result.
    ///
    /// Monotonic: a known fact is never overwritten. New column ids append;
    /// existing columns only fill currently-empty attributes. Merging the
    /// same schema twice is a no-op.
    pub fn merge(&self, list_id: &str, incoming: &Schema) -> Result<Schema, SchemaError> {
        let mut merged = self
            .load(list_id)?
            .unwrap_or_else(|| Schema::empty(list_id));

        for col in &incoming.columns {
            match merged.columns.iter_mut().find(|c| c.id == col.id) {
                None => merged.columns.push(col.clone()),
                Some(existing) => {
                    if existing.key.is_none() {
                        existing.key = col.key.clone();
                    }
                    if existing.name_is_fallback() && !col.name_is_fallback() {
                        existing.name = col.name.clone();
                    }
                    if existing.column_type.is_unknown() {
                        existing.column_type = col.column_type;
                    }
                    if existing.options.is_none() {
                        existing.options = col.options.clone();
                    }
                    if col.is_primary {
                        existing.is_primary = true;
                    }
                }
            }
        }

        self.save(list_id, &merged)?;
        Ok(merged)
    }
}

// List ids become file names; anything outside [A-Za-z0-9._-] is replaced.
fn sanitize_id(list_id: &str) -> String {
    list_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
