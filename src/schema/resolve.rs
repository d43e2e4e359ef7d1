/*!
Schema resolver: orchestrates the discovery strategy chain and returns a
ready `SchemaIndex`.

Chain (short-circuits at the first success):
  1. explicit schema file        (never touches the cache)
  2. cached schema               (skipped on force_refresh)
  3. remote metadata             (authoritative; full cache overwrite)
  4. row-sampling inference      (only after metadata Unsupported; merged)
  5. nothing found -> Ok(None)

Cache writes in steps 3/4 are best-effort side effects: a persist failure
logs at debug level and never fails the overall resolution.
*/

use crate::schema::cache::SchemaCache;
use crate::schema::column::Schema;
use crate::schema::error::SchemaError;
use crate::schema::index::SchemaIndex;
use crate::schema::infer::infer_schema;
use crate::schema::normalize::normalize_schema;
use crate::service::ListService;
use crate::{log_debug, log_trace};
use std::path::Path;

/// Upper bound on rows sampled for inference. Pages are fetched one at a
/// time; the loop stops at this many rows or at the last page.
const DEFAULT_SAMPLE_LIMIT: usize = 100;

pub struct SchemaResolver<'a> {
    service: &'a dyn ListService,
    cache: SchemaCache,
    sample_limit: usize,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(service: &'a dyn ListService, cache: SchemaCache) -> Self {
        SchemaResolver {
            service,
            cache,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }

    #[cfg(test)]
    pub fn with_sample_limit(mut self, limit: usize) -> Self {
        self.sample_limit = limit;
        self
    }

    /// Run the discovery chain. `Ok(None)` means every strategy was
    /// exhausted with zero columns; callers that require a schema map that
    /// to `SchemaError::SchemaUnavailable`.
    pub async fn resolve(
        &self,
        list_id: &str,
        schema_file: Option<&Path>,
        force_refresh: bool,
    ) -> Result<Option<SchemaIndex>, SchemaError> {
        // 1. Explicit file wins outright and bypasses the cache entirely.
        if let Some(path) = schema_file {
            log_debug!("schema: loading explicit file {}", path.display());
            let raw = std::fs::read_to_string(path)?;
            let payload: serde_json::Value = serde_json::from_str(&raw)?;
            let schema = normalize_schema(list_id, &payload)?;
            return Ok(Some(SchemaIndex::build(schema)));
        }

        // 2. Cached schema.
        if !force_refresh {
            if let Some(schema) = self.cache.load(list_id)? {
                log_debug!("schema: cache hit for {list_id}");
                return Ok(Some(SchemaIndex::build(schema)));
            }
        }

        // 3. Remote metadata (authoritative).
        match self.service.fetch_metadata(list_id).await {
            Ok(payload) => {
                log_debug!("schema: metadata fetched for {list_id}");
                let schema = normalize_schema(list_id, &payload)?;
                self.persist(list_id, &schema);
                return Ok(Some(SchemaIndex::build(schema)));
            }
            Err(e) if e.is_unsupported() => {
                log_debug!("schema: metadata unsupported for {list_id}, sampling rows");
            }
            Err(e) => return Err(e.into()),
        }

        // 4. Inference from sampled rows.
        let rows = self.sample_rows(list_id).await?;
        let inferred = infer_schema(list_id, &rows);
        if !inferred.is_empty() {
            log_debug!(
                "schema: inferred {} column(s) for {list_id} from {} row(s)",
                inferred.columns.len(),
                rows.len()
            );
            let merged = self.merge_best_effort(list_id, inferred);
            return Ok(Some(SchemaIndex::build(merged)));
        }

        // 5. Every strategy exhausted.
        log_debug!("schema: no columns discoverable for {list_id}");
        Ok(None)
    }

    /// Sequential, bounded pagination over the row-listing capability.
    /// `Unsupported` is a continuation signal here too (treated as no rows);
    /// any other error aborts resolution.
    async fn sample_rows(&self, list_id: &str) -> Result<Vec<serde_json::Value>, SchemaError> {
        let mut rows = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = match self.service.list_rows(list_id, token.as_deref()).await {
                Ok(page) => page,
                Err(e) if e.is_unsupported() => {
                    log_debug!("schema: row listing unsupported for {list_id}");
                    return Ok(rows);
                }
                Err(e) => return Err(e.into()),
            };
            log_trace!("schema: sampled page of {} row(s)", page.rows.len());
            rows.extend(page.rows);
            if rows.len() >= self.sample_limit {
                rows.truncate(self.sample_limit);
                return Ok(rows);
            }
            match page.next_page_token {
                Some(next) => token = Some(next),
                None => return Ok(rows),
            }
        }
    }

    fn persist(&self, list_id: &str, schema: &Schema) {
        if let Err(e) = self.cache.save(list_id, schema) {
            log_debug!("schema: cache write failed for {list_id}: {e}");
        }
    }

    fn merge_best_effort(&self, list_id: &str, inferred: Schema) -> Schema {
        match self.cache.merge(list_id, &inferred) {
            Ok(merged) => merged,
            Err(e) => {
                log_debug!("schema: cache merge failed for {list_id}: {e}");
                inferred
            }
        }
    }
}
