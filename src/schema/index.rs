/*!
Schema index: derived, read-only lookup view over a `Schema`.

Three maps (by id, by lowercased key, by lowercased name) into the column
vector. Rebuilt on demand, never mutated in place, cheap to discard.
*/

use crate::schema::column::{Column, ColumnType, Schema};
use std::collections::HashMap;

/// Names tried (via key/name lookup) when picking a primary text column
/// that was not explicitly flagged.
const PRIMARY_NAME_CANDIDATES: &[&str] = &["name", "title", "task"];

#[derive(Debug)]
pub struct SchemaIndex {
    schema: Schema,
    by_id: HashMap<String, usize>,
    by_key: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl SchemaIndex {
    /// Build the lookup maps. Pure and total; first occurrence wins when
    /// keys or names collide across columns.
    pub fn build(schema: Schema) -> Self {
        let mut by_id = HashMap::with_capacity(schema.columns.len());
        let mut by_key = HashMap::new();
        let mut by_name = HashMap::new();

        for (pos, col) in schema.columns.iter().enumerate() {
            by_id.entry(col.id.clone()).or_insert(pos);
            if let Some(key) = &col.key {
                by_key.entry(key.to_lowercase()).or_insert(pos);
            }
            by_name.entry(col.name.to_lowercase()).or_insert(pos);
        }

        SchemaIndex {
            schema,
            by_id,
            by_key,
            by_name,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> &[Column] {
        &self.schema.columns
    }

    pub fn len(&self) -> usize {
        self.schema.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schema.columns.is_empty()
    }

    /// Resolve a user-supplied column reference.
    ///
    /// Tier order: exact id, case-insensitive key, case-insensitive name.
    /// The first successful tier wins; an identifier that misses on id/key
    /// but matches some column's name is still honored, so cross-column
    /// key/name collisions are a latent ambiguity callers tolerate.
    pub fn resolve_column(&self, identifier: &str) -> Option<&Column> {
        let pos = self
            .by_id
            .get(identifier)
            .or_else(|| self.by_key.get(&identifier.to_lowercase()))
            .or_else(|| self.by_name.get(&identifier.to_lowercase()))?;
        self.schema.columns.get(*pos)
    }

    /// First column (schema order) whose type is in `types`. Callers using
    /// this as a default pick must treat multiple candidates as ambiguous;
    /// see `columns_by_type`.
    pub fn find_column_by_type(&self, types: &[ColumnType]) -> Option<&Column> {
        self.schema
            .columns
            .iter()
            .find(|c| types.contains(&c.column_type))
    }

    /// All columns (schema order) whose type is in `types`.
    pub fn columns_by_type(&self, types: &[ColumnType]) -> Vec<&Column> {
        self.schema
            .columns
            .iter()
            .filter(|c| types.contains(&c.column_type))
            .collect()
    }

    /// Pick the column that holds a row's primary text, in order: the
    /// explicitly flagged primary column; a column resolvable as
    /// "name"/"title"/"task"; the first text/rich_text column.
    pub fn find_primary_text_column(&self) -> Option<&Column> {
        if let Some(col) = self.schema.columns.iter().find(|c| c.is_primary) {
            return Some(col);
        }
        for candidate in PRIMARY_NAME_CANDIDATES {
            if let Some(col) = self.resolve_column(candidate) {
                return Some(col);
            }
        }
        self.find_column_by_type(&[ColumnType::Text, ColumnType::RichText])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(id: &str, key: Option<&str>, name: &str, ty: ColumnType) -> Column {
        Column {
            id: id.into(),
            key: key.map(str::to_string),
            name: name.into(),
            column_type: ty,
            is_primary: false,
            options: None,
        }
    }

    fn sample_index() -> SchemaIndex {
        SchemaIndex::build(Schema {
            list_id: "L1".into(),
            columns: vec![
                col("Col1", Some("task"), "Task", ColumnType::Text),
                col("Col2", Some("status"), "Status", ColumnType::Select),
                col("Col3", None, "Priority", ColumnType::Select),
            ],
        })
    }

    #[test]
    fn resolves_by_id_key_and_name() {
        let idx = sample_index();
        let by_id = idx.resolve_column("Col2").unwrap();
        let by_key = idx.resolve_column("STATUS").unwrap();
        let by_name = idx.resolve_column("status").unwrap();
        assert_eq!(by_id.id, "Col2");
        assert_eq!(by_key.id, "Col2");
        assert_eq!(by_name.id, "Col2");
    }

    #[test]
    fn name_lookup_is_case_insensitive() {
        let idx = sample_index();
        assert_eq!(idx.resolve_column("pRiOrItY").unwrap().id, "Col3");
    }

    #[test]
    fn unresolvable_identifier_is_none() {
        let idx = sample_index();
        assert!(idx.resolve_column("due date").is_none());
    }

    #[test]
    fn type_pick_returns_first_in_schema_order() {
        let idx = sample_index();
        let first = idx.find_column_by_type(&[ColumnType::Select]).unwrap();
        assert_eq!(first.id, "Col2");
        // the caller detects the second candidate for ambiguity handling
        let all = idx.columns_by_type(&[ColumnType::Select]);
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].id, "Col3");
    }

    #[test]
    fn primary_pick_prefers_flag() {
        let mut schema = sample_index().schema().clone();
        schema.columns[2].is_primary = true;
        let idx = SchemaIndex::build(schema);
        assert_eq!(idx.find_primary_text_column().unwrap().id, "Col3");
    }

    #[test]
    fn primary_pick_falls_back_to_well_known_names_then_text() {
        let idx = sample_index();
        // "task" key resolves before the text-type fallback fires
        assert_eq!(idx.find_primary_text_column().unwrap().id, "Col1");

        let idx = SchemaIndex::build(Schema {
            list_id: "L1".into(),
            columns: vec![
                col("a", None, "Due", ColumnType::Date),
                col("b", None, "Notes", ColumnType::RichText),
            ],
        });
        assert_eq!(idx.find_primary_text_column().unwrap().id, "b");

        let idx = SchemaIndex::build(Schema {
            list_id: "L1".into(),
            columns: vec![col("a", None, "Due", ColumnType::Date)],
        });
        assert!(idx.find_primary_text_column().is_none());
    }

    #[test]
    fn collision_is_first_match_wins() {
        let idx = SchemaIndex::build(Schema {
            list_id: "L1".into(),
            columns: vec![
                col("a", None, "Status", ColumnType::Text),
                col("b", None, "Status", ColumnType::Select),
            ],
        });
        assert_eq!(idx.resolve_column("status").unwrap().id, "a");
    }
}
