/*!
Schema inference: derive a partial schema by sampling existing rows when
structured metadata is unavailable.

A column is discovered the first time its id is observed in a row's
`fields` array and never re-examined afterwards (first observation wins
for both presence and inferred type). Select choices are not observable
from row data, so inferred columns carry no options.
*/

use crate::schema::column::{Column, ColumnType, Schema};
use serde_json::Value;
use std::collections::HashSet;

/// Field-shape keys checked in fixed priority order. The first key present
/// on a field object decides the column type.
const FIELD_SHAPE_KEYS: &[(&str, ColumnType)] = &[
    ("rich_text", ColumnType::RichText),
    ("select", ColumnType::Select),
    ("user", ColumnType::User),
    ("channel", ColumnType::Channel),
    ("date", ColumnType::Date),
    ("checkbox", ColumnType::Checkbox),
    ("number", ColumnType::Number),
    ("rating", ColumnType::Rating),
    ("link", ColumnType::Link),
    ("attachment", ColumnType::Attachment),
    ("message", ColumnType::Message),
    ("reference", ColumnType::Reference),
    ("url", ColumnType::Url),
    ("emoji", ColumnType::Emoji),
    ("text", ColumnType::Text),
];

/// Scan sampled rows and build a partial `Schema`. Zero rows with
/// recognizable fields produces an empty column list, not an error.
pub fn infer_schema(list_id: &str, rows: &[Value]) -> Schema {
    let mut columns: Vec<Column> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for row in rows {
        let Some(fields) = row.get("fields").and_then(|v| v.as_array()) else {
            continue;
        };
        for field in fields {
            let Some(id) = field
                .get("column_id")
                .or_else(|| field.get("id"))
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
            else {
                continue;
            };
            if !seen.insert(id.to_string()) {
                continue;
            }

            let mut col = Column::new(id, infer_field_type(field));
            col.key = field
                .get("key")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            columns.push(col);
        }
    }

    Schema {
        list_id: list_id.to_string(),
        columns,
    }
}

fn infer_field_type(field: &Value) -> ColumnType {
    for (key, ty) in FIELD_SHAPE_KEYS {
        if field.get(key).is_some() {
            return *ty;
        }
    }
    ColumnType::Unknown
}
