/*!
Schema normalizer: turns heterogeneous raw schema payloads (metadata
responses, schema files) into the canonical `Schema`.

Container detection, in priority order:
  1. nested metadata wrapper: a `list_metadata` object (top-level or under
     `list`) holding a `schema` array
  2. top-level `schema` array
  3. top-level `columns` array
None present -> SchemaError::SchemaFormat.
*/

use crate::schema::column::{Column, ColumnOptions, ColumnType, Schema, SelectChoice};
use crate::schema::error::SchemaError;
use serde_json::Value;

/// Normalize an arbitrary parsed payload into a `Schema` for `list_id`.
pub fn normalize_schema(list_id: &str, payload: &Value) -> Result<Schema, SchemaError> {
    let entries = find_column_entries(payload).ok_or(SchemaError::SchemaFormat)?;

    let mut columns = Vec::with_capacity(entries.len());
    for entry in entries {
        columns.push(normalize_column(entry)?);
    }

    Ok(Schema {
        list_id: list_id.to_string(),
        columns,
    })
}

fn find_column_entries(payload: &Value) -> Option<&Vec<Value>> {
    let wrapper = payload
        .get("list_metadata")
        .or_else(|| payload.get("list").and_then(|l| l.get("list_metadata")));
    if let Some(arr) = wrapper.and_then(|m| m.get("schema")).and_then(|v| v.as_array()) {
        return Some(arr);
    }
    if let Some(arr) = payload.get("schema").and_then(|v| v.as_array()) {
        return Some(arr);
    }
    payload.get("columns").and_then(|v| v.as_array())
}

/// Normalize one raw column entry. Independent of its siblings: a single
/// malformed entry (missing id) fails the whole payload with
/// `InvalidColumn`.
fn normalize_column(entry: &Value) -> Result<Column, SchemaError> {
    let id = entry
        .get("id")
        .or_else(|| entry.get("column_id"))
        .or_else(|| entry.get("columnId"))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or(SchemaError::InvalidColumn)?
        .to_string();

    let column_type = entry
        .get("type")
        .and_then(|v| v.as_str())
        .map(ColumnType::parse)
        .unwrap_or(ColumnType::Unknown);

    let key = entry
        .get("key")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let name = entry
        .get("name")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| id.clone());

    let is_primary = entry
        .get("is_primary_column")
        .or_else(|| entry.get("is_primary"))
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    // Options pass through only when structurally an object.
    let options = entry
        .get("options")
        .and_then(|v| v.as_object())
        .map(normalize_options)
        .filter(|o| !o.is_empty());

    Ok(Column {
        id,
        key,
        name,
        column_type,
        is_primary,
        options,
    })
}

fn normalize_options(raw: &serde_json::Map<String, Value>) -> ColumnOptions {
    let choices = raw.get("choices").and_then(|v| v.as_array()).map(|arr| {
        arr.iter()
            .filter_map(normalize_choice)
            .collect::<Vec<SelectChoice>>()
    });

    ColumnOptions {
        choices: choices.filter(|c| !c.is_empty()),
        max: raw.get("max").and_then(|v| v.as_u64()).map(|n| n as u32),
        format: raw
            .get("format")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        precision: raw
            .get("precision")
            .and_then(|v| v.as_u64())
            .map(|n| n as u32),
        date_format: raw
            .get("date_format")
            .and_then(|v| v.as_str())
            .map(str::to_string),
    }
}

// Choices without a string `value` are dropped rather than failing the
// column; choice metadata is advisory for encoding.
fn normalize_choice(raw: &Value) -> Option<SelectChoice> {
    let obj = raw.as_object()?;
    let value = obj.get("value")?.as_str()?.to_string();
    Some(SelectChoice {
        value,
        label: obj.get("label").and_then(|v| v.as_str()).map(str::to_string),
        color: obj.get("color").and_then(|v| v.as_str()).map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_columns_array() {
        let payload = json!({
            "columns": [
                {"id":"c1","name":"Task","type":"text"},
                {"column_id":"c2","key":"status","type":"select",
                 "options":{"choices":[{"value":"open","label":"Open"}]}}
            ]
        });
        let schema = normalize_schema("L1", &payload).unwrap();
        assert_eq!(schema.list_id, "L1");
        assert_eq!(schema.columns.len(), 2);
        assert_eq!(schema.columns[0].column_type, ColumnType::Text);
        assert_eq!(schema.columns[1].id, "c2");
        assert_eq!(schema.columns[1].key.as_deref(), Some("status"));
        let choices = schema.columns[1]
            .options
            .as_ref()
            .and_then(|o| o.choices.as_ref())
            .unwrap();
        assert_eq!(choices[0].value, "open");
        assert_eq!(choices[0].label.as_deref(), Some("Open"));
    }

    #[test]
    fn wrapper_takes_priority_over_top_level_columns() {
        let payload = json!({
            "list": {"list_metadata": {"schema": [{"id":"real","type":"date"}]}},
            "columns": [{"id":"decoy","type":"text"}]
        });
        let schema = normalize_schema("L1", &payload).unwrap();
        assert_eq!(schema.columns.len(), 1);
        assert_eq!(schema.columns[0].id, "real");
        assert_eq!(schema.columns[0].column_type, ColumnType::Date);
    }

    #[test]
    fn camel_case_id_accepted() {
        let payload = json!({"schema":[{"columnId":"c7","type":"user"}]});
        let schema = normalize_schema("L1", &payload).unwrap();
        assert_eq!(schema.columns[0].id, "c7");
    }

    #[test]
    fn missing_id_is_invalid_column() {
        let payload = json!({"columns":[{"name":"Nameless","type":"text"}]});
        let err = normalize_schema("L1", &payload).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidColumn));
    }

    #[test]
    fn unrecognized_container_is_schema_format() {
        let payload = json!({"fields":[{"id":"c1"}]});
        let err = normalize_schema("L1", &payload).unwrap_err();
        assert!(matches!(err, SchemaError::SchemaFormat));
    }

    #[test]
    fn unknown_type_and_name_fallback() {
        let payload = json!({"columns":[{"id":"c1","type":"quantum"}]});
        let schema = normalize_schema("L1", &payload).unwrap();
        assert_eq!(schema.columns[0].column_type, ColumnType::Unknown);
        assert_eq!(schema.columns[0].name, "c1");
    }

    #[test]
    fn non_object_options_are_dropped() {
        let payload = json!({"columns":[{"id":"c1","type":"select","options":"oops"}]});
        let schema = normalize_schema("L1", &payload).unwrap();
        assert!(schema.columns[0].options.is_none());
    }

    #[test]
    fn malformed_choice_entries_are_skipped() {
        let payload = json!({"columns":[{"id":"c1","type":"select",
            "options":{"choices":[{"value":"ok"},{"label":"no value"},42]}}]});
        let schema = normalize_schema("L1", &payload).unwrap();
        let choices = schema.columns[0]
            .options
            .as_ref()
            .and_then(|o| o.choices.as_ref())
            .unwrap();
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].value, "ok");
    }

    #[test]
    fn normalization_is_idempotent_over_round_trip() {
        let payload = json!({
            "columns": [
                {"id":"c1","name":"Task","type":"text"},
                {"id":"c2","key":"pri","name":"Priority","type":"select",
                 "options":{"choices":[{"value":"high"}]}}
            ]
        });
        let first = normalize_schema("L1", &payload).unwrap();
        let round_tripped = serde_json::to_value(&first).unwrap();
        let second = normalize_schema("L1", &round_tripped).unwrap();
        assert_eq!(first, second);
    }
}
