/*!
Typed error taxonomy for schema resolution and field encoding.

Every variant carries a stable machine-readable `code()` so the CLI
boundary can map errors deterministically, plus an optional `hint()` for
the human-facing output path.
*/

use crate::schema::column::ColumnType;
use crate::service::ServiceError;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// No recognizable column list in a payload (neither a metadata
    /// wrapper, a `schema` array, nor a `columns` array).
    #[error("no recognizable column list in payload")]
    SchemaFormat,

    /// A column entry is missing its required id.
    #[error("column entry missing required id")]
    InvalidColumn,

    /// The resolver exhausted every discovery strategy with zero columns.
    #[error("no schema available for list '{list_id}'")]
    SchemaUnavailable { list_id: String },

    /// A caller-supplied column reference did not resolve in the index.
    #[error("unknown column '{reference}'")]
    UnknownColumn { reference: String },

    /// A resolved column's type is not in the caller's accepted set.
    #[error("column '{column}' has type {actual}, expected one of: {}", .expected.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", "))]
    ColumnTypeMismatch {
        column: String,
        actual: ColumnType,
        expected: Vec<ColumnType>,
    },

    /// More than one column could satisfy a type-based default pick.
    #[error("ambiguous {wanted} column: candidates {}", .candidates.join(", "))]
    AmbiguousColumn {
        wanted: String,
        candidates: Vec<String>,
    },

    /// Non-numeric input supplied to a number/currency/rating column.
    #[error("invalid number '{input}' for column '{column}'")]
    InvalidNumber { column: String, input: String },

    /// Identity resolution failed for a user/channel reference.
    #[error("could not resolve identity '{reference}'")]
    Identity {
        reference: String,
        #[source]
        source: ServiceError,
    },

    /// Remote list service failure (anything other than the "unsupported
    /// capability" continuation signal, which the resolver swallows).
    #[error("list service error: {0}")]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    /// Stable identifier for machine-readable output.
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::SchemaFormat => "schema_format",
            SchemaError::InvalidColumn => "invalid_column",
            SchemaError::SchemaUnavailable { .. } => "schema_unavailable",
            SchemaError::UnknownColumn { .. } => "unknown_column",
            SchemaError::ColumnTypeMismatch { .. } => "column_type_mismatch",
            SchemaError::AmbiguousColumn { .. } => "ambiguous_column",
            SchemaError::InvalidNumber { .. } => "invalid_number",
            SchemaError::Identity { .. } => "identity_resolution_failed",
            SchemaError::Service(_) => "service_error",
            SchemaError::Io(_) => "io_error",
            SchemaError::Json(_) => "json_error",
        }
    }

    /// Short remediation hint for human output. None when the message is
    /// self-explanatory.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            SchemaError::SchemaUnavailable { .. } => Some(
                "provide an explicit schema file with --schema-file (or LISTCTL_SCHEMA_FILE)",
            ),
            SchemaError::SchemaFormat => {
                Some("expected a list_metadata wrapper, a 'schema' array, or a 'columns' array")
            }
            SchemaError::UnknownColumn { .. } => {
                Some("run `listctl columns <LIST_ID>` to see known columns")
            }
            SchemaError::AmbiguousColumn { .. } => {
                Some("name the column explicitly instead of relying on the type-based default")
            }
            SchemaError::Identity { .. } => {
                Some("check the reference spelling or pass a resolved id directly")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(SchemaError::SchemaFormat.code(), "schema_format");
        assert_eq!(
            SchemaError::SchemaUnavailable {
                list_id: "L1".into()
            }
            .code(),
            "schema_unavailable"
        );
    }

    #[test]
    fn mismatch_message_lists_expected_types() {
        let e = SchemaError::ColumnTypeMismatch {
            column: "Due".into(),
            actual: ColumnType::Select,
            expected: vec![ColumnType::Date, ColumnType::TodoDueDate],
        };
        let msg = e.to_string();
        assert!(msg.contains("date, todo_due_date"), "got: {msg}");
    }

    #[test]
    fn ambiguous_message_names_candidates() {
        let e = SchemaError::AmbiguousColumn {
            wanted: "select".into(),
            candidates: vec!["Priority".into(), "Status".into()],
        };
        assert!(e.to_string().contains("Priority, Status"));
    }
}
