/*!
Column model: the typed vocabulary of column kinds and their value shapes.

Key items:
  - ColumnType (closed enum; anything unrecognized normalizes to Unknown)
  - SelectChoice / ColumnOptions (type-specific constraints)
  - Column / Schema (serialized shape == cache file shape)
*/

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed enumeration of column kinds the remote list service can expose.
///
/// `Unknown` is the safe default for unrecognized or unobservable types:
/// encoding continues with a conservative free-text fallback instead of
/// failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    RichText,
    Number,
    Rating,
    Date,
    User,
    Channel,
    Select,
    Checkbox,
    Currency,
    Url,
    Emoji,
    Attachment,
    Link,
    Message,
    Reference,
    TodoAssignee,
    TodoDueDate,
    TodoCompleted,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ColumnType {
    /// Case-folding parser against the allow-list. Strings outside the list
    /// map to `Unknown`, never to an error.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => ColumnType::Text,
            "rich_text" => ColumnType::RichText,
            "number" => ColumnType::Number,
            "rating" => ColumnType::Rating,
            "date" => ColumnType::Date,
            "user" => ColumnType::User,
            "channel" => ColumnType::Channel,
            "select" => ColumnType::Select,
            "checkbox" => ColumnType::Checkbox,
            "currency" => ColumnType::Currency,
            "url" => ColumnType::Url,
            "emoji" => ColumnType::Emoji,
            "attachment" => ColumnType::Attachment,
            "link" => ColumnType::Link,
            "message" => ColumnType::Message,
            "reference" => ColumnType::Reference,
            "todo_assignee" => ColumnType::TodoAssignee,
            "todo_due_date" => ColumnType::TodoDueDate,
            "todo_completed" => ColumnType::TodoCompleted,
            _ => ColumnType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::RichText => "rich_text",
            ColumnType::Number => "number",
            ColumnType::Rating => "rating",
            ColumnType::Date => "date",
            ColumnType::User => "user",
            ColumnType::Channel => "channel",
            ColumnType::Select => "select",
            ColumnType::Checkbox => "checkbox",
            ColumnType::Currency => "currency",
            ColumnType::Url => "url",
            ColumnType::Emoji => "emoji",
            ColumnType::Attachment => "attachment",
            ColumnType::Link => "link",
            ColumnType::Message => "message",
            ColumnType::Reference => "reference",
            ColumnType::TodoAssignee => "todo_assignee",
            ColumnType::TodoDueDate => "todo_due_date",
            ColumnType::TodoCompleted => "todo_completed",
            ColumnType::Unknown => "unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ColumnType::Unknown)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured choice of a select-typed column. `value` is the canonical
/// token the service stores; `label` is the human form shown in clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectChoice {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Type-specific constraints. All optional; a missing options block only
/// skips type-specific validation, it never fails encoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<SelectChoice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
}

impl ColumnOptions {
    pub fn is_empty(&self) -> bool {
        self.choices.is_none()
            && self.max.is_none()
            && self.format.is_none()
            && self.precision.is_none()
            && self.date_format.is_none()
    }
}

/// A single field definition in a list's schema.
///
/// `id` is the only globally unique identifier; `key` and `name` are not
/// guaranteed unique and lookups by them are first-match-wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub name: String,
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_primary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ColumnOptions>,
}

impl Column {
    /// Minimal column with the name defaulted to the id.
    pub fn new(id: impl Into<String>, column_type: ColumnType) -> Self {
        let id = id.into();
        Column {
            name: id.clone(),
            id,
            key: None,
            column_type,
            is_primary: false,
            options: None,
        }
    }

    /// Whether `name` is just the id fallback (i.e. no real display name
    /// has been learned yet).
    pub fn name_is_fallback(&self) -> bool {
        self.name == self.id
    }
}

/// The full set of column definitions for one list. Column order is
/// insignificant for lookups; it matters for display and for type-based
/// default picks only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub list_id: String,
    pub columns: Vec<Column>,
}

impl Schema {
    pub fn empty(list_id: impl Into<String>) -> Self {
        Schema {
            list_id: list_id.into(),
            columns: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
