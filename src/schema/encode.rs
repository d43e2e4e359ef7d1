/*!
Field encoder: converts free-form user input into the typed payload
fragment the remote service expects for a column.

`FieldPayload` is an externally tagged serde enum, so serializing a
variant yields exactly the service's wire shape ({"select":[...]},
{"checkbox":true}, ...). Dispatch over `ColumnType` is an exhaustive
match; adding a column type is a compile-time decision, not a silent
fallthrough.
*/

use crate::schema::column::{Column, ColumnType};
use crate::schema::error::SchemaError;
use crate::service::IdentityResolver;
use serde::Serialize;
use serde_json::Value;

/// Raw-value tokens recognized as "true" for checkbox columns. Anything
/// else resolves to false; there is no error path.
const TRUE_TOKENS: &[&str] = &["true", "yes", "1", "completed", "done"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPayload {
    RichText(Vec<RichTextBlock>),
    User(Vec<String>),
    Channel(Vec<String>),
    Select(Vec<String>),
    Date(Vec<String>),
    Checkbox(bool),
    Number(Vec<f64>),
    Rating(Vec<f64>),
    Url(Vec<String>),
    Emoji(String),
    Link(Vec<LinkValue>),
    Attachment(Vec<String>),
    Message(Vec<String>),
    Reference(Vec<FileReference>),
}

/// Single paragraph of the service's structured rich-text representation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RichTextBlock {
    #[serde(rename = "type")]
    pub block_type: &'static str,
    pub elements: Vec<RichTextSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RichTextSection {
    #[serde(rename = "type")]
    pub section_type: &'static str,
    pub elements: Vec<RichTextRun>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RichTextRun {
    #[serde(rename = "type")]
    pub run_type: &'static str,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkValue {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub display_as_url: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReference {
    pub file: FileRef,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRef {
    pub id: String,
}

impl FieldPayload {
    /// Full field object for a row payload:
    /// `{"column_id": ..., "<typed key>": ...}`.
    pub fn into_field(self, column_id: &str) -> Value {
        let mut obj = match serde_json::to_value(&self) {
            Ok(Value::Object(map)) => map,
            // Serialize of an externally tagged enum is always an object.
            _ => serde_json::Map::new(),
        };
        obj.insert("column_id".into(), Value::String(column_id.to_string()));
        Value::Object(obj)
    }
}

/// Encode `raw` for `column`. Identity resolution is the only I/O this
/// performs, and only for user/channel-typed columns.
pub async fn encode_field<R: IdentityResolver + ?Sized>(
    column: &Column,
    raw: &str,
    ids: &R,
) -> Result<FieldPayload, SchemaError> {
    match column.column_type {
        ColumnType::Text | ColumnType::RichText | ColumnType::Unknown => {
            Ok(FieldPayload::RichText(vec![rich_text_paragraph(raw)]))
        }

        ColumnType::User | ColumnType::TodoAssignee => {
            let mut resolved = Vec::new();
            for token in split_tokens(raw) {
                let id = ids.resolve_user(token).await.map_err(|e| {
                    SchemaError::Identity {
                        reference: token.to_string(),
                        source: e,
                    }
                })?;
                resolved.push(id);
            }
            Ok(FieldPayload::User(resolved))
        }

        ColumnType::Channel => {
            let mut resolved = Vec::new();
            for token in split_tokens(raw) {
                let id = ids.resolve_channel(token).await.map_err(|e| {
                    SchemaError::Identity {
                        reference: token.to_string(),
                        source: e,
                    }
                })?;
                resolved.push(id);
            }
            Ok(FieldPayload::Channel(resolved))
        }

        ColumnType::Select => {
            let choices = column
                .options
                .as_ref()
                .and_then(|o| o.choices.as_deref())
                .unwrap_or(&[]);
            let values = split_tokens(raw)
                .map(|token| {
                    choices
                        .iter()
                        .find(|c| {
                            c.value.eq_ignore_ascii_case(token)
                                || c.label
                                    .as_deref()
                                    .is_some_and(|l| l.eq_ignore_ascii_case(token))
                        })
                        .map(|c| c.value.clone())
                        // No match: pass the raw token through unchanged.
                        // Choice metadata may be stale or incomplete.
                        .unwrap_or_else(|| token.to_string())
                })
                .collect();
            Ok(FieldPayload::Select(values))
        }

        ColumnType::Date | ColumnType::TodoDueDate => Ok(FieldPayload::Date(
            split_tokens(raw).map(str::to_string).collect(),
        )),

        ColumnType::Checkbox | ColumnType::TodoCompleted => {
            let lowered = raw.trim().to_ascii_lowercase();
            Ok(FieldPayload::Checkbox(
                TRUE_TOKENS.contains(&lowered.as_str()),
            ))
        }

        ColumnType::Number | ColumnType::Currency => {
            Ok(FieldPayload::Number(vec![parse_number(column, raw)?]))
        }

        ColumnType::Rating => Ok(FieldPayload::Rating(vec![parse_number(column, raw)?])),

        ColumnType::Url => Ok(FieldPayload::Url(
            split_tokens(raw).map(str::to_string).collect(),
        )),

        ColumnType::Emoji => Ok(FieldPayload::Emoji(raw.trim().to_string())),

        ColumnType::Link => {
            let (url, label) = match raw.split_once('|') {
                Some((u, l)) => (u.trim().to_string(), Some(l.trim().to_string())),
                None => (raw.trim().to_string(), None),
            };
            let display_as_url = label.is_none();
            Ok(FieldPayload::Link(vec![LinkValue {
                url,
                text: label,
                display_as_url,
            }]))
        }

        ColumnType::Attachment => Ok(FieldPayload::Attachment(
            split_tokens(raw).map(str::to_string).collect(),
        )),

        ColumnType::Message => Ok(FieldPayload::Message(
            split_tokens(raw).map(str::to_string).collect(),
        )),

        ColumnType::Reference => Ok(FieldPayload::Reference(
            split_tokens(raw)
                .map(|token| FileReference {
                    file: FileRef {
                        id: token.to_string(),
                    },
                })
                .collect(),
        )),
    }
}

fn rich_text_paragraph(raw: &str) -> RichTextBlock {
    RichTextBlock {
        block_type: "rich_text",
        elements: vec![RichTextSection {
            section_type: "rich_text_section",
            elements: vec![RichTextRun {
                run_type: "text",
                text: raw.to_string(),
            }],
        }],
    }
}

fn split_tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_number(column: &Column, raw: &str) -> Result<f64, SchemaError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| SchemaError::InvalidNumber {
            column: column.name.clone(),
            input: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::column::{ColumnOptions, SelectChoice};
    use crate::service::ServiceError;
    use serde_json::json;

    struct MapIds;

    #[async_trait::async_trait]
    impl IdentityResolver for MapIds {
        async fn resolve_user(&self, reference: &str) -> Result<String, ServiceError> {
            match reference {
                "alice@example.com" => Ok("U01".into()),
                "bob" => Ok("U02".into()),
                other => Err(ServiceError::UnknownIdentity(other.into())),
            }
        }

        async fn resolve_channel(&self, reference: &str) -> Result<String, ServiceError> {
            match reference {
                "#general" => Ok("C01".into()),
                other => Err(ServiceError::UnknownIdentity(other.into())),
            }
        }
    }

    fn select_column() -> Column {
        let mut col = Column::new("c1", ColumnType::Select);
        col.options = Some(ColumnOptions {
            choices: Some(vec![SelectChoice {
                value: "high".into(),
                label: Some("High".into()),
                color: None,
            }]),
            ..Default::default()
        });
        col
    }

    #[tokio::test]
    async fn text_wraps_in_rich_text_section() {
        let col = Column::new("c1", ColumnType::Text);
        let p = encode_field(&col, "hello", &MapIds).await.unwrap();
        let v = p.clone().into_field("c1");
        assert_eq!(v["column_id"], "c1");
        assert_eq!(v["rich_text"][0]["type"], "rich_text");
        assert_eq!(
            v["rich_text"][0]["elements"][0]["elements"][0]["text"],
            "hello"
        );
        // unknown columns take the same conservative path
        let unk = Column::new("c1", ColumnType::Unknown);
        assert_eq!(encode_field(&unk, "hello", &MapIds).await.unwrap(), p);
    }

    #[tokio::test]
    async fn users_are_split_and_resolved() {
        let col = Column::new("c1", ColumnType::TodoAssignee);
        let p = encode_field(&col, "alice@example.com, bob", &MapIds)
            .await
            .unwrap();
        assert_eq!(p, FieldPayload::User(vec!["U01".into(), "U02".into()]));
    }

    #[tokio::test]
    async fn unresolvable_identity_carries_reference() {
        let col = Column::new("c1", ColumnType::User);
        let err = encode_field(&col, "carol", &MapIds).await.unwrap_err();
        match err {
            SchemaError::Identity { reference, .. } => assert_eq!(reference, "carol"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn channels_resolve_against_channel_identity() {
        let col = Column::new("c1", ColumnType::Channel);
        let p = encode_field(&col, "#general", &MapIds).await.unwrap();
        assert_eq!(p, FieldPayload::Channel(vec!["C01".into()]));
    }

    #[tokio::test]
    async fn select_matches_label_case_insensitively() {
        let p = encode_field(&select_column(), "HIGH", &MapIds).await.unwrap();
        assert_eq!(p, FieldPayload::Select(vec!["high".into()]));
        let p = encode_field(&select_column(), "High", &MapIds).await.unwrap();
        assert_eq!(p, FieldPayload::Select(vec!["high".into()]));
    }

    #[tokio::test]
    async fn select_unmatched_token_survives_verbatim() {
        // deliberate permissiveness: stale/incomplete choice metadata must
        // not block the write, so the raw token passes through unchanged
        let p = encode_field(&select_column(), "urgent", &MapIds)
            .await
            .unwrap();
        assert_eq!(p, FieldPayload::Select(vec!["urgent".into()]));
    }

    #[tokio::test]
    async fn select_without_options_passes_everything_through() {
        let col = Column::new("c1", ColumnType::Select);
        let p = encode_field(&col, "open, closed", &MapIds).await.unwrap();
        assert_eq!(
            p,
            FieldPayload::Select(vec!["open".into(), "closed".into()])
        );
    }

    #[tokio::test]
    async fn checkbox_vocabulary() {
        let col = Column::new("c1", ColumnType::Checkbox);
        for raw in ["Done", "true", "YES", "1", "completed"] {
            assert_eq!(
                encode_field(&col, raw, &MapIds).await.unwrap(),
                FieldPayload::Checkbox(true),
                "{raw} should be true"
            );
        }
        assert_eq!(
            encode_field(&col, "nope", &MapIds).await.unwrap(),
            FieldPayload::Checkbox(false)
        );
    }

    #[tokio::test]
    async fn number_parses_or_fails_typed() {
        let col = Column::new("c1", ColumnType::Currency);
        assert_eq!(
            encode_field(&col, "19.99", &MapIds).await.unwrap(),
            FieldPayload::Number(vec![19.99])
        );
        let err = encode_field(&col, "cheap", &MapIds).await.unwrap_err();
        assert!(matches!(err, SchemaError::InvalidNumber { .. }));
    }

    #[tokio::test]
    async fn link_splits_url_and_label() {
        let col = Column::new("c1", ColumnType::Link);
        let p = encode_field(&col, "https://example.com | Example", &MapIds)
            .await
            .unwrap();
        assert_eq!(
            p,
            FieldPayload::Link(vec![LinkValue {
                url: "https://example.com".into(),
                text: Some("Example".into()),
                display_as_url: false,
            }])
        );

        let bare = encode_field(&col, "https://example.com", &MapIds)
            .await
            .unwrap();
        let v = serde_json::to_value(&bare).unwrap();
        assert_eq!(v, json!({"link":[{"url":"https://example.com","display_as_url":true}]}));
    }

    #[tokio::test]
    async fn date_tokens_are_literal() {
        let col = Column::new("c1", ColumnType::TodoDueDate);
        let p = encode_field(&col, "2026-09-01, next friday", &MapIds)
            .await
            .unwrap();
        assert_eq!(
            p,
            FieldPayload::Date(vec!["2026-09-01".into(), "next friday".into()])
        );
    }

    #[tokio::test]
    async fn reference_wraps_file_ids() {
        let col = Column::new("c1", ColumnType::Reference);
        let p = encode_field(&col, "F1,F2", &MapIds).await.unwrap();
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(
            v,
            json!({"reference":[{"file":{"id":"F1"}},{"file":{"id":"F2"}}]})
        );
    }

    #[tokio::test]
    async fn attachment_and_message_are_opaque_lists() {
        let att = Column::new("c1", ColumnType::Attachment);
        let msg = Column::new("c2", ColumnType::Message);
        assert_eq!(
            encode_field(&att, "F9", &MapIds).await.unwrap(),
            FieldPayload::Attachment(vec!["F9".into()])
        );
        assert_eq!(
            encode_field(&msg, "p1, p2", &MapIds).await.unwrap(),
            FieldPayload::Message(vec!["p1".into(), "p2".into()])
        );
    }

    #[tokio::test]
    async fn rating_shares_the_numeric_parse() {
        let col = Column::new("c1", ColumnType::Rating);
        assert_eq!(
            encode_field(&col, "4", &MapIds).await.unwrap(),
            FieldPayload::Rating(vec![4.0])
        );
        assert!(encode_field(&col, "four", &MapIds).await.is_err());
    }
}
