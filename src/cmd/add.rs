/*!
`add` subcommand: build the typed field payload for a new row.

Field values come from:
  --title TEXT                  (routed to the primary text column)
  --field KEY=VALUE             (repeatable; KEY is a column id/key/name)
  --field-file fields.(json|yaml) (merged; CLI --field overrides entries)

Every value is encoded through the resolved schema, so the printed
payload is exactly what the row-creation transport expects:

{
  "status": "ok",
  "list_id": "L123",
  "elapsed_ms": 9,
  "payload": { "fields": [ { "column_id": "...", "select": ["high"] } ] }
}
*/

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji};
use crate::cmd::shared::{
    collect_field_pairs, effective_schema_file, effective_target, load_field_file_into_map,
    open_service, output_error, output_schema_error, runtime,
};
use crate::schema::{SchemaCache, SchemaError, SchemaIndex, SchemaResolver, encode_field};
use crate::service::IdentityResolver;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// List id to add a row to
    pub list_id: String,

    /// Primary text value (mapped to the list's primary text column)
    #[arg(long)]
    pub title: Option<String>,

    /// Field value (KEY=VALUE, KEY is a column id/key/name), repeatable
    #[arg(long = "field", value_name = "KEY=VALUE")]
    pub fields: Vec<String>,

    /// Load field values from file (JSON or YAML). CLI --field overrides
    #[arg(long = "field-file", value_name = "PATH")]
    pub field_file: Option<String>,

    /// Explicit schema file (JSON); falls back to LISTCTL_SCHEMA_FILE env
    #[arg(long = "schema-file", value_name = "PATH")]
    pub schema_file: Option<PathBuf>,

    /// Ignore the cached schema and re-discover
    #[arg(long)]
    pub refresh: bool,

    /// Target list service; falls back to LISTCTL_TARGET env
    #[arg(short = 't', long)]
    pub target: Option<String>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute_add(mut args: AddArgs) -> Result<()> {
    let mut provided = match collect_field_pairs(&args.fields) {
        Ok(map) => map,
        Err(e) => return output_error(args.json, &e.to_string()),
    };
    if let Some(ref pf) = args.field_file
        && let Err(e) = load_field_file_into_map(pf, &mut provided)
    {
        return output_error(args.json, &e.to_string());
    }
    if args.title.is_none() && provided.is_empty() {
        return output_error(args.json, "nothing to add (use --title or --field)");
    }

    let target = effective_target(args.target.take());
    let schema_file = effective_schema_file(args.schema_file.take());

    let started = Instant::now();
    let rt = runtime()?;
    let handle = rt.block_on(open_service(target.as_deref()))?;
    let cache = SchemaCache::new(SchemaCache::default_dir());
    let resolver = SchemaResolver::new(handle.as_list(), cache);

    let index = match rt.block_on(resolver.resolve(
        &args.list_id,
        schema_file.as_deref(),
        args.refresh,
    )) {
        Ok(Some(index)) => index,
        Ok(None) => {
            return output_schema_error(
                args.json,
                SchemaError::SchemaUnavailable {
                    list_id: args.list_id.clone(),
                },
            );
        }
        Err(e) => return output_schema_error(args.json, e),
    };

    let encoded = rt.block_on(encode_all(
        &index,
        args.title.as_deref(),
        &provided,
        handle.as_identities(),
    ));
    let fields = match encoded {
        Ok(fields) => fields,
        Err(e) => return output_schema_error(args.json, e),
    };
    let elapsed_ms = started.elapsed().as_millis();

    let payload = serde_json::json!({ "fields": fields });
    if args.json {
        let body = serde_json::json!({
            "status": "ok",
            "list_id": args.list_id,
            "elapsed_ms": elapsed_ms,
            "payload": payload,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string())
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    let header = box_header(
        format!(
            "{} Add Row ({} field(s)) - {}",
            emoji("success", &style),
            fields.len(),
            args.list_id
        ),
        Some(format!("{elapsed_ms} ms")),
        &style,
    );
    println!("{header}");
    println!("{} {}", emoji("field", &style), color(Role::Accent, "Payload:", &style));
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string())
    );
    Ok(())
}

/// Encode the title plus every provided field against the resolved index,
/// in a stable order (title first, then fields sorted by reference).
async fn encode_all(
    index: &SchemaIndex,
    title: Option<&str>,
    provided: &std::collections::HashMap<String, String>,
    ids: &dyn IdentityResolver,
) -> Result<Vec<serde_json::Value>, SchemaError> {
    let mut fields = Vec::with_capacity(provided.len() + 1);

    if let Some(text) = title {
        let col = index
            .find_primary_text_column()
            .ok_or_else(|| SchemaError::UnknownColumn {
                reference: "title".into(),
            })?;
        let payload = encode_field(col, text, ids).await?;
        fields.push(payload.into_field(&col.id));
    }

    let mut refs: Vec<&String> = provided.keys().collect();
    refs.sort();
    for reference in refs {
        let col = index
            .resolve_column(reference)
            .ok_or_else(|| SchemaError::UnknownColumn {
                reference: reference.clone(),
            })?;
        let payload = encode_field(col, &provided[reference], ids).await?;
        fields.push(payload.into_field(&col.id));
    }

    Ok(fields)
}
