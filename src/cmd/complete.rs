/*!
`complete` subcommand: mark a row's completion checkbox without naming
the column.

The column is picked by type over {todo_completed, checkbox}. Zero
candidates fails with `unknown_column`; more than one is a genuine
ambiguity the user must resolve by using `set` with an explicit column
reference (`ambiguous_column`).
*/

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji};
use crate::cmd::shared::{
    effective_schema_file, effective_target, open_service, output_schema_error, runtime,
};
use crate::schema::{ColumnType, SchemaCache, SchemaError, SchemaResolver, encode_field};

const COMPLETION_TYPES: &[ColumnType] = &[ColumnType::TodoCompleted, ColumnType::Checkbox];

#[derive(Args, Debug)]
pub struct CompleteArgs {
    /// List id
    pub list_id: String,

    /// Row id
    pub row_id: String,

    /// Raw checkbox value (default marks the row done)
    #[arg(long, default_value = "done")]
    pub value: String,

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

pub fn execute_complete(mut args: CompleteArgs) -> Result<()> {
    let target = effective_target(args.target.take());
    let schema_file = effective_schema_file(args.schema_file.take());

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

    let candidates = index.columns_by_type(COMPLETION_TYPES);
    let column = match candidates.as_slice() {
        [] => {
            return output_schema_error(
                args.json,
                SchemaError::UnknownColumn {
                    reference: "todo_completed/checkbox".into(),
                },
            );
        }
        [only] => *only,
        many => {
            return output_schema_error(
                args.json,
                SchemaError::AmbiguousColumn {
                    wanted: "checkbox".into(),
                    candidates: many.iter().map(|c| c.name.clone()).collect(),
                },
            );
        }
    };

    let payload = match rt.block_on(encode_field(column, &args.value, handle.as_identities())) {
        Ok(payload) => payload,
        Err(e) => return output_schema_error(args.json, e),
    };
    let field = payload.into_field(&column.id);

    if args.json {
        let body = serde_json::json!({
            "status": "ok",
            "list_id": args.list_id,
            "row_id": args.row_id,
            "column": { "id": column.id, "name": column.name },
            "field": field,
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
            "{} Complete row {} via {}",
            emoji("success", &style),
            args.row_id,
            column.name
        ),
        Some(format!("list={}", args.list_id)),
        &style,
    );
    println!("{header}");
    println!("{}", color(Role::Accent, "Field:", &style));
    println!(
        "{}",
        serde_json::to_string_pretty(&field).unwrap_or_else(|_| field.to_string())
    );
    Ok(())
}
