/*!
`set` subcommand: encode one cell value for an existing row.

The column reference resolves through the index tiers (id, key, name);
`--expect-type` optionally constrains the accepted column types and fails
with `column_type_mismatch` when the resolved column is something else.

JSON output shape:
{
  "status": "ok",
  "list_id": "L123",
  "row_id": "R1",
  "column": { "id": "...", "name": "...", "type": "..." },
  "field": { "column_id": "...", "checkbox": true }
}
*/

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji};
use crate::cmd::shared::{
    effective_schema_file, effective_target, open_service, output_schema_error, runtime,
};
use crate::schema::{ColumnType, SchemaCache, SchemaError, SchemaResolver, encode_field};

#[derive(Args, Debug)]
pub struct SetArgs {
    /// List id
    pub list_id: String,

    /// Row id
    pub row_id: String,

    /// Column reference (id, key, or display name)
    pub column: String,

    /// Raw value to encode
    pub value: String,

    /// Accepted column type(s), comma separated (e.g. "date,todo_due_date")
    #[arg(long = "expect-type", value_name = "TYPE[,TYPE...]")]
    pub expect_type: Option<String>,

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

pub fn execute_set(mut args: SetArgs) -> Result<()> {
    let expected: Vec<ColumnType> = args
        .expect_type
        .as_deref()
        .map(|raw| raw.split(',').map(ColumnType::parse).collect())
        .unwrap_or_default();

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

    let Some(column) = index.resolve_column(&args.column) else {
        return output_schema_error(
            args.json,
            SchemaError::UnknownColumn {
                reference: args.column.clone(),
            },
        );
    };

    if !expected.is_empty() && !expected.contains(&column.column_type) {
        return output_schema_error(
            args.json,
            SchemaError::ColumnTypeMismatch {
                column: column.name.clone(),
                actual: column.column_type,
                expected,
            },
        );
    }

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
            "column": {
                "id": column.id,
                "name": column.name,
                "type": column.column_type,
            },
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
            "{} Set {} ({}) on row {}",
            emoji("field", &style),
            column.name,
            column.column_type,
            args.row_id
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

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        cmd: TestSub,
    }

    #[derive(clap::Subcommand, Debug)]
    enum TestSub {
        Set(SetArgs),
    }

    #[test]
    fn clap_parses_set_with_expect_type() {
        let cli = TestCli::try_parse_from([
            "t",
            "set",
            "L1",
            "R9",
            "status",
            "open",
            "--expect-type",
            "select",
        ])
        .unwrap();
        let TestSub::Set(a) = cli.cmd;
        assert_eq!(a.list_id, "L1");
        assert_eq!(a.row_id, "R9");
        assert_eq!(a.column, "status");
        assert_eq!(a.value, "open");
        assert_eq!(a.expect_type.as_deref(), Some("select"));
    }
}
