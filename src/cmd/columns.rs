/*!
`columns` subcommand: resolve and display a list's schema.

Runs the full discovery chain (explicit file -> cache -> remote metadata
-> row inference). A list whose schema cannot be discovered by any
strategy fails with `schema_unavailable` rather than a low-level error.

JSON output shape:
{
  "status": "ok",
  "list_id": "L123",
  "elapsed_ms": 12,
  "count": 3,
  "columns": [ { "id": "...", "name": "...", "type": "...", ... } ]
}
*/

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

use crate::cmd::format::{Role, StyleOptions, TableOpts, box_header, color, emoji, table};
use crate::cmd::shared::{
    effective_schema_file, effective_target, open_service, output_schema_error, runtime,
};
use crate::schema::{Column, SchemaCache, SchemaError, SchemaResolver};

#[derive(Args, Debug)]
pub struct ColumnsArgs {
    /// List id to inspect
    pub list_id: String,

    /// Explicit schema file (JSON); bypasses cache and remote discovery.
    /// Falls back to LISTCTL_SCHEMA_FILE env.
    #[arg(long = "schema-file", value_name = "PATH")]
    pub schema_file: Option<PathBuf>,

    /// Ignore the cached schema and re-discover
    #[arg(long)]
    pub refresh: bool,

    /// Target list service (snapshot file path or remote URL).
    /// Falls back to LISTCTL_TARGET env.
    #[arg(short = 't', long)]
    pub target: Option<String>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute_columns(mut args: ColumnsArgs) -> Result<()> {
    let target = effective_target(args.target.take());
    let schema_file = effective_schema_file(args.schema_file.take());

    let started = Instant::now();
    let rt = runtime()?;
    let handle = rt.block_on(open_service(target.as_deref()))?;
    let cache = SchemaCache::new(SchemaCache::default_dir());
    let resolver = SchemaResolver::new(handle.as_list(), cache);
    let resolved =
        rt.block_on(resolver.resolve(&args.list_id, schema_file.as_deref(), args.refresh));
    let elapsed_ms = started.elapsed().as_millis();

    let index = match resolved {
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

    if args.json {
        let body = serde_json::json!({
            "status": "ok",
            "list_id": args.list_id,
            "elapsed_ms": elapsed_ms,
            "count": index.len(),
            "columns": index.columns(),
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
            "{} Columns ({}) - {}",
            emoji("columns", &style),
            index.len(),
            args.list_id
        ),
        Some(format!("{elapsed_ms} ms")),
        &style,
    );
    println!("{header}");

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(index.len());
    for (i, col) in index.columns().iter().enumerate() {
        rows.push(vec![
            (i + 1).to_string(),
            col.id.clone(),
            col.key.clone().unwrap_or_else(|| "-".into()),
            col.name.clone(),
            col.column_type.to_string(),
            column_details(col),
        ]);
    }
    let tbl = table(
        &["#", "ID", "KEY", "NAME", "TYPE", "DETAILS"],
        &rows,
        TableOpts {
            max_width: style.term_width,
            ..Default::default()
        },
        &style,
    );
    println!("{tbl}");
    println!(
        "\n{} {}",
        emoji("info", &style),
        color(
            Role::Dim,
            "Use `listctl set <LIST> <ROW> <COLUMN> <VALUE>` to encode a cell value",
            &style
        )
    );

    Ok(())
}

fn column_details(col: &Column) -> String {
    let mut parts: Vec<String> = Vec::new();
    if col.is_primary {
        parts.push("primary".into());
    }
    if let Some(opts) = &col.options {
        if let Some(choices) = &opts.choices {
            let values: Vec<&str> = choices.iter().map(|c| c.value.as_str()).collect();
            parts.push(format!("choices: {}", values.join("/")));
        }
        if let Some(max) = opts.max {
            parts.push(format!("max: {max}"));
        }
    }
    if parts.is_empty() {
        "-".into()
    } else {
        parts.join(", ")
    }
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
        Columns(ColumnsArgs),
    }

    #[test]
    fn clap_parses_columns() {
        let cli = TestCli::try_parse_from(["t", "columns", "L123", "--refresh", "--json"]).unwrap();
        let TestSub::Columns(a) = cli.cmd;
        assert_eq!(a.list_id, "L123");
        assert!(a.refresh);
        assert!(a.json);
    }
}
