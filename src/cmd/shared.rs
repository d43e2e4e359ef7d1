/*!
shared.rs - shared helpers for subcommands.

Focus:
  - target handling (flag > LISTCTL_TARGET env) + snapshot service setup
  - schema file default (flag > LISTCTL_SCHEMA_FILE env)
  - field pair collection (--field KEY=VALUE, --field-file json/yaml)
  - single-threaded runtime construction
  - typed error rendering (stable code + hint) for both output modes
*/

use anyhow::{Context, Result, bail};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji};
use crate::schema::error::SchemaError;
use crate::service::{
    self, IdentityResolver, ListService, NullService, SnapshotService, TargetSpec,
};

/// CLI flag wins; falls back to the LISTCTL_TARGET environment variable.
pub fn effective_target(flag: Option<String>) -> Option<String> {
    flag.or_else(|| {
        std::env::var("LISTCTL_TARGET")
            .ok()
            .filter(|s| !s.trim().is_empty())
    })
}

/// CLI flag wins; falls back to the LISTCTL_SCHEMA_FILE environment variable.
pub fn effective_schema_file(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| {
        std::env::var("LISTCTL_SCHEMA_FILE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
    })
}

/// Single-threaded cooperative runtime; every command awaits its I/O
/// sequentially, nothing here needs worker threads.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")
}

/// Backing service for a command invocation. Without a target, every
/// remote capability degrades to Unsupported (file/cache-only resolution).
pub enum ServiceHandle {
    Snapshot(SnapshotService),
    Null(NullService),
}

impl ServiceHandle {
    pub fn as_list(&self) -> &dyn ListService {
        match self {
            ServiceHandle::Snapshot(s) => s,
            ServiceHandle::Null(s) => s,
        }
    }

    pub fn as_identities(&self) -> &dyn IdentityResolver {
        match self {
            ServiceHandle::Snapshot(s) => s,
            ServiceHandle::Null(s) => s,
        }
    }
}

/// Parse a target string (if any) and open the backing service. Remote
/// endpoints are recognized but not implemented yet.
pub async fn open_service(target_raw: Option<&str>) -> Result<ServiceHandle> {
    let Some(target_raw) = target_raw else {
        return Ok(ServiceHandle::Null(NullService));
    };
    let spec = service::parse_target(target_raw)
        .with_context(|| format!("Failed to parse target: '{target_raw}'"))?;
    match spec {
        TargetSpec::SnapshotFile { path, .. } => {
            Ok(ServiceHandle::Snapshot(SnapshotService::open(&path).await?))
        }
        TargetSpec::RemoteUrl { url, .. } => {
            bail!("remote list service not implemented yet: {url}")
        }
    }
}

/// Collect `--field KEY=VALUE` pairs into a map, rejecting malformed input.
pub fn collect_field_pairs(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut out = HashMap::new();
    for kv in pairs {
        let Some((k, v)) = kv.split_once('=') else {
            bail!("invalid --field (expected KEY=VALUE): {kv}");
        };
        let key = k.trim();
        if key.is_empty() {
            bail!("invalid --field (empty key): {kv}");
        }
        out.insert(key.to_string(), v.trim().to_string());
    }
    Ok(out)
}

/// Merge a field file (JSON or YAML object) into `provided`. Entries
/// already present (from --field) win over file entries.
pub fn load_field_file_into_map(
    path: &str,
    provided: &mut HashMap<String, String>,
) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read field file: {path}"))?;
    let lower = path.to_ascii_lowercase();

    let value: serde_json::Value = if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        let yaml_v: serde_yaml::Value =
            serde_yaml::from_str(&raw).context("failed to parse YAML field file")?;
        serde_json::to_value(yaml_v).context("failed to convert YAML to JSON")?
    } else {
        serde_json::from_str(&raw).context("failed to parse JSON field file")?
    };

    let obj = value
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("field file root must be an object"))?;

    for (k, v) in obj {
        if provided.contains_key(k) {
            continue;
        }
        let s = match v {
            serde_json::Value::String(sv) => sv.clone(),
            _ => v.to_string(),
        };
        provided.insert(k.clone(), s);
    }
    Ok(())
}

/// Render a core error on the chosen output path, then fail the command.
///
/// JSON shape:
/// {"status":"error","error_code":"...","error":"...","hint":"..."}
pub fn output_schema_error(json: bool, err: SchemaError) -> Result<()> {
    if json {
        let mut body = serde_json::json!({
            "status": "error",
            "error_code": err.code(),
            "error": err.to_string(),
        });
        if let Some(hint) = err.hint() {
            body["hint"] = serde_json::Value::String(hint.to_string());
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string())
        );
    } else {
        let style = StyleOptions::detect();
        let title = format!("{} Error [{}]", emoji("error", &style), err.code());
        let boxed = box_header(title, Some(color(Role::Error, err.to_string(), &style)), &style);
        println!("{boxed}");
        if let Some(hint) = err.hint() {
            println!(
                "{} {}",
                emoji("info", &style),
                color(Role::Dim, hint, &style)
            );
        }
    }
    Err(err.into())
}

/// Plain-message variant for boundary failures that have no typed core
/// error (missing target, malformed flags).
pub fn output_error(json: bool, msg: &str) -> Result<()> {
    if json {
        let body = serde_json::json!({"status":"error","error": msg});
        println!(
            "{}",
            serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string())
        );
    } else {
        let style = StyleOptions::detect();
        let boxed = box_header(
            format!("{} Error", emoji("error", &style)),
            Some(color(Role::Error, msg, &style)),
            &style,
        );
        println!("{boxed}");
    }
    bail!(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_pairs_parse_and_trim() {
        let pairs = vec!["status=open".to_string(), " due = 2026-09-01 ".to_string()];
        let map = collect_field_pairs(&pairs).unwrap();
        assert_eq!(map.get("status").unwrap(), "open");
        assert_eq!(map.get("due").unwrap(), "2026-09-01");
    }

    #[test]
    fn field_pairs_reject_missing_equals() {
        assert!(collect_field_pairs(&["oops".to_string()]).is_err());
        assert!(collect_field_pairs(&["=value".to_string()]).is_err());
    }

    #[test]
    fn field_file_json_merge_cli_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.json");
        std::fs::write(&path, r#"{ "status": "open", "points": 3 }"#).unwrap();

        let mut provided = HashMap::new();
        provided.insert("status".to_string(), "closed".to_string());
        load_field_file_into_map(path.to_str().unwrap(), &mut provided).unwrap();

        assert_eq!(provided.get("status").unwrap(), "closed");
        assert_eq!(provided.get("points").unwrap(), "3");
    }

    #[test]
    fn field_file_yaml_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.yaml");
        std::fs::write(&path, "status: open\npoints: 3\n").unwrap();

        let mut provided = HashMap::new();
        load_field_file_into_map(path.to_str().unwrap(), &mut provided).unwrap();
        assert_eq!(provided.get("status").unwrap(), "open");
        assert_eq!(provided.get("points").unwrap(), "3");
    }
}
