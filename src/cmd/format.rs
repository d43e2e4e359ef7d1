/*!
Formatting primitives for human output paths.

Zero non-std dependencies: ANSI color (NO_COLOR disables), emoji tags
(NO_EMOJI disables), a boxed header, and a width-aware table. JSON output
paths must not use these helpers; machine output stays clean.

Public API:
  - StyleOptions::detect()
  - color(role, text, &StyleOptions)
  - emoji(tag, &StyleOptions)
  - box_header(title, subtitle_opt, &StyleOptions)
  - table(headers, rows, TableOpts, &StyleOptions)
  - truncate_ellipsis(s, max_chars)
*/

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub use_emoji: bool,
    pub term_width: usize,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::detect()
    }
}

impl StyleOptions {
    /// Best-effort detection: COLUMNS env (clamped 40..=220, default 100),
    /// NO_COLOR / NO_EMOJI opt-outs.
    pub fn detect() -> Self {
        let term_width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);
        StyleOptions {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            use_emoji: std::env::var_os("NO_EMOJI").is_none(),
            term_width,
        }
    }
}

/// Semantic color roles; concrete codes stay private to this module.
#[derive(Debug, Clone, Copy)]
pub enum Role {
    Accent,
    Dim,
    Error,
    Ok,
}

impl Role {
    fn code(self) -> &'static str {
        match self {
            Role::Accent => "\x1b[36m",
            Role::Dim => "\x1b[2m",
            Role::Error => "\x1b[31m",
            Role::Ok => "\x1b[32m",
        }
    }
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    format!("{}{}\x1b[0m", role.code(), text.as_ref())
}

pub fn emoji(tag: &str, style: &StyleOptions) -> &'static str {
    if !style.use_emoji {
        return "";
    }
    match tag {
        "columns" => "📋",
        "field" => "✏️",
        "success" => "✅",
        "error" => "❌",
        "info" => "ℹ️",
        _ => "",
    }
}

/// Rounded box around a title (and optional subtitle), width-fitted.
pub fn box_header(title: String, subtitle: Option<String>, style: &StyleOptions) -> String {
    let inner_width = [Some(&title), subtitle.as_ref()]
        .into_iter()
        .flatten()
        .map(|s| display_width(s))
        .max()
        .unwrap_or(0)
        .min(style.term_width.saturating_sub(4));

    let mut out = String::new();
    out.push_str(&format!("╭{}╮\n", "─".repeat(inner_width + 2)));
    out.push_str(&box_line(&title, inner_width));
    if let Some(sub) = subtitle {
        out.push_str(&box_line(&color(Role::Dim, sub, style), inner_width));
    }
    out.push_str(&format!("╰{}╯", "─".repeat(inner_width + 2)));
    out
}

fn box_line(content: &str, inner_width: usize) -> String {
    let pad = inner_width.saturating_sub(display_width(content));
    format!("│ {}{} │\n", content, " ".repeat(pad))
}

#[derive(Debug, Clone, Copy)]
pub struct TableOpts {
    pub max_width: usize,
    pub truncate: bool,
    pub header_sep: bool,
}

impl Default for TableOpts {
    fn default() -> Self {
        TableOpts {
            max_width: 100,
            truncate: true,
            header_sep: true,
        }
    }
}

/// Simple left-aligned table. Column widths come from the widest cell;
/// when the total exceeds `max_width` the last column absorbs the cut.
pub fn table(
    headers: &[&str],
    rows: &[Vec<String>],
    opts: TableOpts,
    style: &StyleOptions,
) -> String {
    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().take(cols).enumerate() {
            widths[i] = widths[i].max(display_width(cell));
        }
    }

    // Shrink the widest column until the table fits (rough fit; cells are
    // truncated to their final width below).
    if opts.truncate {
        let sep_width = 2 * (cols.saturating_sub(1));
        while widths.iter().sum::<usize>() + sep_width > opts.max_width {
            let Some((imax, _)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
                break;
            };
            if widths[imax] <= 8 {
                break;
            }
            widths[imax] -= 1;
        }
    }

    let mut out = String::new();
    let header_line = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:w$}", h, w = widths[i]))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(&color(Role::Accent, header_line, style));
    out.push('\n');
    if opts.header_sep {
        let total = widths.iter().sum::<usize>() + 2 * (cols.saturating_sub(1));
        out.push_str(&color(Role::Dim, "─".repeat(total), style));
        out.push('\n');
    }
    for row in rows {
        let line = (0..cols)
            .map(|i| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                let cell = if opts.truncate {
                    truncate_ellipsis(cell, widths[i])
                } else {
                    cell.to_string()
                };
                format!("{:w$}", cell, w = widths[i])
            })
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.pop();
    out
}

/// Truncate to `max_chars` characters, appending "…" when cut.
pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    let count = s.chars().count();
    if count <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(1);
    let mut out: String = s.chars().take(keep).collect();
    out.push('…');
    out
}

// char count; ANSI-styled strings are only padded, never truncated, so
// this stays a plain count
fn display_width(s: &str) -> usize {
    s.chars().count()
}
