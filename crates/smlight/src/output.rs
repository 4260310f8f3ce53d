//! Output formatting: plain text and JSON.
//!
//! Renders data in the format selected by `--output`. Plain output is a
//! hand-written `key: value` view; structured formats use serde.

use std::io::{self, Write};

use crate::cli::OutputFormat;
use crate::error::CliError;

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a single serde-serializable item in the chosen format.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Plain => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
    }
}

/// Render a list of items; plain output is one `row_fn` line per item.
pub fn render_list<T>(
    format: OutputFormat,
    data: &[T],
    row_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Plain => Ok(data.iter().map(row_fn).collect::<Vec<_>>().join("\n")),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// JSON in either pretty or single-line form.
pub fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(rendered)
}

/// Build an aligned `key: value` block, skipping absent values.
pub fn detail_lines(rows: &[(&str, Option<String>)]) -> String {
    let width = rows.iter().map(|(k, _)| k.len() + 1).max().unwrap_or(0);
    rows.iter()
        .filter_map(|(key, value)| {
            let label = format!("{key}:");
            value.as_ref().map(|v| format!("{label:<width$}  {v}"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn detail_lines_align_and_skip_missing() {
        let out = detail_lines(&[
            ("model", Some("SLZB-06".into())),
            ("zb_hw", None),
            ("sw_version", Some("v2.3.6".into())),
        ]);
        assert_eq!(out, format!("model:{}SLZB-06\nsw_version:  v2.3.6", " ".repeat(7)));
    }

    #[test]
    fn compact_json_is_single_line() {
        let out = render_json(&serde_json::json!({"a": 1, "b": [1, 2]}), true).unwrap();
        assert!(!out.contains('\n'));
    }
}
