//! Output formatting: table or JSON.
//!
//! Table uses `tabled`, structured formats use serde.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use flowboard_core::{Notification, NotificationKind};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// One notification as a single human-readable line.
pub fn notification_line(n: &Notification, color: bool) -> String {
    let (marker, ok) = match n.kind {
        NotificationKind::Success => ("✓", true),
        NotificationKind::Failure => ("✗", false),
    };
    if !color {
        return format!("{marker} {}", n.message);
    }
    if ok {
        format!("{} {}", marker.green(), n.message)
    } else {
        format!("{} {}", marker.red(), n.message.red())
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render rows as a table, or the data itself as JSON.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &T,
    rows: impl FnOnce() -> Vec<R>,
) -> Result<String, CliError>
where
    T: serde::Serialize + ?Sized,
    R: Tabled,
{
    match format {
        OutputFormat::Table => Ok(render_table(&rows())),
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

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let out = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(out)
}
