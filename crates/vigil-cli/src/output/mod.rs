use serde::Serialize;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

pub use table::TableRow;

/// Render a serializable value in the requested format.
///
/// Values without a row layout are shown as pretty JSON under `table`.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json | OutputFormat::Table => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable value in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Render rows as a table, or as a JSON array for `json`/`raw`.
pub fn render_rows<T: Serialize + TableRow>(rows: &[T], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Table => Ok(table::render_rows(rows, table_options())),
        OutputFormat::Json | OutputFormat::Raw => render(&rows, format),
    }
}

/// Print rows in the requested format.
pub fn output_rows<T: Serialize + TableRow>(rows: &[T], format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render_rows(rows, format)?;
    println!("{rendered}");
    Ok(())
}

fn table_options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.width,
        color: prefs.color,
    }
}
