//! Plain aligned tables for terminal output.

/// Rendering options resolved from UI preferences.
#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

/// A row type with a fixed column layout.
pub trait TableRow {
    /// Column headers, in display order.
    fn headers() -> &'static [&'static str];

    /// One cell per header.
    fn cells(&self) -> Vec<String>;
}

const MIN_COLUMN: usize = 4;
const GAP: &str = "  ";

/// Render rows under `headers`, shrinking the widest columns to fit.
#[must_use]
pub fn render(headers: &[&str], rows: &[Vec<String>], options: TableOptions) -> String {
    if rows.is_empty() {
        return String::from("(no rows)");
    }

    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    shrink_to_fit(&mut widths, headers, options.max_width);

    let mut lines = Vec::with_capacity(rows.len() + 2);
    let header_line = join_cells(headers.iter().map(|h| (*h).to_string()), &widths, false);
    lines.push("-".repeat(header_line.chars().count()));
    lines.insert(0, header_line);
    for row in rows {
        lines.push(join_cells(row.iter().cloned(), &widths, options.color));
    }
    lines.join("\n")
}

/// Render typed rows.
#[must_use]
pub fn render_rows<T: TableRow>(rows: &[T], options: TableOptions) -> String {
    let cells: Vec<Vec<String>> = rows.iter().map(TableRow::cells).collect();
    render(T::headers(), &cells, options)
}

fn join_cells(cells: impl Iterator<Item = String>, widths: &[usize], color: bool) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| {
            let text = truncate(&cell, *width);
            let pad = " ".repeat(width.saturating_sub(text.chars().count()));
            let numeric = is_numeric(&text);
            let shown = if color { colorize(&text) } else { text };
            if numeric {
                format!("{pad}{shown}")
            } else {
                format!("{shown}{pad}")
            }
        })
        .collect::<Vec<_>>()
        .join(GAP)
        .trim_end()
        .to_string()
}

fn shrink_to_fit(widths: &mut [usize], headers: &[&str], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };
    let gaps = widths.len().saturating_sub(1) * GAP.len();
    while widths.iter().sum::<usize>() + gaps > max_width {
        let widest = widths
            .iter()
            .enumerate()
            .filter(|(index, width)| **width > headers[*index].len().max(MIN_COLUMN))
            .max_by_key(|(_, width)| **width)
            .map(|(index, _)| index);
        let Some(index) = widest else {
            break;
        };
        widths[index] -= 1;
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|ch| ch.is_ascii_digit())
}

fn colorize(value: &str) -> String {
    let code = match value {
        "passed" | "completed" | "success" => "32",
        "warning" | "timed_out" | "cancelled" | "pending" | "running" => "33",
        "failure" | "failed" | "errored" => "31",
        "info" => "36",
        _ => return value.to_string(),
    };
    format!("\u{1b}[{code}m{value}\u{1b}[0m")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: TableOptions = TableOptions {
        max_width: None,
        color: false,
    };

    #[test]
    fn columns_align_and_numbers_right_justify() {
        let rows = vec![
            vec!["net.CablingReport".to_string(), "failed".to_string(), "1".to_string()],
            vec!["net.PowerReport".to_string(), "passed".to_string(), "12".to_string()],
        ];
        let table = render(&["unit", "outcome", "failure"], &rows, PLAIN);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("unit"));
        assert!(lines[1].chars().all(|c| c == '-'));
        assert!(lines[2].ends_with("      1"));
        assert!(lines[3].ends_with("     12"));
    }

    #[test]
    fn narrow_terminal_truncates_widest_column() {
        let rows = vec![vec!["a".repeat(60), "passed".to_string()]];
        let options = TableOptions {
            max_width: Some(40),
            color: false,
        };
        let table = render(&["unit", "outcome"], &rows, options);
        let row = table.lines().nth(2).unwrap();
        assert!(row.chars().count() <= 40);
        assert!(row.contains('…'));
    }

    #[test]
    fn empty_table_says_so() {
        assert_eq!(render(&["unit"], &[], PLAIN), "(no rows)");
    }

    #[test]
    fn color_wraps_known_statuses_only() {
        assert_eq!(colorize("errored"), "\u{1b}[31merrored\u{1b}[0m");
        assert_eq!(colorize("net.CablingReport"), "net.CablingReport");
    }
}
