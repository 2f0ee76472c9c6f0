//! Table detection over extracted page text.
//!
//! pdfium exposes a text layer but no table structure, so tables are
//! recovered from the text itself. A line is a table row when its cells are
//! separated by a tab or by a run of two or more spaces and it has at least
//! two non-empty cells. A whitespace run mixing tabs and spaces is a single
//! separator. Two or more consecutive rows with the same cell count form a
//! table. Tables never span pages.
//!
//! The pipeline does not process tables as records. Each table is reduced
//! to a one-line description that gets appended to the document's last
//! paragraph, and can optionally be exported as CSV for inspection.

use crate::error::DigestError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A whitespace run containing a tab, or two or more spaces.
static RE_CELL_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]*\t[ \t]*| {2,}").unwrap());

/// Minimum consecutive rows for a run of lines to count as a table.
const MIN_TABLE_ROWS: usize = 2;

/// A table recovered from one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedTable {
    /// 1-indexed page the table was found on.
    pub page: usize,
    /// Cell grid; the first row is treated as the header.
    pub rows: Vec<Vec<String>>,
}

impl DetectedTable {
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }
}

/// Detect tables in every page, in document order.
pub fn detect_tables(pages: &[String]) -> Vec<DetectedTable> {
    let mut tables = Vec::new();
    for (idx, text) in pages.iter().enumerate() {
        let page = idx + 1;
        let mut run: Vec<Vec<String>> = Vec::new();

        for line in text.lines() {
            match split_row(line) {
                Some(cells) if run.is_empty() || run[0].len() == cells.len() => run.push(cells),
                Some(cells) => {
                    flush_run(&mut tables, page, std::mem::take(&mut run));
                    run.push(cells);
                }
                None => flush_run(&mut tables, page, std::mem::take(&mut run)),
            }
        }
        flush_run(&mut tables, page, run);
    }

    info!("Table detection complete: {} tables", tables.len());
    tables
}

fn flush_run(tables: &mut Vec<DetectedTable>, page: usize, run: Vec<Vec<String>>) {
    if run.len() >= MIN_TABLE_ROWS {
        debug!(
            "Page {}: table with {} rows × {} columns",
            page,
            run.len(),
            run[0].len()
        );
        tables.push(DetectedTable { page, rows: run });
    }
}

fn split_row(line: &str) -> Option<Vec<String>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cells: Vec<String> = RE_CELL_SEPARATOR
        .split(trimmed)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    (cells.len() >= 2).then_some(cells)
}

/// One description line per table, numbered from 0.
///
/// `"Table {n}: contains columns ['A', 'B']"`, or
/// `"Table {n}: empty or no header"` when there is nothing to name.
pub fn describe_tables(tables: &[DetectedTable]) -> Vec<String> {
    tables
        .iter()
        .enumerate()
        .map(|(n, table)| match table.header() {
            Some(header) if header.iter().any(|c| !c.trim().is_empty()) => {
                format!("Table {n}: contains columns {}", format_header(header))
            }
            _ => format!("Table {n}: empty or no header"),
        })
        .collect()
}

/// Render header cells as a bracketed list of quoted strings: `['A', 'B']`.
pub fn format_header(cells: &[String]) -> String {
    let quoted: Vec<String> = cells.iter().map(|c| quote_cell(c)).collect();
    format!("[{}]", quoted.join(", "))
}

fn quote_cell(cell: &str) -> String {
    if cell.contains('\'') && !cell.contains('"') {
        format!("\"{}\"", cell.replace('\\', "\\\\"))
    } else {
        format!(
            "'{}'",
            cell.replace('\\', "\\\\").replace('\'', "\\'")
        )
    }
}

/// Write each table to `table_{n}.csv` inside `dir`.
pub async fn export_csv(tables: &[DetectedTable], dir: &Path) -> Result<Vec<PathBuf>, DigestError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DigestError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

    let mut written = Vec::with_capacity(tables.len());
    for (n, table) in tables.iter().enumerate() {
        let path = dir.join(format!("table_{n}.csv"));
        tokio::fs::write(&path, to_csv(&table.rows))
            .await
            .map_err(|e| DigestError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;
        info!("Table saved as CSV: {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// RFC 4180 rendering with CRLF row terminators.
fn to_csv(rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in rows {
        let fields: Vec<String> = row.iter().map(|f| csv_field(f)).collect();
        out.push_str(&fields.join(","));
        out.push_str("\r\n");
    }
    out
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
