//! CSV table parsing.
//!
//! Two shapes come out of here:
//!
//! - [`Grid`]: header-less rows of cells. Row 0 is *not* special to the parser;
//!   consumers decide what it means.
//! - [`RecordTable`]: the first non-blank line names the columns and every later
//!   row is read positionally against it.
//!
//! Parsing never fails. Blank lines (including lines whose cells are all
//! empty) are skipped, invalid UTF-8 is decoded lossily and quoting oddities
//! produce whatever row the CSV reader recovers.

use std::collections::HashMap;

use csv::{ReaderBuilder, Trim};
use tracing::debug;

/// Header-less table: ordered rows of trimmed cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    pub rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Header-driven table.
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    headers: Vec<String>,
    header_map: HashMap<String, usize>,
    rows: Vec<SourceRow>,
}

#[derive(Debug, Clone)]
struct SourceRow {
    line: usize,
    cells: Vec<String>,
}

/// A borrowed view of one data row of a [`RecordTable`].
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    line: usize,
    cells: &'a [String],
    header_map: &'a HashMap<String, usize>,
}

impl RecordTable {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.header_map.contains_key(name)
    }

    /// Number of data rows (the header line is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(|row| Record {
            line: row.line,
            cells: &row.cells,
            header_map: &self.header_map,
        })
    }
}

impl<'a> Record<'a> {
    /// 1-based line of this row in the source text.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Cell for `column`, or `None` when the column does not exist or the row
    /// is too short to reach it. An empty cell is returned as `Some("")`.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = *self.header_map.get(column)?;
        self.cells.get(idx).map(String::as_str)
    }

    /// First present cell among several spellings of the same column.
    pub fn get_any(&self, columns: &[&str]) -> Option<&'a str> {
        columns.iter().find_map(|column| self.get(column))
    }
}

/// Parse comma-delimited text into a header-less grid.
pub fn parse_grid(text: &str) -> Grid {
    Grid {
        rows: read_rows(text).into_iter().map(|row| row.cells).collect(),
    }
}

/// Parse comma-delimited text into header-keyed records.
///
/// Duplicate header names resolve to their first occurrence. Cells beyond the
/// header width are ignored.
pub fn parse_records(text: &str) -> RecordTable {
    let mut rows = read_rows(text).into_iter();
    let Some(header_row) = rows.next() else {
        return RecordTable::default();
    };

    let headers = header_row.cells;
    let mut header_map = HashMap::with_capacity(headers.len());
    for (idx, name) in headers.iter().enumerate() {
        header_map.entry(name.clone()).or_insert(idx);
    }

    RecordTable {
        headers,
        header_map,
        rows: rows.collect(),
    }
}

fn read_rows(text: &str) -> Vec<SourceRow> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut out: Vec<SourceRow> = Vec::new();
    for (idx, result) in reader.byte_records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(record = idx + 1, error = %e, "skipping unreadable CSV record");
                continue;
            }
        };

        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 1);

        let mut cells: Vec<String> = record
            .iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect();

        if out.is_empty() {
            // Spreadsheet exports often prefix the first cell with a BOM.
            if let Some(first) = cells.first_mut() {
                if let Some(stripped) = first.strip_prefix('\u{feff}') {
                    *first = stripped.trim().to_string();
                }
            }
        }

        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }

        out.push(SourceRow { line, cells });
    }
    out
}
