//! Generic HTML table extraction.
//!
//! Turns markup into header + row text grids. Nothing here knows about game
//! logs; selection and cleaning live in `game_log`.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

/// Largest colspan honoured; browsers clamp to the same bound.
const MAX_COLSPAN: usize = 1000;

/// A table as plain text: one header row and zero or more body rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Column names. Unnamed columns are empty strings; repeated names get
    /// `.1`, `.2`, ... suffixes in encounter order.
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Index of the first header matching any of `names`, tried in order.
    pub fn column(&self, names: &[&str]) -> Option<usize> {
        names
            .iter()
            .find_map(|name| self.headers.iter().position(|h| h == name))
    }
}

/// Remove `<!--` and `-->` markers so commented-out markup becomes live.
pub fn strip_comment_markers(markup: &str) -> String {
    markup.replace("<!--", "").replace("-->", "")
}

/// Parse every `<table>` in the document, in document order.
pub fn parse_tables(markup: &str) -> Vec<RawTable> {
    let (Ok(table_sel), Ok(head_sel), Ok(body_sel), Ok(cell_sel)) = (
        Selector::parse("table"),
        Selector::parse("thead tr"),
        Selector::parse("tbody tr"),
        Selector::parse("th, td"),
    ) else {
        return Vec::new();
    };

    let document = Html::parse_document(markup);
    document
        .select(&table_sel)
        .map(|table| {
            let header_rows: Vec<Vec<String>> = table
                .select(&head_sel)
                .map(|tr| row_cells(&tr, &cell_sel))
                .collect();
            let mut body: Vec<ElementRef> = table.select(&body_sel).collect();

            // PFR-style tables use several header rows (over-headers first);
            // the last one names the columns.
            let header = match header_rows.into_iter().last() {
                Some(h) => h,
                None if body.first().is_some_and(|tr| is_header_row(tr, &cell_sel)) => {
                    let first = body.remove(0);
                    row_cells(&first, &cell_sel)
                }
                None => Vec::new(),
            };

            RawTable {
                headers: dedup_headers(header),
                rows: body.iter().map(|tr| row_cells(tr, &cell_sel)).collect(),
            }
        })
        .collect()
}

fn row_cells(tr: &ElementRef, cell_sel: &Selector) -> Vec<String> {
    let mut cells = Vec::new();
    for cell in tr.select(cell_sel) {
        cells.push(cell_text(&cell));
        let span = cell
            .value()
            .attr("colspan")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .clamp(1, MAX_COLSPAN);
        cells.extend(std::iter::repeat(String::new()).take(span.saturating_sub(1)));
    }
    cells
}

fn is_header_row(tr: &ElementRef, cell_sel: &Selector) -> bool {
    let mut cells = tr.select(cell_sel).peekable();
    cells.peek().is_some() && cells.all(|c| c.value().name() == "th")
}

/// Cell text with inner whitespace collapsed.
fn cell_text(cell: &ElementRef) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn dedup_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|h| {
            if h.is_empty() {
                return h;
            }
            let count = seen.entry(h.clone()).or_insert(0);
            let name = if *count == 0 {
                h
            } else {
                format!("{}.{}", h, count)
            };
            *count += 1;
            name
        })
        .collect()
}
