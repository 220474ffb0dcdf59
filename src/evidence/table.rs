//! Tolerant HTML table scanning.
//!
//! Retrieved snippets are machine-converted HTML with no guarantee of
//! well-formedness: unclosed cells, stray attributes, mixed case. A full DOM
//! parser buys nothing here, so this is a linear scanner that only
//! understands `<table>`, `<tr>`, `<th>` and `<td>` boundaries and strips
//! everything else. Malformed markup degrades to fewer rows, never a panic.

use super::ParsedTable;

/// Parses the first `<table>` in `html`. Headers come from the first row's
/// `<th>` cells, falling back to its `<td>` cells. Rows with no non-empty
/// cell are dropped. Returns `None` when no table or no header row exists.
pub fn parse_table(html: &str) -> Option<ParsedTable> {
    let table_start = find_tag(html, "table", 0)?;
    let body_start = html[table_start..].find('>')? + table_start + 1;
    let body_end = find_tag(html, "/table", body_start)
        .unwrap_or(html.len())
        .min(html.len());
    let body = &html[body_start..body_end];

    let mut table = ParsedTable::default();
    for row_html in row_segments(body) {
        let mut cells = cell_texts(row_html, "th");
        let from_th = !cells.is_empty();
        if cells.is_empty() {
            cells = cell_texts(row_html, "td");
        }
        if cells.is_empty() {
            continue;
        }
        if table.headers.is_empty() {
            table.headers = cells;
        } else if !from_th && cells.iter().any(|c| !c.is_empty()) {
            table.rows.push(cells);
        }
    }

    (!table.headers.is_empty()).then_some(table)
}

/// Case-insensitive search for `<{tag}` at a tag-name boundary.
fn find_tag(html: &str, tag: &str, from: usize) -> Option<usize> {
    let lower = html.to_lowercase();
    let needle = format!("<{tag}");
    let mut at = from;
    while let Some(rel) = lower[at..].find(&needle) {
        let pos = at + rel;
        let after = lower.as_bytes().get(pos + needle.len());
        match after {
            Some(b'>') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') | Some(b'/')
            | None => return Some(pos),
            _ => at = pos + needle.len(),
        }
    }
    None
}

/// Splits the table body into the content of each `<tr>…</tr>` (or up to the
/// next `<tr>` when the closing tag is missing).
fn row_segments(body: &str) -> Vec<&str> {
    let mut rows = Vec::new();
    let mut at = 0;
    while let Some(open) = find_tag(body, "tr", at) {
        let Some(content_rel) = body[open..].find('>') else {
            break;
        };
        let content_start = open + content_rel + 1;
        let close = find_tag(body, "/tr", content_start);
        let next_open = find_tag(body, "tr", content_start);
        let end = match (close, next_open) {
            (Some(c), Some(n)) => c.min(n),
            (Some(c), None) => c,
            (None, Some(n)) => n,
            (None, None) => body.len(),
        };
        rows.push(&body[content_start..end]);
        at = end.max(content_start);
        if at >= body.len() {
            break;
        }
    }
    rows
}

/// Extracts the text of every `<{tag}>` cell inside one row.
fn cell_texts(row: &str, tag: &str) -> Vec<String> {
    let close = format!("/{tag}");
    let mut cells = Vec::new();
    let mut at = 0;
    while let Some(open) = find_tag(row, tag, at) {
        let Some(content_rel) = row[open..].find('>') else {
            break;
        };
        let content_start = open + content_rel + 1;
        let close_pos = find_tag(row, &close, content_start);
        let next_open = find_tag(row, tag, content_start);
        let end = match (close_pos, next_open) {
            (Some(c), Some(n)) => c.min(n),
            (Some(c), None) => c,
            (None, Some(n)) => n,
            (None, None) => row.len(),
        };
        cells.push(clean_text(&row[content_start..end]));
        at = end.max(content_start);
        if at >= row.len() {
            break;
        }
    }
    cells
}

/// Strips nested tags, decodes the common entities, collapses whitespace.
fn clean_text(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for c in fragment.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    let decoded = out
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
