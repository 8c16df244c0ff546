use std::collections::HashMap;
use tracing::debug;

/// One data row keyed by trimmed header name.
pub type RawRow = HashMap<String, String>;

/// Parse CSV text into string-keyed rows.
///
/// The first non-empty line is the header; every later line becomes a row
/// mapping header name to trimmed field value. Quoting follows RFC 4180:
/// fields may be double-quoted, `""` inside quotes decodes to a literal
/// quote, and commas or newlines inside quotes do not split. Rows shorter
/// than the header are padded with empty strings; extra trailing fields are
/// dropped. A header-only or empty input yields no rows rather than an
/// error, so a malformed file is indistinguishable from an empty sheet.
pub fn parse(text: &str) -> Vec<RawRow> {
    let lines = split_records(text);
    let mut rows = Vec::new();

    let Some((header_line, data_lines)) = lines.split_first() else {
        return rows;
    };

    let headers: Vec<String> =
        split_fields(header_line).into_iter().map(|h| h.trim().to_string()).collect();

    for line in data_lines {
        let fields = split_fields(line);
        let mut row = RawRow::with_capacity(headers.len());
        for (idx, header) in headers.iter().enumerate() {
            let value = fields.get(idx).map(|f| f.trim()).unwrap_or_default();
            row.insert(header.clone(), value.to_string());
        }
        rows.push(row);
    }

    debug!("parsed {} data rows under {} headers", rows.len(), headers.len());
    rows
}

/// Split the input into logical records: carriage returns are stripped, a
/// newline only terminates a record outside quotes, and empty records
/// (including a trailing blank line) are dropped.
fn split_records(text: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in text.chars() {
        match ch {
            '\r' => {}
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            '\n' if !in_quotes => {
                if !current.is_empty() {
                    records.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        records.push(current);
    }
    records
}

/// Split one record into raw field values, honoring quotes character by
/// character with doubled-quote lookahead only.
fn split_fields(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                out.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }

    out.push(current);
    out
}
