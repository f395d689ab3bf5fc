//! Minimal CSV reading for legacy migration sources
//!
//! Legacy exports are small, hand-edited spreadsheet dumps: quoted fields,
//! embedded commas, CRLF line endings and a leading BOM all occur in the
//! wild. This reader handles exactly that envelope; it is not a general
//! CSV implementation and does not try to be.

/// A parsed CSV table: trimmed header row plus data rows.
///
/// Rows shorter than the header are padded with empty cells so column
/// indexing is always safe.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Parse CSV text into a table. Returns `None` when there is no header
    /// row at all.
    pub fn parse(text: &str) -> Option<CsvTable> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut records = parse_records(text).into_iter();

        let headers: Vec<String> = records
            .next()?
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.iter().all(String::is_empty) {
            return None;
        }

        let width = headers.len();
        let rows = records
            .filter(|cells| cells.iter().any(|c| !c.trim().is_empty()))
            .map(|mut cells| {
                cells.resize(width, String::new());
                cells.truncate(width);
                cells.into_iter().map(|c| c.trim().to_string()).collect()
            })
            .collect();

        Some(CsvTable { headers, rows })
    }

    /// Index of the first header matching any alias, case-insensitively.
    pub fn column(&self, aliases: &[&str]) -> Option<usize> {
        self.headers.iter().position(|h| {
            aliases.iter().any(|a| h.eq_ignore_ascii_case(a))
        })
    }

    /// Whether any data row has a non-empty cell.
    pub fn has_data(&self) -> bool {
        !self.rows.is_empty()
    }
}

/// Split CSV text into records, honoring quoted fields.
///
/// A quote inside a quoted field is escaped by doubling (`""`). Newlines
/// inside quoted fields are preserved.
fn parse_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => {
                record.push(std::mem::take(&mut field));
            }
            '\r' if !in_quotes => {} // CRLF: the \n closes the record
            '\n' if !in_quotes => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}
