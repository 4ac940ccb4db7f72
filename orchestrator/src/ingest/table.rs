use csv::{ReaderBuilder, Trim};
use log::info;

use crate::{IngestErr, Result};

/// Cell values that count as missing.
const MISSING: [&str; 13] = [
    "", "NA", "N/A", "n/a", "#N/A", "NaN", "nan", "-nan", "-NaN", "null", "NULL", "None", "<NA>",
];

/// A parsed table: trimmed header names and raw cells, one `Vec` per row.
#[derive(Debug, Clone)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Parses an uploaded delimited text table.
    ///
    /// The delimiter is `;` if the first line contains one, `,` otherwise.
    /// Rows shorter than the header are padded with missing cells.
    ///
    /// # Arguments
    /// * `raw` - The uploaded bytes, UTF-8 encoded.
    ///
    /// # Errors
    /// Returns `IngestErr::Parse` if the bytes aren't UTF-8, if there is no
    /// header or no data row, or if a row is longer than the header.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(raw)
            .map_err(|e| IngestErr::Parse(format!("file is not valid UTF-8: {e}")))?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let first_line = text.lines().next().unwrap_or_default();
        let delimiter = if first_line.contains(';') { b';' } else { b',' };

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let columns: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
        if columns.iter().all(String::is_empty) {
            return Err(IngestErr::Parse("table has no header".into()));
        }

        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() > columns.len() {
                return Err(IngestErr::Parse(format!(
                    "row {} has {} fields, expected {}",
                    line + 1,
                    record.len(),
                    columns.len()
                )));
            }

            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(columns.len(), String::new());
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(IngestErr::Parse("table has no rows".into()));
        }

        info!(
            rows = rows.len(),
            separator = delimiter as char;
            "received table with columns {columns:?}"
        );

        Ok(Self { columns, rows })
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Reads a column as numbers.
    ///
    /// # Returns
    /// The column with missing or non-finite cells as `None`, or `None` if
    /// some present cell isn't a number.
    pub fn numeric_column(&self, idx: usize) -> Option<Vec<Option<f64>>> {
        self.rows
            .iter()
            .map(|row| {
                let cell = row[idx].as_str();
                if is_missing(cell) {
                    return Some(None);
                }
                match cell.parse::<f64>() {
                    Ok(v) if v.is_finite() => Some(Some(v)),
                    Ok(_) => Some(None),
                    Err(_) => None,
                }
            })
            .collect()
    }

    /// Reads a column as text, missing cells replaced by `nan`.
    pub fn text_column(&self, idx: usize) -> Vec<&str> {
        self.rows
            .iter()
            .map(|row| {
                let cell = row[idx].as_str();
                if is_missing(cell) { "nan" } else { cell }
            })
            .collect()
    }
}

fn is_missing(cell: &str) -> bool {
    MISSING.contains(&cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_semicolon_and_trims_headers() {
        let table = Table::parse(b" a ; b;label \n1;2;x\n3;4;y\n").unwrap();

        assert_eq!(table.columns, ["a", "b", "label"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], ["3", "4", "y"]);
    }

    #[test]
    fn commas_inside_a_semicolon_table_stay_in_the_cell() {
        let table = Table::parse(b"a;b\n1,5;2\n").unwrap();
        assert_eq!(table.rows[0], ["1,5", "2"]);
    }

    #[test]
    fn short_rows_are_padded_with_missing_cells() {
        let table = Table::parse(b"a,b,c\n1,2\n").unwrap();
        assert_eq!(table.numeric_column(2).unwrap(), [None]);
    }

    #[test]
    fn numeric_columns_tolerate_missing_markers() {
        let table = Table::parse(b"a,b\n1.5,x\nNA,\n,y\n").unwrap();

        assert_eq!(table.numeric_column(0).unwrap(), [Some(1.5), None, None]);
        assert!(table.numeric_column(1).is_none());
        assert_eq!(table.text_column(1), ["x", "nan", "y"]);
    }

    #[test]
    fn non_finite_numbers_count_as_missing() {
        let table = Table::parse(b"a,b,c,label\ninf,NAN,#N/A,x\n1,-infinity,-nan,y\n").unwrap();

        assert_eq!(table.numeric_column(0).unwrap(), [None, Some(1.0)]);
        assert_eq!(table.numeric_column(1).unwrap(), [None, None]);
        assert_eq!(table.numeric_column(2).unwrap(), [None, None]);
    }

    #[test]
    fn rejects_unusable_uploads() {
        assert!(matches!(Table::parse(&[0xff, 0xfe, 0x00]), Err(IngestErr::Parse(_))));
        assert!(matches!(Table::parse(b""), Err(IngestErr::Parse(_))));
        assert!(matches!(Table::parse(b"a,b\n"), Err(IngestErr::Parse(_))));
        assert!(matches!(Table::parse(b"a,b\n1,2,3\n"), Err(IngestErr::Parse(_))));
    }
}
