//! Delimited text to row records.
//!
//! The parser is lenient: short rows are padded with `None`,
//! surplus cells are dropped, and nothing in the text itself can make it
//! fail. Only reading the bytes can fail.

use crate::error::{IntakeError, Result};
use crate::header::split_cells;
use crate::models::{FileSource, RowRecord};
use tracing::debug;

/// Parse raw CSV text into rows keyed by the header line
///
/// Blank lines are discarded. The first remaining line is the header.
/// Fewer than two remaining lines yield no rows. Empty cells, like cells
/// missing from a short row, are stored as `None`.
pub fn parse_rows(raw: &str) -> Vec<RowRecord> {
    let mut lines = raw.lines().filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers = split_cells(header_line);

    let rows: Vec<RowRecord> = lines
        .map(|line| {
            let mut cells = split_cells(line).into_iter();
            let mut record = RowRecord::with_capacity(headers.len());
            for header in &headers {
                let value = cells.next().filter(|cell| !cell.is_empty());
                record.insert(header.clone(), value);
            }
            record
        })
        .collect();

    debug!(
        "Parsed {} rows across {} columns",
        rows.len(),
        headers.len()
    );
    rows
}

/// Read a file's bytes as UTF-8 text
pub async fn read_text(name: &str, source: &FileSource) -> Result<String> {
    let bytes = match source {
        FileSource::Path(path) => tokio::fs::read(path).await?,
        FileSource::Memory(bytes) => bytes.to_vec(),
    };

    let text = String::from_utf8(bytes).map_err(|e| IntakeError::UnreadableContent {
        name: name.to_string(),
        reason: e.to_string(),
    })?;

    // spreadsheet exports often lead with a byte-order mark
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn cell<'a>(row: &'a RowRecord, key: &str) -> Option<&'a str> {
        row.get(key).and_then(|value| value.as_deref())
    }

    #[test]
    fn test_parse_basic_rows() {
        let rows = parse_rows("a,b,c\n1,2,3\n4,5,6\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(cell(&rows[0], "a"), Some("1"));
        assert_eq!(cell(&rows[1], "c"), Some("6"));
        let keys: Vec<_> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_header_only_or_empty_yields_no_rows() {
        assert!(parse_rows("").is_empty());
        assert!(parse_rows("a,b,c").is_empty());
        assert!(parse_rows("\n\na,b,c\n   \n").is_empty());
    }

    #[test]
    fn test_blank_lines_and_crlf_are_ignored() {
        let rows = parse_rows("\r\na, b\r\n\r\n 1 , 2 \r\n   \r\n3,4\r\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(cell(&rows[0], "b"), Some("2"));
        assert_eq!(cell(&rows[1], "a"), Some("3"));
    }

    #[test]
    fn test_short_rows_pad_with_none() {
        let rows = parse_rows("a,b,c\n1\n");
        assert_eq!(rows[0].len(), 3);
        assert_eq!(cell(&rows[0], "a"), Some("1"));
        assert_eq!(rows[0].get("b"), Some(&None));
        assert_eq!(rows[0].get("c"), Some(&None));
    }

    #[test]
    fn test_long_rows_drop_extra_cells() {
        let rows = parse_rows("a,b\n1,2,3,4\n");
        assert_eq!(rows[0].len(), 2);
        assert_eq!(cell(&rows[0], "b"), Some("2"));
    }

    #[test]
    fn test_empty_cells_become_none() {
        let rows = parse_rows("a,b,c\n1,,3\n");
        assert_eq!(rows[0].get("b"), Some(&None));
        assert_eq!(cell(&rows[0], "c"), Some("3"));
    }

    #[test]
    fn test_no_quote_handling() {
        let rows = parse_rows("name,value\n\"Kepler, b\",7\n");
        assert_eq!(cell(&rows[0], "name"), Some("\"Kepler"));
        assert_eq!(cell(&rows[0], "value"), Some("b\""));
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let raw = "pl_rade,st_teff\n1.1,5700\n2.2\n";
        assert_eq!(parse_rows(raw), parse_rows(raw));
    }

    #[tokio::test]
    async fn test_read_text_from_path_and_memory() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "a,b\n1,2\n").unwrap();

        let from_disk = read_text("a.csv", &FileSource::Path(temp_file.path().to_path_buf()))
            .await
            .unwrap();
        assert_eq!(from_disk, "a,b\n1,2\n");

        let from_memory = read_text("b.csv", &FileSource::Memory(Arc::from(&b"x,y"[..])))
            .await
            .unwrap();
        assert_eq!(from_memory, "x,y");
    }

    #[tokio::test]
    async fn test_read_text_strips_byte_order_mark() {
        let bytes = "\u{feff}pl_orbper,st_teff\n3.5,5800\n".as_bytes();
        let text = read_text("excel.csv", &FileSource::Memory(Arc::from(bytes)))
            .await
            .unwrap();
        assert!(text.starts_with("pl_orbper"));

        let rows = parse_rows(&text);
        assert_eq!(cell(&rows[0], "pl_orbper"), Some("3.5"));
    }

    #[tokio::test]
    async fn test_read_text_failures() {
        let missing = read_text("gone.csv", &FileSource::Path(PathBuf::from("/nonexistent/gone.csv")))
            .await;
        assert!(matches!(missing, Err(IntakeError::Io(_))));

        let binary = read_text("bin.csv", &FileSource::Memory(Arc::from(&[0xff, 0xfe, 0x00][..])))
            .await;
        match binary {
            Err(IntakeError::UnreadableContent { name, .. }) => assert_eq!(name, "bin.csv"),
            other => panic!("Expected UnreadableContent, got {:?}", other),
        }
    }
}
