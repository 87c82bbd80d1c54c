//! Triple-file ingestion.
//!
//! Input is a text file with one `row,col,value` triple per line, all
//! integers, 1-indexed. Order is irrelevant downstream. Fully blank lines
//! are skipped; anything else must parse as exactly three integers.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::types::{Cell, MatrixTag};

/// Reads one matrix from `path`, tagging every cell with `tag`.
///
/// Fails with [`CoreError::MissingFile`] if the file cannot be opened and
/// [`CoreError::MalformedInput`] on the first line that does not parse.
pub fn read_matrix(path: &Path, tag: MatrixTag) -> CoreResult<Vec<Cell>> {
    let path_str = path.display().to_string();
    let file = File::open(path).map_err(|source| CoreError::MissingFile {
        path: path_str.clone(),
        source,
    })?;

    let mut cells = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| CoreError::ReadFailed {
            path: path_str.clone(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let (row, col, value) = parse_triple(&line).ok_or_else(|| CoreError::MalformedInput {
            path: path_str.clone(),
            line_number: index + 1,
            line: line.clone(),
        })?;
        cells.push(Cell::new(tag, row, col, value));
    }

    debug!(path = %path_str, matrix = %tag, cells = cells.len(), "ingested matrix");
    Ok(cells)
}

/// Parses `row,col,value`. Indices must be positive; the value may be any
/// `i64`. Returns `None` on any deviation.
fn parse_triple(line: &str) -> Option<(u32, u32, i64)> {
    let mut fields = line.split(',');
    let row: u32 = fields.next()?.trim().parse().ok()?;
    let col: u32 = fields.next()?.trim().parse().ok()?;
    let value: i64 = fields.next()?.trim().parse().ok()?;
    if fields.next().is_some() || row == 0 || col == 0 {
        return None;
    }
    Some((row, col, value))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_triples_with_negative_values() {
        let file = write_temp("1,1,1\n1,4,-2\n2,3,-3\n");
        let cells = read_matrix(file.path(), MatrixTag::A).unwrap();
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[1], Cell::new(MatrixTag::A, 1, 4, -2));
    }

    #[test]
    fn tolerates_field_whitespace_and_blank_lines() {
        let file = write_temp(" 1 , 2 , 30 \n\n2,1,4\n");
        let cells = read_matrix(file.path(), MatrixTag::B).unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0], Cell::new(MatrixTag::B, 1, 2, 30));
    }

    #[test]
    fn rejects_non_numeric_field() {
        let file = write_temp("1,1,1\n1,x,3\n");
        let err = read_matrix(file.path(), MatrixTag::A).unwrap_err();
        match err {
            CoreError::MalformedInput { line_number, line, .. } => {
                assert_eq!(line_number, 2);
                assert_eq!(line, "1,x,3");
            }
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }

    #[test]
    fn rejects_wrong_arity() {
        for bad in ["1,1", "1,1,1,1", "7"] {
            let file = write_temp(bad);
            assert!(
                matches!(
                    read_matrix(file.path(), MatrixTag::A),
                    Err(CoreError::MalformedInput { .. })
                ),
                "line '{bad}' should be rejected"
            );
        }
    }

    #[test]
    fn rejects_zero_index() {
        let file = write_temp("0,1,5\n");
        assert!(matches!(
            read_matrix(file.path(), MatrixTag::A),
            Err(CoreError::MalformedInput { .. })
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = read_matrix(Path::new("/nonexistent/matrix.csv"), MatrixTag::A).unwrap_err();
        assert!(matches!(err, CoreError::MissingFile { .. }));
    }

    #[test]
    fn empty_file_is_an_empty_matrix() {
        let file = write_temp("");
        assert!(read_matrix(file.path(), MatrixTag::A).unwrap().is_empty());
    }
}
