//! Spreadsheet boundary: raw xlsx/xls bytes to a rectangular string table.
//!
//! The pipeline core only consumes the header/row shape produced here; all
//! typing happens later in the schema canonicalizer.

use crate::error::{PipelineError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use polars::prelude::*;
use std::io::Cursor;
use tracing::info;

/// Render one cell to its string form. Whole floats lose the trailing `.0`
/// so numeric article codes keep their spreadsheet appearance.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
        Data::Empty => String::new(),
    }
}

/// Assemble a string DataFrame from decoded headers and rows. Columns with an
/// empty header are dropped (pandas' `Unnamed:` columns), duplicate headers
/// get a positional suffix, and all-empty rows are skipped.
fn build_dataframe(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<DataFrame> {
    let mut kept: Vec<(usize, String)> = Vec::new();
    for (idx, header) in headers.into_iter().enumerate() {
        if header.is_empty() {
            continue;
        }
        let name = if kept.iter().any(|(_, n)| *n == header) {
            format!("{header}_{idx}")
        } else {
            header
        };
        kept.push((idx, name));
    }

    if kept.is_empty() {
        return Err(PipelineError::Spreadsheet(
            "no named columns in header row".to_string(),
        ));
    }

    let mut columns: Vec<Vec<String>> = vec![Vec::new(); kept.len()];
    for row in &rows {
        let cells: Vec<&str> = kept
            .iter()
            .map(|(idx, _)| row.get(*idx).map(String::as_str).unwrap_or(""))
            .collect();
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        for (slot, cell) in columns.iter_mut().zip(cells) {
            slot.push(cell.to_string());
        }
    }

    let series: Vec<Column> = kept
        .iter()
        .zip(columns)
        .map(|((_, name), values)| Series::new(name.as_str().into(), values).into())
        .collect();

    Ok(DataFrame::new(series)?)
}

/// Decode the first sheet of an xlsx/xls byte stream into a string table.
pub fn read_table(bytes: &[u8]) -> Result<DataFrame> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| PipelineError::Spreadsheet(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| PipelineError::Spreadsheet("workbook has no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| PipelineError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| PipelineError::Spreadsheet("sheet has no header row".to_string()))?;

    let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();
    let data_rows: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    let df = build_dataframe(headers, data_rows)?;
    info!(
        "Decoded sheet '{}': {} rows, {} columns",
        sheet_name,
        df.height(),
        df.width()
    );
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_rendering() {
        assert_eq!(cell_to_string(&Data::String("  B145 ".to_string())), "B145");
        assert_eq!(cell_to_string(&Data::Float(1234567.0)), "1234567");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&Data::Int(-3)), "-3");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn test_build_dataframe_drops_unnamed_and_empty_rows() {
        let headers = vec![
            "Cliente".to_string(),
            "".to_string(),
            "Unidades".to_string(),
        ];
        let rows = vec![
            vec!["100".to_string(), "x".to_string(), "3".to_string()],
            vec!["".to_string(), "".to_string(), "".to_string()],
            vec!["200".to_string()],
        ];

        let df = build_dataframe(headers, rows).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 2);

        let qty = df.column("Unidades").unwrap().str().unwrap();
        assert_eq!(qty.get(0), Some("3"));
        assert_eq!(qty.get(1), Some(""));
    }

    #[test]
    fn test_build_dataframe_deduplicates_headers() {
        let headers = vec!["Total".to_string(), "Total".to_string()];
        let rows = vec![vec!["1".to_string(), "2".to_string()]];

        let df = build_dataframe(headers, rows).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["Total", "Total_1"]);
    }

    #[test]
    fn test_build_dataframe_requires_named_columns() {
        let headers = vec!["".to_string()];
        assert!(matches!(
            build_dataframe(headers, vec![]),
            Err(PipelineError::Spreadsheet(_))
        ));
    }

    #[test]
    fn test_read_table_rejects_garbage_bytes() {
        assert!(matches!(
            read_table(b"definitely not a spreadsheet"),
            Err(PipelineError::Spreadsheet(_))
        ));
    }
}
