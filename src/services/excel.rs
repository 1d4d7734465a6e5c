use std::io::Cursor;

use anyhow::Context;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::Workbook;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const EXPORT_FILE_NAME: &str = "export.xlsx";
const EXPORT_SHEET_NAME: &str = "Export";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedSheet {
    pub headers: Vec<String>,
    pub data: Vec<Vec<String>>,
    pub file_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub data: Vec<Vec<Value>>,
}

/// Read the first worksheet of an uploaded workbook. The first row is the
/// header; every other non-blank row is cut or padded to the header width.
pub async fn import_workbook(bytes: Vec<u8>, file_name: String) -> AppResult<ImportedSheet> {
    let (headers, data) = tokio::task::spawn_blocking(move || read_first_sheet(bytes))
        .await
        .context("spreadsheet import task failed")??;

    Ok(ImportedSheet {
        headers,
        data,
        file_name,
    })
}

fn read_first_sheet(bytes: Vec<u8>) -> AppResult<(Vec<String>, Vec<Vec<String>>)> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| AppError::Validation(format!("import failed: {}", e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::Validation("import failed: workbook has no sheets".into()))?
        .map_err(|e| AppError::Validation(format!("import failed: {}", e)))?;

    let mut rows = range.rows();
    let mut headers: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(cell_text).collect(),
        None => return Ok((Vec::new(), Vec::new())),
    };
    // The used range may be wider than the header row.
    while headers.last().is_some_and(String::is_empty) {
        headers.pop();
    }

    let width = headers.len();
    let data = rows
        .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
        .map(|row| {
            (0..width)
                .map(|index| row.get(index).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();

    Ok((headers, data))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Build a single-sheet workbook with every cell written as text.
pub fn export_workbook(request: &ExportRequest) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(EXPORT_SHEET_NAME)
        .context("naming export sheet")?;

    for (col, header) in request.headers.iter().enumerate() {
        worksheet
            .write_string(0, column(col)?, header)
            .context("writing header cell")?;
    }

    for (index, row) in request.data.iter().enumerate() {
        let row_number = u32::try_from(index + 1)
            .map_err(|_| AppError::Validation("too many rows to export".into()))?;
        for (col, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_number, column(col)?, value_text(value))
                .context("writing data cell")?;
        }
    }

    Ok(workbook.save_to_buffer().context("serializing workbook")?)
}

fn column(index: usize) -> AppResult<u16> {
    u16::try_from(index).map_err(|_| AppError::Validation("too many columns to export".into()))
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn workbook_with(rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if !cell.is_empty() {
                    worksheet.write_string(r as u32, c as u16, *cell).unwrap();
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[tokio::test]
    async fn rows_are_fitted_to_header_width() {
        let bytes = workbook_with(&[
            &["name", "email", "role"],
            &["alice", "a@example.com", "admin", "extra"],
            &["bob"],
            &["", "", ""],
            &["carol", "", "editor"],
        ]);

        let sheet = import_workbook(bytes, "users.xlsx".into()).await.unwrap();

        assert_eq!(sheet.headers, vec!["name", "email", "role"]);
        assert_eq!(sheet.file_name, "users.xlsx");
        assert_eq!(sheet.data.len(), 3);
        assert_eq!(sheet.data[0], vec!["alice", "a@example.com", "admin"]);
        assert_eq!(sheet.data[1], vec!["bob", "", ""]);
        assert_eq!(sheet.data[2], vec!["carol", "", "editor"]);
    }

    #[tokio::test]
    async fn garbage_upload_is_a_validation_error() {
        let err = import_workbook(b"not a workbook".to_vec(), "x.xlsx".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn exported_cells_are_text_and_nulls_blank() {
        let request = ExportRequest {
            headers: vec!["id".into(), "name".into(), "note".into()],
            data: vec![vec![json!(1), json!("alice"), Value::Null], vec![json!(true)]],
        };

        let bytes = export_workbook(&request).unwrap();
        let sheet = import_workbook(bytes, EXPORT_FILE_NAME.into()).await.unwrap();

        assert_eq!(sheet.headers, vec!["id", "name", "note"]);
        assert_eq!(sheet.data[0], vec!["1", "alice", ""]);
        assert_eq!(sheet.data[1], vec!["true", "", ""]);
    }
}
