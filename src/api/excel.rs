use axum::extract::Multipart;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};

use crate::api::response::{ApiResponse, JsonBody};
use crate::error::{AppError, AppResult};
use crate::services::excel::{
    export_workbook, import_workbook, ExportRequest, ImportedSheet, EXPORT_FILE_NAME,
    XLSX_CONTENT_TYPE,
};

/// Upload size accepted by the import route.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Multipart upload with the workbook in a field named `file`.
pub async fn import_excel(mut multipart: Multipart) -> AppResult<ApiResponse<ImportedSheet>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        let sheet = import_workbook(bytes.to_vec(), file_name).await?;
        return Ok(ApiResponse::success(sheet));
    }

    Err(AppError::Validation("missing multipart field 'file'".into()))
}

pub async fn export_excel(JsonBody(request): JsonBody<ExportRequest>) -> AppResult<Response> {
    let bytes = export_workbook(&request)?;
    let disposition = format!("attachment; filename={}", EXPORT_FILE_NAME);

    Ok((
        [
            (CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
