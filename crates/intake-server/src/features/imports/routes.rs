use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::commands::{self, ProcessUploadCommand, ProcessUploadError};
use super::queries::{self, GetImportError, GetImportQuery};
use crate::error::AppError;
use crate::ingest::ImportError;
use intake_common::checksum::MAX_CONTENT_BYTES;

/// Multipart framing overhead allowed on top of the content cap.
const UPLOAD_BODY_OVERHEAD: usize = 1024 * 1024;

pub fn imports_routes() -> Router<PgPool> {
    // The transport limit sits above the digest cap so oversized uploads
    // reach the truncation path instead of a 413 from the extractor.
    Router::new()
        .route("/xlsx", post(upload_xlsx))
        .route("/:id", get(get_import))
        .layer(DefaultBodyLimit::max(
            MAX_CONTENT_BYTES as usize + UPLOAD_BODY_OVERHEAD,
        ))
}

#[tracing::instrument(skip(pool, multipart))]
async fn upload_xlsx(
    State(pool): State<PgPool>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut filename: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| upload_error(ImportError::FileUnreadable))?
    {
        if field.name() == Some("file") {
            filename = field.file_name().map(|s| s.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|_| upload_error(ImportError::FileUnreadable))?;
            content = Some(data.to_vec());
        }
    }

    let content =
        content.ok_or_else(|| AppError::BadRequest("no file field in upload".to_string()))?;

    let command = ProcessUploadCommand {
        filename: filename.unwrap_or_else(|| "upload.xlsx".to_string()),
        content,
    };

    let response = commands::process_upload::handle(pool, command).await?;

    tracing::info!(
        import_id = %response.import_id,
        file_sha256 = %response.file_sha256,
        "XLSX import accepted via API"
    );

    Ok((StatusCode::OK, Json(response)).into_response())
}

#[tracing::instrument(skip(pool))]
async fn get_import(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let record = queries::get_import::handle(pool, GetImportQuery { import_id: id }).await?;
    Ok((StatusCode::OK, Json(record)).into_response())
}

fn upload_error(err: ImportError) -> AppError {
    ProcessUploadError::Import(err).into()
}

impl From<ProcessUploadError> for AppError {
    fn from(err: ProcessUploadError) -> Self {
        match err {
            ProcessUploadError::FilenameRequired | ProcessUploadError::ContentRequired => {
                AppError::BadRequest(err.to_string())
            }
            ProcessUploadError::Import(import_err) => match import_err {
                ImportError::FileUnreadable
                | ImportError::InvalidWorkbook(_)
                | ImportError::NoSheetsFound
                | ImportError::NoDataRows => AppError::BadRequest(import_err.to_string()),
                ImportError::Database(e) => AppError::Database(e),
            },
        }
    }
}

impl From<GetImportError> for AppError {
    fn from(err: GetImportError) -> Self {
        match err {
            GetImportError::NotFound(_) => AppError::NotFound(err.to_string()),
            GetImportError::Database(e) => AppError::Database(e),
        }
    }
}
