use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::ResumeRecord;
use crate::routes::identity::CurrentIdentity;
use crate::state::AppState;
use crate::store::{FetchOutcome, ResumeUpload, MAX_RESUME_BYTES};

/// Multipart field carrying the résumé file.
pub const FILE_FIELD: &str = "file";

#[derive(Serialize)]
pub struct ResumeView {
    pub resume: Option<ResumeRecord>,
    pub uploading: bool,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// GET /api/v1/resume
pub async fn handle_get_resume(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<ResumeView>, AppError> {
    let store = state.sessions.open(identity).await;
    Ok(Json(ResumeView {
        resume: store.current_resume()?,
        uploading: store.is_uploading()?,
    }))
}

/// POST /api/v1/resume
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ResumeRecord>), AppError> {
    // Identity is checked before the body is read.
    let identity = identity.ok_or(AppError::Unauthorized)?;
    let store = state.sessions.open(Some(identity)).await;
    let upload = read_file_field(&mut multipart).await?;
    let record = store.upload(upload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /api/v1/resume
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<DeleteResponse>, AppError> {
    let store = state.sessions.open(identity).await;
    let deleted = store.delete().await?;
    Ok(Json(DeleteResponse { deleted }))
}

/// POST /api/v1/resume/refresh
pub async fn handle_refresh_resume(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<FetchOutcome>, AppError> {
    let store = state.sessions.open(identity).await;
    Ok(Json(store.refresh().await?))
}

/// DELETE /api/v1/session
pub async fn handle_close_session(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<StatusCode, AppError> {
    let identity = identity.ok_or(AppError::Unauthorized)?;
    state.sessions.close(&identity);
    Ok(StatusCode::NO_CONTENT)
}

async fn read_file_field(multipart: &mut Multipart) -> Result<ResumeUpload, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_owned)
            .ok_or_else(|| AppError::Validation(format!("Field '{FILE_FIELD}' has no file name")))?;
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(ResumeUpload::new(file_name, bytes));
    }
    Err(AppError::Validation(format!(
        "Multipart field '{FILE_FIELD}' is missing"
    )))
}

/// A body over the request limit surfaces here as a multipart error.
fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!(
            "File exceeds the {MAX_RESUME_BYTES} byte limit"
        ))
    } else {
        AppError::Validation(format!("Malformed multipart body: {}", e.body_text()))
    }
}
