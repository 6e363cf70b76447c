use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::models::{ApplicationRecord, JobPosting};
use crate::routes::identity::CurrentIdentity;
use crate::state::AppState;

/// GET /api/v1/jobs/recommended
pub async fn handle_recommended_jobs(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<Vec<JobPosting>>, AppError> {
    let store = state.sessions.open(identity).await;
    Ok(Json(store.recommended_jobs().await?))
}

/// GET /api/v1/applications
pub async fn handle_applications(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<Vec<ApplicationRecord>>, AppError> {
    let store = state.sessions.open(identity).await;
    Ok(Json(store.applications().await?))
}
