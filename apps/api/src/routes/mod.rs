pub mod health;
pub mod identity;
pub mod jobs;
pub mod resume;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;
use crate::store::MAX_RESUME_BYTES;

/// Largest accepted résumé plus room for multipart framing.
const MAX_REQUEST_BYTES: usize = MAX_RESUME_BYTES + 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/resume",
            get(resume::handle_get_resume)
                .post(resume::handle_upload_resume)
                .delete(resume::handle_delete_resume),
        )
        .route("/api/v1/resume/refresh", post(resume::handle_refresh_resume))
        .route("/api/v1/jobs/recommended", get(jobs::handle_recommended_jobs))
        .route("/api/v1/applications", get(jobs::handle_applications))
        .route("/api/v1/session", delete(resume::handle_close_session))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .with_state(state)
}
