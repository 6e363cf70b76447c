use std::sync::Arc;

use crate::sessions::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
}
