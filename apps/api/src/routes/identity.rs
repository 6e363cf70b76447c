use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::models::Identity;

/// Set by the authenticating gateway in front of this service.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The caller's identity, or `None` for unauthenticated requests.
pub struct CurrentIdentity(pub Option<Identity>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(Identity::new);
        Ok(CurrentIdentity(identity))
    }
}
