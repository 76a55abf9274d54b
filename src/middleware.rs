use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::AppState;

pub const USER_HEADER: &str = "x-user-id";
pub const DEFAULT_USER: &str = "demo-user";

/// Opaque caller identity from the `x-user-id` header, defaulted for the
/// demo deployment. Extraction also lazily creates the caller's wallet
/// row. Real authentication is out of scope.
#[derive(Debug, Clone)]
pub struct UserId(pub String);

impl FromRequestParts<AppState> for UserId {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_USER)
            .to_string();
        state.wallet.ensure_user(&id).await;
        Ok(UserId(id))
    }
}
