//! Viewer extraction
//!
//! Handlers take a [`Viewer`] argument; it is resolved from an
//! `Authorization: Bearer <token>` header. Requests without a usable token
//! are served anonymously.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::viewer::Viewer;
use crate::AppState;

#[async_trait]
impl FromRequestParts<AppState> for Viewer {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts);
        Viewer::resolve(&state.catalog, token).await.map_err(|e| {
            error!("Viewer lookup failed: {}", e);
            SessionError::Lookup(e.to_string())
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Session or bookmark lookup could not reach the catalog
#[derive(Debug)]
pub enum SessionError {
    Lookup(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            SessionError::Lookup(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Session lookup failed: {}", msg),
            ),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
