//! # API Key
//!
//! Requests to non-public routes must carry the configured key in the
//! `X-API-Key` header. Browser-facing and health routes are public.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::{HeaderValue, StatusCode};
use subtle::ConstantTimeEq;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

const PUBLIC_PREFIXES: [&str; 5] = [
    "/request-object/",
    "/verifier/interactions/authorization-response",
    "/oidc/authorize",
    "/oidc/redirect",
    "/oidc/token",
];

/// Returns true when `path` does not require an API key.
#[must_use]
pub fn is_public(path: &str) -> bool {
    let path = path.to_lowercase();
    path.ends_with("/healthcheck")
        || path.contains("/credentials/status/")
        || PUBLIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// Middleware rejecting requests to non-public routes without a matching API
/// key.
pub async fn require_api_key(
    State(api_key): State<String>, request: Request, next: Next,
) -> Response {
    if is_public(request.uri().path()) {
        return next.run(request).await;
    }

    let provided =
        request.headers().get(API_KEY_HEADER).map(HeaderValue::as_bytes).unwrap_or_default();
    if !bool::from(provided.ct_eq(api_key.as_bytes())) {
        tracing::debug!(path = %request.uri().path(), "missing or invalid API key");
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }

    next.run(request).await
}
