//! # Routes
//!
//! HTTP surface of the proxy.
//!
//! | Method | Path              | Handler                       |
//! |--------|-------------------|-------------------------------|
//! | POST   | `/oidc/authorize` | pushed authorization request  |
//! | GET    | `/oidc/authorize` | authorization                 |
//! | GET    | `/oidc/redirect`  | Identity Provider redirect    |
//! | POST   | `/oidc/token`     | token                         |
//! | GET    | `/healthcheck`    | health                        |

use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Json, Router};
use axum_extra::TypedHeader;
use axum_extra::headers::Host;
use credibil_oidc4vc::types::{
    AuthorizationRequest, PushedAuthorizationRequest, RedirectRequest, TokenRequest,
};
use credibil_oidc4vc::{Error, Request};
use http::header::{CACHE_CONTROL, PRAGMA};
use http::{HeaderMap, HeaderValue};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::ProxyProvider;
use crate::api_key::require_api_key;
use crate::http::{IntoHttp, IntoRedirect, error};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Proxy capabilities.
    pub provider: ProxyProvider,

    /// Public base URL. Required in production: when unset, the base URL is
    /// `http://` plus the client-supplied `Host` header.
    pub host_url_external: Option<String>,
}

impl AppState {
    fn host(&self, host: &Host) -> String {
        self.host_url_external
            .as_ref()
            .map_or_else(|| format!("http://{host}"), |h| h.trim_end_matches('/').to_string())
    }
}

/// Build the proxy router. Non-public routes require `api_key` when set.
pub fn router(state: AppState, api_key: Option<String>) -> Router {
    let mut router = Router::new()
        .route("/oidc/authorize", get(authorize).post(par))
        .route("/oidc/redirect", get(redirect))
        .route("/oidc/token", axum::routing::post(token))
        .route("/healthcheck", get(healthcheck))
        .with_state(state);

    if let Some(api_key) = api_key {
        router = router.layer(from_fn_with_state(api_key, require_api_key));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_methods(Any).allow_origin(Any).allow_headers(Any))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store"),
        ))
}

// Pushed Authorization Request (RFC 9126)
#[axum::debug_handler]
async fn par(
    State(state): State<AppState>, TypedHeader(host): TypedHeader<Host>, headers: HeaderMap,
    form: Result<Form<PushedAuthorizationRequest>, FormRejection>,
) -> Response {
    let Form(body) = match form {
        Ok(form) => form,
        Err(e) => return error(&Error::InvalidRequest(e.body_text())),
    };
    let request = Request {
        body,
        headers: headers.into(),
    };
    credibil_oidc4vc::handle(&state.host(&host), request, &state.provider).await.into_http()
}

/// Authorize endpoint
///
/// Redirects the user agent to the Identity Provider nominated by the Issuer.
#[axum::debug_handler]
async fn authorize(
    State(state): State<AppState>, TypedHeader(host): TypedHeader<Host>,
    query: Result<Query<AuthorizationRequest>, QueryRejection>,
) -> Response {
    let Query(request) = match query {
        Ok(query) => query,
        Err(e) => return error(&Error::InvalidRequest(e.body_text())),
    };
    credibil_oidc4vc::handle(&state.host(&host), request, &state.provider).await.into_redirect()
}

/// Identity Provider redirect endpoint
///
/// Returns the user agent to the Wallet with the proxy's authorization code.
#[axum::debug_handler]
async fn redirect(
    State(state): State<AppState>, TypedHeader(host): TypedHeader<Host>,
    query: Result<Query<RedirectRequest>, QueryRejection>,
) -> Response {
    let Query(request) = match query {
        Ok(query) => query,
        Err(e) => return error(&Error::InvalidRequest(e.body_text())),
    };
    credibil_oidc4vc::handle(&state.host(&host), request, &state.provider).await.into_redirect()
}

// Token endpoint (RFC 6749 section 5.1): responses must not be cached
#[axum::debug_handler]
async fn token(
    State(state): State<AppState>, TypedHeader(host): TypedHeader<Host>, headers: HeaderMap,
    form: Result<Form<TokenRequest>, FormRejection>,
) -> Response {
    let Form(body) = match form {
        Ok(form) => form,
        Err(e) => return error(&Error::InvalidRequest(e.body_text())),
    };
    let request = Request {
        body,
        headers: headers.into(),
    };
    let response =
        credibil_oidc4vc::handle(&state.host(&host), request, &state.provider).await.into_http();
    (
        [
            (CACHE_CONTROL, HeaderValue::from_static("no-store")),
            (PRAGMA, HeaderValue::from_static("no-cache")),
        ],
        response,
    )
        .into_response()
}

async fn healthcheck() -> impl IntoResponse {
    Json(json!({
        "status": "success",
        "currentTime": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use http::uri::Authority;

    use super::*;

    fn app_state(host_url_external: Option<&str>) -> AppState {
        let settings = crate::Settings {
            host_url_external: host_url_external.map(ToString::to_string),
            ..crate::Settings::default()
        };
        crate::state(&settings).expect("should build state")
    }

    #[test]
    fn external_host() {
        let host = Host::from(Authority::from_static("attacker.example.com"));
        let state = app_state(Some("https://proxy.example.com/"));
        assert_eq!(state.host(&host), "https://proxy.example.com");
    }

    #[test]
    fn host_header_fallback() {
        let host = Host::from(Authority::from_static("localhost:8080"));
        assert_eq!(app_state(None).host(&host), "http://localhost:8080");
    }
}
