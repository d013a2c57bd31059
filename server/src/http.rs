//! # Axum Response
//!
//! Converts handler results into HTTP responses. JSON endpoints render the
//! response body; browser endpoints render a `303 See Other` redirect. Errors
//! are rendered as an `OAuth 2.0` error object with the status the error maps
//! to.

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use credibil_oidc4vc::Error;
use credibil_oidc4vc::types::RedirectResponse;
use http::header::{CONTENT_TYPE, LOCATION, WWW_AUTHENTICATE};
use http::{HeaderValue, StatusCode};
use serde::Serialize;

type Result<T> = credibil_oidc4vc::Result<credibil_oidc4vc::Response<T>>;

/// Trait for converting a `Result` into a JSON HTTP response.
pub trait IntoHttp {
    /// Convert into an HTTP response.
    fn into_http(self) -> Response;
}

impl<T: Serialize> IntoHttp for Result<T> {
    fn into_http(self) -> Response {
        match self {
            Ok(r) => json(r.status, &r.body),
            Err(e) => error(&e),
        }
    }
}

/// Trait for converting a `Result` into a redirect.
pub trait IntoRedirect {
    /// Convert into a `303 See Other` response, or an error response.
    fn into_redirect(self) -> Response;
}

impl IntoRedirect for Result<RedirectResponse> {
    fn into_redirect(self) -> Response {
        let response = match self {
            Ok(r) => r,
            Err(e) => return error(&e),
        };
        let Ok(location) = HeaderValue::try_from(&response.body.location) else {
            tracing::error!(location = %response.body.location, "invalid redirect location");
            return error(&Error::ServerError("invalid redirect location".to_string()));
        };
        let mut http = Response::new(Body::empty());
        *http.status_mut() = StatusCode::SEE_OTHER;
        http.headers_mut().insert(LOCATION, location);
        http
    }
}

/// Render an error as an `OAuth 2.0` error response.
pub fn error(err: &Error) -> Response {
    let status = err.status();
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    } else {
        tracing::debug!(error = %err, "request rejected");
    }

    let mut response = json(status, err);
    if matches!(err, Error::InvalidClient(_)) {
        response.headers_mut().insert(WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
    }
    response
}

fn json<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(body) => {
            (status, [(CONTENT_TYPE, HeaderValue::from_static("application/json"))], body)
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "serializing response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
