//! # Proxy Errors
//!
//! Errors returned by the proxy are `OAuth 2.0` error codes. Each variant
//! serializes to the standard `error` and `error_description` pair and maps to
//! an HTTP status code suitable for the failing endpoint.

use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// `OAuth 2.0` error codes returned by the proxy.
#[derive(Error, Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "error", content = "error_description")]
pub enum Error {
    /// The request is missing a required parameter, includes an unsupported
    /// parameter value, repeats a parameter, or is otherwise malformed.
    #[error(r#"{{"error": "invalid_request", "error_description": "{0}"}}"#)]
    InvalidRequest(String),

    /// Client authentication failed (e.g., unknown client, no client
    /// authentication included, or unsupported authentication method).
    #[error(r#"{{"error": "invalid_client", "error_description": "{0}"}}"#)]
    InvalidClient(String),

    /// The provided authorization grant is invalid, expired, revoked, does
    /// not match the redirection URI used in the authorization request, or
    /// was issued to another client.
    #[error(r#"{{"error": "invalid_grant", "error_description": "{0}"}}"#)]
    InvalidGrant(String),

    /// The client is not authorized to request an authorization code using
    /// this method.
    #[error(r#"{{"error": "unauthorized_client", "error_description": "{0}"}}"#)]
    UnauthorizedClient(String),

    /// The authorization grant type is not supported by the authorization
    /// server.
    #[error(r#"{{"error": "unsupported_grant_type", "error_description": "{0}"}}"#)]
    UnsupportedGrantType(String),

    /// The authorization server does not support obtaining an authorization
    /// code using this method.
    #[error(r#"{{"error": "unsupported_response_type", "error_description": "{0}"}}"#)]
    UnsupportedResponseType(String),

    /// The requested scope is invalid, unknown, malformed, or exceeds the
    /// scope granted.
    #[error(r#"{{"error": "invalid_scope", "error_description": "{0}"}}"#)]
    InvalidScope(String),

    /// Unknown authorization details type or authorization details not
    /// conforming to the respective type definition.
    #[error(r#"{{"error": "invalid_authorization_details", "error_description": "{0}"}}"#)]
    InvalidAuthorizationDetails(String),

    /// The resource owner or authorization server denied the request.
    #[error(r#"{{"error": "access_denied", "error_description": "{0}"}}"#)]
    AccessDenied(String),

    /// The authorization server encountered an unexpected condition that
    /// prevented it from fulfilling the request.
    #[error(r#"{{"error": "server_error", "error_description": "{0}"}}"#)]
    ServerError(String),

    /// The authorization server is unable to handle the request due to
    /// temporary overloading or maintenance.
    #[error(r#"{{"error": "temporarily_unavailable", "error_description": "{0}"}}"#)]
    TemporarilyUnavailable(String),

    /// The correlation state referenced by the request does not exist or has
    /// expired.
    #[serde(rename = "invalid_request")]
    #[error(r#"{{"error": "invalid_request", "error_description": "{0}"}}"#)]
    InvalidState(String),
}

impl Error {
    /// The HTTP status code used when rendering the error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidClient(_) => StatusCode::UNAUTHORIZED,
            Self::AccessDenied(_) => StatusCode::FORBIDDEN,
            Self::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::TemporarilyUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// The human-readable error description.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::InvalidRequest(d)
            | Self::InvalidClient(d)
            | Self::InvalidGrant(d)
            | Self::UnauthorizedClient(d)
            | Self::UnsupportedGrantType(d)
            | Self::UnsupportedResponseType(d)
            | Self::InvalidScope(d)
            | Self::InvalidAuthorizationDetails(d)
            | Self::AccessDenied(d)
            | Self::ServerError(d)
            | Self::TemporarilyUnavailable(d)
            | Self::InvalidState(d) => d,
        }
    }

    // Prefix the error description with `context`, keeping the error code.
    fn with_context(&self, context: &str) -> Self {
        if context.is_empty() {
            return self.clone();
        }
        let d = format!("{context}: {}", self.description());
        match self {
            Self::InvalidRequest(_) => Self::InvalidRequest(d),
            Self::InvalidClient(_) => Self::InvalidClient(d),
            Self::InvalidGrant(_) => Self::InvalidGrant(d),
            Self::UnauthorizedClient(_) => Self::UnauthorizedClient(d),
            Self::UnsupportedGrantType(_) => Self::UnsupportedGrantType(d),
            Self::UnsupportedResponseType(_) => Self::UnsupportedResponseType(d),
            Self::InvalidScope(_) => Self::InvalidScope(d),
            Self::InvalidAuthorizationDetails(_) => Self::InvalidAuthorizationDetails(d),
            Self::AccessDenied(_) => Self::AccessDenied(d),
            Self::ServerError(_) => Self::ServerError(d),
            Self::TemporarilyUnavailable(_) => Self::TemporarilyUnavailable(d),
            Self::InvalidState(_) => Self::InvalidState(d),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        // walk the chain: context added by callers sits above the root cause
        let mut context = vec![];
        for cause in err.chain() {
            if let Some(e) = cause.downcast_ref::<Self>() {
                return e.with_context(&context.join(": "));
            }
            context.push(cause.to_string());
        }
        Self::ServerError(context.join(": "))
    }
}

/// Construct an `Error::InvalidRequest` error from a string or existing error
/// value.
macro_rules! invalid {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::InvalidRequest(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::InvalidRequest(format!($err))
    };
}
pub(crate) use invalid;

/// Construct an `Error::ServerError` error from a string or existing error
/// value.
macro_rules! server {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::ServerError(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::ServerError(format!($err))
    };
}
pub(crate) use server;

#[cfg(test)]
mod test {
    use anyhow::{Context, anyhow};
    use serde_json::json;

    use super::*;

    // Test that the error details are returned as an http query string.
    #[test]
    fn querystring() {
        let err = invalid!("Invalid request description");
        let ser = serde_urlencoded::to_string(&err).unwrap();
        assert_eq!(ser, "error=invalid_request&error_description=Invalid+request+description");
    }

    #[test]
    fn json() {
        let err = invalid!("bad request");
        let ser = serde_json::to_value(&err).unwrap();
        assert_eq!(ser, json!({"error":"invalid_request", "error_description": "bad request"}));
    }

    // Missing state is reported to the client as `invalid_request`.
    #[test]
    fn invalid_state() {
        let err = Error::InvalidState("no state".to_string());
        let ser = serde_json::to_value(&err).unwrap();
        assert_eq!(ser, json!({"error":"invalid_request", "error_description": "no state"}));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn keeps_code_through_context() {
        let res: anyhow::Result<()> = Err(Error::InvalidGrant("code expired".to_string()).into());
        let err: Error = res.context("access request").unwrap_err().into();
        assert_eq!(err, Error::InvalidGrant("access request: code expired".to_string()));
    }

    #[test]
    fn upstream_is_server_error() {
        let res: anyhow::Result<()> = Err(anyhow!("status code 500"));
        let err: Error = res.context("push authorization details").unwrap_err().into();
        assert_eq!(err, Error::ServerError("push authorization details: status code 500".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
