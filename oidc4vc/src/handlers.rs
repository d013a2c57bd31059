//! # Endpoint
//!
//! `Endpoint` provides the entry point for proxy requests. Requests are
//! routed to the appropriate handler for processing, returning a response
//! that can be serialized to a JSON object or rendered as a redirect.

mod authorize;
mod par;
mod redirect;
mod token;

use std::fmt::Debug;

pub use credibil_core::api::{Body, Handler, Headers, NoHeaders, Request, Response};
use http::HeaderMap;
use http::header::AUTHORIZATION;
use tracing::instrument;

pub use crate::error::Error;
use crate::provider::Provider;

/// Result type for the authorization proxy.
pub type Result<T, E = Error> = anyhow::Result<T, E>;

/// Handle incoming requests.
///
/// `host` is the proxy's public base URL, used to build the redirect URI
/// registered with the Identity Provider.
///
/// # Errors
///
/// This method can fail for a number of reasons related to the incoming
/// request's viability. Expected failures include invalid client
/// authentication, malformed parameters, unknown correlation state, and
/// Issuer or Identity Provider errors.
///
/// Implementers should look to the Error type and description for more
/// information on the reason for failure.
#[instrument(level = "debug", skip(provider))]
pub async fn handle<B, H, P, U>(
    host: &str, request: impl Into<Request<B, H>> + Debug, provider: &P,
) -> Result<Response<U>>
where
    B: Body,
    H: Headers,
    P: Provider,
    Request<B, H>: Handler<U, P, Error = Error>,
{
    let request: Request<B, H> = request.into();
    Ok(request.handle(host, provider).await?.into())
}

/// Pushed authorization request headers.
pub type PushedAuthorizationHeaders = ClientHeaders;

/// Token request headers.
pub type TokenHeaders = ClientHeaders;

/// Headers carrying optional HTTP Basic client authentication.
#[derive(Clone, Debug, Default)]
pub struct ClientHeaders {
    /// The `Authorization` header.
    pub authorization: Option<String>,
}

impl Headers for ClientHeaders {}

impl From<HeaderMap> for ClientHeaders {
    fn from(headers: HeaderMap) -> Self {
        let authorization =
            headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()).map(ToString::to_string);
        Self { authorization }
    }
}
