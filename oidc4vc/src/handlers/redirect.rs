//! # Redirect Endpoint
//!
//! The Identity Provider redirects the user back to the proxy with its
//! authorization code and `state` (the Issuer's `op_state`). The code is
//! handed to the Issuer and the user is sent on to the Wallet with the
//! proxy's own authorization response.

use anyhow::Context as _;
use http::StatusCode;
use tracing::debug;
use url::Url;

use crate::client::check_status;
use crate::error::{invalid, server};
use crate::handlers::{Body, Error, Handler, Request, Response, Result};
use crate::provider::{IssuerInteraction, Provider, StateStore};
use crate::types::{RedirectRequest, RedirectResponse, StoreAuthorizationCodeRequest};

/// Identity Provider redirect handler.
///
/// # Errors
///
/// Returns an `OAuth 2.0` error if no authorization state exists for
/// `state`, or the Issuer does not accept the authorization code.
async fn redirect(
    _host: &str, provider: &impl Provider, request: RedirectRequest,
) -> Result<Response<RedirectResponse>> {
    if request.state.is_empty() {
        return Err(invalid!("invalid-value[state]: state is required"));
    }

    let state = StateStore::get_authorize_state(provider, &request.state)
        .await
        .context("get authorize state")?;

    let Ok(mut url) = Url::parse(&state.redirect_uri) else {
        return Err(server!("invalid redirect_uri: {}", state.redirect_uri));
    };

    let Some(code) = request.code else {
        // pass an Identity Provider error through to the Wallet
        let Some(error) = request.error else {
            return Err(invalid!("invalid-value[code]: code is required"));
        };
        debug!(op_state = %request.state, %error, "identity provider declined authorization");
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("error", &error);
            if let Some(description) = &request.error_description {
                query.append_pair("error_description", description);
            }
            query.append_pair("state", &request.state);
        }
        return Ok(Response::with_status(StatusCode::SEE_OTHER, RedirectResponse {
            location: url.to_string(),
        }));
    };

    let store = StoreAuthorizationCodeRequest {
        code,
        op_state: request.state.clone(),
    };
    let response = IssuerInteraction::store_authorization_code(provider, &store)
        .await
        .context("store authorization code")?;
    check_status(&response).context("store authorization code")?;

    url.query_pairs_mut().extend_pairs(state.response.parameters());
    debug!(op_state = %request.state, "redirecting to wallet");

    Ok(Response::with_status(StatusCode::SEE_OTHER, RedirectResponse {
        location: url.to_string(),
    }))
}

impl<P: Provider> Handler<RedirectResponse, P> for Request<RedirectRequest> {
    type Error = Error;

    async fn handle(
        self, host: &str, provider: &P,
    ) -> Result<impl Into<Response<RedirectResponse>>, Self::Error> {
        redirect(host, provider, self.body).await
    }
}

impl Body for RedirectRequest {}
