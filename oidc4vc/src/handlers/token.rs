//! # Token Endpoint
//!
//! The Wallet redeems the proxy's authorization code. Before the access token
//! is issued, the Issuer is asked to redeem the Identity Provider's code for
//! the same `op_state`.

use anyhow::Context as _;
use tracing::debug;

use crate::client::check_status;
use crate::error::server;
use crate::handlers::{Body, Error, Handler, Request, Response, Result, TokenHeaders};
use crate::provider::{Engine, IssuerInteraction, Provider};
use crate::types::{AccessResponse, ExchangeAuthorizationCodeRequest, TokenRequest};

/// Token request handler.
///
/// # Errors
///
/// Returns an `OAuth 2.0` error if client authentication fails, the grant is
/// invalid, or the Issuer cannot exchange its authorization code.
async fn token(
    _host: &str, provider: &impl Provider, request: Request<TokenRequest, TokenHeaders>,
) -> Result<AccessResponse> {
    let credentials = request.body.credentials(request.headers.authorization.clone());
    let access_request = Engine::access_request(provider, &request.body, &credentials).await?;

    let Some(op_state) = access_request.session.op_state() else {
        return Err(server!("session has no `opState`"));
    };

    let exchange = ExchangeAuthorizationCodeRequest {
        op_state: op_state.to_string(),
    };
    let response = IssuerInteraction::exchange_authorization_code(provider, &exchange)
        .await
        .context("exchange authorization code")?;
    check_status(&response).context("exchange authorization code")?;
    debug!(%op_state, "issuer exchanged authorization code");

    Ok(Engine::access_response(provider, &access_request).await.context("create access response")?)
}

impl<P: Provider> Handler<AccessResponse, P> for Request<TokenRequest, TokenHeaders> {
    type Error = Error;

    async fn handle(
        self, host: &str, provider: &P,
    ) -> Result<impl Into<Response<AccessResponse>>, Self::Error> {
        token(host, provider, self).await
    }
}

impl Body for TokenRequest {}
