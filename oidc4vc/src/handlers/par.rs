//! # Pushed Authorization Request Endpoint [RFC9126]
//!
//! The Wallet pushes its authorization request, together with
//! `authorization_details` and the Issuer's `op_state`, ahead of redirecting
//! the user to the authorization endpoint. Authorization details are
//! validated and forwarded to the Issuer before the engine records the
//! request.
//!
//! [RFC9126]: (https://www.rfc-editor.org/rfc/rfc9126.html)

use anyhow::Context as _;
use http::StatusCode;
use tracing::debug;

use crate::client::check_status;
use crate::error::invalid;
use crate::handlers::{Body, Error, Handler, PushedAuthorizationHeaders, Request, Response, Result};
use crate::provider::{Engine, IssuerInteraction, Provider};
use crate::types::{
    AuthorizationDetails, PushAuthorizationDetailsRequest, PushedAuthorizationRequest,
    PushedAuthorizeResponse,
};

/// Pushed authorization request handler.
///
/// # Errors
///
/// Returns an `OAuth 2.0` error if client authentication fails, the request
/// or its authorization details are invalid, or the Issuer rejects the
/// authorization details.
async fn par(
    _host: &str, provider: &impl Provider,
    request: Request<PushedAuthorizationRequest, PushedAuthorizationHeaders>,
) -> Result<Response<PushedAuthorizeResponse>> {
    let body = &request.body;
    let credentials = body.credentials(request.headers.authorization.clone());

    let authorize_request =
        Engine::pushed_authorize_request(provider, &body.params, &credentials).await?;

    let authorization_details = AuthorizationDetails::parse(&body.authorization_details)?;
    if body.op_state.is_empty() {
        return Err(invalid!("invalid-value[op_state]: op_state is required"));
    }

    let push = PushAuthorizationDetailsRequest {
        authorization_details,
        op_state: body.op_state.clone(),
    };
    let response = IssuerInteraction::push_authorization_details(provider, &push)
        .await
        .context("push authorization details")?;
    check_status(&response).context("push authorization details")?;
    debug!(op_state = %body.op_state, "authorization details accepted by issuer");

    let par_response = Engine::pushed_authorize_response(provider, &authorize_request).await?;
    Ok(Response::with_status(StatusCode::CREATED, par_response))
}

impl<P: Provider> Handler<PushedAuthorizeResponse, P>
    for Request<PushedAuthorizationRequest, PushedAuthorizationHeaders>
{
    type Error = Error;

    async fn handle(
        self, host: &str, provider: &P,
    ) -> Result<impl Into<Response<PushedAuthorizeResponse>>, Self::Error> {
        par(host, provider, self).await
    }
}

impl Body for PushedAuthorizationRequest {}
