//! # Authorization Endpoint
//!
//! The Wallet's authorization request is validated by the engine, the Issuer
//! is asked which Identity Provider to send the user to, and the proxy's own
//! authorization code is minted and saved against `op_state` before the user
//! is redirected to the Identity Provider.
//!
//! When the Issuer returns a pushed authorization request endpoint, the
//! request is first pushed to the Identity Provider and the user is
//! redirected with the returned `request_uri`.

use anyhow::Context as _;
use http::StatusCode;
use tracing::debug;
use url::Url;

use crate::client::decode;
use crate::error::{invalid, server};
use crate::handlers::{Body, Error, Handler, Request, Response, Result};
use crate::provider::{Engine, IdentityProvider, IssuerInteraction, Provider, StateStore};
use crate::store::AuthorizeState;
use crate::types::{
    AuthorizationRequest, IdpPushedAuthorizationRequest, PrepareClaimDataAuthorizationRequest,
    PrepareClaimDataAuthorizationResponse, PushedAuthorizeResponse, RedirectResponse, Session,
};

/// Path of the proxy's redirect endpoint, relative to the public host.
pub const REDIRECT_PATH: &str = "/oidc/redirect";

/// Authorization request handler.
///
/// # Errors
///
/// Returns an `OAuth 2.0` error if the request is invalid, the Issuer cannot
/// prepare the claim data authorization, or state cannot be saved.
async fn authorize(
    host: &str, provider: &impl Provider, request: AuthorizationRequest,
) -> Result<Response<RedirectResponse>> {
    let mut authorize_request = Engine::authorize_request(provider, &request.params).await?;

    let op_state = request.op_state;
    if op_state.is_empty() {
        return Err(invalid!("invalid-value[op_state]: op_state is required"));
    }

    let prepare = PrepareClaimDataAuthorizationRequest {
        response_type: authorize_request.response_type.to_string(),
        op_state: op_state.clone(),
        scope: Some(authorize_request.requested_scope.clone()),
    };
    let response = IssuerInteraction::prepare_authorization_request(provider, &prepare)
        .await
        .context("prepare claim data authorization")?;
    let claim_data: PrepareClaimDataAuthorizationResponse =
        decode(&response).context("prepare claim data authorization")?;

    // the Wallet receives `op_state` back as `state`
    authorize_request.state = Some(op_state.clone());
    let session = Session::with_op_state(&op_state);
    let authorize_response = Engine::authorize_response(provider, &authorize_request, &session)
        .await
        .context("create authorize response")?;

    let state = AuthorizeState {
        op_state: op_state.clone(),
        redirect_uri: authorize_request.redirect_uri,
        response: authorize_response,
    };
    StateStore::save_authorize_state(provider, &op_state, &state)
        .await
        .context("save authorize state")?;

    let location = idp_location(host, provider, &claim_data, &op_state).await?;
    debug!(%op_state, "redirecting to identity provider");

    Ok(Response::with_status(StatusCode::SEE_OTHER, RedirectResponse { location }))
}

// Build the Identity Provider authorization URL the user is redirected to.
async fn idp_location(
    host: &str, provider: &impl Provider, claim_data: &PrepareClaimDataAuthorizationResponse,
    op_state: &str,
) -> Result<String> {
    let oauth = &claim_data.authorization_request;
    let Ok(mut url) = Url::parse(&claim_data.authorization_endpoint) else {
        return Err(server!(
            "invalid authorization endpoint: {}",
            claim_data.authorization_endpoint
        ));
    };

    let idp_request = IdpPushedAuthorizationRequest {
        client_id: oauth.client_id.clone(),
        response_type: oauth.response_type.clone(),
        scope: oauth.scope.join(" "),
        state: op_state.to_string(),
        redirect_uri: format!("{}{REDIRECT_PATH}", host.trim_end_matches('/')),
    };

    if let Some(endpoint) = &claim_data.pushed_authorization_request_endpoint {
        let response = IdentityProvider::push_authorization_request(
            provider,
            endpoint,
            &idp_request,
            &oauth.client_secret,
        )
        .await
        .context("push authorization request to identity provider")?;
        let pushed: PushedAuthorizeResponse =
            decode(&response).context("push authorization request to identity provider")?;

        url.query_pairs_mut()
            .append_pair("client_id", &idp_request.client_id)
            .append_pair("request_uri", &pushed.request_uri);
        return Ok(url.to_string());
    }

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("client_id", &idp_request.client_id)
            .append_pair("redirect_uri", &idp_request.redirect_uri)
            .append_pair("response_type", &idp_request.response_type);
        if !idp_request.scope.is_empty() {
            query.append_pair("scope", &idp_request.scope);
        }
        query.append_pair("state", &idp_request.state);
    }
    Ok(url.to_string())
}

impl<P: Provider> Handler<RedirectResponse, P> for Request<AuthorizationRequest> {
    type Error = Error;

    async fn handle(
        self, host: &str, provider: &P,
    ) -> Result<impl Into<Response<RedirectResponse>>, Self::Error> {
        authorize(host, provider, self.body).await
    }
}

impl Body for AuthorizationRequest {}
