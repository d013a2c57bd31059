//! # Proxy
//!
//! Composes a [`Provider`](crate::provider::Provider) from an engine, a state
//! store, an Issuer client, and an Identity Provider client.

use anyhow::Result;

use crate::provider::{Engine, IdentityProvider, IssuerInteraction, StateStore, UpstreamResponse};
use crate::store::AuthorizeState;
use crate::types::{
    AccessRequest, AccessResponse, AuthorizationParams, AuthorizeRequest, AuthorizeResponse,
    ClientCredentials, ExchangeAuthorizationCodeRequest, IdpPushedAuthorizationRequest,
    PrepareClaimDataAuthorizationRequest, PushAuthorizationDetailsRequest,
    PushedAuthorizeResponse, Session, StoreAuthorizationCodeRequest, TokenRequest,
};

/// The proxy's collaborators.
#[derive(Clone, Debug)]
pub struct Proxy<E, S, I, D> {
    /// `OAuth 2.0` engine.
    pub engine: E,

    /// Correlation state store.
    pub store: S,

    /// Issuer interaction client.
    pub issuer: I,

    /// Identity Provider client.
    pub idp: D,
}

impl<E, S, I, D> Proxy<E, S, I, D> {
    /// Create a proxy from its collaborators.
    pub const fn new(engine: E, store: S, issuer: I, idp: D) -> Self {
        Self {
            engine,
            store,
            issuer,
            idp,
        }
    }
}

impl<E: Engine, S: Send + Sync, I: Send + Sync, D: Send + Sync> Engine for Proxy<E, S, I, D> {
    async fn pushed_authorize_request(
        &self, params: &AuthorizationParams, credentials: &ClientCredentials,
    ) -> Result<AuthorizeRequest> {
        self.engine.pushed_authorize_request(params, credentials).await
    }

    async fn pushed_authorize_response(
        &self, request: &AuthorizeRequest,
    ) -> Result<PushedAuthorizeResponse> {
        self.engine.pushed_authorize_response(request).await
    }

    async fn authorize_request(&self, params: &AuthorizationParams) -> Result<AuthorizeRequest> {
        self.engine.authorize_request(params).await
    }

    async fn authorize_response(
        &self, request: &AuthorizeRequest, session: &Session,
    ) -> Result<AuthorizeResponse> {
        self.engine.authorize_response(request, session).await
    }

    async fn access_request(
        &self, request: &TokenRequest, credentials: &ClientCredentials,
    ) -> Result<AccessRequest> {
        self.engine.access_request(request, credentials).await
    }

    async fn access_response(&self, request: &AccessRequest) -> Result<AccessResponse> {
        self.engine.access_response(request).await
    }
}

impl<E: Send + Sync, S: StateStore, I: Send + Sync, D: Send + Sync> StateStore
    for Proxy<E, S, I, D>
{
    async fn save_authorize_state(&self, op_state: &str, state: &AuthorizeState) -> Result<()> {
        self.store.save_authorize_state(op_state, state).await
    }

    async fn get_authorize_state(&self, op_state: &str) -> Result<AuthorizeState> {
        self.store.get_authorize_state(op_state).await
    }
}

impl<E: Send + Sync, S: Send + Sync, I: IssuerInteraction, D: Send + Sync> IssuerInteraction
    for Proxy<E, S, I, D>
{
    async fn prepare_authorization_request(
        &self, request: &PrepareClaimDataAuthorizationRequest,
    ) -> Result<UpstreamResponse> {
        self.issuer.prepare_authorization_request(request).await
    }

    async fn push_authorization_details(
        &self, request: &PushAuthorizationDetailsRequest,
    ) -> Result<UpstreamResponse> {
        self.issuer.push_authorization_details(request).await
    }

    async fn store_authorization_code(
        &self, request: &StoreAuthorizationCodeRequest,
    ) -> Result<UpstreamResponse> {
        self.issuer.store_authorization_code(request).await
    }

    async fn exchange_authorization_code(
        &self, request: &ExchangeAuthorizationCodeRequest,
    ) -> Result<UpstreamResponse> {
        self.issuer.exchange_authorization_code(request).await
    }
}

impl<E: Send + Sync, S: Send + Sync, I: Send + Sync, D: IdentityProvider> IdentityProvider
    for Proxy<E, S, I, D>
{
    async fn push_authorization_request(
        &self, endpoint: &str, request: &IdpPushedAuthorizationRequest, client_secret: &str,
    ) -> Result<UpstreamResponse> {
        self.idp.push_authorization_request(endpoint, request, client_secret).await
    }
}
