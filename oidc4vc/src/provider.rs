//! # Provider Traits
//!
//! This module defines the `Provider` trait and its associated traits. The
//! proxy's handlers depend only on these capabilities:
//!
//! * [`Engine`] validates `OAuth 2.0` requests and mints codes and tokens.
//! * [`StateStore`] correlates the four-step flow by the Issuer's `op_state`.
//! * [`IssuerInteraction`] calls the Issuer's interaction API.
//! * [`IdentityProvider`] pushes authorization requests to an Identity
//!   Provider that requires them.
//!
//! Upstream calls return the raw HTTP response so handlers can check the
//! status explicitly.

use std::future::Future;

use anyhow::Result;

use crate::store::AuthorizeState;
use crate::types::{
    AccessRequest, AccessResponse, AuthorizationParams, AuthorizeRequest, AuthorizeResponse,
    ClientCredentials, ExchangeAuthorizationCodeRequest, IdpPushedAuthorizationRequest,
    PrepareClaimDataAuthorizationRequest, PushAuthorizationDetailsRequest,
    PushedAuthorizeResponse, Session, StoreAuthorizationCodeRequest, TokenRequest,
};

/// Upstream HTTP response: status code and raw body.
pub type UpstreamResponse = http::Response<Vec<u8>>;

/// Proxy Provider trait.
pub trait Provider: Engine + StateStore + IssuerInteraction + IdentityProvider + Clone {}

/// A blanket implementation for `Provider` trait so that any type implementing
/// the required super traits is considered a `Provider`.
impl<T> Provider for T where T: Engine + StateStore + IssuerInteraction + IdentityProvider + Clone {}

/// The embedded `OAuth 2.0` authorization server.
///
/// Errors returned by the engine should wrap [`crate::Error`] so their
/// `OAuth 2.0` error code is preserved in the response to the Wallet.
pub trait Engine: Send + Sync {
    /// Authenticate the client and validate a pushed authorization request.
    fn pushed_authorize_request(
        &self, params: &AuthorizationParams, credentials: &ClientCredentials,
    ) -> impl Future<Output = Result<AuthorizeRequest>> + Send;

    /// Persist a validated pushed authorization request, returning the
    /// `request_uri` that references it.
    fn pushed_authorize_response(
        &self, request: &AuthorizeRequest,
    ) -> impl Future<Output = Result<PushedAuthorizeResponse>> + Send;

    /// Validate an authorization request, resolving `request_uri` when
    /// present.
    fn authorize_request(
        &self, params: &AuthorizationParams,
    ) -> impl Future<Output = Result<AuthorizeRequest>> + Send;

    /// Mint an authorization code bound to `request` and `session`.
    fn authorize_response(
        &self, request: &AuthorizeRequest, session: &Session,
    ) -> impl Future<Output = Result<AuthorizeResponse>> + Send;

    /// Authenticate the client and redeem the authorization code, returning
    /// the session recorded when the code was issued.
    fn access_request(
        &self, request: &TokenRequest, credentials: &ClientCredentials,
    ) -> impl Future<Output = Result<AccessRequest>> + Send;

    /// Mint an access token for a validated token request.
    fn access_response(
        &self, request: &AccessRequest,
    ) -> impl Future<Output = Result<AccessResponse>> + Send;
}

/// `StateStore` persists authorization state between the authorization
/// endpoint and the Identity Provider's redirect.
pub trait StateStore: Send + Sync {
    /// Save state under `op_state`, replacing any existing entry.
    fn save_authorize_state(
        &self, op_state: &str, state: &AuthorizeState,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Retrieve state saved under `op_state`.
    ///
    /// Missing or expired entries are reported as
    /// [`crate::Error::InvalidState`].
    fn get_authorize_state(
        &self, op_state: &str,
    ) -> impl Future<Output = Result<AuthorizeState>> + Send;
}

/// The Issuer's interaction API.
pub trait IssuerInteraction: Send + Sync {
    /// Ask the Issuer which Identity Provider to use for `op_state`.
    fn prepare_authorization_request(
        &self, request: &PrepareClaimDataAuthorizationRequest,
    ) -> impl Future<Output = Result<UpstreamResponse>> + Send;

    /// Forward validated authorization details.
    fn push_authorization_details(
        &self, request: &PushAuthorizationDetailsRequest,
    ) -> impl Future<Output = Result<UpstreamResponse>> + Send;

    /// Hand over the Identity Provider's authorization code.
    fn store_authorization_code(
        &self, request: &StoreAuthorizationCodeRequest,
    ) -> impl Future<Output = Result<UpstreamResponse>> + Send;

    /// Ask the Issuer to redeem the Identity Provider's authorization code.
    fn exchange_authorization_code(
        &self, request: &ExchangeAuthorizationCodeRequest,
    ) -> impl Future<Output = Result<UpstreamResponse>> + Send;
}

/// Outbound calls to a third-party Identity Provider.
pub trait IdentityProvider: Send + Sync {
    /// Push an authorization request to `endpoint`, authenticating with
    /// `client_secret`.
    fn push_authorization_request(
        &self, endpoint: &str, request: &IdpPushedAuthorizationRequest, client_secret: &str,
    ) -> impl Future<Output = Result<UpstreamResponse>> + Send;
}
