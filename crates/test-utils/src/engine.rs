//! # Stub Engine
//!
//! An `Engine` returning fixed values, recording each call and failing on
//! demand.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use credibil_oidc4vc::Error;
use credibil_oidc4vc::provider::Engine;
use credibil_oidc4vc::types::{
    AccessRequest, AccessResponse, AuthorizationParams, AuthorizeRequest, AuthorizeResponse,
    ClientCredentials, PushedAuthorizeResponse, ResponseType, Session, TokenRequest, TokenType,
};

/// Client ID used for all requests.
pub const CLIENT_ID: &str = "wallet";
/// Redirect URI used when the request has none.
pub const REDIRECT_URI: &str = "https://wallet.example.com/cb";
/// Authorization code returned by `authorize_response`.
pub const AUTH_CODE: &str = "proxy-auth-code";
/// Access token returned by `access_response`.
pub const ACCESS_TOKEN: &str = "proxy-access-token";
/// Request URI returned by `pushed_authorize_response`.
pub const REQUEST_URI: &str = "urn:ietf:params:oauth:request_uri:stub";

/// Engine operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineCall {
    /// `pushed_authorize_request`
    PushedAuthorizeRequest,
    /// `pushed_authorize_response`
    PushedAuthorizeResponse,
    /// `authorize_request`
    AuthorizeRequest,
    /// `authorize_response`
    AuthorizeResponse,
    /// `access_request`
    AccessRequest,
    /// `access_response`
    AccessResponse,
}

#[derive(Debug, Default)]
struct Inner {
    calls: Vec<EngineCall>,
    failures: HashMap<EngineCall, Error>,
    authorized: Option<(AuthorizeRequest, Session)>,
    access_session: Option<Session>,
}

/// Stub `OAuth 2.0` engine.
#[derive(Clone, Debug, Default)]
pub struct StubEngine {
    inner: Arc<Mutex<Inner>>,
}

impl StubEngine {
    /// Fail `call` with `error`.
    pub fn fail(&self, call: EngineCall, error: Error) {
        self.inner.lock().unwrap().failures.insert(call, error);
    }

    /// Use `session` for access requests instead of the session recorded by
    /// `authorize_response`.
    pub fn access_session(&self, session: Session) {
        self.inner.lock().unwrap().access_session = Some(session);
    }

    /// Calls made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<EngineCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Request and session passed to the most recent `authorize_response`.
    #[must_use]
    pub fn authorized(&self) -> Option<(AuthorizeRequest, Session)> {
        self.inner.lock().unwrap().authorized.clone()
    }

    fn record(&self, call: EngineCall) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call);
        if let Some(err) = inner.failures.get(&call) {
            return Err(err.clone().into());
        }
        Ok(())
    }
}

fn authorize_request(params: &AuthorizationParams) -> AuthorizeRequest {
    let scope = params.scope.as_deref().unwrap_or("openid profile");
    AuthorizeRequest {
        client_id: params.client_id.clone().unwrap_or_else(|| CLIENT_ID.to_string()),
        response_type: ResponseType::Code,
        redirect_uri: params.redirect_uri.clone().unwrap_or_else(|| REDIRECT_URI.to_string()),
        redirect_uri_requested: params.redirect_uri.is_some(),
        requested_scope: scope.split_whitespace().map(ToString::to_string).collect(),
        state: params.state.clone(),
        code_challenge: None,
        code_challenge_method: None,
    }
}

impl Engine for StubEngine {
    async fn pushed_authorize_request(
        &self, params: &AuthorizationParams, _: &ClientCredentials,
    ) -> Result<AuthorizeRequest> {
        self.record(EngineCall::PushedAuthorizeRequest)?;
        Ok(authorize_request(params))
    }

    async fn pushed_authorize_response(&self, _: &AuthorizeRequest) -> Result<PushedAuthorizeResponse> {
        self.record(EngineCall::PushedAuthorizeResponse)?;
        Ok(PushedAuthorizeResponse {
            request_uri: REQUEST_URI.to_string(),
            expires_in: 600,
        })
    }

    async fn authorize_request(&self, params: &AuthorizationParams) -> Result<AuthorizeRequest> {
        self.record(EngineCall::AuthorizeRequest)?;
        Ok(authorize_request(params))
    }

    async fn authorize_response(
        &self, request: &AuthorizeRequest, session: &Session,
    ) -> Result<AuthorizeResponse> {
        self.record(EngineCall::AuthorizeResponse)?;
        self.inner.lock().unwrap().authorized = Some((request.clone(), session.clone()));
        Ok(AuthorizeResponse {
            code: AUTH_CODE.to_string(),
            state: request.state.clone(),
            scope: None,
        })
    }

    async fn access_request(
        &self, _: &TokenRequest, _: &ClientCredentials,
    ) -> Result<AccessRequest> {
        self.record(EngineCall::AccessRequest)?;
        let inner = self.inner.lock().unwrap();
        let session = inner
            .access_session
            .clone()
            .or_else(|| inner.authorized.as_ref().map(|(_, s)| s.clone()))
            .unwrap_or_default();
        Ok(AccessRequest {
            client_id: CLIENT_ID.to_string(),
            granted_scope: vec!["openid".to_string(), "profile".to_string()],
            session,
        })
    }

    async fn access_response(&self, request: &AccessRequest) -> Result<AccessResponse> {
        self.record(EngineCall::AccessResponse)?;
        Ok(AccessResponse {
            access_token: ACCESS_TOKEN.to_string(),
            token_type: TokenType::Bearer,
            expires_in: 3600,
            scope: Some(request.granted_scope.join(" ")),
        })
    }
}
