//! # Mock Issuer and Identity Provider
//!
//! Each upstream operation returns a configurable [`Outcome`] and records the
//! request it was called with.

use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use credibil_oidc4vc::provider::{IdentityProvider, IssuerInteraction, UpstreamResponse};
use credibil_oidc4vc::types::{
    ExchangeAuthorizationCodeRequest, IdpPushedAuthorizationRequest,
    PrepareClaimDataAuthorizationRequest, PushAuthorizationDetailsRequest,
    StoreAuthorizationCodeRequest,
};
use serde_json::json;

/// Identity Provider authorization endpoint returned by default.
pub const IDP_AUTHORIZE: &str = "https://idp.example.com/oauth2/authorize";
/// Identity Provider client ID returned by default.
pub const IDP_CLIENT_ID: &str = "idp-client";
/// Identity Provider client secret returned by default.
pub const IDP_CLIENT_SECRET: &str = "idp-secret";

/// The result of an upstream call.
#[derive(Clone, Debug)]
pub enum Outcome {
    /// Respond with the status code and body.
    Respond(u16, String),

    /// Fail before a response is received.
    Fail(String),
}

impl Default for Outcome {
    fn default() -> Self {
        Self::Respond(200, String::new())
    }
}

impl Outcome {
    fn into_response(self) -> Result<UpstreamResponse> {
        match self {
            Self::Respond(status, body) => {
                Ok(http::Response::builder().status(status).body(body.into_bytes())?)
            }
            Self::Fail(msg) => Err(anyhow!(msg)),
        }
    }
}

/// Requests received by the mock Issuer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IssuerCall {
    /// Prepare claim data authorization.
    Prepare(PrepareClaimDataAuthorizationRequest),
    /// Push authorization details.
    PushDetails(PushAuthorizationDetailsRequest),
    /// Store authorization code.
    StoreCode(StoreAuthorizationCodeRequest),
    /// Exchange authorization code.
    ExchangeCode(ExchangeAuthorizationCodeRequest),
}

#[derive(Debug)]
struct IssuerInner {
    prepare: Outcome,
    push_details: Outcome,
    store_code: Outcome,
    exchange_code: Outcome,
    calls: Vec<IssuerCall>,
}

impl Default for IssuerInner {
    fn default() -> Self {
        Self {
            prepare: Outcome::Respond(200, prepare_body(None)),
            push_details: Outcome::default(),
            store_code: Outcome::default(),
            exchange_code: Outcome::default(),
            calls: vec![],
        }
    }
}

/// A prepare claim data authorization response body pointing at the default
/// Identity Provider, optionally with a pushed authorization request
/// endpoint.
#[must_use]
pub fn prepare_body(par_endpoint: Option<&str>) -> String {
    let mut body = json!({
        "authorization_endpoint": IDP_AUTHORIZE,
        "authorization_request": {
            "client_id": IDP_CLIENT_ID,
            "client_secret": IDP_CLIENT_SECRET,
            "response_type": "code",
            "scope": ["openid", "profile"]
        }
    });
    if let Some(endpoint) = par_endpoint {
        body["pushed_authorization_request_endpoint"] = json!(endpoint);
    }
    body.to_string()
}

/// Mock Issuer interaction API.
#[derive(Clone, Debug, Default)]
pub struct MockIssuer {
    inner: Arc<Mutex<IssuerInner>>,
}

impl MockIssuer {
    /// Set the outcome of prepare claim data authorization.
    pub fn on_prepare(&self, outcome: Outcome) {
        self.inner.lock().unwrap().prepare = outcome;
    }

    /// Set the outcome of push authorization details.
    pub fn on_push_details(&self, outcome: Outcome) {
        self.inner.lock().unwrap().push_details = outcome;
    }

    /// Set the outcome of store authorization code.
    pub fn on_store_code(&self, outcome: Outcome) {
        self.inner.lock().unwrap().store_code = outcome;
    }

    /// Set the outcome of exchange authorization code.
    pub fn on_exchange_code(&self, outcome: Outcome) {
        self.inner.lock().unwrap().exchange_code = outcome;
    }

    /// Requests received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<IssuerCall> {
        self.inner.lock().unwrap().calls.clone()
    }
}

impl IssuerInteraction for MockIssuer {
    async fn prepare_authorization_request(
        &self, request: &PrepareClaimDataAuthorizationRequest,
    ) -> Result<UpstreamResponse> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(IssuerCall::Prepare(request.clone()));
        inner.prepare.clone().into_response()
    }

    async fn push_authorization_details(
        &self, request: &PushAuthorizationDetailsRequest,
    ) -> Result<UpstreamResponse> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(IssuerCall::PushDetails(request.clone()));
        inner.push_details.clone().into_response()
    }

    async fn store_authorization_code(
        &self, request: &StoreAuthorizationCodeRequest,
    ) -> Result<UpstreamResponse> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(IssuerCall::StoreCode(request.clone()));
        inner.store_code.clone().into_response()
    }

    async fn exchange_authorization_code(
        &self, request: &ExchangeAuthorizationCodeRequest,
    ) -> Result<UpstreamResponse> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(IssuerCall::ExchangeCode(request.clone()));
        inner.exchange_code.clone().into_response()
    }
}

/// A pushed authorization request received by the mock Identity Provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdpCall {
    /// Endpoint the request was pushed to.
    pub endpoint: String,
    /// The pushed request.
    pub request: IdpPushedAuthorizationRequest,
    /// Client secret used to authenticate.
    pub client_secret: String,
}

#[derive(Debug)]
struct IdpInner {
    outcome: Outcome,
    calls: Vec<IdpCall>,
}

impl Default for IdpInner {
    fn default() -> Self {
        Self {
            outcome: Outcome::Respond(
                201,
                json!({"request_uri": "urn:idp:request", "expires_in": 60}).to_string(),
            ),
            calls: vec![],
        }
    }
}

/// Mock Identity Provider.
#[derive(Clone, Debug, Default)]
pub struct MockIdp {
    inner: Arc<Mutex<IdpInner>>,
}

impl MockIdp {
    /// Set the outcome of pushed authorization requests.
    pub fn on_push(&self, outcome: Outcome) {
        self.inner.lock().unwrap().outcome = outcome;
    }

    /// Requests received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<IdpCall> {
        self.inner.lock().unwrap().calls.clone()
    }
}

impl IdentityProvider for MockIdp {
    async fn push_authorization_request(
        &self, endpoint: &str, request: &IdpPushedAuthorizationRequest, client_secret: &str,
    ) -> Result<UpstreamResponse> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(IdpCall {
            endpoint: endpoint.to_string(),
            request: request.clone(),
            client_secret: client_secret.to_string(),
        });
        inner.outcome.clone().into_response()
    }
}
