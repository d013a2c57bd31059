//! An in-memory `OAuth 2.0` authorization server engine for the `OIDC4VC`
//! authorization proxy.
//!
//! The engine supports the authorization code grant with pushed authorization
//! requests (RFC 9126) and PKCE (RFC 7636). Clients are registered up front.
//! Pushed requests, authorization codes, and access tokens are held in memory
//! and expire after their configured lifespans. Authorization codes and
//! request URIs are single-use.

pub mod client;
pub mod pkce;

use std::sync::Arc;

use anyhow::Result;
use chrono::Duration;
use credibil_core::generate;
use credibil_core::state::State;
use credibil_oidc4vc::Error;
use credibil_oidc4vc::provider::Engine;
use credibil_oidc4vc::types::{
    AccessRequest, AccessResponse, AuthorizationParams, AuthorizeRequest, AuthorizeResponse,
    ClientCredentials, CodeChallengeMethod, PushedAuthorizeResponse, ResponseType, Session,
    TokenRequest, TokenType,
};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use self::client::{Client, Registry};

const REQUEST_URI_PREFIX: &str = "urn:ietf:params:oauth:request_uri:";
const AUTHORIZATION_CODE: &str = "authorization_code";

/// Engine settings.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Authorization code lifespan in seconds.
    pub code_lifespan_secs: i64,

    /// Access token lifespan in seconds.
    pub token_lifespan_secs: i64,

    /// Pushed request URI lifespan in seconds.
    pub par_lifespan_secs: i64,

    /// Require every authorization request to carry a PKCE code challenge.
    pub enforce_pkce: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            code_lifespan_secs: 900,
            token_lifespan_secs: 3600,
            par_lifespan_secs: 600,
            enforce_pkce: false,
        }
    }
}

#[derive(Clone, Debug)]
struct CodeGrant {
    request: AuthorizeRequest,
    session: Session,
}

/// In-memory `OAuth 2.0` engine.
#[derive(Clone, Debug)]
pub struct MemoryEngine {
    config: EngineConfig,
    registry: Arc<Registry>,
    pushed: Arc<DashMap<String, State<AuthorizeRequest>>>,
    codes: Arc<DashMap<String, State<CodeGrant>>>,
    tokens: Arc<DashMap<String, State<AccessRequest>>>,
}

impl MemoryEngine {
    /// Create an engine for the registered `clients`.
    #[must_use]
    pub fn new(config: EngineConfig, clients: impl IntoIterator<Item = Client>) -> Self {
        Self {
            config,
            registry: Arc::new(Registry::new(clients)),
            pushed: Arc::new(DashMap::new()),
            codes: Arc::new(DashMap::new()),
            tokens: Arc::new(DashMap::new()),
        }
    }

    /// Look up the grant behind an unexpired access token.
    #[must_use]
    pub fn introspect(&self, access_token: &str) -> Option<AccessRequest> {
        let entry = self.tokens.get(access_token)?;
        if entry.is_expired() {
            return None;
        }
        Some(entry.body.clone())
    }

    // Validate authorization parameters on behalf of `client`.
    fn validate(
        &self, client: &Client, params: &AuthorizationParams,
    ) -> Result<AuthorizeRequest, Error> {
        let Some(response_type) = params.response_type.as_deref() else {
            return Err(Error::InvalidRequest("`response_type` is required".to_string()));
        };
        let response_type: ResponseType = response_type.parse()?;
        if !client.response_types.iter().any(|r| r == "code") {
            return Err(Error::UnauthorizedClient(
                "client may not use response_type `code`".to_string(),
            ));
        }

        let redirect_uri = client.redirect_uri(params.redirect_uri.as_deref())?;

        let requested_scope: Vec<String> = params
            .scope
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(ToString::to_string)
            .collect();
        client.check_scopes(&requested_scope)?;

        let code_challenge_method = match (&params.code_challenge, &params.code_challenge_method) {
            (None, _) if self.config.enforce_pkce => {
                return Err(Error::InvalidRequest("`code_challenge` is required".to_string()));
            }
            (None, _) => None,
            (Some(challenge), method) => {
                pkce::check_format("code_challenge", challenge)?;
                Some(method.as_deref().map_or(Ok(CodeChallengeMethod::Plain), str::parse)?)
            }
        };

        Ok(AuthorizeRequest {
            client_id: client.id.clone(),
            response_type,
            redirect_uri,
            redirect_uri_requested: params.redirect_uri.is_some(),
            requested_scope,
            state: params.state.clone(),
            code_challenge: params.code_challenge.clone(),
            code_challenge_method,
        })
    }

    // Resolve and consume a pushed request URI.
    fn take_pushed(
        &self, request_uri: &str, client_id: Option<&str>,
    ) -> Result<AuthorizeRequest, Error> {
        let Some((_, state)) = self.pushed.remove(request_uri) else {
            return Err(Error::InvalidRequest("`request_uri` is invalid".to_string()));
        };
        if state.is_expired() {
            return Err(Error::InvalidRequest("`request_uri` has expired".to_string()));
        }
        if client_id.is_some_and(|id| id != state.body.client_id) {
            return Err(Error::InvalidRequest(
                "`client_id` differs from pushed request".to_string(),
            ));
        }
        Ok(state.body)
    }
}

impl Engine for MemoryEngine {
    async fn pushed_authorize_request(
        &self, params: &AuthorizationParams, credentials: &ClientCredentials,
    ) -> Result<AuthorizeRequest> {
        if params.request_uri.is_some() {
            return Err(Error::InvalidRequest("`request_uri` is not allowed".to_string()).into());
        }
        let client = self.registry.authenticate(credentials)?;
        Ok(self.validate(client, params)?)
    }

    async fn pushed_authorize_response(
        &self, request: &AuthorizeRequest,
    ) -> Result<PushedAuthorizeResponse> {
        let request_uri = format!("{REQUEST_URI_PREFIX}{}", generate::uri_token());
        let lifespan = Duration::seconds(self.config.par_lifespan_secs);
        self.pushed.retain(|_, s| !s.is_expired());
        self.pushed.insert(request_uri.clone(), State::new(request.clone(), lifespan));

        Ok(PushedAuthorizeResponse {
            request_uri,
            expires_in: lifespan.num_seconds(),
        })
    }

    async fn authorize_request(&self, params: &AuthorizationParams) -> Result<AuthorizeRequest> {
        if let Some(request_uri) = &params.request_uri {
            let mut request = self.take_pushed(request_uri, params.client_id.as_deref())?;
            if params.state.is_some() {
                request.state.clone_from(&params.state);
            }
            return Ok(request);
        }

        let Some(client_id) = params.client_id.as_deref() else {
            return Err(Error::InvalidRequest("`client_id` is required".to_string()).into());
        };
        let client = self.registry.get(client_id)?;
        Ok(self.validate(client, params)?)
    }

    async fn authorize_response(
        &self, request: &AuthorizeRequest, session: &Session,
    ) -> Result<AuthorizeResponse> {
        let code = generate::auth_code();
        let grant = CodeGrant {
            request: request.clone(),
            session: session.clone(),
        };
        let lifespan = Duration::seconds(self.config.code_lifespan_secs);
        self.codes.retain(|_, s| !s.is_expired());
        self.codes.insert(code.clone(), State::new(grant, lifespan));
        debug!(client_id = %request.client_id, "issued authorization code");

        Ok(AuthorizeResponse {
            code,
            state: request.state.clone(),
            scope: None,
        })
    }

    async fn access_request(
        &self, request: &TokenRequest, credentials: &ClientCredentials,
    ) -> Result<AccessRequest> {
        let client = self.registry.authenticate(credentials)?;

        if request.grant_type != AUTHORIZATION_CODE {
            return Err(Error::UnsupportedGrantType(format!(
                "unsupported grant_type `{}`",
                request.grant_type
            ))
            .into());
        }
        if !client.grant_types.iter().any(|g| g == AUTHORIZATION_CODE) {
            return Err(Error::UnauthorizedClient(
                "client may not use grant_type `authorization_code`".to_string(),
            )
            .into());
        }

        let Some(code) = request.code.as_deref() else {
            return Err(Error::InvalidRequest("`code` is required".to_string()).into());
        };
        let Some((_, state)) = self.codes.remove(code) else {
            return Err(Error::InvalidGrant("authorization code is invalid".to_string()).into());
        };
        if state.is_expired() {
            return Err(Error::InvalidGrant("authorization code has expired".to_string()).into());
        }
        let grant = state.body;

        if grant.request.client_id != client.id {
            return Err(Error::InvalidGrant(
                "authorization code was issued to another client".to_string(),
            )
            .into());
        }

        // redirect_uri must be repeated when sent with the authorization request
        match request.redirect_uri.as_deref() {
            Some(uri) if uri != grant.request.redirect_uri => {
                return Err(Error::InvalidGrant(
                    "`redirect_uri` differs from authorized one".to_string(),
                )
                .into());
            }
            None if grant.request.redirect_uri_requested => {
                return Err(Error::InvalidGrant("`redirect_uri` is missing".to_string()).into());
            }
            _ => {}
        }

        if let Some(challenge) = &grant.request.code_challenge {
            let method = grant.request.code_challenge_method.unwrap_or(CodeChallengeMethod::Plain);
            pkce::verify(challenge, method, request.code_verifier.as_deref())?;
        }

        Ok(AccessRequest {
            client_id: client.id.clone(),
            granted_scope: grant.request.requested_scope,
            session: grant.session,
        })
    }

    async fn access_response(&self, request: &AccessRequest) -> Result<AccessResponse> {
        let access_token = generate::token();
        let lifespan = Duration::seconds(self.config.token_lifespan_secs);
        self.tokens.retain(|_, s| !s.is_expired());
        self.tokens.insert(access_token.clone(), State::new(request.clone(), lifespan));

        let scope = (!request.granted_scope.is_empty()).then(|| request.granted_scope.join(" "));
        Ok(AccessResponse {
            access_token,
            token_type: TokenType::Bearer,
            expires_in: lifespan.num_seconds(),
            scope,
        })
    }
}
