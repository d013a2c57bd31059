use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Error;

/// Session extras key holding the Issuer's `op_state`.
pub const OP_STATE_KEY: &str = "opState";

/// Supported `OAuth 2.0` response types.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Authorization code flow.
    #[default]
    Code,
}

impl Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code => write!(f, "code"),
        }
    }
}

impl FromStr for ResponseType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "code" => Ok(Self::Code),
            _ => Err(Error::UnsupportedResponseType(format!("unsupported response_type `{s}`"))),
        }
    }
}

/// PKCE code challenge methods.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum CodeChallengeMethod {
    /// Challenge is the verifier.
    #[serde(rename = "plain")]
    Plain,

    /// Challenge is the base64url-encoded SHA-256 hash of the verifier.
    #[default]
    S256,
}

impl FromStr for CodeChallengeMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S256" => Ok(Self::S256),
            "plain" => Ok(Self::Plain),
            _ => Err(Error::InvalidRequest(format!("unsupported code_challenge_method `{s}`"))),
        }
    }
}

/// Access token type.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum TokenType {
    /// Bearer token.
    #[default]
    Bearer,
}

/// Session attached to an authorization grant. Extras set when the
/// authorization code is issued are available when it is redeemed.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Session {
    /// Arbitrary session values.
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl Session {
    /// Create a session carrying the Issuer's `op_state`.
    #[must_use]
    pub fn with_op_state(op_state: impl Into<String>) -> Self {
        let mut session = Self::default();
        session.set_extra(OP_STATE_KEY, op_state.into());
        session
    }

    /// Set a session extra.
    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extra.insert(key.into(), value.into());
    }

    /// The string value of a session extra, if present.
    #[must_use]
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    /// The Issuer's `op_state`, if set.
    #[must_use]
    pub fn op_state(&self) -> Option<&str> {
        self.extra_str(OP_STATE_KEY).filter(|s| !s.is_empty())
    }
}

/// A validated authorization request produced by the engine.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct AuthorizeRequest {
    /// The authenticated or identified client.
    pub client_id: String,

    /// Requested response type.
    pub response_type: ResponseType,

    /// Effective redirect URI for the Wallet.
    pub redirect_uri: String,

    /// Whether `redirect_uri` was sent by the client, requiring it to be
    /// repeated at the token endpoint.
    #[serde(default)]
    pub redirect_uri_requested: bool,

    /// Requested scopes.
    #[serde(default)]
    pub requested_scope: Vec<String>,

    /// State returned with the authorization response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// PKCE code challenge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<String>,

    /// PKCE code challenge method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge_method: Option<CodeChallengeMethod>,
}

/// Response to a successfully pushed authorization request.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PushedAuthorizeResponse {
    /// Reference to the pushed request for use at the authorization endpoint.
    pub request_uri: String,

    /// Lifetime of `request_uri` in seconds.
    pub expires_in: i64,
}

/// Authorization response parameters returned to the Wallet's redirect URI.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct AuthorizeResponse {
    /// Proxy-issued authorization code.
    pub code: String,

    /// Client state, always the Issuer's `op_state` in this flow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Granted scope, when it differs from that requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl AuthorizeResponse {
    /// Response parameters in the order they are appended to the redirect
    /// URI.
    #[must_use]
    pub fn parameters(&self) -> Vec<(&str, &str)> {
        let mut params = vec![("code", self.code.as_str())];
        if let Some(state) = &self.state {
            params.push(("state", state));
        }
        if let Some(scope) = &self.scope {
            params.push(("scope", scope));
        }
        params
    }
}

/// A validated token request produced by the engine.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct AccessRequest {
    /// The authenticated client.
    pub client_id: String,

    /// Scopes granted with the authorization code.
    #[serde(default)]
    pub granted_scope: Vec<String>,

    /// Session recorded when the authorization code was issued.
    #[serde(default)]
    pub session: Session,
}

/// Successful token response.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct AccessResponse {
    /// Opaque bearer access token.
    pub access_token: String,

    /// Token type.
    pub token_type: TokenType,

    /// Token lifetime in seconds.
    pub expires_in: i64,

    /// Granted scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// A redirect to be returned to the caller as `303 See Other`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RedirectResponse {
    /// Target URL.
    pub location: String,
}
