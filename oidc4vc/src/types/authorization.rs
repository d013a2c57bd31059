use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Error;

/// The only supported `authorization_details` type.
pub const OPENID_CREDENTIAL: &str = "openid_credential";

/// Authorization request parameters common to the pushed authorization
/// request and authorization endpoints. Values are kept as received so the
/// engine can reject them with the appropriate `OAuth 2.0` error.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct AuthorizationParams {
    /// `OAuth 2.0` response type. Only `code` is supported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_type: Option<String>,

    /// The Wallet's client identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// The Wallet's redirection endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,

    /// Space-delimited scopes requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Client state returned to the Wallet with the authorization response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// PKCE code challenge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<String>,

    /// PKCE code challenge method: `S256` or `plain`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge_method: Option<String>,

    /// Reference to a previously pushed authorization request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_uri: Option<String>,
}

impl AuthorizationParams {
    /// Create a new `AuthorizationParamsBuilder`.
    #[must_use]
    pub fn builder() -> AuthorizationParamsBuilder {
        AuthorizationParamsBuilder::default()
    }
}

/// Build [`AuthorizationParams`].
#[derive(Debug, Default)]
pub struct AuthorizationParamsBuilder {
    params: AuthorizationParams,
}

impl AuthorizationParamsBuilder {
    /// Specify the response type.
    #[must_use]
    pub fn response_type(mut self, response_type: impl Into<String>) -> Self {
        self.params.response_type = Some(response_type.into());
        self
    }

    /// Specify the Wallet's client ID.
    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.params.client_id = Some(client_id.into());
        self
    }

    /// Specify the Wallet's redirection endpoint.
    #[must_use]
    pub fn redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.params.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Specify the space-delimited scopes.
    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.params.scope = Some(scope.into());
        self
    }

    /// Specify the client state.
    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.params.state = Some(state.into());
        self
    }

    /// Specify the PKCE code challenge and its method.
    #[must_use]
    pub fn code_challenge(
        mut self, code_challenge: impl Into<String>, method: impl Into<String>,
    ) -> Self {
        self.params.code_challenge = Some(code_challenge.into());
        self.params.code_challenge_method = Some(method.into());
        self
    }

    /// Specify a previously pushed request URI.
    #[must_use]
    pub fn request_uri(mut self, request_uri: impl Into<String>) -> Self {
        self.params.request_uri = Some(request_uri.into());
        self
    }

    /// Build the parameters.
    #[must_use]
    pub fn build(self) -> AuthorizationParams {
        self.params
    }
}

/// Raw client authentication material presented with a request. The engine
/// is responsible for interpreting it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientCredentials {
    /// The `Authorization` header value, if any.
    pub authorization: Option<String>,

    /// `client_id` form parameter.
    pub client_id: Option<String>,

    /// `client_secret` form parameter.
    pub client_secret: Option<String>,
}

/// Pushed Authorization Request (RFC 9126) sent by the Wallet to the proxy.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PushedAuthorizationRequest {
    /// Standard authorization request parameters.
    #[serde(flatten)]
    pub params: AuthorizationParams,

    /// Client secret when authenticating with form parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// The Issuer's correlation key for this issuance.
    #[serde(default)]
    pub op_state: String,

    /// JSON-encoded authorization details.
    #[serde(default)]
    pub authorization_details: String,
}

impl PushedAuthorizationRequest {
    /// Client credentials carried in the request body.
    #[must_use]
    pub fn credentials(&self, authorization: Option<String>) -> ClientCredentials {
        ClientCredentials {
            authorization,
            client_id: self.params.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }
}

/// Authorization request sent by the Wallet to the proxy's authorization
/// endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct AuthorizationRequest {
    /// Standard authorization request parameters.
    #[serde(flatten)]
    pub params: AuthorizationParams,

    /// The Issuer's correlation key for this issuance.
    #[serde(default)]
    pub op_state: String,
}

/// Callback from the third-party Identity Provider.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RedirectRequest {
    /// Authorization code issued by the Identity Provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Echoes the `op_state` sent to the Identity Provider.
    #[serde(default)]
    pub state: String,

    /// Error code when the Identity Provider declined the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Error description accompanying `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

/// Token request sent by the Wallet.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TokenRequest {
    /// Grant type. Only `authorization_code` is supported.
    pub grant_type: String,

    /// The proxy-issued authorization code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Redirect URI used in the authorization request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,

    /// PKCE code verifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_verifier: Option<String>,

    /// Client ID when authenticating with form parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Client secret when authenticating with form parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

impl TokenRequest {
    /// Client credentials carried in the request body.
    #[must_use]
    pub fn credentials(&self, authorization: Option<String>) -> ClientCredentials {
        ClientCredentials {
            authorization,
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }
}

/// A single `authorization_details` entry (RFC 9396) as used by `OpenID` for
/// Verifiable Credential Issuance.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct AuthorizationDetails {
    /// Authorization details type. Must be `openid_credential`.
    pub r#type: String,

    /// Credential types requested.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,

    /// Requested credential format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Credential Issuer locations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<String>>,

    /// Additional members, forwarded to the Issuer untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthorizationDetails {
    /// Decode JSON-encoded authorization details and check their type.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` when the value is not well-formed JSON and
    /// `InvalidAuthorizationDetails` when the type is not `openid_credential`.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let details: Self = serde_json::from_str(raw).map_err(|e| {
            Error::InvalidRequest(format!("invalid-value[authorization_details]: {e}"))
        })?;
        details.validate()?;
        Ok(details)
    }

    /// Check the authorization details type is supported.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAuthorizationDetails` when the type is not
    /// `openid_credential`.
    pub fn validate(&self) -> Result<(), Error> {
        if self.r#type != OPENID_CREDENTIAL {
            return Err(Error::InvalidAuthorizationDetails(format!(
                "invalid-value[authorization_details.type]: type should be '{OPENID_CREDENTIAL}'"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_details() {
        let raw = r#"{"type":"openid_credential","format":"jwt_vc","types":["VerifiableCredential","UniversityDegreeCredential"],"locations":["https://issuer.example.com"]}"#;
        let details = AuthorizationDetails::parse(raw).expect("should parse");
        assert_eq!(details.format.as_deref(), Some("jwt_vc"));
        assert_eq!(details.types.len(), 2);
    }

    #[test]
    fn keeps_unknown_members() {
        let raw = r#"{"type":"openid_credential","credential_configuration_id":"EmployeeID"}"#;
        let details = AuthorizationDetails::parse(raw).expect("should parse");
        let json = serde_json::to_value(&details).expect("should serialize");
        assert_eq!(json["credential_configuration_id"], "EmployeeID");
    }

    #[test]
    fn malformed_details() {
        let err = AuthorizationDetails::parse("invalid").expect_err("should fail");
        assert!(matches!(&err, Error::InvalidRequest(d) if d.starts_with("invalid-value[authorization_details]")));
    }

    #[test]
    fn unsupported_type() {
        let err = AuthorizationDetails::parse(r#"{"type":"invalid","format":"jwt_vc"}"#)
            .expect_err("should fail");
        assert_eq!(
            err,
            Error::InvalidAuthorizationDetails(
                "invalid-value[authorization_details.type]: type should be 'openid_credential'"
                    .to_string()
            )
        );
    }

    #[test]
    fn par_form() {
        let form = "response_type=code&client_id=wallet&op_state=opState&authorization_details=%7B%22type%22%3A%22openid_credential%22%7D";
        let par: PushedAuthorizationRequest = serde_urlencoded::from_str(form).expect("should decode");
        assert_eq!(par.params.client_id.as_deref(), Some("wallet"));
        assert_eq!(par.op_state, "opState");
        assert_eq!(par.authorization_details, r#"{"type":"openid_credential"}"#);
    }
}
