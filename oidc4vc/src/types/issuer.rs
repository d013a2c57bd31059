//! Messages exchanged with the Issuer's interaction API.

use serde::{Deserialize, Serialize};

use crate::types::AuthorizationDetails;

/// Asks the Issuer where, and with which client parameters, the user should
/// authenticate.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PrepareClaimDataAuthorizationRequest {
    /// The Wallet's requested response type.
    pub response_type: String,

    /// The Issuer's correlation key.
    pub op_state: String,

    /// Scopes requested by the Wallet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Vec<String>>,
}

/// Identity Provider details returned by the Issuer.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PrepareClaimDataAuthorizationResponse {
    /// The Identity Provider's authorization endpoint.
    pub authorization_endpoint: String,

    /// `OAuth 2.0` client parameters to use with the Identity Provider.
    pub authorization_request: OAuthParameters,

    /// The Identity Provider's pushed authorization request endpoint, when it
    /// requires one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pushed_authorization_request_endpoint: Option<String>,
}

/// The proxy's client registration at the Identity Provider.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct OAuthParameters {
    /// Client ID registered with the Identity Provider.
    pub client_id: String,

    /// Client secret registered with the Identity Provider.
    #[serde(default)]
    pub client_secret: String,

    /// Response type to request.
    pub response_type: String,

    /// Scopes to request.
    #[serde(default)]
    pub scope: Vec<String>,
}

/// Forwards validated authorization details to the Issuer.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PushAuthorizationDetailsRequest {
    /// Authorization details pushed by the Wallet.
    pub authorization_details: AuthorizationDetails,

    /// The Issuer's correlation key.
    pub op_state: String,
}

/// Hands the Identity Provider's authorization code to the Issuer.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct StoreAuthorizationCodeRequest {
    /// Authorization code issued by the Identity Provider.
    pub code: String,

    /// The Issuer's correlation key.
    pub op_state: String,
}

/// Asks the Issuer to redeem the Identity Provider's authorization code.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ExchangeAuthorizationCodeRequest {
    /// The Issuer's correlation key.
    pub op_state: String,
}

/// Pushed authorization request sent to the Identity Provider.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct IdpPushedAuthorizationRequest {
    /// Client ID registered with the Identity Provider.
    pub client_id: String,

    /// Response type to request.
    pub response_type: String,

    /// Space-delimited scopes.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub scope: String,

    /// The Issuer's correlation key, echoed back to the redirect endpoint.
    pub state: String,

    /// The proxy's redirect endpoint.
    pub redirect_uri: String,
}
