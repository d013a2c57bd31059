//! # Client Registry
//!
//! Registered Wallet clients and client authentication, either HTTP Basic
//! (`client_secret_basic`) or form parameters (`client_secret_post`). Public
//! clients have no secret and identify themselves with `client_id` alone.

use std::collections::HashMap;

use base64ct::{Base64, Encoding};
use credibil_oidc4vc::Error;
use credibil_oidc4vc::types::ClientCredentials;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// A registered client.
///
/// Unless set, clients may use response type `code` and grant type
/// `authorization_code`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Client {
    /// Client identifier.
    pub id: String,

    /// Client secret. Public clients have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    /// Registered redirect URIs.
    #[serde(default)]
    pub redirect_uris: Vec<String>,

    /// Permitted response types.
    #[serde(default = "default_response_types")]
    pub response_types: Vec<String>,

    /// Permitted grant types.
    #[serde(default = "default_grant_types")]
    pub grant_types: Vec<String>,

    /// Permitted scopes.
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl Default for Client {
    fn default() -> Self {
        Self {
            id: String::new(),
            secret: None,
            redirect_uris: vec![],
            response_types: default_response_types(),
            grant_types: default_grant_types(),
            scopes: vec![],
        }
    }
}

fn default_response_types() -> Vec<String> {
    vec!["code".to_string()]
}

fn default_grant_types() -> Vec<String> {
    vec!["authorization_code".to_string()]
}

impl Client {
    /// Check the client may request `scope`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidScope` for the first scope not registered.
    pub fn check_scopes(&self, scopes: &[String]) -> Result<(), Error> {
        if let Some(unknown) = scopes.iter().find(|s| !self.scopes.contains(s)) {
            return Err(Error::InvalidScope(format!("scope `{unknown}` is not permitted")));
        }
        Ok(())
    }

    /// Resolve the redirect URI to use for an authorization request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` when `requested` is not registered, or when it
    /// is absent and the client has more than one registered URI.
    pub fn redirect_uri(&self, requested: Option<&str>) -> Result<String, Error> {
        match requested {
            Some(uri) if self.redirect_uris.iter().any(|r| r == uri) => Ok(uri.to_string()),
            Some(uri) => Err(Error::InvalidRequest(format!("redirect_uri `{uri}` is not registered"))),
            None if self.redirect_uris.len() == 1 => Ok(self.redirect_uris[0].clone()),
            None => Err(Error::InvalidRequest("`redirect_uri` is required".to_string())),
        }
    }
}

/// Registered clients, keyed by client ID.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    clients: HashMap<String, Client>,
}

impl Registry {
    /// Create a registry from a list of clients.
    #[must_use]
    pub fn new(clients: impl IntoIterator<Item = Client>) -> Self {
        Self {
            clients: clients.into_iter().map(|c| (c.id.clone(), c)).collect(),
        }
    }

    /// Look up a client by ID.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClient` for unknown clients.
    pub fn get(&self, client_id: &str) -> Result<&Client, Error> {
        self.clients
            .get(client_id)
            .ok_or_else(|| Error::InvalidClient(format!("unknown client `{client_id}`")))
    }

    /// Authenticate the client presenting `credentials`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClient` when the client is unknown, presents more than
    /// one authentication method, or its secret does not match.
    pub fn authenticate(&self, credentials: &ClientCredentials) -> Result<&Client, Error> {
        let basic = match &credentials.authorization {
            Some(header) => Some(decode_basic(header)?),
            None => None,
        };
        if basic.is_some() && credentials.client_secret.is_some() {
            return Err(Error::InvalidClient(
                "multiple client authentication methods".to_string(),
            ));
        }

        let (client_id, secret) = match basic {
            Some((id, secret)) => {
                if credentials.client_id.as_ref().is_some_and(|c| c != &id) {
                    return Err(Error::InvalidClient("`client_id` mismatch".to_string()));
                }
                (id, Some(secret))
            }
            None => {
                let Some(id) = credentials.client_id.clone() else {
                    return Err(Error::InvalidClient("client authentication missing".to_string()));
                };
                (id, credentials.client_secret.clone())
            }
        };

        let client = self.get(&client_id)?;
        match (&client.secret, secret) {
            (None, _) => Ok(client),
            (Some(expected), Some(presented))
                if bool::from(expected.as_bytes().ct_eq(presented.as_bytes())) =>
            {
                Ok(client)
            }
            _ => Err(Error::InvalidClient("client authentication failed".to_string())),
        }
    }
}

// Decode an `Authorization: Basic` header into client ID and secret.
fn decode_basic(header: &str) -> Result<(String, String), Error> {
    let invalid = || Error::InvalidClient("malformed `Authorization` header".to_string());

    let Some(encoded) = header.strip_prefix("Basic ").or_else(|| header.strip_prefix("basic "))
    else {
        return Err(invalid());
    };
    let decoded = Base64::decode_vec(encoded.trim()).map_err(|_| invalid())?;
    let decoded = String::from_utf8(decoded).map_err(|_| invalid())?;
    let Some((id, secret)) = decoded.split_once(':') else {
        return Err(invalid());
    };

    // RFC 6749 2.3.1: both values are form-urlencoded before encoding
    let unescape = |s: &str| {
        percent_decode_str(&s.replace('+', " ")).decode_utf8().map(|s| s.to_string())
    };
    Ok((unescape(id).map_err(|_| invalid())?, unescape(secret).map_err(|_| invalid())?))
}
