//! # HTTP Clients
//!
//! [`IssuerClient`] implements [`IssuerInteraction`] against the Issuer's
//! interaction API and [`IdpClient`] implements [`IdentityProvider`]. Both
//! return the upstream status and body untouched so handlers can decide
//! what counts as success.

use std::time::Duration;

use anyhow::{Context as _, Result, anyhow};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::provider::{IdentityProvider, IssuerInteraction, UpstreamResponse};
use crate::types::{
    ExchangeAuthorizationCodeRequest, IdpPushedAuthorizationRequest,
    PrepareClaimDataAuthorizationRequest, PushAuthorizationDetailsRequest,
    StoreAuthorizationCodeRequest,
};

/// Default timeout for upstream requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const API_KEY_HEADER: &str = "X-API-Key";
const PREPARE_PATH: &str = "/issuer/interactions/prepare-claim-data-authz-request";
const PUSH_DETAILS_PATH: &str = "/issuer/interactions/push-authorization-request";
const STORE_CODE_PATH: &str = "/issuer/interactions/store-authorization-code";
const EXCHANGE_CODE_PATH: &str = "/issuer/interactions/exchange-auth-code";

/// Client for the Issuer's interaction API.
#[derive(Clone, Debug)]
pub struct IssuerClient {
    base_url: String,
    api_key: Option<String>,
    http: Client,
}

impl IssuerClient {
    /// Create a client for the Issuer at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build().context("building http client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            http,
        })
    }

    /// Send `key` in the `X-API-Key` header of every request.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    async fn post<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<UpstreamResponse> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "calling issuer");

        let mut request = self.http.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        into_upstream(request.send().await?).await
    }
}

impl IssuerInteraction for IssuerClient {
    async fn prepare_authorization_request(
        &self, request: &PrepareClaimDataAuthorizationRequest,
    ) -> Result<UpstreamResponse> {
        self.post(PREPARE_PATH, request).await
    }

    async fn push_authorization_details(
        &self, request: &PushAuthorizationDetailsRequest,
    ) -> Result<UpstreamResponse> {
        self.post(PUSH_DETAILS_PATH, request).await
    }

    async fn store_authorization_code(
        &self, request: &StoreAuthorizationCodeRequest,
    ) -> Result<UpstreamResponse> {
        self.post(STORE_CODE_PATH, request).await
    }

    async fn exchange_authorization_code(
        &self, request: &ExchangeAuthorizationCodeRequest,
    ) -> Result<UpstreamResponse> {
        self.post(EXCHANGE_CODE_PATH, request).await
    }
}

/// Client for third-party Identity Providers.
#[derive(Clone, Debug)]
pub struct IdpClient {
    http: Client,
}

impl IdpClient {
    /// Create a client using `timeout` for each request.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build().context("building http client")?;
        Ok(Self { http })
    }
}

impl IdentityProvider for IdpClient {
    async fn push_authorization_request(
        &self, endpoint: &str, request: &IdpPushedAuthorizationRequest, client_secret: &str,
    ) -> Result<UpstreamResponse> {
        debug!(%endpoint, "pushing authorization request to identity provider");
        let response = self
            .http
            .post(endpoint)
            .basic_auth(&request.client_id, Some(client_secret))
            .form(request)
            .send()
            .await?;
        into_upstream(response).await
    }
}

async fn into_upstream(response: reqwest::Response) -> Result<UpstreamResponse> {
    let mut builder = http::Response::builder().status(response.status());
    for (k, v) in response.headers() {
        builder = builder.header(k, v);
    }
    Ok(builder.body(response.bytes().await?.to_vec())?)
}

/// Fail unless the upstream response has a success status.
///
/// # Errors
///
/// Returns `status code <n>` for any non-2xx status.
pub fn check_status(response: &UpstreamResponse) -> Result<()> {
    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("status code {}", status.as_u16()));
    }
    Ok(())
}

/// Check the upstream status and decode the JSON body.
///
/// # Errors
///
/// Returns an error for non-2xx status codes or a body that does not decode
/// to `T`.
pub fn decode<T: DeserializeOwned>(response: &UpstreamResponse) -> Result<T> {
    check_status(response)?;
    serde_json::from_slice(response.body()).context("decoding response")
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::types::PushedAuthorizeResponse;

    fn response(status: StatusCode, body: &str) -> UpstreamResponse {
        http::Response::builder().status(status).body(body.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn non_success() {
        let err = check_status(&response(StatusCode::INTERNAL_SERVER_ERROR, "")).unwrap_err();
        assert_eq!(err.to_string(), "status code 500");
        assert!(check_status(&response(StatusCode::NO_CONTENT, "")).is_ok());
    }

    #[test]
    fn decode_body() {
        let ok = response(StatusCode::CREATED, r#"{"request_uri":"urn:x","expires_in":60}"#);
        let par: PushedAuthorizeResponse = decode(&ok).expect("should decode");
        assert_eq!(par.expires_in, 60);

        let bad = response(StatusCode::OK, "not json");
        assert!(decode::<PushedAuthorizeResponse>(&bad).is_err());
    }
}
