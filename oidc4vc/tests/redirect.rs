//! Identity Provider Redirect Tests

use std::collections::HashMap;

use credibil_oidc4vc::provider::StateStore;
use credibil_oidc4vc::store::AuthorizeState;
use credibil_oidc4vc::types::{AuthorizeResponse, RedirectRequest, RedirectResponse};
use credibil_oidc4vc::{Error, Response};
use http::StatusCode;
use test_utils::{HOST, IssuerCall, Outcome, TestProvider};
use url::Url;

const OP_STATE: &str = "opState";
const WALLET_REDIRECT: &str = "https://wallet.example.com/cb";

async fn provider_with_state() -> TestProvider {
    let provider = test_utils::provider();
    let state = AuthorizeState {
        op_state: OP_STATE.to_string(),
        redirect_uri: WALLET_REDIRECT.to_string(),
        response: AuthorizeResponse {
            code: "proxy-code".to_string(),
            state: Some(OP_STATE.to_string()),
            scope: None,
        },
    };
    provider.save_authorize_state(OP_STATE, &state).await.expect("should save");
    provider
}

fn request(code: &str, state: &str) -> RedirectRequest {
    RedirectRequest {
        code: Some(code.to_string()),
        state: state.to_string(),
        ..RedirectRequest::default()
    }
}

async fn redirect(
    provider: &TestProvider, request: RedirectRequest,
) -> Result<Response<RedirectResponse>, Error> {
    credibil_oidc4vc::handle(HOST, request, provider).await
}

fn query(location: &str) -> HashMap<String, String> {
    let url = Url::parse(location).expect("should be a URL");
    url.query_pairs().into_owned().collect()
}

// Should hand the Identity Provider's code to the Issuer and redirect to the
// Wallet with the proxy's code.
#[tokio::test]
async fn success() {
    let provider = provider_with_state().await;

    let response = redirect(&provider, request("idp-code", OP_STATE)).await.expect("should redirect");
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert!(response.location.starts_with(WALLET_REDIRECT));

    let query = query(&response.location);
    assert_eq!(query["code"], "proxy-code");
    assert_eq!(query["state"], OP_STATE);

    let calls = provider.issuer.calls();
    let [IssuerCall::StoreCode(store)] = calls.as_slice() else {
        panic!("should store authorization code, got {calls:?}");
    };
    assert_eq!(store.code, "idp-code");
    assert_eq!(store.op_state, OP_STATE);
}

// Should reject a redirect for an unknown op_state without calling the
// Issuer.
#[tokio::test]
async fn unknown_state() {
    let provider = provider_with_state().await;

    let err = redirect(&provider, request("idp-code", "unknown")).await.expect_err("should fail");
    let Error::InvalidState(description) = &err else {
        panic!("should be invalid state, got {err:?}");
    };
    assert!(description.starts_with("get authorize state"));
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert!(provider.issuer.calls().is_empty());
}

// Should report store failures as server errors.
#[tokio::test]
async fn store_unavailable() {
    let provider = provider_with_state().await;
    provider.store.fail_get();

    let err = redirect(&provider, request("idp-code", OP_STATE)).await.expect_err("should fail");
    assert_eq!(err, Error::ServerError("get authorize state: get error".to_string()));
}

// Should fail when the Issuer cannot be reached.
#[tokio::test]
async fn store_code_transport_error() {
    let provider = provider_with_state().await;
    provider.issuer.on_store_code(Outcome::Fail("store authorization code error".to_string()));

    let err = redirect(&provider, request("idp-code", OP_STATE)).await.expect_err("should fail");
    let Error::ServerError(description) = &err else {
        panic!("should be server_error, got {err:?}");
    };
    assert!(description.contains("store authorization code error"));
}

// Should fail when the Issuer rejects the code.
#[tokio::test]
async fn store_code_status() {
    let provider = provider_with_state().await;
    provider.issuer.on_store_code(Outcome::Respond(500, String::new()));

    let err = redirect(&provider, request("idp-code", OP_STATE)).await.expect_err("should fail");
    assert_eq!(err, Error::ServerError("store authorization code: status code 500".to_string()));
}

// Should pass an Identity Provider error through to the Wallet.
#[tokio::test]
async fn identity_provider_error() {
    let provider = provider_with_state().await;
    let request = RedirectRequest {
        code: None,
        state: OP_STATE.to_string(),
        error: Some("access_denied".to_string()),
        error_description: Some("user cancelled".to_string()),
    };

    let response = redirect(&provider, request).await.expect("should redirect");
    let query = query(&response.location);
    assert_eq!(query["error"], "access_denied");
    assert_eq!(query["error_description"], "user cancelled");
    assert_eq!(query["state"], OP_STATE);
    assert!(!query.contains_key("code"));
    assert!(provider.issuer.calls().is_empty());
}

// Should reject a redirect with neither a code nor an error.
#[tokio::test]
async fn missing_code() {
    let provider = provider_with_state().await;
    let request = RedirectRequest {
        state: OP_STATE.to_string(),
        ..RedirectRequest::default()
    };

    let err = redirect(&provider, request).await.expect_err("should fail");
    assert!(matches!(err, Error::InvalidRequest(_)));
}
