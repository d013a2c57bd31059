//! Authorization Endpoint Tests

use std::collections::HashMap;

use credibil_oidc4vc::provider::StateStore;
use credibil_oidc4vc::types::{AuthorizationParams, AuthorizationRequest, RedirectResponse};
use credibil_oidc4vc::{Error, Response};
use http::StatusCode;
use test_utils::engine::{AUTH_CODE, REDIRECT_URI};
use test_utils::issuer::{IDP_AUTHORIZE, IDP_CLIENT_ID, IDP_CLIENT_SECRET, prepare_body};
use test_utils::{EngineCall, HOST, IssuerCall, Outcome, TestProvider};
use url::Url;

const OP_STATE: &str = "opState";

fn request() -> AuthorizationRequest {
    AuthorizationRequest {
        params: AuthorizationParams::builder()
            .response_type("code")
            .client_id("wallet")
            .redirect_uri(REDIRECT_URI)
            .scope("openid profile")
            .state(OP_STATE)
            .build(),
        op_state: OP_STATE.to_string(),
    }
}

async fn authorize(provider: &TestProvider) -> Result<Response<RedirectResponse>, Error> {
    credibil_oidc4vc::handle(HOST, request(), provider).await
}

fn query(location: &str) -> (Url, HashMap<String, String>) {
    let url = Url::parse(location).expect("should be a URL");
    let query = url.query_pairs().into_owned().collect();
    (url, query)
}

// Should save the proxy's authorization response and redirect to the
// Identity Provider.
#[tokio::test]
async fn success() {
    let provider = test_utils::provider();

    let response = authorize(&provider).await.expect("should authorize");
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let (url, query) = query(&response.location);
    assert!(url.as_str().starts_with(IDP_AUTHORIZE));
    assert_eq!(query["client_id"], IDP_CLIENT_ID);
    assert_eq!(query["response_type"], "code");
    assert_eq!(query["scope"], "openid profile");
    assert_eq!(query["state"], OP_STATE);
    assert_eq!(query["redirect_uri"], format!("{HOST}/oidc/redirect"));
    assert!(!query.contains_key("client_secret"));

    // the Issuer was asked to prepare for this op_state
    let calls = provider.issuer.calls();
    let [IssuerCall::Prepare(prepare)] = calls.as_slice() else {
        panic!("should prepare claim data, got {calls:?}");
    };
    assert_eq!(prepare.op_state, OP_STATE);
    assert_eq!(prepare.response_type, "code");
    assert_eq!(prepare.scope, Some(vec!["openid".to_string(), "profile".to_string()]));

    // the code is bound to a session carrying op_state
    let (authorized, session) = provider.engine.authorized().expect("should authorize");
    assert_eq!(authorized.state.as_deref(), Some(OP_STATE));
    assert_eq!(session.op_state(), Some(OP_STATE));

    let state = provider.get_authorize_state(OP_STATE).await.expect("should save state");
    assert_eq!(state.redirect_uri, REDIRECT_URI);
    assert_eq!(state.response.code, AUTH_CODE);
    assert_eq!(state.response.state.as_deref(), Some(OP_STATE));
}

// Should push the request to an Identity Provider that requires it and
// redirect with the returned request URI.
#[tokio::test]
async fn identity_provider_par() {
    let provider = test_utils::provider();
    let par_endpoint = "https://idp.example.com/oauth2/par";
    provider.issuer.on_prepare(Outcome::Respond(200, prepare_body(Some(par_endpoint))));

    let response = authorize(&provider).await.expect("should authorize");

    let (_, query) = query(&response.location);
    assert_eq!(query["client_id"], IDP_CLIENT_ID);
    assert_eq!(query["request_uri"], "urn:idp:request");
    assert!(!query.contains_key("state"));

    let calls = provider.idp.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].endpoint, par_endpoint);
    assert_eq!(calls[0].client_secret, IDP_CLIENT_SECRET);
    assert_eq!(calls[0].request.state, OP_STATE);
    assert_eq!(calls[0].request.redirect_uri, format!("{HOST}/oidc/redirect"));
}

// Should fail when the Identity Provider rejects the pushed request.
#[tokio::test]
async fn identity_provider_par_error() {
    let provider = test_utils::provider();
    provider
        .issuer
        .on_prepare(Outcome::Respond(200, prepare_body(Some("https://idp.example.com/par"))));
    provider.idp.on_push(Outcome::Respond(400, r#"{"error":"invalid_request"}"#.to_string()));

    let err = authorize(&provider).await.expect_err("should fail");
    assert_eq!(
        err,
        Error::ServerError(
            "push authorization request to identity provider: status code 400".to_string()
        )
    );
}

// Should return the engine's error for an invalid authorization request.
#[tokio::test]
async fn engine_rejects_request() {
    let provider = test_utils::provider();
    provider.engine.fail(
        EngineCall::AuthorizeRequest,
        Error::UnsupportedResponseType("unsupported response_type `token`".to_string()),
    );

    let err = authorize(&provider).await.expect_err("should fail");
    assert!(matches!(err, Error::UnsupportedResponseType(_)));
    assert!(provider.issuer.calls().is_empty());
}

// Should require the Issuer's op_state.
#[tokio::test]
async fn missing_op_state() {
    let provider = test_utils::provider();
    let mut request = request();
    request.op_state = String::new();

    let result: Result<Response<RedirectResponse>, Error> =
        credibil_oidc4vc::handle(HOST, request, &provider).await;
    assert!(matches!(result.expect_err("should fail"), Error::InvalidRequest(_)));
    assert!(provider.issuer.calls().is_empty());
}

// Should fail when the Issuer cannot be reached.
#[tokio::test]
async fn prepare_transport_error() {
    let provider = test_utils::provider();
    provider.issuer.on_prepare(Outcome::Fail("prepare claim data authorization error".to_string()));

    let err = authorize(&provider).await.expect_err("should fail");
    let Error::ServerError(description) = &err else {
        panic!("should be server_error, got {err:?}");
    };
    assert!(description.contains("prepare claim data authorization error"));
    assert!(provider.get_authorize_state(OP_STATE).await.is_err());
}

// Should fail when the Issuer returns a non-success status.
#[tokio::test]
async fn prepare_status() {
    let provider = test_utils::provider();
    provider.issuer.on_prepare(Outcome::Respond(500, String::new()));

    let err = authorize(&provider).await.expect_err("should fail");
    assert_eq!(
        err,
        Error::ServerError("prepare claim data authorization: status code 500".to_string())
    );
    assert!(!provider.engine.calls().contains(&EngineCall::AuthorizeResponse));
}

// Should fail when the Issuer's response cannot be decoded.
#[tokio::test]
async fn prepare_invalid_body() {
    let provider = test_utils::provider();
    provider.issuer.on_prepare(Outcome::Respond(200, "invalid json".to_string()));

    let err = authorize(&provider).await.expect_err("should fail");
    let Error::ServerError(description) = &err else {
        panic!("should be server_error, got {err:?}");
    };
    assert!(description.starts_with("prepare claim data authorization: decoding response"));
}

// Should return the engine's error when the code cannot be issued.
#[tokio::test]
async fn engine_response_error() {
    let provider = test_utils::provider();
    provider.engine.fail(
        EngineCall::AuthorizeResponse,
        Error::ServerError("authorize response error".to_string()),
    );

    let err = authorize(&provider).await.expect_err("should fail");
    let Error::ServerError(description) = &err else {
        panic!("should be server_error, got {err:?}");
    };
    assert!(description.contains("authorize response error"));
    assert!(provider.get_authorize_state(OP_STATE).await.is_err());
}

// Should fail when state cannot be saved.
#[tokio::test]
async fn save_state_error() {
    let provider = test_utils::provider();
    provider.store.fail_save();

    let err = authorize(&provider).await.expect_err("should fail");
    assert_eq!(err, Error::ServerError("save authorize state: save error".to_string()));
}
