//! Token Endpoint Tests

use credibil_oidc4vc::types::{AccessResponse, Session, TokenRequest, TokenType};
use credibil_oidc4vc::{ClientHeaders, Error, Request, Response};
use test_utils::engine::ACCESS_TOKEN;
use test_utils::{EngineCall, HOST, IssuerCall, Outcome, TestProvider};

const OP_STATE: &str = "1234";

fn provider() -> TestProvider {
    let provider = test_utils::provider();
    provider.engine.access_session(Session::with_op_state(OP_STATE));
    provider
}

async fn token(provider: &TestProvider) -> Result<Response<AccessResponse>, Error> {
    let request = Request {
        body: TokenRequest {
            grant_type: "authorization_code".to_string(),
            code: Some("proxy-code".to_string()),
            redirect_uri: Some("https://wallet.example.com/cb".to_string()),
            code_verifier: Some("xalsLDydJtHwIQZukUyj6boam5vMUaJRWv-BnGCAzcZi3ZTs".to_string()),
            ..TokenRequest::default()
        },
        headers: ClientHeaders {
            authorization: Some("Basic d2FsbGV0OmZvb2Jhcg==".to_string()),
        },
    };
    credibil_oidc4vc::handle(HOST, request, provider).await
}

// Should exchange the Issuer's code for op_state and issue an access token.
#[tokio::test]
async fn success() {
    let provider = provider();

    let response = token(&provider).await.expect("should issue token");
    assert_eq!(response.access_token, ACCESS_TOKEN);
    assert_eq!(response.token_type, TokenType::Bearer);

    let calls = provider.issuer.calls();
    let [IssuerCall::ExchangeCode(exchange)] = calls.as_slice() else {
        panic!("should exchange authorization code, got {calls:?}");
    };
    assert_eq!(exchange.op_state, OP_STATE);

    assert_eq!(provider.engine.calls(), vec![EngineCall::AccessRequest, EngineCall::AccessResponse]);
}

// Should return the engine's error for an invalid grant.
#[tokio::test]
async fn engine_rejects_request() {
    let provider = provider();
    provider
        .engine
        .fail(EngineCall::AccessRequest, Error::InvalidGrant("authorization code is invalid".to_string()));

    let err = token(&provider).await.expect_err("should fail");
    assert_eq!(err, Error::InvalidGrant("authorization code is invalid".to_string()));
    assert!(provider.issuer.calls().is_empty());
}

// Should fail when the session does not carry op_state.
#[tokio::test]
async fn missing_op_state() {
    let provider = test_utils::provider();
    provider.engine.access_session(Session::default());

    let err = token(&provider).await.expect_err("should fail");
    assert!(matches!(err, Error::ServerError(_)));
    assert!(provider.issuer.calls().is_empty());
}

// Should fail when the Issuer cannot be reached.
#[tokio::test]
async fn exchange_transport_error() {
    let provider = provider();
    provider.issuer.on_exchange_code(Outcome::Fail("can not exchange token".to_string()));

    let err = token(&provider).await.expect_err("should fail");
    assert_eq!(
        err,
        Error::ServerError("exchange authorization code: can not exchange token".to_string())
    );
    assert!(!provider.engine.calls().contains(&EngineCall::AccessResponse));
}

// Should fail when the Issuer cannot exchange its code.
#[tokio::test]
async fn exchange_status() {
    let provider = provider();
    provider.issuer.on_exchange_code(Outcome::Respond(500, String::new()));

    let err = token(&provider).await.expect_err("should fail");
    assert_eq!(err, Error::ServerError("exchange authorization code: status code 500".to_string()));
}

// Should return the engine's error when the token cannot be issued.
#[tokio::test]
async fn engine_response_error() {
    let provider = provider();
    provider
        .engine
        .fail(EngineCall::AccessResponse, Error::ServerError("access response error".to_string()));

    let err = token(&provider).await.expect_err("should fail");
    let Error::ServerError(description) = &err else {
        panic!("should be server_error, got {err:?}");
    };
    assert!(description.contains("access response error"));
}
