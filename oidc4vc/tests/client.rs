//! Issuer and Identity Provider HTTP Client Tests

use std::time::Duration;

use credibil_oidc4vc::client::{IdpClient, IssuerClient, check_status, decode};
use credibil_oidc4vc::provider::{IdentityProvider, IssuerInteraction};
use credibil_oidc4vc::types::{
    ExchangeAuthorizationCodeRequest, IdpPushedAuthorizationRequest,
    PrepareClaimDataAuthorizationRequest, PrepareClaimDataAuthorizationResponse,
    PushedAuthorizeResponse, StoreAuthorizationCodeRequest,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Should post JSON with the API key and return the Issuer's response.
#[tokio::test]
async fn prepare_claim_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/issuer/interactions/prepare-claim-data-authz-request"))
        .and(header("X-API-Key", "secret-key"))
        .and(body_json(json!({
            "response_type": "code",
            "op_state": "opState",
            "scope": ["openid", "profile"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "authorization_endpoint": "https://idp.example.com/authorize",
            "authorization_request": {
                "client_id": "idp-client",
                "client_secret": "idp-secret",
                "response_type": "code",
                "scope": ["openid"]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        IssuerClient::new(server.uri(), Duration::from_secs(5)).expect("should build").api_key("secret-key");
    let request = PrepareClaimDataAuthorizationRequest {
        response_type: "code".to_string(),
        op_state: "opState".to_string(),
        scope: Some(vec!["openid".to_string(), "profile".to_string()]),
    };

    let response = client.prepare_authorization_request(&request).await.expect("should call issuer");
    let prepared: PrepareClaimDataAuthorizationResponse = decode(&response).expect("should decode");
    assert_eq!(prepared.authorization_endpoint, "https://idp.example.com/authorize");
    assert_eq!(prepared.authorization_request.client_id, "idp-client");
    assert_eq!(prepared.pushed_authorization_request_endpoint, None);
}

// Should return non-success responses for the caller to check.
#[tokio::test]
async fn issuer_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/issuer/interactions/store-authorization-code"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = IssuerClient::new(server.uri(), Duration::from_secs(5)).expect("should build");
    let request = StoreAuthorizationCodeRequest {
        code: "idp-code".to_string(),
        op_state: "opState".to_string(),
    };

    let response = client.store_authorization_code(&request).await.expect("should call issuer");
    let err = check_status(&response).expect_err("should fail");
    assert_eq!(err.to_string(), "status code 500");
}

// Should omit the API key header when none is configured.
#[tokio::test]
async fn exchange_without_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/issuer/interactions/exchange-auth-code"))
        .and(body_json(json!({"op_state": "opState"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = IssuerClient::new(format!("{}/", server.uri()), Duration::from_secs(5))
        .expect("should build");
    let request = ExchangeAuthorizationCodeRequest {
        op_state: "opState".to_string(),
    };

    let response = client.exchange_authorization_code(&request).await.expect("should call issuer");
    check_status(&response).expect("should succeed");

    let received = server.received_requests().await.expect("should record requests");
    assert!(received[0].headers.get("x-api-key").is_none());
}

// Should fail when the Issuer cannot be reached.
#[tokio::test]
async fn issuer_unreachable() {
    let client =
        IssuerClient::new("http://127.0.0.1:9", Duration::from_secs(1)).expect("should build");
    let request = ExchangeAuthorizationCodeRequest {
        op_state: "opState".to_string(),
    };
    assert!(client.exchange_authorization_code(&request).await.is_err());
}

// Should push a form-encoded request with Basic client authentication.
#[tokio::test]
async fn identity_provider_par() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/par"))
        .and(header_exists("authorization"))
        .and(body_string_contains("state=opState"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"request_uri": "urn:idp:request", "expires_in": 90})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = IdpClient::new(Duration::from_secs(5)).expect("should build");
    let request = IdpPushedAuthorizationRequest {
        client_id: "idp-client".to_string(),
        response_type: "code".to_string(),
        scope: "openid".to_string(),
        state: "opState".to_string(),
        redirect_uri: "https://proxy.example.com/oidc/redirect".to_string(),
    };

    let response = client
        .push_authorization_request(&format!("{}/par", server.uri()), &request, "idp-secret")
        .await
        .expect("should push");
    let pushed: PushedAuthorizeResponse = decode(&response).expect("should decode");
    assert_eq!(pushed.request_uri, "urn:idp:request");

    let received = server.received_requests().await.expect("should record requests");
    let authorization = received[0].headers.get("authorization").expect("should authenticate");
    assert_eq!(authorization.to_str().unwrap(), "Basic aWRwLWNsaWVudDppZHAtc2VjcmV0");
}
