use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use common_http_client::{
    ClientMetrics, Envelope, HttpClientConfig, IntegrationClient, RequestOptions,
};
use common_token_auth::{IntegrationAuth, IntegrationCaller, IntegrationConfig, TokenValidator};
use httpmock::prelude::*;
use serde_json::{json, Value};
use tokio::net::TcpListener;

fn auth(origin: &str, allowed: &[&str]) -> IntegrationAuth {
    let origin = origin.to_string();
    let allowed: Vec<String> = allowed.iter().map(|value| value.to_string()).collect();
    IntegrationAuth::new(
        IntegrationConfig::configure(move |settings| {
            settings.secret = "secret".into();
            settings.origin = origin;
            settings.allowed_origins = allowed;
        })
        .expect("valid config"),
    )
}

fn client(auth: &IntegrationAuth) -> IntegrationClient {
    IntegrationClient::new(auth.injector.clone(), &HttpClientConfig::default()).expect("client")
}

#[tokio::test]
async fn get_request_carries_bearer_token() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/orders")
            .header_exists("authorization")
            .header("content-type", "application/json");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "data": "GET request" }));
    });

    let response = client(&auth("orders", &[]))
        .get(&server.url("/orders"), RequestOptions::new())
        .await
        .expect("request succeeds");

    mock.assert();
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["data"], json!("GET request"));
}

#[tokio::test]
async fn post_wraps_body_in_data_envelope() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/orders")
            .header_exists("authorization")
            .json_body(json!({ "data": { "foo": "bar" } }));
        then.status(201).json_body(json!({ "data": "POST request" }));
    });

    let response = client(&auth("orders", &[]))
        .post(&server.url("/orders"), &json!({ "foo": "bar" }), RequestOptions::new())
        .await
        .expect("request succeeds");

    mock.assert();
    let body: Envelope<String> = response.json().await.expect("json body");
    assert_eq!(body.into_inner(), "POST request");
}

#[tokio::test]
async fn put_can_skip_envelope() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/orders/7")
            .json_body(json!({ "status": "shipped" }));
        then.status(204);
    });

    let response = client(&auth("orders", &[]))
        .put(
            &server.url("/orders/7"),
            &json!({ "status": "shipped" }),
            RequestOptions::new().wrap_in_data(false),
        )
        .await
        .expect("request succeeds");

    mock.assert();
    assert_eq!(response.status().as_u16(), 204);
}

#[tokio::test]
async fn failure_status_is_returned_not_raised() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE).path("/orders/7");
        then.status(404);
    });

    let metrics = ClientMetrics::new().expect("metrics");
    let client = client(&auth("orders", &[])).with_metrics(metrics.clone());
    let response = client
        .delete(&server.url("/orders/7"), RequestOptions::new())
        .await
        .expect("transport succeeded");

    mock.assert();
    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(metrics.count("DELETE", "error_status"), 1);
}

#[tokio::test]
async fn missing_secret_fails_before_sending() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.any_request();
        then.status(200);
    });

    let unsigned = IntegrationAuth::new(
        IntegrationConfig::configure(|settings| settings.origin = "orders".into())
            .expect("valid config"),
    );
    let err = client(&unsigned)
        .get(&server.url("/orders"), RequestOptions::new())
        .await
        .expect_err("no secret configured");

    assert!(matches!(err, common_http_client::ClientError::Auth(_)));
    mock.assert_hits(0);
}

async fn whoami(caller: IntegrationCaller) -> Json<Value> {
    Json(json!({
        "origin": caller.origin(),
        "issuer": caller.claims.issuer,
        "data": caller.claims.data,
    }))
}

async fn spawn_receiver(validator: Arc<TokenValidator>) -> SocketAddr {
    let app = Router::new()
        .route("/whoami", get(whoami).post(whoami))
        .with_state(validator);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

#[tokio::test]
async fn receiving_service_accepts_sender_token() {
    let receiver = auth("billing", &["orders"]);
    let addr = spawn_receiver(receiver.validator.clone()).await;
    let sender = client(&auth("orders", &[]));

    let response = sender
        .get(
            &format!("http://{addr}/whoami"),
            RequestOptions::new()
                .sender("nightly-sync")
                .token_data(json!({ "batch": 42 })),
        )
        .await
        .expect("request succeeds");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["origin"], json!("orders"));
    assert_eq!(body["issuer"], json!("nightly-sync"));
    assert_eq!(body["data"], json!({ "batch": 42 }));
}

#[tokio::test]
async fn receiving_service_rejects_mismatched_custom_secret() {
    let receiver = auth("billing", &["orders"]);
    let addr = spawn_receiver(receiver.validator.clone()).await;
    let sender = client(&auth("orders", &[]));

    let response = sender
        .post(
            &format!("http://{addr}/whoami"),
            &json!({ "foo": "bar" }),
            RequestOptions::new().secret_override("partner-only"),
        )
        .await
        .expect("request completes");

    assert_eq!(response.status().as_u16(), 401);
}
