#![allow(clippy::unwrap_used)]
// Integration tests for `StateAdapter` against a wiremock cloud.

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use controlr_api::{AppCredentials, Session};
use controlr_core::{CoreError, CurrentHeaterState, PropertyNames, StateAdapter};

const SERIAL: &str = "AC000W012345678";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, StateAdapter) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let app = AppCredentials {
        app_id: "test-app-id".into(),
        app_secret: SecretString::from("test-app-secret".to_string()),
    };
    let session = Arc::new(Session::with_client(reqwest::Client::new(), base_url, app));

    Mock::given(method("POST"))
        .and(path("/users/sign_in"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "expires_in": 86_400
        })))
        .mount(&server)
        .await;
    session
        .authenticate("owner@example.com", &SecretString::from("pw".to_string()))
        .await
        .unwrap();

    (server, StateAdapter::new(session, PropertyNames::default()))
}

fn property_path(name: &str) -> String {
    format!("/apiv1/dsns/{SERIAL}/properties/{name}")
}

/// Serve `value` for property `name`, expecting exactly `times` reads.
async fn serve_property(server: &MockServer, name: &str, value: Value, times: u64) {
    Mock::given(method("GET"))
        .and(path(property_path(name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "property": { "name": name, "value": value }
        })))
        .expect(times)
        .mount(server)
        .await;
}

async fn expect_datapoint(server: &MockServer, name: &str, value: Value) {
    Mock::given(method("POST"))
        .and(path(format!("{}/datapoints", property_path(name))))
        .and(body_json(json!({ "datapoint": { "value": value } })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(1)
        .mount(server)
        .await;
}

// ── Recirculation ───────────────────────────────────────────────────

#[tokio::test]
async fn test_heater_active_from_truthy_value() {
    let (server, adapter) = setup().await;
    serve_property(&server, "set_recirculation_enabled", json!(1), 2).await;

    assert!(adapter.get_heater_active(SERIAL).await.unwrap());
    assert_eq!(
        adapter.get_current_heater_state(SERIAL).await.unwrap(),
        CurrentHeaterState::Heating
    );
}

#[tokio::test]
async fn test_heater_idle_when_not_recirculating() {
    let (server, adapter) = setup().await;
    serve_property(&server, "set_recirculation_enabled", json!(false), 1).await;

    assert_eq!(
        adapter.get_current_heater_state(SERIAL).await.unwrap(),
        CurrentHeaterState::Idle
    );
}

#[tokio::test]
async fn test_set_heater_active_writes_datapoint() {
    let (server, adapter) = setup().await;
    expect_datapoint(&server, "set_recirculation_enabled", json!(1)).await;

    adapter.set_heater_active(SERIAL, true).await.unwrap();
}

// ── Temperature ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_temperature_converted_to_celsius() {
    let (server, adapter) = setup().await;
    serve_property(&server, "set_domestic_temperature", json!(120), 1).await;

    assert_eq!(adapter.get_temperature(SERIAL).await.unwrap(), 49);
}

#[tokio::test]
async fn test_set_target_temperature_converts_to_fahrenheit() {
    let (server, adapter) = setup().await;
    expect_datapoint(&server, "set_domestic_temperature", json!(95)).await;

    adapter.set_target_temperature(SERIAL, 35).await.unwrap();
}

#[tokio::test]
async fn test_non_numeric_temperature_is_rejected() {
    let (server, adapter) = setup().await;
    serve_property(&server, "set_domestic_temperature", json!({ "f": 120 }), 1).await;

    let result = adapter.get_temperature(SERIAL).await;
    assert!(
        matches!(result, Err(CoreError::UnexpectedValue { .. })),
        "got: {result:?}"
    );
}

// ── Water ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_water_in_use_pass_through() {
    let (server, adapter) = setup().await;
    serve_property(&server, "water_flow_status", json!(true), 1).await;

    assert!(adapter.get_water_in_use(SERIAL).await.unwrap());
}

#[tokio::test]
async fn test_water_not_ready_when_recirculation_off() {
    let (server, adapter) = setup().await;
    serve_property(&server, "set_recirculation_enabled", json!(0), 1).await;
    serve_property(&server, "set_domestic_temperature", json!(120), 0).await;
    serve_property(&server, "m02_outlet_temperature", json!(125), 0).await;

    assert!(!adapter.get_water_is_ready(SERIAL).await.unwrap());
}

#[tokio::test]
async fn test_water_ready_when_outlet_reaches_target() {
    let (server, adapter) = setup().await;
    serve_property(&server, "set_recirculation_enabled", json!(1), 1).await;
    serve_property(&server, "set_domestic_temperature", json!(120), 1).await;
    serve_property(&server, "m02_outlet_temperature", json!(125), 1).await;

    assert!(adapter.get_water_is_ready(SERIAL).await.unwrap());
}

#[tokio::test]
async fn test_water_not_ready_when_outlet_below_target() {
    let (server, adapter) = setup().await;
    serve_property(&server, "set_recirculation_enabled", json!(1), 1).await;
    serve_property(&server, "set_domestic_temperature", json!(120), 1).await;
    serve_property(&server, "m02_outlet_temperature", json!(100), 1).await;

    assert!(!adapter.get_water_is_ready(SERIAL).await.unwrap());
}

#[tokio::test]
async fn test_water_ready_failure_short_circuits() {
    let (server, adapter) = setup().await;
    serve_property(&server, "set_recirculation_enabled", json!(1), 1).await;
    Mock::given(method("GET"))
        .and(path(property_path("set_domestic_temperature")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "boom" })))
        .expect(1)
        .mount(&server)
        .await;
    serve_property(&server, "m02_outlet_temperature", json!(125), 0).await;

    let result = adapter.get_water_is_ready(SERIAL).await;
    match result {
        Err(ref err @ CoreError::Api { .. }) => assert!(err.is_transient()),
        other => panic!("expected Api error, got: {other:?}"),
    }
}

// ── Snapshot ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_status_snapshot() {
    let (server, adapter) = setup().await;
    serve_property(&server, "set_recirculation_enabled", json!(1), 2).await;
    serve_property(&server, "set_domestic_temperature", json!(140), 2).await;
    serve_property(&server, "water_flow_status", json!(0), 1).await;
    serve_property(&server, "m02_outlet_temperature", json!(138.5), 1).await;

    let status = adapter.status(SERIAL).await.unwrap();

    assert_eq!(status.serial, SERIAL);
    assert!(status.active);
    assert_eq!(status.current_state, CurrentHeaterState::Heating);
    assert_eq!(status.target_temperature_c, 60);
    assert!(!status.water_in_use);
    assert!(!status.water_is_ready);
}

#[tokio::test]
async fn test_status_unauthorized_read_is_worth_polling_again() {
    let (server, adapter) = setup().await;
    Mock::given(method("GET"))
        .and(path(property_path("set_recirculation_enabled")))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid token" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = adapter.status(SERIAL).await;
    match result {
        Err(ref err @ CoreError::Api { status, .. }) => {
            assert_eq!(status, Some(401));
            assert!(err.is_transient());
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_property_payload_without_name() {
    let (server, adapter) = setup().await;
    Mock::given(method("GET"))
        .and(path(property_path("water_flow_status")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "property": { "value": 1 } })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(adapter.get_water_in_use(SERIAL).await.unwrap());
}
