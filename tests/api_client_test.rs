//! Contract tests for the tax API client against a local mock server.
//!
//! The client is blocking, so each test keeps a multi-thread runtime
//! alive for the mock server and talks to it from the test thread.

use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use tokio::runtime::Runtime;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gst_desk::data::api::{ApiError, TaxApiClient};
use gst_desk::domain::types::{NewRecord, TaxType};
use gst_desk::session::{failure_message, ApiOp, DELETE_FAILED, INVALID_DATA};

fn server_with(rt: &Runtime, mocks: Vec<Mock>) -> MockServer {
    rt.block_on(async {
        let server = MockServer::start().await;
        for mock in mocks {
            server.register(mock).await;
        }
        server
    })
}

fn client_for(server: &MockServer) -> TaxApiClient {
    TaxApiClient::new(server.uri(), Duration::from_secs(5)).unwrap()
}

fn new_record() -> NewRecord {
    NewRecord {
        from_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        to_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        from_value: dec!(100),
        to_value: dec!(200),
        tax_type: TaxType::Cgst,
        tax_rate: dec!(18),
    }
}

#[test]
fn list_returns_records_from_the_success_envelope() {
    let rt = Runtime::new().unwrap();
    let server = server_with(
        &rt,
        vec![Mock::given(method("GET")).and(path("/tax")).respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": [{
                    "_id": "65f1c0ffee",
                    "fromDate": "2024-01-01",
                    "toDate": "2024-01-31",
                    "fromValue": 100.0,
                    "toValue": 200.0,
                    "taxType": "CGST",
                    "taxRate": 18.0,
                    "taxAmount": 18.0
                }]
            })),
        )],
    );

    let records = client_for(&server).list().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "65f1c0ffee");
    assert_eq!(records[0].from_date, "2024-01-01");
    assert_eq!(records[0].tax_type, "CGST");
    assert_eq!(records[0].tax_amount, 18.0);
}

#[test]
fn list_accepts_records_keyed_by_plain_id() {
    let rt = Runtime::new().unwrap();
    let server = server_with(
        &rt,
        vec![Mock::given(method("GET")).and(path("/tax")).respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": [{
                    "id": "plain",
                    "fromDate": "2024-02-01T00:00:00.000Z",
                    "toDate": "2024-02-29T00:00:00.000Z",
                    "fromValue": 1.0,
                    "toValue": 2.0,
                    "taxType": "IGST",
                    "taxRate": 18.0,
                    "taxAmount": 0.18
                }]
            })),
        )],
    );

    let records = client_for(&server).list().unwrap();
    assert_eq!(records[0].id, "plain");
}

#[test]
fn list_with_success_false_is_a_rejection() {
    let rt = Runtime::new().unwrap();
    let server = server_with(
        &rt,
        vec![Mock::given(method("GET")).and(path("/tax")).respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "message": "storage offline"
            })),
        )],
    );

    let err = client_for(&server).list().unwrap_err();
    assert_eq!(err.server_message(), Some("storage offline"));
    assert_eq!(err.status(), Some(200));
}

#[test]
fn list_maps_a_plain_500_to_a_status_only_rejection() {
    let rt = Runtime::new().unwrap();
    let server = server_with(
        &rt,
        vec![Mock::given(method("GET"))
            .and(path("/tax"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))],
    );

    let err = client_for(&server).list().unwrap_err();
    assert!(matches!(err, ApiError::Rejected { .. }));
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.server_message(), None);
}

#[test]
fn create_posts_the_documented_wire_shape() {
    let rt = Runtime::new().unwrap();
    let server = server_with(
        &rt,
        vec![Mock::given(method("POST"))
            .and(path("/tax"))
            .and(body_json(serde_json::json!({
                "fromDate": "2024-01-01",
                "toDate": "2024-01-31",
                "fromValue": 100.0,
                "toValue": 200.0,
                "taxType": "CGST",
                "taxRate": 18.0
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "success": true,
                "data": { "_id": "new" }
            })))
            .expect(1)],
    );

    client_for(&server).create(&new_record()).unwrap();
    rt.block_on(server.verify());
}

#[test]
fn create_rejection_keeps_the_server_message() {
    let rt = Runtime::new().unwrap();
    let server = server_with(
        &rt,
        vec![Mock::given(method("POST")).and(path("/tax")).respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "success": false,
                "message": "taxRate must not exceed 100"
            })),
        )],
    );

    let err = client_for(&server).create(&new_record()).unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(
        failure_message(ApiOp::Create, &err),
        "taxRate must not exceed 100"
    );
}

#[test]
fn create_bare_400_becomes_the_invalid_data_hint() {
    let rt = Runtime::new().unwrap();
    let server = server_with(
        &rt,
        vec![Mock::given(method("POST"))
            .and(path("/tax"))
            .respond_with(ResponseTemplate::new(400).set_body_string("no details"))],
    );

    let err = client_for(&server).create(&new_record()).unwrap_err();
    assert_eq!(failure_message(ApiOp::Create, &err), INVALID_DATA);
}

#[test]
fn create_treats_a_success_false_ack_as_a_rejection() {
    let rt = Runtime::new().unwrap();
    let server = server_with(
        &rt,
        vec![Mock::given(method("POST")).and(path("/tax")).respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "message": "validation failed"
            })),
        )],
    );

    let err = client_for(&server).create(&new_record()).unwrap_err();
    assert_eq!(err.server_message(), Some("validation failed"));
}

#[test]
fn delete_targets_the_record_path() {
    let rt = Runtime::new().unwrap();
    let server = server_with(
        &rt,
        vec![Mock::given(method("DELETE"))
            .and(path("/tax/65f1c0ffee"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true
            })))
            .expect(1)],
    );

    client_for(&server).delete("65f1c0ffee").unwrap();
    rt.block_on(server.verify());
}

#[test]
fn delete_failure_uses_the_delete_wording() {
    let rt = Runtime::new().unwrap();
    let server = server_with(
        &rt,
        vec![Mock::given(method("DELETE"))
            .and(path("/tax/gone"))
            .respond_with(ResponseTemplate::new(500))],
    );

    let err = client_for(&server).delete("gone").unwrap_err();
    assert_eq!(failure_message(ApiOp::Delete, &err), DELETE_FAILED);
}

#[test]
fn unreachable_server_is_a_transport_error() {
    // Nothing listens on port 9; the connection fails without a response.
    let client = TaxApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
    let err = client.list().unwrap_err();
    assert!(matches!(err, ApiError::Transport { .. }));
}
