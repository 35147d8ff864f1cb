//! Tests for HTTP error mapping.

use super::*;
use crate::domain::{Error, FieldIssue};
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[fixture]
fn internal_error_case(expected_trace_id: String) -> Error {
    Error::internal("entry repository error: relation \"coffee_entries\" does not exist")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"secret": "x"}))
}

#[fixture]
fn validation_case(expected_trace_id: String) -> Error {
    Error::validation(vec![FieldIssue::new(
        "size",
        "required",
        "size is required",
    )])
    .with_trace_id(expected_trace_id)
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("No token provided"), StatusCode::UNAUTHORIZED)]
#[case(Error::not_found("Entry not found"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("Email already in use"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

async fn assert_error_response(
    error: Error,
    expected_status: StatusCode,
    expected_trace_id: Option<&str>,
) -> Value {
    let response = ResponseError::error_response(&error);
    assert_eq!(response.status(), expected_status);

    let header = response.headers().get(TRACE_ID_HEADER);
    match expected_trace_id {
        Some(expected) => {
            let trace_id = header
                .expect("trace-id header is set by error_response")
                .to_str()
                .expect("trace-id is valid UTF-8");
            assert_eq!(trace_id, expected);
        }
        None => assert!(header.is_none(), "trace-id header should not be present"),
    }

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    serde_json::from_slice(&bytes).expect("error JSON deserialisation succeeds")
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(
    #[from(internal_error_case)] internal_error: Error,
    expected_trace_id: String,
) {
    let body = assert_error_response(
        internal_error,
        StatusCode::INTERNAL_SERVER_ERROR,
        Some(expected_trace_id.as_str()),
    )
    .await;

    assert_eq!(body["error"], "Internal server error");
    assert_eq!(body["code"], "internal_error");
    assert_eq!(body["traceId"], TRACE_ID);
    assert!(body.get("details").is_none());
}

#[rstest]
#[actix_web::test]
async fn outage_detail_is_not_exposed() {
    let body = assert_error_response(
        Error::service_unavailable("entry repository unavailable: connection refused"),
        StatusCode::SERVICE_UNAVAILABLE,
        None,
    )
    .await;

    assert_eq!(body["error"], "Service temporarily unavailable");
    assert_eq!(body["code"], "service_unavailable");
}

#[rstest]
#[actix_web::test]
async fn validation_errors_keep_field_details(
    #[from(validation_case)] validation: Error,
    expected_trace_id: String,
) {
    let body = assert_error_response(
        validation,
        StatusCode::BAD_REQUEST,
        Some(expected_trace_id.as_str()),
    )
    .await;

    assert_eq!(body["error"], "Validation error");
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(
        body["details"],
        json!([{"field": "size", "code": "required", "message": "size is required"}])
    );
}

#[rstest]
#[actix_web::test]
async fn error_without_trace_id_omits_trace_header() {
    let body = assert_error_response(
        Error::not_found("Companion not found"),
        StatusCode::NOT_FOUND,
        None,
    )
    .await;

    assert_eq!(body["error"], "Companion not found");
    assert!(body.get("traceId").is_none());
}

#[rstest]
fn actix_errors_become_internal() {
    let actix = actix_web::error::ErrorBadGateway("upstream");
    let error = Error::from(actix);
    assert_eq!(error.code(), ErrorCode::InternalError);
    assert_eq!(error.message(), "Internal server error");
}
