//! Tests for the domain error payload.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("no token"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("nope"), ErrorCode::Forbidden)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::conflict("taken"), ErrorCode::Conflict)]
#[case(Error::too_many_requests("slow down"), ErrorCode::TooManyRequests)]
#[case(Error::service_unavailable("db down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn blank_message_falls_back_to_placeholder() {
    let error = Error::internal("   ");
    assert_eq!(error.message(), FALLBACK_MESSAGE);
}

#[tokio::test]
async fn new_captures_trace_id_in_scope() {
    let trace_id: TraceId = "00000000-0000-0000-0000-000000000000"
        .parse()
        .expect("valid UUID");
    let expected = trace_id.to_string();
    let error = TraceId::scope(trace_id, async move { Error::not_found("missing") }).await;
    assert_eq!(error.trace_id(), Some(expected.as_str()));
}

#[rstest]
fn new_has_no_trace_id_out_of_scope() {
    assert!(Error::conflict("taken").trace_id().is_none());
}

#[rstest]
fn serialises_with_camel_case_and_skips_empty_fields() {
    let value = serde_json::to_value(Error::conflict("email taken").with_trace_id("abc"))
        .expect("serialise error");
    assert_eq!(
        value,
        json!({"code": "conflict", "message": "email taken", "traceId": "abc"})
    );
}

#[rstest]
fn deserialise_rejects_blank_message() {
    let result = serde_json::from_value::<Error>(json!({"code": "not_found", "message": " "}));
    assert!(result.is_err());
}

#[rstest]
fn deserialise_accepts_snake_case_trace_id_alias() {
    let error: Error = serde_json::from_value(json!({
        "code": "unauthorized",
        "message": "no token",
        "trace_id": "abc",
        "details": {"field": "authorization"}
    }))
    .expect("deserialise error");
    assert_eq!(error.trace_id(), Some("abc"));
    assert_eq!(error.details(), Some(&json!({"field": "authorization"})));
}
