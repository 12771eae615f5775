//! Integration tests for the FaaS control-plane adapters
//!
//! Verifies both runtime dialects against a wiremock control plane:
//! - Invocation envelope and request id parsing
//! - Decode failures keep the request id
//! - Success and error report paths and bodies
//! - SCF readiness signal

use webwatch::error::AppError;
use webwatch::runtime::{AliyunRuntime, EventSource, TencentRuntime};
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FC_BASE: &str = "/2020-11-11/runtime/invocation";

fn aliyun(server: &MockServer) -> AliyunRuntime {
    AliyunRuntime::new(reqwest::Client::new(), &server.uri(), "2020-11-11")
}

fn tencent(server: &MockServer) -> TencentRuntime {
    TencentRuntime::new(reqwest::Client::new(), &server.uri())
}

#[tokio::test]
async fn test_aliyun_next_parses_timer_trigger() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{FC_BASE}/next")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-fc-request-id", "fc-req-1")
                .set_body_json(serde_json::json!({
                    "triggerTime": "2026-10-17T08:00:00Z",
                    "triggerName": "every-hour",
                    "payload": "https://example.com/news"
                })),
        )
        .mount(&server)
        .await;

    let invocation = aliyun(&server).next().await.unwrap();
    assert_eq!(invocation.request_id, "fc-req-1");
    assert_eq!(invocation.payload, "https://example.com/news");
    assert_eq!(invocation.trigger_name.as_deref(), Some("every-hour"));
    assert_eq!(
        invocation.trigger_time.as_deref(),
        Some("2026-10-17T08:00:00Z")
    );
}

#[tokio::test]
async fn test_aliyun_malformed_envelope_keeps_request_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{FC_BASE}/next")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-fc-request-id", "fc-req-2")
                .set_body_string("not json"),
        )
        .mount(&server)
        .await;

    let err = aliyun(&server).next().await.unwrap_err();
    assert_eq!(err.request_id, "fc-req-2");
    assert!(matches!(err.source, AppError::Json(_)));
}

#[tokio::test]
async fn test_aliyun_reports_are_addressed_by_request_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{FC_BASE}/fc-req-3/response")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{FC_BASE}/fc-req-4/error")))
        .and(body_string("fetch failed"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let runtime = aliyun(&server);
    runtime.report_success("fc-req-3").await;
    runtime.report_error("fetch failed", "fc-req-4").await;
}

#[tokio::test]
async fn test_aliyun_report_failure_is_swallowed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    // Must return normally; the failure is only logged
    aliyun(&server).report_success("fc-req-5").await;
}

#[tokio::test]
async fn test_tencent_ready_and_next() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/runtime/init/ready"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/runtime/invocation/next"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("request_id", "scf-req-1")
                .set_body_json(serde_json::json!({
                    "Type": "Timer",
                    "TriggerName": "every-hour",
                    "Time": "2026-10-17T08:00:00Z",
                    "Message": "https://example.com/news"
                })),
        )
        .mount(&server)
        .await;

    let runtime = tencent(&server);
    runtime.ready().await.unwrap();

    let invocation = runtime.next().await.unwrap();
    assert_eq!(invocation.request_id, "scf-req-1");
    assert_eq!(invocation.payload, "https://example.com/news");
    assert_eq!(invocation.trigger_name.as_deref(), Some("every-hour"));
}

#[tokio::test]
async fn test_tencent_ready_failure_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/runtime/init/ready"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    assert!(tencent(&server).ready().await.is_err());
}

#[tokio::test]
async fn test_tencent_reports() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/runtime/invocation/response"))
        .and(body_string("scf-req-2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/runtime/invocation/error"))
        .and(body_string("mail: no receiver"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let runtime = tencent(&server);
    runtime.report_success("scf-req-2").await;
    runtime.report_error("mail: no receiver", "scf-req-3").await;
}

#[tokio::test]
async fn test_next_without_control_plane_fails_with_empty_request_id() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let runtime = AliyunRuntime::new(reqwest::Client::new(), &uri, "2020-11-11");
    let err = runtime.next().await.unwrap_err();
    assert!(err.request_id.is_empty());
    assert!(matches!(err.source, AppError::Http(_)));
}
