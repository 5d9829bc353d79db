mod common;

use axum::body::Body;
use http::{Request, StatusCode};
use template_base::core::request::MAX_BODY_BYTES;
use template_base::domain::ports::OtpRepository;
use template_base::transport::{function, server};
use tower::ServiceExt;

async fn socket_status(method: &str, path: &str, body: Option<&str>) -> StatusCode {
    let app = server::router(common::context().api());
    let request = Request::builder()
        .method(method)
        .uri(path)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();
    app.oneshot(request).await.unwrap().status()
}

fn function_status(method: &str, path: &str, body: Option<&str>) -> u16 {
    let context = common::context();
    function::handle_event(&context, common::function_event(method, path, body)).status_code
}

#[tokio::test]
async fn test_status_codes_match_socket_mode() {
    let cases: [(&str, &str, Option<&str>); 7] = [
        ("GET", "/health", None),
        ("GET", "/examples", None),
        ("POST", "/examples", Some(r#"{"name":"parity"}"#)),
        ("POST", "/examples", Some("{not json")),
        ("GET", "/examples/unknown", None),
        ("DELETE", "/examples", None),
        ("GET", "/nowhere", None),
    ];

    for (method, path, body) in cases {
        let socket = socket_status(method, path, body).await;
        let function = function_status(method, path, body);
        assert_eq!(socket.as_u16(), function, "{method} {path}");
    }
}

#[tokio::test]
async fn test_oversized_body_gets_same_status_in_both_modes() {
    let description = "a".repeat(MAX_BODY_BYTES + 1024);
    let body = format!(r#"{{"name":"big","description":"{description}"}}"#);

    let socket = socket_status("POST", "/examples", Some(&body)).await;
    let function = function_status("POST", "/examples", Some(&body));

    assert_eq!(socket, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(function, 413);

    let small = function_status("POST", "/examples", Some(r#"{"name":"small"}"#));
    assert_eq!(small, 201);
}

#[test]
fn test_malformed_event_then_good_event() {
    let context = common::context();

    let mut malformed = common::function_event("POST", "/examples", Some("%%%"));
    malformed["isBase64Encoded"] = serde_json::json!(true);
    let reply = function::handle_event(&context, malformed);
    assert_eq!(reply.status_code, 500);
    assert_eq!(reply.headers["content-type"], "application/json");
    let body: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Malformed event"));

    let reply = function::handle_event(&context, serde_json::json!("just a string"));
    assert_eq!(reply.status_code, 500);

    let reply = function::handle_event(&context, common::function_event("GET", "/health", None));
    assert_eq!(reply.status_code, 200);
}

#[test]
fn test_handler_panic_degrades_only_that_invocation() {
    let context = common::flaky_context();

    let reply = function::handle_event(&context, common::function_event("GET", "/boom", None));
    assert_eq!(reply.status_code, 500);
    assert!(reply.body.contains("handler exploded"));

    let reply = function::handle_event(&context, common::function_event("GET", "/fine", None));
    assert_eq!(reply.status_code, 200);
    assert_eq!(reply.body, r#"{"ok":true}"#);
}

#[test]
fn test_otp_flow_across_invocations() {
    let context = common::context();

    let issued = function::handle_event(
        &context,
        common::function_event(
            "POST",
            "/otps",
            Some(r#"{"userPhoneNumber":"+5511999999999","userId":"user-1"}"#),
        ),
    );
    assert_eq!(issued.status_code, 201);
    let issued: serde_json::Value = serde_json::from_str(&issued.body).unwrap();
    assert!(issued.get("otp").is_none());
    assert_eq!(issued["status"], "pending");
    let id = issued["id"].as_str().unwrap().to_string();

    let wrong = function::handle_event(
        &context,
        common::function_event("POST", &format!("/otps/{id}/verify"), Some(r#"{"otp":"x"}"#)),
    );
    assert_eq!(wrong.status_code, 422);

    let code = context.store().find(&id).unwrap().otp().to_string();
    let verified = function::handle_event(
        &context,
        common::function_event(
            "POST",
            &format!("/otps/{id}/verify"),
            Some(&format!(r#"{{"otp":"{code}"}}"#)),
        ),
    );
    assert_eq!(verified.status_code, 200);
    let verified: serde_json::Value = serde_json::from_str(&verified.body).unwrap();
    assert_eq!(verified["status"], "verified");
    assert_eq!(verified["validAttempts"], 1);
    assert_eq!(verified["retryAttempts"], 1);

    let fetched = function::handle_event(
        &context,
        common::function_event("GET", &format!("/otps/{id}"), None),
    );
    assert_eq!(fetched.status_code, 200);
}

#[test]
fn test_mixed_case_headers_reach_handlers() {
    let context = common::context();
    let mut event = common::function_event("POST", "/examples", Some(r#"{"name":"cased"}"#));
    event["headers"] = serde_json::json!({ "CONTENT-TYPE": "application/json", "Authorization": "Bearer t" });

    let event = function::parse_event(event).unwrap();
    let request = function::to_generic_request(&event).unwrap();
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.header("AUTHORIZATION"), Some("Bearer t"));

    let response = context.api().handle(&request);
    assert_eq!(response.status(), StatusCode::CREATED);
}
