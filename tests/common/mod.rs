#![allow(dead_code)]

use template_base::{AppConfig, AppContext, GenericRequest, GenericResponse, RequestHandler};

use http::StatusCode;
use std::sync::Arc;

/// Handler set that panics on `/boom` and answers everything else with 200.
pub struct FlakyHandler;

impl RequestHandler for FlakyHandler {
    fn handle(&self, request: &GenericRequest) -> GenericResponse {
        if request.path() == "/boom" {
            panic!("handler exploded on {}", request.path());
        }
        GenericResponse::json(StatusCode::OK, &serde_json::json!({ "ok": true }))
    }
}

pub fn context() -> AppContext {
    AppContext::build(AppConfig::default())
}

pub fn flaky_context() -> AppContext {
    context().with_handlers(Arc::new(FlakyHandler))
}

pub fn function_event(method: &str, path: &str, body: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "version": "2.0",
        "rawPath": path,
        "rawQueryString": "",
        "headers": { "content-type": "application/json" },
        "requestContext": { "http": { "method": method, "path": path } },
        "body": body,
        "isBase64Encoded": false
    })
}
