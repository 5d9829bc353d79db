//! Bridge between Lambda function-URL events and the generic request/response
//! pair, plus the single-invocation entry point registered with the runtime.

use crate::app::context::AppContext;
use crate::core::guard::{failure_response, handle_guarded};
use crate::core::request::{parse_query, GenericRequest, GenericResponse, MAX_BODY_BYTES};
use crate::utils::error::{AppError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, COOKIE, SET_COOKIE};
use http::Method;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Function-URL invocation event (payload format 2.0). Only the fields the
/// bridge reads are modelled.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionUrlEvent {
    #[serde(default)]
    pub raw_path: Option<String>,
    #[serde(default)]
    pub raw_query_string: Option<String>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub cookies: Option<Vec<String>>,
    #[serde(default)]
    pub request_context: Option<EventRequestContext>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventRequestContext {
    #[serde(default)]
    pub http: Option<EventHttp>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventHttp {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionReply {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cookies: Vec<String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

pub fn parse_event(payload: serde_json::Value) -> Result<FunctionUrlEvent> {
    serde_json::from_value(payload)
        .map_err(|e| AppError::malformed(format!("event does not match the function-URL shape: {}", e)))
}

pub fn to_generic_request(event: &FunctionUrlEvent) -> Result<GenericRequest> {
    let http = event.request_context.as_ref().and_then(|ctx| ctx.http.as_ref());

    let method = http
        .and_then(|http| http.method.as_deref())
        .ok_or_else(|| AppError::malformed("requestContext.http.method is missing"))?;
    let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|e| AppError::malformed(format!("invalid method '{}': {}", method, e)))?;

    let path = event
        .raw_path
        .as_deref()
        .or_else(|| http.and_then(|http| http.path.as_deref()))
        .ok_or_else(|| AppError::malformed("rawPath is missing"))?;
    if !path.starts_with('/') {
        return Err(AppError::malformed(format!("path '{}' is not absolute", path)));
    }

    let mut headers = HeaderMap::new();
    for (name, value) in event.headers.iter().flatten() {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AppError::malformed(format!("invalid header name '{}': {}", name, e)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| AppError::malformed(format!("invalid value for header '{}': {}", name, e)))?;
        headers.append(header_name, header_value);
    }

    // Function URLs lift cookies out of the headers.
    if let Some(cookies) = event.cookies.as_ref().filter(|c| !c.is_empty()) {
        if !headers.contains_key(COOKIE) {
            let joined = HeaderValue::from_str(&cookies.join("; "))
                .map_err(|e| AppError::malformed(format!("invalid cookie: {}", e)))?;
            headers.insert(COOKIE, joined);
        }
    }

    let query = event
        .raw_query_string
        .as_deref()
        .map(parse_query)
        .unwrap_or_default();

    let body = match event.body.as_deref() {
        None => Vec::new(),
        Some(body) if event.is_base64_encoded => STANDARD
            .decode(body)
            .map_err(|e| AppError::malformed(format!("body is not valid base64: {}", e)))?,
        Some(body) => body.as_bytes().to_vec(),
    };
    if body.len() > MAX_BODY_BYTES {
        return Err(AppError::PayloadTooLarge {
            limit: MAX_BODY_BYTES,
        });
    }

    Ok(GenericRequest::new(method, path, headers, query, body))
}

/// Converts a response into the reply the function URL expects. Cannot fail.
pub fn to_platform_reply(response: GenericResponse) -> FunctionReply {
    let (status, mut headers, body) = response.into_parts();
    if !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    let mut reply_headers = BTreeMap::new();
    let mut cookies = Vec::new();
    for name in headers.keys() {
        let values = headers
            .get_all(name)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
        if *name == SET_COOKIE {
            cookies.extend(values);
        } else {
            reply_headers.insert(name.as_str().to_string(), values.collect::<Vec<_>>().join(", "));
        }
    }

    let (body, is_base64_encoded) = match String::from_utf8(body) {
        Ok(text) => (text, false),
        Err(e) => (STANDARD.encode(e.into_bytes()), true),
    };

    FunctionReply {
        status_code: status.as_u16(),
        headers: reply_headers,
        cookies,
        body,
        is_base64_encoded,
    }
}

/// One complete invocation. Always yields exactly one reply.
pub fn handle_event(context: &AppContext, payload: serde_json::Value) -> FunctionReply {
    // 每次調用都重新建立路由
    let api = context.api();

    let response = parse_event(payload)
        .and_then(|event| to_generic_request(&event))
        .and_then(|request| handle_guarded(&api, &request))
        .unwrap_or_else(|err| failure_response(&err));

    to_platform_reply(response)
}

#[cfg(feature = "lambda")]
pub async fn run(context: AppContext) -> Result<()> {
    use lambda_runtime::{service_fn, Error, LambdaEvent};

    context.logger().info(&format!(
        "Initializing function handler (environment: {})",
        context.config().environment_label()
    ));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<serde_json::Value>| {
        let context = context.clone();
        async move {
            tracing::info!(request_id = %event.context.request_id, "invocation received");
            Ok::<FunctionReply, Error>(handle_event(&context, event.payload))
        }
    }))
    .await
    .map_err(|e| AppError::RuntimeError {
        message: format!("lambda runtime error: {}", e),
    })
}

#[cfg(not(feature = "lambda"))]
pub async fn run(_context: AppContext) -> Result<()> {
    Err(AppError::ConfigError {
        message: "function mode detected but the binary was built without the `lambda` feature"
            .to_string(),
    })
}
