use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Largest request body either transport accepts.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Transport-agnostic view of an incoming HTTP request.
///
/// Header names are stored normalized, so lookups are case-insensitive.
/// Query parameters keep their arrival order, including repeated keys.
#[derive(Debug, Clone)]
pub struct GenericRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    body: Vec<u8>,
}

impl GenericRequest {
    pub fn new(
        method: Method,
        path: impl Into<String>,
        headers: HeaderMap,
        query: Vec<(String, String)>,
        body: Vec<u8>,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            headers,
            query,
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of `name`, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn query_param<'a>(&'a self, key: &'a str) -> Option<&'a str> {
        self.query_values(key).next()
    }

    pub fn query_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.query
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

/// Splits a raw query string into decoded pairs, preserving order.
pub fn parse_query(raw: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
}

/// Transport-agnostic response produced by the handler set.
#[derive(Debug, Clone)]
pub struct GenericResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl GenericResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self::new(status)
                .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .with_body(body),
            Err(e) => Self::internal_error(&format!("failed to serialize response: {}", e)),
        }
    }

    /// Error envelope: `{"error":{"code":..,"message":..}}`.
    pub fn error(status: StatusCode, code: &str, message: &str) -> Self {
        Self::json(
            status,
            &ErrorEnvelope {
                error: ErrorBody { code, message },
            },
        )
    }

    pub fn internal_error(message: &str) -> Self {
        let body = serde_json::json!({
            "error": { "code": "internal_error", "message": message }
        });
        Self::new(StatusCode::INTERNAL_SERVER_ERROR)
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(body.to_string().into_bytes())
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_parts(self) -> (StatusCode, HeaderMap, Vec<u8>) {
        (self.status, self.headers, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_header(name: &'static str, value: &'static str) -> GenericRequest {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_static(value),
        );
        GenericRequest::new(Method::GET, "/", headers, Vec::new(), Vec::new())
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let request = request_with_header("content-type", "application/json");

        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.header("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(request.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_custom_header_lookup_ignores_case() {
        let request = request_with_header("X-Requested-With", "XMLHttpRequest");
        assert_eq!(request.header("x-requested-with"), Some("XMLHttpRequest"));
    }

    #[test]
    fn test_parse_query_keeps_repeated_keys_in_order() {
        let query = parse_query("tag=b&page=2&tag=a&q=hello%20world");
        assert_eq!(
            query,
            vec![
                ("tag".to_string(), "b".to_string()),
                ("page".to_string(), "2".to_string()),
                ("tag".to_string(), "a".to_string()),
                ("q".to_string(), "hello world".to_string()),
            ]
        );

        let request = GenericRequest::new(Method::GET, "/", HeaderMap::new(), query, Vec::new());
        assert_eq!(request.query_param("tag"), Some("b"));
        assert_eq!(request.query_values("tag").collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(request.query_param("missing"), None);
    }

    #[test]
    fn test_error_envelope_shape() {
        let response = GenericResponse::error(StatusCode::NOT_FOUND, "not_found", "no such example");
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");
        assert_eq!(body["error"]["message"], "no such example");
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    }
}
