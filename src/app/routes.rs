use crate::app::handlers::{ExampleHandler, HealthHandler, OtpHandler};
use crate::core::request::{GenericRequest, GenericResponse};
use crate::core::router::RequestHandler;
use http::header::{HeaderValue, ALLOW};
use http::StatusCode;

/// Fully wired handlers plus the path table that selects between them.
pub struct HandlerSet {
    health: HealthHandler,
    examples: ExampleHandler,
    otps: OtpHandler,
}

impl HandlerSet {
    pub fn new(health: HealthHandler, examples: ExampleHandler, otps: OtpHandler) -> Self {
        Self {
            health,
            examples,
            otps,
        }
    }
}

/// Methods served for a known path shape, `None` for unknown paths.
fn allowed_methods(segments: &[&str]) -> Option<&'static str> {
    match segments {
        ["health"] => Some("GET"),
        ["examples"] => Some("GET, POST"),
        ["examples", _] => Some("GET, PUT, PATCH, DELETE"),
        ["otps"] => Some("POST"),
        ["otps", _] => Some("GET"),
        ["otps", _, "verify"] => Some("POST"),
        _ => None,
    }
}

impl RequestHandler for HandlerSet {
    fn handle(&self, request: &GenericRequest) -> GenericResponse {
        let segments: Vec<&str> = request
            .path()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        match (request.method().as_str(), segments.as_slice()) {
            ("GET", ["health"]) => self.health.check(),

            ("GET", ["examples"]) => self.examples.list(),
            ("POST", ["examples"]) => self.examples.create(request),
            ("GET", ["examples", id]) => self.examples.get(id),
            ("PUT", ["examples", id]) => self.examples.replace(id, request),
            ("PATCH", ["examples", id]) => self.examples.patch(id, request),
            ("DELETE", ["examples", id]) => self.examples.delete(id),

            ("POST", ["otps"]) => self.otps.issue(request),
            ("GET", ["otps", id]) => self.otps.get(id),
            ("POST", ["otps", id, "verify"]) => self.otps.verify(id, request),

            (_, segments) => match allowed_methods(segments) {
                Some(allow) => GenericResponse::error(
                    StatusCode::METHOD_NOT_ALLOWED,
                    "method_not_allowed",
                    &format!("{} is not supported on {}", request.method(), request.path()),
                )
                .with_header(ALLOW, HeaderValue::from_static(allow)),
                None => GenericResponse::error(
                    StatusCode::NOT_FOUND,
                    "not_found",
                    &format!("no route for {}", request.path()),
                ),
            },
        }
    }
}
