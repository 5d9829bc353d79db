use crate::core::request::{GenericRequest, GenericResponse};
use crate::core::router::Api;
use crate::utils::error::{AppError, Result};
use http::StatusCode;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Runs the facade and turns a handler panic into [`AppError::HandlerPanic`].
pub fn handle_guarded(api: &Api, request: &GenericRequest) -> Result<GenericResponse> {
    panic::catch_unwind(AssertUnwindSafe(|| api.handle(request))).map_err(|payload| {
        AppError::HandlerPanic {
            message: panic_message(payload.as_ref()),
        }
    })
}

pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Reply used by both transports when a request cannot be served.
pub fn failure_response(err: &AppError) -> GenericResponse {
    match err {
        AppError::PayloadTooLarge { .. } => {
            tracing::warn!("{}", err);
            GenericResponse::error(StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", &err.to_string())
        }
        _ => {
            tracing::error!("❌ {}", err);
            GenericResponse::internal_error(&err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::router::RequestHandler;
    use http::{HeaderMap, Method};
    use std::sync::Arc;

    struct Exploding;

    impl RequestHandler for Exploding {
        fn handle(&self, _request: &GenericRequest) -> GenericResponse {
            panic!("database went away");
        }
    }

    #[test]
    fn test_panic_becomes_handler_panic_error() {
        let api = Api::new(Arc::new(Exploding));
        let request = GenericRequest::new(Method::GET, "/", HeaderMap::new(), vec![], vec![]);

        let err = handle_guarded(&api, &request).unwrap_err();

        assert!(matches!(err, AppError::HandlerPanic { ref message } if message == "database went away"));
        assert_eq!(failure_response(&err).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_oversized_body_is_payload_too_large() {
        let response = failure_response(&AppError::PayloadTooLarge { limit: 16 });
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"]["code"], "payload_too_large");
    }

    #[test]
    fn test_panic_message_formats() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let unknown: Box<dyn Any + Send> = Box::new(42u8);

        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(unknown.as_ref()), "unknown panic");
    }
}
