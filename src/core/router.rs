use crate::core::request::{GenericRequest, GenericResponse};
use std::sync::Arc;

/// Contract every handler set exposes to the transports.
pub trait RequestHandler: Send + Sync {
    fn handle(&self, request: &GenericRequest) -> GenericResponse;
}

/// Single routing entry point shared by both transports.
///
/// Holds nothing but the handler set it was built with, so it can be cloned
/// into every connection task or rebuilt per invocation at no cost. Panics
/// raised by handlers propagate to the caller; recovering from them is the
/// transport's job.
#[derive(Clone)]
pub struct Api {
    handlers: Arc<dyn RequestHandler>,
}

impl Api {
    pub fn new(handlers: Arc<dyn RequestHandler>) -> Self {
        Self { handlers }
    }

    pub fn handle(&self, request: &GenericRequest) -> GenericResponse {
        tracing::debug!(method = %request.method(), path = request.path(), "handling request");
        let response = self.handlers.handle(request);
        tracing::debug!(status = response.status().as_u16(), "request handled");
        response
    }
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api").finish_non_exhaustive()
    }
}
