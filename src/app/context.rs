use crate::adapters::logger::TracingLogger;
use crate::adapters::memory::DocumentStore;
use crate::app::handlers::{ExampleHandler, HealthHandler, OtpHandler};
use crate::app::routes::HandlerSet;
use crate::app::services::{ExampleService, OtpService};
use crate::config::AppConfig;
use crate::core::router::{Api, RequestHandler};
use crate::domain::ports::Logger;
use std::sync::Arc;

/// Composition root: everything a transport needs, built once per process.
#[derive(Clone)]
pub struct AppContext {
    config: AppConfig,
    logger: Arc<dyn Logger>,
    store: Arc<DocumentStore>,
    handlers: Arc<dyn RequestHandler>,
}

impl AppContext {
    pub fn build(config: AppConfig) -> Self {
        Self::build_with_logger(config, Arc::new(TracingLogger))
    }

    pub fn build_with_logger(config: AppConfig, logger: Arc<dyn Logger>) -> Self {
        // 建立儲存層
        let store = Arc::new(DocumentStore::new(config.storage.clone()));

        // 建立服務與處理器
        let examples = ExampleService::new(store.clone(), logger.clone());
        let otps = OtpService::new(store.clone(), logger.clone());
        let handlers = HandlerSet::new(
            HealthHandler::new(config.environment_label()),
            ExampleHandler::new(examples),
            OtpHandler::new(otps),
        );

        Self {
            config,
            logger,
            store,
            handlers: Arc::new(handlers),
        }
    }

    /// Swaps the handler set while keeping the rest of the wiring.
    pub fn with_handlers(mut self, handlers: Arc<dyn RequestHandler>) -> Self {
        self.handlers = handlers;
        self
    }

    /// A router facade over this context's handler set.
    pub fn api(&self) -> Api {
        Api::new(self.handlers.clone())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }
}
