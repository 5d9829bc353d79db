//! Transport selection and the two adapters that feed the router facade.
//!
//! The process starts uninitialized, detects its mode once, and then runs in
//! that mode for the rest of its life:
//!
//! - [`TransportMode::Server`]: bind a socket and accept connections.
//! - [`TransportMode::Function`]: hand an invocation callback to the Lambda
//!   runtime, which drives every later invocation.

pub mod function;
pub mod server;

use crate::app::context::AppContext;
use crate::utils::error::Result;
use std::env;

/// Environment variable the Lambda host sets for every function process.
pub const FUNCTION_SIGNAL_VAR: &str = "AWS_LAMBDA_FUNCTION_NAME";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Server,
    Function,
}

impl TransportMode {
    pub fn detect() -> Self {
        Self::detect_from(|key| env::var_os(key).is_some())
    }

    /// Mode from a presence check. The value of the signal is irrelevant.
    pub fn detect_from<F>(is_set: F) -> Self
    where
        F: Fn(&str) -> bool,
    {
        if is_set(FUNCTION_SIGNAL_VAR) {
            Self::Function
        } else {
            Self::Server
        }
    }
}

/// Runs the process in `mode` until the transport stops.
pub async fn run(mode: TransportMode, context: AppContext) -> Result<()> {
    match mode {
        TransportMode::Server => server::run(context).await,
        TransportMode::Function => function::run(context).await,
    }
}
