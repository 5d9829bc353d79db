pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod transport;
pub mod utils;

pub use app::AppContext;
pub use config::{AppConfig, CliArgs};
pub use crate::core::{Api, GenericRequest, GenericResponse, RequestHandler};
pub use transport::TransportMode;
pub use utils::error::{AppError, Result};
