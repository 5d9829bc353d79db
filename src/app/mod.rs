pub mod context;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;

pub use context::AppContext;
