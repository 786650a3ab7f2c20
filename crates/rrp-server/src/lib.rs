//! HTTP server for the Restaurant Rating Pool.
//!
//! Exposes rating submission and lookup over JSON. Every response, success
//! or failure, uses the same envelope: `{ httpStatus, requestId, body }`.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::{AppConfig, ServerConfig};
pub use error::{ApiError, ServerError, ServerResult};
pub use handler::Envelope;
pub use server::RrpServer;
pub use state::AppState;
