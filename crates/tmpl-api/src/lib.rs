//! Axum HTTP API server.
//!
//! This crate provides:
//! - Admin template import from a template id or a pasted CURL command
//! - Template listing, editing and categorized variables for the editor
//! - Render submission and the rendering webhook receiver
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
