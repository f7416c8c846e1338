//! Client for the Creatomate rendering API.
//!
//! Covers the three calls the import and render flows need:
//! - fetching a template (element tree and metadata)
//! - listing a template's most recent renders
//! - creating a render
//!
//! Network errors, 429 and 5xx responses are retried with exponential
//! backoff; every request is recorded in metrics.

pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod retry;
pub mod types;

pub use client::CreatomateClient;
pub use config::CreatomateConfig;
pub use error::{CreatomateError, CreatomateResult};
pub use retry::RetryConfig;
pub use types::{CreateRenderRequest, CreatomateTemplate, Render, TemplateOutput};
