//! Template import orchestration.
//!
//! [`TemplateImporter`] sequences CURL parsing, template fetch, element
//! extraction, the sample-render lookup and the description fallback, then
//! merges everything into one canonical variable map. Stores for imported
//! templates and render jobs live in [`store`].

pub mod config;
pub mod error;
pub mod importer;
pub mod logging;
pub mod metrics;
pub mod sources;
pub mod store;

pub use config::ImporterConfig;
pub use error::{ImportError, ImportResult};
pub use importer::{ImportReport, ImportRequest, ImportStage, TemplateImporter};
pub use logging::ImportLogger;
pub use sources::{RenderSource, TemplateSource};
pub use store::{InMemoryRenderStore, InMemoryTemplateStore, RenderStore, TemplateStore};
