//! Shared data models for the template studio backend.
//!
//! This crate provides Serde-serializable types for:
//! - Imported templates and output platforms
//! - Rendering-SaaS element trees
//! - Template variables and their editor categories
//! - Render jobs and webhook metadata

pub mod element;
pub mod render;
pub mod template;
pub mod variable;

// Re-export common types
pub use element::{EffectiveElement, ElementProperties, TemplateElement};
pub use render::{MetadataError, RenderJob, RenderJobId, RenderMetadata, RenderStatus};
pub use template::{ImportedTemplate, Platform, TemplateId};
pub use variable::{CategorizedVariable, CategorizedVariables, PropertyType, VariableMap};
