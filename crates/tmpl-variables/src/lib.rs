//! Template variable extraction and normalization.
//!
//! This crate turns loosely structured variable data into a canonical,
//! de-duplicated variable set:
//! - `curl`: template id and modifications from pasted CURL commands
//! - `json_repair`: staged repair of near-JSON literals
//! - `elements`: variables derived from a template's element tree
//! - `normalize`: merging sources and resolving key collisions
//! - `categorize`: text/media/color sections for the editor
//!
//! Everything here is synchronous and free of I/O.

pub mod categorize;
pub mod curl;
pub mod elements;
pub mod error;
pub mod json_repair;
pub mod normalize;

pub use categorize::categorize_variables;
pub use curl::{extract_modifications, extract_template_id, parse_curl_command, require_template_id, ParsedCurl};
pub use elements::extract_element_variables;
pub use error::{VariableError, VariableResult};
pub use json_repair::{repair_json, RepairPass};
pub use normalize::{base_property, merge_absent, merge_sources, normalize_variables};
