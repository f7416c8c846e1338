//! Import metrics.

use metrics::{counter, histogram};

pub mod names {
    /// Imports by outcome (success, missing_template_id, fetch_failed, store_failed).
    pub const IMPORTS_TOTAL: &str = "tmpl_imports_total";

    /// Number of variables on successfully imported templates.
    pub const IMPORT_VARIABLES: &str = "tmpl_import_variables";
}

pub fn record_import(outcome: &'static str) {
    counter!(names::IMPORTS_TOTAL, "outcome" => outcome).increment(1);
}

pub fn record_variables(count: usize) {
    histogram!(names::IMPORT_VARIABLES).record(count as f64);
}
