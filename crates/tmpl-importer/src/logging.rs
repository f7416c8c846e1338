//! Structured import logging.
//!
//! Every log line carries the template id and the import stage so a single
//! import can be followed through the logs.

use tracing::{error, info, warn, Span};

use crate::importer::ImportStage;

/// Import logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct ImportLogger {
    template_id: String,
    operation: String,
}

impl ImportLogger {
    /// Create a logger for one import of `template_id`.
    pub fn new(template_id: &str) -> Self {
        Self::with_operation(template_id, "template_import")
    }

    pub fn with_operation(template_id: &str, operation: &str) -> Self {
        Self {
            template_id: template_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            template_id = %self.template_id,
            operation = %self.operation,
            "Import started: {}", message
        );
    }

    /// Log the result of one stage.
    pub fn log_stage(&self, stage: ImportStage, message: &str) {
        info!(
            template_id = %self.template_id,
            operation = %self.operation,
            stage = %stage,
            "Import stage: {}", message
        );
    }

    pub fn log_warning(&self, stage: ImportStage, message: &str) {
        warn!(
            template_id = %self.template_id,
            operation = %self.operation,
            stage = %stage,
            "Import warning: {}", message
        );
    }

    pub fn log_error(&self, stage: ImportStage, message: &str) {
        error!(
            template_id = %self.template_id,
            operation = %self.operation,
            stage = %stage,
            "Import error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            template_id = %self.template_id,
            operation = %self.operation,
            "Import completed: {}", message
        );
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Span covering the whole import.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "import",
            template_id = %self.template_id,
            operation = %self.operation
        )
    }
}
