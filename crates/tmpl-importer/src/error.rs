//! Import error types.

use thiserror::Error;
use tmpl_creatomate::CreatomateError;

use crate::importer::ImportStage;

pub type ImportResult<T> = Result<T, ImportError>;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("No template id given and none found in the CURL command")]
    MissingTemplateId,

    #[error("Template {template_id} could not be fetched during {stage}: {source}")]
    TemplateFetch {
        stage: ImportStage,
        template_id: String,
        #[source]
        source: CreatomateError,
    },

    #[error("Store error: {0}")]
    Store(String),
}

impl ImportError {
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Stage the import failed in.
    pub fn stage(&self) -> ImportStage {
        match self {
            ImportError::MissingTemplateId => ImportStage::ParseCurl,
            ImportError::TemplateFetch { stage, .. } => *stage,
            ImportError::Store(_) => ImportStage::Persist,
        }
    }

    /// True when the rendering API reported the template as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ImportError::TemplateFetch { source, .. } if source.is_not_found())
    }

    /// Label used for the import outcome metric.
    pub fn outcome(&self) -> &'static str {
        match self {
            ImportError::MissingTemplateId => "missing_template_id",
            ImportError::TemplateFetch { .. } => "fetch_failed",
            ImportError::Store(_) => "store_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_and_outcome() {
        let err = ImportError::MissingTemplateId;
        assert_eq!(err.stage(), ImportStage::ParseCurl);
        assert_eq!(err.outcome(), "missing_template_id");

        let err = ImportError::store("disk full");
        assert_eq!(err.stage(), ImportStage::Persist);
    }

    #[test]
    fn test_fetch_not_found() {
        let err = ImportError::TemplateFetch {
            stage: ImportStage::FetchTemplate,
            template_id: "abc".to_string(),
            source: CreatomateError::not_found("abc"),
        };
        assert!(err.is_not_found());
        assert_eq!(err.stage(), ImportStage::FetchTemplate);
        assert!(err.to_string().contains("fetch_template"));
    }
}
