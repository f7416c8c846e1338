//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tmpl_creatomate::CreatomateError;
use tmpl_importer::ImportError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("Rendering service error: {0}")]
    Creatomate(#[from] CreatomateError),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Import(e) => match e {
                ImportError::MissingTemplateId => StatusCode::BAD_REQUEST,
                ImportError::TemplateFetch { .. } if e.is_not_found() => StatusCode::NOT_FOUND,
                ImportError::TemplateFetch { .. } => StatusCode::BAD_GATEWAY,
                ImportError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Creatomate(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn is_internal(&self) -> bool {
        matches!(
            self,
            ApiError::Internal(_) | ApiError::Import(ImportError::Store(_))
        )
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Import(ImportError::TemplateFetch {
                template_id,
                source,
                ..
            }) => format!(
                "Template {} not found or could not be fetched: {}",
                template_id, source
            ),
            other => other.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let detail = if self.is_internal()
            && std::env::var("ENVIRONMENT").unwrap_or_default() == "production"
        {
            "An internal error occurred".to_string()
        } else {
            self.detail()
        };

        let code = match &self {
            ApiError::Import(e) => Some(e.stage().to_string()),
            _ => None,
        };

        (status, Json(ErrorResponse { detail, code })).into_response()
    }
}
