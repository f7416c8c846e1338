//! Creatomate API request and response types.

use serde::{Deserialize, Serialize};
use tmpl_models::{RenderStatus, TemplateElement, VariableMap};

/// Template as returned by `GET /templates/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatomateTemplate {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub preview_url: Option<String>,

    #[serde(default)]
    pub source: Option<TemplateSource>,

    /// Legacy top-level element list
    #[serde(default)]
    pub elements: Vec<TemplateElement>,

    #[serde(default)]
    pub outputs: Vec<TemplateOutput>,
}

/// The template's composition source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateSource {
    #[serde(default)]
    pub width: Option<u32>,

    #[serde(default)]
    pub height: Option<u32>,

    #[serde(default)]
    pub elements: Vec<TemplateElement>,
}

/// An output preset declared on the template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateOutput {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub width: Option<u32>,

    #[serde(default)]
    pub height: Option<u32>,
}

impl CreatomateTemplate {
    /// Top-level elements, preferring `source.elements`.
    pub fn elements(&self) -> &[TemplateElement] {
        match &self.source {
            Some(source) if !source.elements.is_empty() => &source.elements,
            _ => &self.elements,
        }
    }

    /// Canvas size from the composition source, if declared.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        let source = self.source.as_ref()?;
        Some((source.width?, source.height?))
    }
}

/// A render as returned by the renders endpoints and the webhook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Render {
    pub id: String,

    #[serde(default)]
    pub status: RenderStatus,

    #[serde(default)]
    pub template_id: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub snapshot_url: Option<String>,

    #[serde(default)]
    pub error_message: Option<String>,

    #[serde(default)]
    pub modifications: Option<VariableMap>,

    #[serde(default)]
    pub metadata: Option<String>,
}

/// `GET /renders` returns either `{ "renders": [...] }` or a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RenderListResponse {
    Wrapped { renders: Vec<Render> },
    Bare(Vec<Render>),
}

impl RenderListResponse {
    pub fn into_renders(self) -> Vec<Render> {
        match self {
            RenderListResponse::Wrapped { renders } => renders,
            RenderListResponse::Bare(renders) => renders,
        }
    }
}

/// `POST /renders` returns a render or an array with one per output.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CreateRenderResponse {
    Many(Vec<Render>),
    One(Render),
}

impl CreateRenderResponse {
    pub fn into_first(self) -> Option<Render> {
        match self {
            CreateRenderResponse::Many(renders) => renders.into_iter().next(),
            CreateRenderResponse::One(render) => Some(render),
        }
    }
}

/// Body of `POST /renders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateRenderRequest {
    pub template_id: String,

    pub modifications: VariableMap,

    /// Echoed back on the webhook
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl CreateRenderRequest {
    pub fn new(template_id: impl Into<String>, modifications: VariableMap) -> Self {
        Self {
            template_id: template_id.into(),
            modifications,
            metadata: None,
            webhook_url: None,
        }
    }

    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    pub fn with_webhook_url(mut self, webhook_url: Option<String>) -> Self {
        self.webhook_url = webhook_url;
        self
    }
}
