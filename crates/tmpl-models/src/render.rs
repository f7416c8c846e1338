//! Render job models and webhook metadata.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::template::TemplateId;
use crate::variable::VariableMap;

/// Unique identifier for a local render job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RenderJobId(pub String);

impl RenderJobId {
    /// Generate a new random render job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RenderJobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RenderJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Render status as reported by the rendering SaaS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum RenderStatus {
    /// Accepted, not yet scheduled
    #[default]
    Planned,
    /// Waiting for a render slot
    Waiting,
    /// Generating subtitles
    Transcribing,
    /// Being rendered
    Rendering,
    /// Output available
    Succeeded,
    /// Render failed
    Failed,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::Planned => "planned",
            RenderStatus::Waiting => "waiting",
            RenderStatus::Transcribing => "transcribing",
            RenderStatus::Rendering => "rendering",
            RenderStatus::Succeeded => "succeeded",
            RenderStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RenderStatus::Succeeded | RenderStatus::Failed)
    }
}

impl fmt::Display for RenderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A render submitted on behalf of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RenderJob {
    pub id: RenderJobId,

    /// Local template the render was created from
    pub template_id: TemplateId,

    /// Template identifier on the rendering SaaS
    pub creatomate_template_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<String>,

    /// Render identifier on the rendering SaaS (set once submitted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creatomate_render_id: Option<String>,

    /// Modifications sent with the render
    #[serde(default)]
    pub modifications: VariableMap,

    #[serde(default)]
    pub status: RenderStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl RenderJob {
    /// Create a planned render job.
    pub fn new(
        template_id: TemplateId,
        creatomate_template_id: impl Into<String>,
        platform_id: Option<String>,
        modifications: VariableMap,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RenderJobId::new(),
            template_id,
            creatomate_template_id: creatomate_template_id.into(),
            platform_id,
            creatomate_render_id: None,
            modifications,
            status: RenderStatus::Planned,
            output_url: None,
            snapshot_url: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Metadata string to embed in the render request.
    pub fn metadata(&self) -> RenderMetadata {
        RenderMetadata {
            job_id: self.id.to_string(),
            platform_id: self.platform_id.clone(),
            extra: Vec::new(),
        }
    }

    /// Apply a status update.
    ///
    /// Updates after a terminal status are ignored so a late, out-of-order
    /// callback cannot overwrite the final result.
    pub fn apply_status(
        &mut self,
        status: RenderStatus,
        output_url: Option<String>,
        snapshot_url: Option<String>,
        error_message: Option<String>,
    ) -> bool {
        if self.status.is_terminal() {
            return false;
        }

        self.status = status;
        if output_url.is_some() {
            self.output_url = output_url;
        }
        if snapshot_url.is_some() {
            self.snapshot_url = snapshot_url;
        }
        if error_message.is_some() {
            self.error_message = error_message;
        }
        self.updated_at = Utc::now();
        true
    }
}

/// Errors parsing a render metadata string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("Render metadata is missing job_id: {0:?}")]
    MissingJobId(String),
}

/// Correlation data embedded in a render request as `key:value|key:value`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderMetadata {
    pub job_id: String,
    pub platform_id: Option<String>,
    /// Other pairs, in their original order
    pub extra: Vec<(String, String)>,
}

impl RenderMetadata {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            ..Default::default()
        }
    }

    pub fn with_platform(mut self, platform_id: impl Into<String>) -> Self {
        self.platform_id = Some(platform_id.into());
        self
    }

    /// Encode as `job_id:<id>|platform_id:<id>|...`.
    pub fn encode(&self) -> String {
        let mut parts = vec![format!("job_id:{}", self.job_id)];
        if let Some(platform_id) = &self.platform_id {
            parts.push(format!("platform_id:{}", platform_id));
        }
        for (key, value) in &self.extra {
            parts.push(format!("{}:{}", key, value));
        }
        parts.join("|")
    }

    /// Parse a metadata string.
    ///
    /// Segments are split on the first `:` so values may contain colons.
    /// Empty segments and segments without a colon are skipped.
    pub fn parse(raw: &str) -> Result<Self, MetadataError> {
        let mut job_id = None;
        let mut platform_id = None;
        let mut extra = Vec::new();

        for segment in raw.split('|') {
            let Some((key, value)) = segment.split_once(':') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() || value.is_empty() {
                continue;
            }

            match key {
                "job_id" => job_id = Some(value.to_string()),
                "platform_id" => platform_id = Some(value.to_string()),
                _ => extra.push((key.to_string(), value.to_string())),
            }
        }

        let job_id = job_id.ok_or_else(|| MetadataError::MissingJobId(raw.to_string()))?;

        Ok(Self {
            job_id,
            platform_id,
            extra,
        })
    }
}

impl fmt::Display for RenderMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_encode() {
        let meta = RenderMetadata::new("job-1").with_platform("instagram_story");
        assert_eq!(meta.encode(), "job_id:job-1|platform_id:instagram_story");
    }

    #[test]
    fn test_metadata_parse_tolerates_noise() {
        let meta = RenderMetadata::parse(" platform_id : tiktok || job_id:abc |junk| source:https://x/a").unwrap();
        assert_eq!(meta.job_id, "abc");
        assert_eq!(meta.platform_id.as_deref(), Some("tiktok"));
        assert_eq!(meta.extra, vec![("source".to_string(), "https://x/a".to_string())]);
    }

    #[test]
    fn test_metadata_parse_requires_job_id() {
        assert!(matches!(
            RenderMetadata::parse("platform_id:tiktok"),
            Err(MetadataError::MissingJobId(_))
        ));
        assert!(RenderMetadata::parse("").is_err());
    }

    #[test]
    fn test_render_status_terminal() {
        assert!(RenderStatus::Succeeded.is_terminal());
        assert!(RenderStatus::Failed.is_terminal());
        assert!(!RenderStatus::Rendering.is_terminal());
        assert_eq!(
            serde_json::from_str::<RenderStatus>("\"transcribing\"").unwrap(),
            RenderStatus::Transcribing
        );
    }

    #[test]
    fn test_apply_status_ignores_late_updates() {
        let mut job = RenderJob::new(TemplateId::from("t1"), "ct1", None, VariableMap::new());
        assert!(job.apply_status(RenderStatus::Succeeded, Some("https://cdn/x.mp4".into()), None, None));
        assert!(!job.apply_status(RenderStatus::Rendering, None, None, None));
        assert_eq!(job.status, RenderStatus::Succeeded);
        assert_eq!(job.output_url.as_deref(), Some("https://cdn/x.mp4"));
    }

    #[test]
    fn test_job_metadata_roundtrip() {
        let job = RenderJob::new(
            TemplateId::from("t1"),
            "ct1",
            Some("feed".to_string()),
            VariableMap::new(),
        );
        let parsed = RenderMetadata::parse(&job.metadata().encode()).unwrap();
        assert_eq!(parsed.job_id, job.id.as_str());
        assert_eq!(parsed.platform_id.as_deref(), Some("feed"));
    }
}
