//! Imported template models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::variable::VariableMap;

/// Unique identifier for an imported template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct TemplateId(pub String);

impl TemplateId {
    /// Generate a new random template ID.
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

impl Default for TemplateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TemplateId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Output target a template can be rendered for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Platform {
    /// Stable identifier (e.g. "instagram_story")
    pub id: String,
    /// Display name
    pub name: String,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
}

impl Platform {
    pub fn new(id: impl Into<String>, name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            width,
            height,
        }
    }

    /// Aspect ratio label such as "9:16".
    pub fn aspect_ratio(&self) -> String {
        let divisor = gcd(self.width, self.height).max(1);
        format!("{}:{}", self.width / divisor, self.height / divisor)
    }
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// A rendering-SaaS template imported into the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ImportedTemplate {
    pub id: TemplateId,

    /// Display name
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_image_url: Option<String>,

    /// Identifier of the template on the rendering SaaS
    pub creatomate_template_id: String,

    /// Canonical variable map (normalized at import and on every edit)
    #[serde(default)]
    pub variables: VariableMap,

    #[serde(default)]
    pub platforms: Vec<Platform>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default = "default_active")]
    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl ImportedTemplate {
    /// Create a new active template with no variables.
    pub fn new(name: impl Into<String>, creatomate_template_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TemplateId::new(),
            name: name.into(),
            description: String::new(),
            preview_image_url: None,
            creatomate_template_id: creatomate_template_id.into(),
            variables: VariableMap::new(),
            platforms: Vec::new(),
            category: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Look up a platform by id.
    pub fn platform(&self, platform_id: &str) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == platform_id)
    }

    /// Mark the template as modified now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_id_roundtrip() {
        let id = TemplateId::from_string("abc");
        assert_eq!(id.as_str(), "abc");
        assert_eq!(id.to_string(), "abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }

    #[test]
    fn test_platform_aspect_ratio() {
        assert_eq!(Platform::new("story", "Story", 1080, 1920).aspect_ratio(), "9:16");
        assert_eq!(Platform::new("feed", "Feed", 1080, 1080).aspect_ratio(), "1:1");
    }

    #[test]
    fn test_new_template_defaults() {
        let template = ImportedTemplate::new("Promo", "36481fd5-8dfe-4359-9544-76d8857acf3d");
        assert!(template.is_active);
        assert!(template.variables.is_empty());
        assert_eq!(template.created_at, template.updated_at);
    }

    #[test]
    fn test_deserialize_defaults_active() {
        let json = serde_json::json!({
            "id": "t1",
            "name": "Promo",
            "creatomate_template_id": "abc",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        });
        let template: ImportedTemplate = serde_json::from_value(json).unwrap();
        assert!(template.is_active);
        assert!(template.platforms.is_empty());
    }
}
