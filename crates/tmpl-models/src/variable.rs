//! Template variable models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Flat, insertion-ordered map from dotted-path key to value.
///
/// Keys look like `Heading.text` or `Background.source`; values are usually
/// strings but may be any JSON value.
pub type VariableMap = serde_json::Map<String, serde_json::Value>;

/// The three editable variable kinds surfaced to end users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    /// Text content
    Text,
    /// Media URL (image, video, audio)
    Source,
    /// Fill color
    Fill,
}

impl PropertyType {
    pub const ALL: [PropertyType; 3] = [PropertyType::Text, PropertyType::Source, PropertyType::Fill];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Text => "text",
            PropertyType::Source => "source",
            PropertyType::Fill => "fill",
        }
    }

    /// Parse a key segment. Matching is exact (`Text` is not a property type).
    pub fn parse(segment: &str) -> Option<Self> {
        match segment {
            "text" => Some(PropertyType::Text),
            "source" => Some(PropertyType::Source),
            "fill" => Some(PropertyType::Fill),
            _ => None,
        }
    }

    /// Build the canonical `ElementName.property` key.
    pub fn key_for(&self, element_name: &str) -> String {
        format!("{}.{}", element_name, self.as_str())
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A variable prepared for the template editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CategorizedVariable {
    /// Key as stored on the template
    pub key: String,
    /// First key segment
    pub element_name: String,
    /// Value rendered as a string
    pub value: String,
    pub property_type: PropertyType,
}

/// Editor sections derived from a template's variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CategorizedVariables {
    pub text_variables: Vec<CategorizedVariable>,
    pub media_variables: Vec<CategorizedVariable>,
    pub color_variables: Vec<CategorizedVariable>,
}

impl CategorizedVariables {
    /// True if any section has at least one variable.
    pub fn has_variables(&self) -> bool {
        !self.text_variables.is_empty()
            || !self.media_variables.is_empty()
            || !self.color_variables.is_empty()
    }

    /// Total number of variables across sections.
    pub fn len(&self) -> usize {
        self.text_variables.len() + self.media_variables.len() + self.color_variables.len()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_variables()
    }

    /// Iterate text, media and color variables in that order.
    pub fn iter(&self) -> impl Iterator<Item = &CategorizedVariable> {
        self.text_variables
            .iter()
            .chain(self.media_variables.iter())
            .chain(self.color_variables.iter())
    }

    /// Flatten the sections back into a `key -> value` map.
    pub fn to_variable_map(&self) -> VariableMap {
        self.iter()
            .map(|v| (v.key.clone(), serde_json::Value::String(v.value.clone())))
            .collect()
    }
}
