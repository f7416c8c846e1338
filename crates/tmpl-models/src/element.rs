//! Rendering-SaaS template element tree.
//!
//! Elements arrive with their overridable fields either on the element itself
//! or nested under `properties`. [`TemplateElement::effective`] flattens both
//! locations into one view so callers never check twice.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Overridable fields that may be nested under an element's `properties`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic: Option<bool>,
}

/// A node in a template's composition tree.
///
/// Unknown fields (position, timing, animations, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateElement {
    /// Element name as set in the template editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Element type (text, image, video, audio, shape, composition, ...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Value>,

    /// Whether the element is marked as dynamic (overridable at render time)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ElementProperties>,

    /// Nested elements (compositions)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<TemplateElement>,
}

/// Flattened, borrowed view of a [`TemplateElement`].
#[derive(Debug, Clone, Copy)]
pub struct EffectiveElement<'a> {
    pub name: Option<&'a str>,
    pub element_type: Option<&'a str>,
    pub text: Option<&'a Value>,
    pub source: Option<&'a Value>,
    pub fill_color: Option<&'a Value>,
    pub dynamic: bool,
    pub children: &'a [TemplateElement],
}

impl TemplateElement {
    /// Create a named element of the given type.
    pub fn new(name: impl Into<String>, element_type: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            element_type: Some(element_type.into()),
            ..Default::default()
        }
    }

    /// Flatten `properties.*` into the element's own fields.
    ///
    /// Fields set directly on the element take precedence over `properties`.
    /// An empty `name` counts as absent.
    pub fn effective(&self) -> EffectiveElement<'_> {
        let props = self.properties.as_ref();

        EffectiveElement {
            name: self.name.as_deref().filter(|n| !n.is_empty()),
            element_type: self.element_type.as_deref(),
            text: self.text.as_ref().or_else(|| props.and_then(|p| p.text.as_ref())),
            source: self
                .source
                .as_ref()
                .or_else(|| props.and_then(|p| p.source.as_ref())),
            fill_color: self
                .fill_color
                .as_ref()
                .or_else(|| props.and_then(|p| p.fill_color.as_ref())),
            dynamic: self
                .dynamic
                .or_else(|| props.and_then(|p| p.dynamic))
                .unwrap_or(false),
            children: &self.elements,
        }
    }
}
