//! Editor sections for a template's variables.

use std::collections::HashSet;

use serde_json::Value;
use tmpl_models::{CategorizedVariable, CategorizedVariables, PropertyType, VariableMap};
use tracing::trace;

/// Split normalized `variables` into text, media and color sections.
///
/// Null values, keys whose second segment is not a property type and nested
/// `source` paths are dropped. Only the first key per element and property
/// type is kept. Each section is ordered by element name (case-insensitive,
/// stable).
pub fn categorize_variables(variables: &VariableMap) -> CategorizedVariables {
    let mut categories = CategorizedVariables::default();
    let mut emitted: HashSet<(&str, PropertyType)> = HashSet::new();

    for (key, value) in variables {
        if value.is_null() {
            continue;
        }

        let mut segments = key.split('.');
        let element_name = segments.next().unwrap_or_default();
        let Some(property_type) = segments.next().and_then(PropertyType::parse) else {
            trace!(key = %key, "Not a property variable");
            continue;
        };

        if emitted.contains(&(element_name, property_type)) {
            trace!(key = %key, "Duplicate property variable skipped");
            continue;
        }

        if is_nested_source(key) {
            trace!(key = %key, "Nested source path skipped");
            continue;
        }

        emitted.insert((element_name, property_type));

        let variable = CategorizedVariable {
            key: key.clone(),
            element_name: element_name.to_string(),
            value: value_to_string(value),
            property_type,
        };

        match property_type {
            PropertyType::Text => categories.text_variables.push(variable),
            PropertyType::Source => categories.media_variables.push(variable),
            PropertyType::Fill => categories.color_variables.push(variable),
        }
    }

    for section in [
        &mut categories.text_variables,
        &mut categories.media_variables,
        &mut categories.color_variables,
    ] {
        section.sort_by_cached_key(|v| v.element_name.to_lowercase());
    }

    categories
}

/// `X.source.source` and `X.source.<anything>` paths other than a plain
/// `.source` suffix.
fn is_nested_source(key: &str) -> bool {
    key.ends_with(".source.source") || (key.contains(".source.") && !key.ends_with(".source"))
}

/// Strings as-is, everything else as compact JSON.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
