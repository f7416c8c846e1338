//! Variables derived from a template's element tree.

use std::collections::HashMap;

use serde_json::Value;
use tmpl_models::{PropertyType, TemplateElement, VariableMap};
use tracing::debug;

/// Element types whose dynamic placeholder is a media source.
const MEDIA_TYPES: [&str; 3] = ["image", "video", "audio"];

/// Walk `elements` (depth-first, parents before children) and collect
/// `Element.text`, `Element.source` and `Element.fill` variables.
///
/// Unnamed elements get a synthesized name `{type}{n}` (or `Element{n}` when
/// the type is missing), where `n` counts unnamed elements of that type across
/// the whole walk. The first write to a key wins.
pub fn extract_element_variables(elements: &[TemplateElement]) -> VariableMap {
    let mut walker = ElementWalker::default();
    walker.walk(elements);

    debug!(variables = walker.variables.len(), "Extracted element variables");
    walker.variables
}

#[derive(Default)]
struct ElementWalker {
    variables: VariableMap,
    synthesized: HashMap<String, usize>,
}

impl ElementWalker {
    fn walk(&mut self, elements: &[TemplateElement]) {
        for element in elements {
            let eff = element.effective();
            let name = match eff.name {
                Some(name) => name.to_string(),
                None => self.synthesize_name(eff.element_type),
            };

            let mut captured = false;
            for (property, value) in [
                (PropertyType::Text, eff.text),
                (PropertyType::Source, eff.source),
                (PropertyType::Fill, eff.fill_color),
            ] {
                if let Some(value) = value {
                    self.emit(property, &name, value.clone());
                    captured = true;
                }
            }

            if eff.dynamic && !captured {
                match eff.element_type {
                    Some("text") => {
                        let placeholder = format!("Text for {}", name);
                        self.emit(PropertyType::Text, &name, Value::String(placeholder));
                    }
                    Some(kind) if MEDIA_TYPES.contains(&kind) => {
                        self.emit(PropertyType::Source, &name, Value::String(String::new()));
                    }
                    _ => {}
                }
            }

            self.walk(eff.children);
        }
    }

    fn emit(&mut self, property: PropertyType, name: &str, value: Value) {
        let key = property.key_for(name);
        if self.variables.contains_key(&key) {
            debug!(key = %key, "Duplicate element variable ignored");
            return;
        }
        self.variables.insert(key, value);
    }

    fn synthesize_name(&mut self, element_type: Option<&str>) -> String {
        let prefix = element_type.filter(|t| !t.is_empty()).unwrap_or("Element");
        let counter = self.synthesized.entry(prefix.to_string()).or_insert(0);
        let name = format!("{}{}", prefix, counter);
        *counter += 1;
        name
    }
}
