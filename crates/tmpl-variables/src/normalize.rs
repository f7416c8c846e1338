//! Merging variable sources and resolving key collisions.
//!
//! The same logical variable can show up under several depths depending on
//! where it came from (`Heading.text` from an element tree,
//! `Heading.text.text` from an older render). Keys are grouped by their base
//! property (first two segments, second one a [`PropertyType`]) and only the
//! shallowest key of each group survives.

use std::collections::HashMap;

use serde_json::Value;
use tmpl_models::{PropertyType, VariableMap};
use tracing::debug;

/// Base property of a key: the `Element.property` prefix and its type.
///
/// Returns `None` when the key has fewer than two segments or its second
/// segment is not `text`, `source` or `fill`.
pub fn base_property(key: &str) -> Option<(&str, PropertyType)> {
    let first_dot = key.find('.')?;
    let rest = &key[first_dot + 1..];
    let second_len = rest.find('.').unwrap_or(rest.len());

    let property = PropertyType::parse(&rest[..second_len])?;
    Some((&key[..first_dot + 1 + second_len], property))
}

fn segment_count(key: &str) -> usize {
    key.split('.').count()
}

enum Slot<'a> {
    Passthrough(&'a str, &'a Value),
    Group(usize),
}

/// Collapse each base-property group to its shallowest key.
///
/// Groups with a single key are kept as-is. Ties on depth go to the key seen
/// first. Keys without a base property pass through. Each surviving entry
/// keeps the position of its group's first key, so the output order is
/// stable and the function is idempotent.
pub fn normalize_variables(variables: &VariableMap) -> VariableMap {
    let mut slots: Vec<Slot<'_>> = Vec::with_capacity(variables.len());
    let mut groups: Vec<Vec<(&str, &Value)>> = Vec::new();
    let mut group_index: HashMap<&str, usize> = HashMap::new();

    for (key, value) in variables {
        let key = key.as_str();
        match base_property(key) {
            Some((base, _)) => match group_index.get(base) {
                Some(&idx) => groups[idx].push((key, value)),
                None => {
                    group_index.insert(base, groups.len());
                    slots.push(Slot::Group(groups.len()));
                    groups.push(vec![(key, value)]);
                }
            },
            None => slots.push(Slot::Passthrough(key, value)),
        }
    }

    let mut normalized = VariableMap::new();
    let mut collapsed = 0usize;

    for slot in slots {
        let (key, value) = match slot {
            Slot::Passthrough(key, value) => (key, value),
            Slot::Group(idx) => {
                let members = &mut groups[idx];
                collapsed += members.len() - 1;
                // Stable, so the first key wins among equally shallow ones.
                members.sort_by_key(|(key, _)| segment_count(key));
                members[0]
            }
        };
        normalized.insert(key.to_string(), value.clone());
    }

    if collapsed > 0 {
        debug!(
            input = variables.len(),
            output = normalized.len(),
            collapsed,
            "Collapsed duplicate variable keys"
        );
    }

    normalized
}

/// Copy entries of `source` whose key is not yet in `target`.
///
/// Returns the number of entries added.
pub fn merge_absent(target: &mut VariableMap, source: &VariableMap) -> usize {
    let mut added = 0;
    for (key, value) in source {
        if !target.contains_key(key) {
            target.insert(key.clone(), value.clone());
            added += 1;
        }
    }
    added
}

/// Merge `sources` in priority order (earlier sources win on equal keys),
/// then normalize.
pub fn merge_sources<'a, I>(sources: I) -> VariableMap
where
    I: IntoIterator<Item = &'a VariableMap>,
{
    let mut merged = VariableMap::new();
    for source in sources {
        merge_absent(&mut merged, source);
    }
    normalize_variables(&merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> VariableMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn keys(map: &VariableMap) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_base_property() {
        assert_eq!(base_property("Heading.text"), Some(("Heading.text", PropertyType::Text)));
        assert_eq!(
            base_property("Logo.source.source"),
            Some(("Logo.source", PropertyType::Source))
        );
        assert_eq!(base_property("Panel.fill"), Some(("Panel.fill", PropertyType::Fill)));
        assert_eq!(base_property("Panel.opacity"), None);
        assert_eq!(base_property("Heading"), None);
        assert_eq!(base_property("Heading.Text"), None);
    }

    #[test]
    fn test_shallowest_key_wins() {
        let input = map(json!({
            "Heading.text.text": "deep",
            "Heading.text": "shallow",
            "Logo.source": "https://x/l.png"
        }));

        let normalized = normalize_variables(&input);
        assert_eq!(
            Value::Object(normalized),
            json!({ "Heading.text": "shallow", "Logo.source": "https://x/l.png" })
        );
    }

    #[test]
    fn test_group_keeps_first_position() {
        let input = map(json!({
            "Heading.text.text": "deep",
            "Logo.source": "https://x/l.png",
            "Heading.text": "shallow"
        }));

        let normalized = normalize_variables(&input);
        assert_eq!(keys(&normalized), ["Heading.text", "Logo.source"]);
        assert_eq!(normalized["Heading.text"], json!("shallow"));
    }

    #[test]
    fn test_tie_goes_to_first_key() {
        let input = map(json!({
            "Title.text.a": "first",
            "Title.text.b": "second"
        }));

        let normalized = normalize_variables(&input);
        assert_eq!(Value::Object(normalized), json!({ "Title.text.a": "first" }));
    }

    #[test]
    fn test_single_key_group_unchanged() {
        let input = map(json!({ "Logo.source.source": "https://x/l.png" }));
        assert_eq!(normalize_variables(&input), input);
    }

    #[test]
    fn test_other_keys_pass_through() {
        let input = map(json!({
            "Panel.opacity": 0.5,
            "duration": 12,
            "Heading.text": "Hi"
        }));
        assert_eq!(normalize_variables(&input), input);
    }

    #[test]
    fn test_idempotent() {
        let input = map(json!({
            "A.text.text": "1",
            "B.fill": "#000",
            "A.text": "2",
            "B.fill.fill": "#fff",
            "C.source.source.source": "x",
            "C.source.source": "y",
            "meta": true
        }));

        let once = normalize_variables(&input);
        let twice = normalize_variables(&once);
        assert_eq!(once, twice);
        assert_eq!(keys(&once), ["A.text", "B.fill", "C.source.source", "meta"]);
    }

    #[test]
    fn test_one_key_per_base_property() {
        let input = map(json!({
            "X.text.text.text": "a",
            "X.text.text": "b",
            "X.text": "c",
            "X.source.source": "d"
        }));

        let normalized = normalize_variables(&input);
        let mut seen = std::collections::HashSet::new();
        for key in normalized.keys() {
            let (base, _) = base_property(key).unwrap();
            assert!(seen.insert(base.to_string()), "duplicate base {base}");
        }
        assert_eq!(normalized["X.text"], json!("c"));
    }

    #[test]
    fn test_merge_sources_priority() {
        let curl = map(json!({ "Heading.text": "from curl" }));
        let elements = map(json!({ "Heading.text": "from elements", "Logo.source": "" }));
        let render = map(json!({ "Logo.source": "https://x/l.png", "Heading.text.text": "deep" }));

        let merged = merge_sources([&curl, &elements, &render]);
        assert_eq!(
            Value::Object(merged),
            json!({ "Heading.text": "from curl", "Logo.source": "" })
        );
    }

    #[test]
    fn test_merge_absent_counts_additions() {
        let mut target = map(json!({ "A.text": "1" }));
        let added = merge_absent(&mut target, &map(json!({ "A.text": "2", "B.text": "3" })));
        assert_eq!(added, 1);
        assert_eq!(target["A.text"], json!("1"));
    }

    #[test]
    fn test_empty() {
        assert!(normalize_variables(&VariableMap::new()).is_empty());
        assert!(merge_sources(std::iter::empty()).is_empty());
    }
}
