//! CURL command parsing.
//!
//! Admins paste the CURL snippet the rendering SaaS shows for a template.
//! Two things are pulled out of it, independently of each other:
//! - the template identifier (from the URL path or the JSON body)
//! - the `modifications` object from the JSON body
//!
//! Each pattern is a separate function and patterns are tried in a fixed
//! order, so a failure can be traced to the pattern that missed.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tmpl_models::VariableMap;
use tracing::debug;

use crate::error::{VariableError, VariableResult};
use crate::json_repair::repair_json;

static TEMPLATE_PATH_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)templates/([0-9a-f-]{36})\b").expect("valid template path pattern")
});

static TEMPLATE_FIELD_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\\?"template_id\\?"\s*:\s*\\?"([0-9a-f-]{36})"#)
        .expect("valid template field pattern")
});

static MODIFICATIONS_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\\?["']?modifications\\?["']?\s*:\s*\{"#).expect("valid modifications pattern")
});

/// Template id patterns, in precedence order.
const TEMPLATE_ID_PATTERNS: [fn(&str) -> Option<String>; 2] =
    [template_id_from_path, template_id_from_field];

/// Result of parsing a CURL command. Either part may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedCurl {
    pub template_id: Option<String>,
    pub modifications: Option<VariableMap>,
}

impl ParsedCurl {
    pub fn is_empty(&self) -> bool {
        self.template_id.is_none() && self.modifications.is_none()
    }
}

/// Parse a raw CURL command.
pub fn parse_curl_command(command: &str) -> ParsedCurl {
    let parsed = ParsedCurl {
        template_id: extract_template_id(command),
        modifications: extract_modifications(command),
    };

    debug!(
        template_id = ?parsed.template_id,
        modifications = parsed.modifications.as_ref().map(|m| m.len()).unwrap_or(0),
        "Parsed CURL command"
    );

    parsed
}

/// Extract the template identifier, trying each pattern in order.
pub fn extract_template_id(command: &str) -> Option<String> {
    TEMPLATE_ID_PATTERNS.iter().find_map(|pattern| pattern(command))
}

/// Like [`extract_template_id`], but a missing id is an error.
pub fn require_template_id(command: &str) -> VariableResult<String> {
    extract_template_id(command)
        .ok_or_else(|| VariableError::not_found("no template id in CURL command"))
}

/// `.../templates/<id>` in the request URL.
pub fn template_id_from_path(command: &str) -> Option<String> {
    TEMPLATE_PATH_ID
        .captures(command)
        .map(|caps| caps[1].to_string())
}

/// `"template_id": "<id>"` in the request body (shell-escaped quotes allowed).
pub fn template_id_from_field(command: &str) -> Option<String> {
    TEMPLATE_FIELD_ID
        .captures(command)
        .map(|caps| caps[1].to_string())
}

/// Extract and repair the `modifications` object.
///
/// Returns `None` when there is no `modifications` key or its literal cannot
/// be repaired into a JSON object. Shell escapes (`\"` and `'\''`) are undone
/// in a second attempt if the text as given does not work.
pub fn extract_modifications(text: &str) -> Option<VariableMap> {
    if let Some(map) = modifications_from(text) {
        return Some(map);
    }

    let unescaped = unescape_shell(text);
    if unescaped != text {
        return modifications_from(&unescaped);
    }

    None
}

fn modifications_from(text: &str) -> Option<VariableMap> {
    let literal = modifications_literal(text)?;

    match repair_json(literal) {
        Ok(Value::Object(map)) => Some(map),
        Ok(other) => {
            debug!(kind = json_kind(&other), "Modifications literal is not an object");
            None
        }
        Err(e) => {
            debug!(error = %e, "Could not repair modifications literal");
            None
        }
    }
}

/// Locate the `{...}` literal following a `modifications` key.
///
/// The literal ends at the brace that closes the opening one; braces inside
/// double-quoted strings are ignored. Unbalanced input yields `None`.
pub fn modifications_literal(text: &str) -> Option<&str> {
    let key = MODIFICATIONS_KEY.find(text)?;
    let start = key.end() - 1;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (offset, ch) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

fn unescape_shell(text: &str) -> String {
    text.replace("'\\''", "'").replace("\\\"", "\"")
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
