//! Best-effort repair of near-JSON literals.
//!
//! Repair runs as a pipeline of named passes in two tiers. The first tier is
//! cheap and rarely harmful (quotes, trailing commas, whitespace). The second
//! tier rewrites bare keys and values and only runs when the first tier did
//! not produce parseable JSON, since quoting values on mostly-valid input can
//! corrupt structure.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::{VariableError, VariableResult};

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("valid trailing comma pattern"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// A single named repair pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepairPass {
    /// Input used as-is
    Strict,
    /// `'` replaced with `"`
    NormalizeQuotes,
    /// `,}` and `,]` collapsed
    StripTrailingCommas,
    /// Whitespace runs collapsed to one space
    CollapseWhitespace,
    /// `{key:` and `, key:` quoted
    QuoteBareKeys,
    /// Bare object values quoted unless they are JSON literals
    QuoteBareValues,
}

const FIRST_TIER: [RepairPass; 3] = [
    RepairPass::NormalizeQuotes,
    RepairPass::StripTrailingCommas,
    RepairPass::CollapseWhitespace,
];

const SECOND_TIER: [RepairPass; 2] = [RepairPass::QuoteBareKeys, RepairPass::QuoteBareValues];

impl RepairPass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepairPass::Strict => "strict",
            RepairPass::NormalizeQuotes => "normalize_quotes",
            RepairPass::StripTrailingCommas => "strip_trailing_commas",
            RepairPass::CollapseWhitespace => "collapse_whitespace",
            RepairPass::QuoteBareKeys => "quote_bare_keys",
            RepairPass::QuoteBareValues => "quote_bare_values",
        }
    }

    /// Apply this pass to `text`.
    pub fn apply(&self, text: &str) -> String {
        match self {
            RepairPass::Strict => text.to_string(),
            RepairPass::NormalizeQuotes => normalize_quotes(text),
            RepairPass::StripTrailingCommas => strip_trailing_commas(text),
            RepairPass::CollapseWhitespace => collapse_whitespace(text),
            RepairPass::QuoteBareKeys => quote_bare_keys(text),
            RepairPass::QuoteBareValues => quote_bare_values(text),
        }
    }
}

impl fmt::Display for RepairPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repair `text` into JSON and parse it.
///
/// On failure the error carries the original text, the final repaired text
/// and the last pass that changed the text.
pub fn repair_json(text: &str) -> VariableResult<Value> {
    if let Ok(value) = serde_json::from_str(text) {
        return Ok(value);
    }

    let mut last_pass = RepairPass::Strict;

    let repaired = run_passes(text.to_string(), &FIRST_TIER, &mut last_pass);
    match serde_json::from_str(&repaired) {
        Ok(value) => {
            debug!(last_pass = %last_pass, "Repaired JSON with first-tier passes");
            return Ok(value);
        }
        Err(e) => debug!(error = %e, "First-tier repair not sufficient"),
    }

    let repaired = run_passes(repaired, &SECOND_TIER, &mut last_pass);
    match serde_json::from_str(&repaired) {
        Ok(value) => {
            debug!(last_pass = %last_pass, "Repaired JSON with second-tier passes");
            Ok(value)
        }
        Err(e) => {
            debug!(error = %e, last_pass = %last_pass, "JSON repair failed");
            Err(VariableError::MalformedInput {
                original: text.to_string(),
                repaired,
                last_pass,
            })
        }
    }
}

fn run_passes(text: String, passes: &[RepairPass], last_pass: &mut RepairPass) -> String {
    passes.iter().fold(text, |current, pass| {
        let next = pass.apply(&current);
        if next != current {
            *last_pass = *pass;
        }
        next
    })
}

/// Replace every single quote with a double quote.
pub fn normalize_quotes(text: &str) -> String {
    text.replace('\'', "\"")
}

/// Remove commas that directly precede `}` or `]`.
pub fn strip_trailing_commas(text: &str) -> String {
    TRAILING_COMMA.replace_all(text, "$1").into_owned()
}

/// Collapse whitespace runs to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

/// Quote bare object keys following `{` or `,`.
///
/// Text inside double-quoted strings is never touched. A candidate key is only
/// quoted when it is terminated by `:`, so array items and bare values are
/// left alone.
pub fn quote_bare_keys(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut scanner = StringScanner::default();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        i += 1;

        if scanner.in_string() {
            scanner.feed(ch);
            out.push(ch);
            continue;
        }

        match ch {
            '{' | ',' => {
                out.push(ch);

                let mut end = i;
                while end < chars.len() && !matches!(chars[end], ':' | ',' | '{' | '}' | '[' | ']' | '"') {
                    end += 1;
                }

                if end < chars.len() && chars[end] == ':' {
                    let candidate: String = chars[i..end].iter().collect();
                    let key = candidate.trim();
                    if !key.is_empty() {
                        let leading = &candidate[..candidate.len() - candidate.trim_start().len()];
                        out.push_str(leading);
                        out.push('"');
                        out.push_str(key);
                        out.push_str("\":");
                        i = end + 1;
                    }
                }
            }
            _ => {
                scanner.feed(ch);
                out.push(ch);
            }
        }
    }

    out
}

/// Quote bare object values that are not JSON literals.
///
/// A bare value runs to the next `,`, `}` or `]`. Values starting with `"`,
/// `{` or `[` are left for the parser; `true`, `false`, `null` and numbers are
/// kept as literals.
pub fn quote_bare_values(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut scanner = StringScanner::default();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        i += 1;

        if scanner.in_string() || ch != ':' {
            scanner.feed(ch);
            out.push(ch);
            continue;
        }

        out.push(':');
        while i < chars.len() && chars[i].is_whitespace() {
            out.push(chars[i]);
            i += 1;
        }

        if i >= chars.len() || matches!(chars[i], '"' | '{' | '[') {
            continue;
        }

        let start = i;
        while i < chars.len() && !matches!(chars[i], ',' | '}' | ']') {
            i += 1;
        }

        let raw: String = chars[start..i].iter().collect();
        let value = raw.trim_end();
        let trailing = &raw[value.len()..];

        if is_json_literal(value) {
            out.push_str(value);
        } else {
            out.push_str(&Value::String(value.to_string()).to_string());
        }
        out.push_str(trailing);
    }

    out
}

fn is_json_literal(value: &str) -> bool {
    serde_json::from_str::<Value>(value)
        .map(|v| v.is_number() || v.is_boolean() || v.is_null())
        .unwrap_or(false)
}

/// Tracks whether a character stream is inside a double-quoted string.
#[derive(Debug, Default)]
struct StringScanner {
    in_string: bool,
    escaped: bool,
}

impl StringScanner {
    fn in_string(&self) -> bool {
        self.in_string
    }

    fn feed(&mut self, ch: char) {
        if !self.in_string {
            if ch == '"' {
                self.in_string = true;
            }
            return;
        }

        if self.escaped {
            self.escaped = false;
        } else if ch == '\\' {
            self.escaped = true;
        } else if ch == '"' {
            self.in_string = false;
        }
    }
}
