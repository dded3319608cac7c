use std::collections::BTreeSet;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::helpers::lenient::scalar_text;
use crate::scope::catalog::{self, WILDCARD_ALIASES};
use crate::utils::constants::DEFAULT_SCOPE_KEY;

/// Raw scope input as callers hand it over.
///
/// Deserializing accepts numbers and booleans as text, both on their own and
/// as list elements. `null` and nested values inside a list are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ScopeInput {
    /// `"gmail,drive"`, `"gmail drive"` or `"[\"gmail\",\"drive\"]"`
    Text(String),
    List(Vec<String>),
}

impl ScopeInput {
    /// Whether the input counts as "given" when picking among scope fields.
    /// A list is always given (even empty); text only when non-empty.
    pub fn is_present(&self) -> bool {
        match self {
            ScopeInput::Text(text) => !text.is_empty(),
            ScopeInput::List(_) => true,
        }
    }
}

impl<'de> Deserialize<'de> for ScopeInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Array(items) => Ok(ScopeInput::List(items.iter().filter_map(scalar_text).collect())),
            value => scalar_text(&value)
                .map(ScopeInput::Text)
                .ok_or_else(|| D::Error::custom(format!("scope must be text or a list, found {value}"))),
        }
    }
}

impl From<&str> for ScopeInput {
    fn from(value: &str) -> Self {
        ScopeInput::Text(value.to_owned())
    }
}

impl From<String> for ScopeInput {
    fn from(value: String) -> Self {
        ScopeInput::Text(value)
    }
}

impl From<Vec<&str>> for ScopeInput {
    fn from(value: Vec<&str>) -> Self {
        ScopeInput::List(value.into_iter().map(str::to_owned).collect())
    }
}

impl From<Vec<String>> for ScopeInput {
    fn from(value: Vec<String>) -> Self {
        ScopeInput::List(value)
    }
}

/// Canonical form of a scope set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedScope {
    /// Deduplicated, ascending.
    pub scope_list: Vec<String>,
    /// `scope_list` joined with single spaces.
    pub scope_string: String,
    /// Cache index: `scope_string`, or `"default"` when it is empty.
    pub scope_key: String,
}

/// Resolve raw scope input into its canonical scope set.
///
/// `fallback` is parsed the same way and used only when `input` yields no
/// tokens at all.
pub fn normalize(input: Option<&ScopeInput>, fallback: Option<&str>) -> NormalizedScope {
    let mut raw = input.map(parse_scope_input).unwrap_or_default();
    if raw.is_empty() {
        raw = fallback.map(parse_scope_text).unwrap_or_default();
    }

    let mut expanded = Vec::with_capacity(raw.len());
    for entry in raw {
        let key = alias_scope(&entry);
        if WILDCARD_ALIASES.contains(&key.as_str()) {
            expanded.extend(catalog::all_scopes());
            continue;
        }
        match catalog::lookup(&key) {
            Some(mapped) => expanded.extend(mapped),
            None => expanded.push(entry),
        }
    }

    let scope_list: Vec<String> = expanded
        .iter()
        .map(|scope| scope.trim())
        .filter(|scope| !scope.is_empty())
        .map(str::to_owned)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let scope_string = scope_list.join(" ");
    let scope_key = if scope_string.is_empty() {
        DEFAULT_SCOPE_KEY.to_owned()
    } else {
        scope_string.clone()
    };

    NormalizedScope {
        scope_list,
        scope_string,
        scope_key,
    }
}

fn parse_scope_input(input: &ScopeInput) -> Vec<String> {
    match input {
        ScopeInput::List(items) => items.clone(),
        ScopeInput::Text(text) => parse_scope_text(text),
    }
}

/// Split a scope string into raw tokens.
///
/// JSON-array shaped text is decoded as an array; anything else (including
/// array-shaped text that fails to decode) is split on commas and whitespace.
pub fn parse_scope_text(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    if text.starts_with('[') && text.ends_with(']') {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text) {
            return items.iter().filter_map(scalar_text).collect();
        }
    }

    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Trim and rewrite a trailing `:ro` (any case) to `.readonly`.
pub fn alias_scope(name: &str) -> String {
    let name = name.trim();
    let split_at = name.len().saturating_sub(3);
    match name.get(split_at..) {
        Some(suffix) if name.len() >= 3 && suffix.eq_ignore_ascii_case(":ro") => {
            format!("{}.readonly", &name[..split_at])
        }
        _ => name.to_owned(),
    }
}
