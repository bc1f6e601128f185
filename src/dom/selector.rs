use anyhow::{bail, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Attribute comparison in a selector such as `[aria-label*="Send"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeMatch {
    Exists,
    Equals(String),
    Contains(String),
    StartsWith(String),
    EndsWith(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeCondition {
    pub name: String,
    pub op: AttributeMatch,
}

impl AttributeCondition {
    pub fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match &self.op {
            AttributeMatch::Exists => true,
            AttributeMatch::Equals(expected) => value == expected,
            AttributeMatch::Contains(needle) => !needle.is_empty() && value.contains(needle),
            AttributeMatch::StartsWith(prefix) => !prefix.is_empty() && value.starts_with(prefix),
            AttributeMatch::EndsWith(suffix) => !suffix.is_empty() && value.ends_with(suffix),
        }
    }
}

/// One compound selector: optional tag plus attribute conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub conditions: Vec<AttributeCondition>,
}

/// A comma-separated list of compound selectors.
///
/// Only the subset of CSS that send-button and compose-field lookups need:
/// type selectors and attribute selectors with `=`, `*=`, `^=` and `$=`.
/// Combinators are not supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\*|[A-Za-z][A-Za-z0-9-]*)").expect("valid tag regex"))
}

fn attribute_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^\[\s*([A-Za-z_][A-Za-z0-9_:-]*)\s*(?:([*^$]?=)\s*(?:"([^"]*)"|'([^']*)'|([A-Za-z0-9_-]+)))?\s*\]"#,
        )
        .expect("valid attribute regex")
    })
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self> {
        let mut alternatives = Vec::new();
        for part in input.split(',') {
            alternatives.push(Self::parse_compound(part.trim())?);
        }
        Ok(Self { alternatives })
    }

    fn parse_compound(input: &str) -> Result<Compound> {
        if input.is_empty() {
            bail!("empty selector");
        }

        let mut rest = input;
        let mut tag = None;
        if let Some(m) = tag_regex().find(rest) {
            if m.as_str() != "*" {
                tag = Some(m.as_str().to_lowercase());
            }
            rest = &rest[m.end()..];
        }

        let mut conditions = Vec::new();
        while !rest.is_empty() {
            let Some(caps) = attribute_regex().captures(rest) else {
                bail!("unsupported selector syntax at '{}' in '{}'", rest, input);
            };
            let name = caps[1].to_lowercase();
            let value = caps
                .get(3)
                .or_else(|| caps.get(4))
                .or_else(|| caps.get(5))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            let op = match caps.get(2).map(|m| m.as_str()) {
                None => AttributeMatch::Exists,
                Some("=") => AttributeMatch::Equals(value),
                Some("*=") => AttributeMatch::Contains(value),
                Some("^=") => AttributeMatch::StartsWith(value),
                Some("$=") => AttributeMatch::EndsWith(value),
                Some(other) => bail!("unsupported attribute operator '{}'", other),
            };
            conditions.push(AttributeCondition { name, op });
            rest = &rest[caps[0].len()..];
        }

        Ok(Compound { tag, conditions })
    }

    /// Test an element given its tag and an attribute lookup.
    pub fn matches<'a, F>(&self, tag: &str, attribute: F) -> bool
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        self.alternatives.iter().any(|compound| {
            compound
                .tag
                .as_deref()
                .map_or(true, |expected| expected.eq_ignore_ascii_case(tag))
                && compound
                    .conditions
                    .iter()
                    .all(|condition| condition.matches(attribute(&condition.name)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_combined_attributes() {
        let selector = Selector::parse(r#"[role="button"][aria-label*="Send"]"#).unwrap();
        let send = attrs(&[("role", "button"), ("aria-label", "Send (Ctrl-Enter)")]);
        let cancel = attrs(&[("role", "button"), ("aria-label", "Discard draft")]);

        assert!(selector.matches("div", |name| send.get(name).map(String::as_str)));
        assert!(!selector.matches("div", |name| cancel.get(name).map(String::as_str)));
    }

    #[test]
    fn test_tag_and_exact_value() {
        let selector = Selector::parse(r#"button[title="Send (Ctrl+Enter)"]"#).unwrap();
        let titled = attrs(&[("title", "Send (Ctrl+Enter)")]);

        assert!(selector.matches("BUTTON", |name| titled.get(name).map(String::as_str)));
        assert!(!selector.matches("div", |name| titled.get(name).map(String::as_str)));
    }

    #[test]
    fn test_existence_and_unquoted_values() {
        let selector = Selector::parse("div[data-hovercard-id], input[name=to]").unwrap();
        let chip = attrs(&[("data-hovercard-id", "a@x.com")]);
        let to = attrs(&[("name", "to")]);
        let other = attrs(&[("name", "cc")]);

        assert!(selector.matches("div", |name| chip.get(name).map(String::as_str)));
        assert!(selector.matches("input", |name| to.get(name).map(String::as_str)));
        assert!(!selector.matches("input", |name| other.get(name).map(String::as_str)));
    }

    #[test]
    fn test_rejects_combinators() {
        assert!(Selector::parse("div > span").is_err());
        assert!(Selector::parse("").is_err());
    }
}
