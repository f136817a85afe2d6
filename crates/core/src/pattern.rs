use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("invalid search pattern `{pattern}`: {reason}")]
    InvalidSearch { pattern: String, reason: String },
    #[error("pattern file is malformed: {0}")]
    InvalidPatternFile(String),
}

/// A search/replace rule. `replace` uses the regex crate's expansion syntax
/// (`$1`, `${name}`).
#[derive(Debug, Clone)]
pub struct PatternRule {
    search: Regex,
    replace: String,
    allow_multiple: bool,
}

impl PatternRule {
    pub fn new(search: &str, replace: &str, allow_multiple: bool) -> Result<Self, PatternError> {
        let search = Regex::new(search).map_err(|err| PatternError::InvalidSearch {
            pattern: search.to_string(),
            reason: err.to_string(),
        })?;
        Ok(Self {
            search,
            replace: replace.to_string(),
            allow_multiple,
        })
    }

    pub fn search(&self) -> &str {
        self.search.as_str()
    }

    pub fn replacement(&self) -> &str {
        &self.replace
    }

    pub fn allow_multiple(&self) -> bool {
        self.allow_multiple
    }

    /// Replaces the first match, or every non-overlapping match when the rule
    /// allows multiple substitutions.
    pub fn apply(&self, file_name: &str) -> String {
        let limit = if self.allow_multiple { 0 } else { 1 };
        self.search
            .replacen(file_name, limit, self.replace.as_str())
            .into_owned()
    }
}

/// Applies each rule in order, feeding every rule the previous rule's output.
pub fn apply_rules(rules: &[PatternRule], file_name: &str) -> String {
    rules
        .iter()
        .fold(file_name.to_string(), |current, rule| rule.apply(&current))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RuleEntry {
    Triple(String, String, bool),
    Pair(String, String),
    Object {
        search: String,
        replace: String,
        #[serde(default)]
        multiple: bool,
    },
}

impl RuleEntry {
    fn into_rule(self) -> Result<PatternRule, PatternError> {
        match self {
            Self::Pair(search, replace) => PatternRule::new(&search, &replace, false),
            Self::Triple(search, replace, multiple)
            | Self::Object {
                search,
                replace,
                multiple,
            } => PatternRule::new(&search, &replace, multiple),
        }
    }
}

/// Parses a JSON array of rules. Entries may be `[search, replace]`,
/// `[search, replace, multiple]` or `{"search", "replace", "multiple"}`.
pub fn parse_pattern_list(json: &str) -> Result<Vec<PatternRule>, PatternError> {
    let entries = serde_json::from_str::<Vec<RuleEntry>>(json)
        .map_err(|err| PatternError::InvalidPatternFile(err.to_string()))?;
    entries.into_iter().map(RuleEntry::into_rule).collect()
}

pub fn load_pattern_file(path: &Path) -> Result<Vec<PatternRule>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read pattern file: {}", path.display()))?;
    let rules = parse_pattern_list(&raw)
        .with_context(|| format!("could not load pattern file: {}", path.display()))?;
    Ok(rules)
}
