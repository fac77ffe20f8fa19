//! Path grammar and compiled patterns.
//!
//! # Grammar
//! - Literal segments: `/users/active`
//! - Placeholders: `{identifier}`, matching `[A-Za-z0-9_.-]+`
//! - Raw regex fragments copied verbatim: `[0-9]`, `(blue|red)`, `[a-z]{2}`
//! - Any other `{...}` token (`{user-id}`, `{}`) is rejected
//!
//! # Design Decisions
//! - Patterns are anchored at both ends and case-sensitive
//! - Only placeholders produce parameters; raw groups do not
//! - The memo publishes fully built patterns only (`Arc` inserted once)

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::observability::metrics;
use crate::routing::descriptor::is_identifier;

/// Character class a placeholder value must consist of.
pub const PLACEHOLDER_CLASS: &str = "[A-Za-z0-9_.-]+";

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex is valid"));

static BRACE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}]*)\}").expect("brace regex is valid"));

static QUANTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+(,[0-9]*)?$").expect("quantifier regex is valid"));

const REGEX_META: &[char] = &['[', ']', '(', ')', '|', '*', '+', '?', '\\', '^', '$'];

/// Error raised when a path cannot be turned into a matcher.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid route pattern {path:?}: {reason}")]
pub struct PatternError {
    pub path: String,
    pub reason: String,
}

/// True when the path needs a compiled pattern to match.
///
/// Static paths are served by exact lookup only.
pub fn is_dynamic(path: &str) -> bool {
    PLACEHOLDER.is_match(path) || path.contains(REGEX_META)
}

/// Reject brace tokens that are neither placeholders nor repetition counts.
///
/// Such a token would otherwise be taken literally and the route could
/// never be reached with a real parameter value.
pub fn check_braces(path: &str) -> Result<(), PatternError> {
    for caps in BRACE_TOKEN.captures_iter(path) {
        let inner = &caps[1];
        if !is_identifier(inner) && !QUANTIFIER.is_match(inner) {
            return Err(PatternError {
                path: path.to_string(),
                reason: format!("{{{}}} is not a placeholder; names are letters, digits and _", inner),
            });
        }
    }
    Ok(())
}

/// Placeholder names in declaration order.
pub fn placeholders(path: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(path)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Replace placeholders left to right with `params`.
///
/// Placeholders left over once `params` runs out stay as literal text.
pub fn fill_placeholders<S: AsRef<str>>(path: &str, params: &[S]) -> String {
    let mut params = params.iter();
    PLACEHOLDER
        .replace_all(path, |caps: &regex::Captures<'_>| match params.next() {
            Some(value) => value.as_ref().to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn group_name(index: usize) -> String {
    format!("__p{}", index)
}

/// Serializable form of a compiled pattern, as stored in the route cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSource {
    pub regex: String,
    pub params: Vec<String>,
}

impl PatternSource {
    /// Translate a full path into an anchored regex source.
    pub fn translate(path: &str) -> Self {
        let mut regex = String::with_capacity(path.len() + 16);
        let mut params = Vec::new();
        let mut last = 0;

        regex.push('^');
        for caps in PLACEHOLDER.captures_iter(path) {
            let whole = caps.get(0).expect("group 0 always participates");
            regex.push_str(&path[last..whole.start()]);
            regex.push_str(&format!("(?P<{}>{})", group_name(params.len()), PLACEHOLDER_CLASS));
            params.push(caps[1].to_string());
            last = whole.end();
        }
        regex.push_str(&path[last..]);
        regex.push('$');

        Self { regex, params }
    }
}

/// An anchored matcher for one full path.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    params: Vec<String>,
}

impl CompiledPattern {
    pub fn compile(path: &str) -> Result<Self, PatternError> {
        check_braces(path)?;
        Self::from_source(path, PatternSource::translate(path))
    }

    /// Build from a translated (possibly cached) source.
    ///
    /// Rejects sources whose capture groups disagree with their parameter list.
    pub fn from_source(path: &str, source: PatternSource) -> Result<Self, PatternError> {
        let regex = Regex::new(&source.regex).map_err(|e| PatternError {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        let expected = (0..source.params.len()).map(group_name);
        let names: Vec<&str> = regex.capture_names().flatten().collect();
        for name in expected {
            if !names.contains(&name.as_str()) {
                return Err(PatternError {
                    path: path.to_string(),
                    reason: format!("missing capture group {}", name),
                });
            }
        }
        metrics::record_pattern_compiled();
        Ok(Self {
            regex,
            params: source.params,
        })
    }

    /// Placeholder values in declaration order, or `None` on no match.
    pub fn captures(&self, path: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(path)?;
        let values = (0..self.params.len())
            .map(|i| {
                caps.name(&group_name(i))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default()
            })
            .collect();
        Some(values)
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    pub fn param_names(&self) -> &[String] {
        &self.params
    }

    pub fn source(&self) -> PatternSource {
        PatternSource {
            regex: self.regex.as_str().to_string(),
            params: self.params.clone(),
        }
    }
}

/// Concurrent read-through memo of compiled patterns, keyed by full path.
///
/// Two threads racing on the same key may both compile; the first insert
/// wins and both observe the same published `Arc`.
#[derive(Debug, Default)]
pub struct PatternCache {
    inner: DashMap<String, Arc<CompiledPattern>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Arc<CompiledPattern>> {
        self.inner.get(path).map(|r| Arc::clone(r.value()))
    }

    pub fn get_or_compile(&self, path: &str) -> Result<Arc<CompiledPattern>, PatternError> {
        if let Some(pattern) = self.get(path) {
            return Ok(pattern);
        }
        // Compile outside the shard lock.
        let compiled = Arc::new(CompiledPattern::compile(path)?);
        Ok(self.publish(path, compiled))
    }

    /// Insert unless already present; returns the published pattern.
    pub fn publish(&self, path: &str, pattern: Arc<CompiledPattern>) -> Arc<CompiledPattern> {
        Arc::clone(self.inner.entry(path.to_string()).or_insert(pattern).value())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn sources(&self) -> Vec<(String, PatternSource)> {
        self.inner
            .iter()
            .map(|r| (r.key().clone(), r.value().source()))
            .collect()
    }
}
