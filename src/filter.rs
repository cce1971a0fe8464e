//! Field admission filter
//!
//! Allow and deny lists of regular expressions evaluated against a field's
//! flat name ("client.nat.ip") before it is admitted into the graph.

use regex::RegexSet;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// Filter patterns as they appear in configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// If non-empty, a field must match at least one of these
    #[serde(default)]
    pub allow: Vec<String>,
    /// A field matching any of these is dropped
    #[serde(default)]
    pub deny: Vec<String>,
}

/// Compiled allow/deny lists
#[derive(Debug, Clone)]
pub struct FieldFilter {
    allow: RegexSet,
    deny: RegexSet,
}

impl FieldFilter {
    /// Compile both lists, reporting the first pattern that fails.
    pub fn new<A, D>(allow: A, deny: D) -> Result<Self>
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        Ok(Self {
            allow: compile(allow)?,
            deny: compile(deny)?,
        })
    }

    pub fn from_config(config: &FilterConfig) -> Result<Self> {
        Self::new(&config.allow, &config.deny)
    }

    /// A filter that admits everything
    pub fn allow_all() -> Self {
        Self {
            allow: RegexSet::empty(),
            deny: RegexSet::empty(),
        }
    }

    /// Whether a field with this flat name enters the graph
    pub fn admits(&self, flat_name: &str) -> bool {
        let allowed = self.allow.is_empty() || self.allow.is_match(flat_name);
        allowed && !self.deny.is_match(flat_name)
    }

    /// Whether the filter admits everything
    pub fn is_pass_through(&self) -> bool {
        self.allow.is_empty() && self.deny.is_empty()
    }
}

impl Default for FieldFilter {
    fn default() -> Self {
        Self::allow_all()
    }
}

fn compile<I>(patterns: I) -> Result<RegexSet>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let patterns: Vec<String> = patterns
        .into_iter()
        .map(|p| p.as_ref().to_string())
        .collect();

    // compile one by one first so the error names the offending pattern
    for pattern in &patterns {
        if let Err(source) = regex::Regex::new(pattern) {
            return Err(SchemaError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            });
        }
    }

    RegexSet::new(&patterns).map_err(|source| SchemaError::InvalidPattern {
        pattern: patterns.join(" | "),
        source,
    })
}
