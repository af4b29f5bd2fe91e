//! Query predicates handed to user lookups.
//!
//! A `Filter` is a small document-query tree. Backends may translate it into
//! their own query language; document-style stores can evaluate it directly
//! with [`Filter::matches`].

use std::fmt;

use regex::Regex;
use serde_json::{Map, Value};

/// A compiled match pattern that keeps its source for translation.
#[derive(Clone)]
pub struct Pattern {
    regex: Regex,
    case_insensitive: bool,
}

impl Pattern {
    pub fn new(regex: Regex, case_insensitive: bool) -> Self {
        Self {
            regex,
            case_insensitive,
        }
    }

    /// The regular expression source, without flags.
    pub fn source(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = if self.case_insensitive { "i" } else { "" };
        write!(f, "/{}/{}", self.regex.as_str(), flags)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source() == other.source() && self.case_insensitive == other.case_insensitive
    }
}

/// Predicate over a record document.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals the value exactly.
    Eq { field: String, value: Value },
    /// String field matches the pattern.
    Matches { field: String, pattern: Pattern },
    /// Numeric field is greater than or equal to the value.
    Gte { field: String, value: i64 },
    /// At least one branch holds.
    Or(Vec<Filter>),
    /// Every branch holds.
    And(Vec<Filter>),
}

impl Filter {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches_pattern(field: impl Into<String>, pattern: Pattern) -> Self {
        Filter::Matches {
            field: field.into(),
            pattern,
        }
    }

    pub fn gte(field: impl Into<String>, value: i64) -> Self {
        Filter::Gte {
            field: field.into(),
            value,
        }
    }

    /// Evaluate against a document. Missing fields never match.
    pub fn matches(&self, document: &Map<String, Value>) -> bool {
        match self {
            Filter::Eq { field, value } => document.get(field) == Some(value),
            Filter::Matches { field, pattern } => document
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|s| pattern.is_match(s)),
            Filter::Gte { field, value } => document
                .get(field)
                .and_then(Value::as_i64)
                .is_some_and(|n| n >= *value),
            Filter::Or(branches) => branches.iter().any(|f| f.matches(document)),
            Filter::And(branches) => branches.iter().all(|f| f.matches(document)),
        }
    }

    /// Top-level conjuncts of an `And`, or the filter itself.
    pub fn conjuncts(&self) -> &[Filter] {
        match self {
            Filter::And(branches) => branches,
            other => std::slice::from_ref(other),
        }
    }
}
