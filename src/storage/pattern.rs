//! Regex-backed identifier patterns.

use regex::RegexBuilder;

use super::filter::Pattern;
use super::traits::PatternBuilder;

/// Builds anchored, escaped, case-insensitive patterns (`/^value$/i`).
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexPatternBuilder;

impl PatternBuilder for RegexPatternBuilder {
    fn case_insensitive_exact(&self, value: &str) -> Result<Pattern, regex::Error> {
        let source = format!("^{}$", regex::escape(value));
        let regex = RegexBuilder::new(&source).case_insensitive(true).build()?;
        Ok(Pattern::new(regex, true))
    }
}
