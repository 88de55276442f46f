//! Lazily compiled regular expressions.
//!
//! Rule patterns and separators are stored as text and compiled the first
//! time they are used, so an invalid pattern surfaces at first use rather
//! than at registration.

use crate::error::{AwkError, Result};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Most patterns kept compiled at once.
pub const MAX_CACHED_PATTERNS: usize = 256;

/// Cache of compiled patterns keyed by source text and case sensitivity.
///
/// Holds at most [`MAX_CACHED_PATTERNS`] entries; when full it is emptied
/// before the next insert.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: HashMap<(String, bool), Regex>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `pattern` (or fetch it from the cache).
    pub fn get(&mut self, pattern: &str, ignore_case: bool) -> Result<Regex> {
        let key = (pattern.to_string(), ignore_case);
        if let Some(re) = self.compiled.get(&key) {
            return Ok(re.clone());
        }
        let re = RegexBuilder::new(pattern)
            .case_insensitive(ignore_case)
            .build()
            .map_err(|source| AwkError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;
        trace!(pattern, ignore_case, "Compiled pattern");
        if self.compiled.len() >= MAX_CACHED_PATTERNS {
            debug!(entries = self.compiled.len(), "Pattern cache full, clearing");
            self.compiled.clear();
        }
        self.compiled.insert(key, re.clone());
        Ok(re)
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

/// Split `text` on every match of `re`.
///
/// Empty text yields a single empty field, so every record has at least
/// one field.
pub fn split_on(re: &Regex, text: &str) -> Vec<String> {
    re.split(text).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiles_once_per_case_mode() {
        let mut cache = PatternCache::new();
        cache.get("ab+", false).unwrap();
        cache.get("ab+", false).unwrap();
        assert_eq!(cache.len(), 1);
        cache.get("ab+", true).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_is_bounded() {
        let mut cache = PatternCache::new();
        for i in 0..MAX_CACHED_PATTERNS + 10 {
            cache.get(&format!("x{i}"), false).unwrap();
            assert!(cache.len() <= MAX_CACHED_PATTERNS);
        }
        assert_eq!(cache.len(), 10);
        assert!(cache.get("x0", false).unwrap().is_match("x0"));
    }

    #[test]
    fn test_case_insensitive_match() {
        let mut cache = PatternCache::new();
        assert!(!cache.get("abc", false).unwrap().is_match("ABC"));
        assert!(cache.get("abc", true).unwrap().is_match("ABC"));
    }

    #[test]
    fn test_invalid_pattern() {
        let mut cache = PatternCache::new();
        let err = cache.get("(unclosed", false).unwrap_err();
        assert!(matches!(err, AwkError::Pattern { ref pattern, .. } if pattern == "(unclosed"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_split_on_whitespace_runs() {
        let re = Regex::new(r"[ \t\n]+").unwrap();
        assert_eq!(split_on(&re, "a  b\tc"), vec!["a", "b", "c"]);
        assert_eq!(split_on(&re, " a"), vec!["", "a"]);
        assert_eq!(split_on(&re, ""), vec![""]);
    }
}
