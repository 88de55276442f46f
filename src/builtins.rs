//! String utilities available to handlers.
//!
//! The plain string helpers are free functions. Anything that takes a
//! regular expression is a method on [`Vars`] so it honors the engine's
//! case-sensitivity flag and can default to `FS`.

use crate::error::Result;
use crate::pattern::split_on;
use crate::vars::{DEFAULT_FS, Vars};

/// Characters of `s` starting at 0-based character offset `start`, at most
/// `len` of them (the rest of the string when `None`).
pub fn substr(s: &str, start: usize, len: Option<usize>) -> String {
    let chars = s.chars().skip(start);
    match len {
        Some(n) => chars.take(n).collect(),
        None => chars.collect(),
    }
}

pub fn tolower(s: &str) -> String {
    s.to_lowercase()
}

pub fn toupper(s: &str) -> String {
    s.to_uppercase()
}

/// Length in characters.
pub fn length(s: &str) -> usize {
    s.chars().count()
}

/// 1-based character position of `t` in `s`, or 0 when absent.
pub fn index(s: &str, t: &str) -> usize {
    s.find(t)
        .map(|byte| s[..byte].chars().count() + 1)
        .unwrap_or(0)
}

impl Vars {
    /// Position of the first match of `pattern` in `s`, 1-based, or 0.
    ///
    /// Sets `rstart` to the returned value and `rlength` to the match
    /// length in characters (-1 when there is no match).
    pub fn match_at(&mut self, s: &str, pattern: &str) -> Result<usize> {
        let re = self.regex(pattern)?;
        match re.find(s) {
            Some(m) => {
                self.rstart = s[..m.start()].chars().count() + 1;
                self.rlength = m.as_str().chars().count() as i64;
            }
            None => {
                self.rstart = 0;
                self.rlength = -1;
            }
        }
        Ok(self.rstart)
    }

    /// Replace the first match of `pattern` in `target`.
    ///
    /// `replacement` uses the regex crate syntax (`$1`, `${name}`, `$$`).
    /// Returns the new string and the number of replacements made.
    pub fn sub(&mut self, pattern: &str, replacement: &str, target: &str) -> Result<(String, usize)> {
        self.substitute(pattern, replacement, target, 1)
    }

    /// Replace every match of `pattern` in `target`.
    pub fn gsub(&mut self, pattern: &str, replacement: &str, target: &str) -> Result<(String, usize)> {
        self.substitute(pattern, replacement, target, 0)
    }

    fn substitute(
        &mut self,
        pattern: &str,
        replacement: &str,
        target: &str,
        limit: usize,
    ) -> Result<(String, usize)> {
        let re = self.regex(pattern)?;
        let found = re.find_iter(target).count();
        let count = if limit == 0 { found } else { found.min(limit) };
        let replaced = re.replacen(target, limit, replacement).into_owned();
        Ok((replaced, count))
    }

    /// Split `s` by `separator` (or `FS` when `None`).
    ///
    /// A separator of a single space trims `s` and splits on runs of
    /// whitespace.
    pub fn split(&mut self, s: &str, separator: Option<&str>) -> Result<Vec<String>> {
        let separator = separator.unwrap_or(self.fs.as_str()).to_string();
        let (s, separator) = if separator == " " {
            (s.trim(), DEFAULT_FS)
        } else {
            (s, separator.as_str())
        };
        let re = self.regex(separator)?;
        Ok(split_on(&re, s))
    }

    /// Split into `out` (cleared first) and return the number of pieces.
    pub fn split_into(
        &mut self,
        s: &str,
        out: &mut Vec<String>,
        separator: Option<&str>,
    ) -> Result<usize> {
        out.clear();
        out.extend(self.split(s, separator)?);
        Ok(out.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substr() {
        assert_eq!(substr("hello", 1, Some(3)), "ell");
        assert_eq!(substr("hello", 2, None), "llo");
        assert_eq!(substr("hello", 10, None), "");
        assert_eq!(substr("héllo", 1, Some(2)), "él");
    }

    #[test]
    fn test_case_and_length() {
        assert_eq!(tolower("AbC"), "abc");
        assert_eq!(toupper("AbC"), "ABC");
        assert_eq!(length("héllo"), 5);
    }

    #[test]
    fn test_index() {
        assert_eq!(index("hello", "ll"), 3);
        assert_eq!(index("hello", "z"), 0);
        assert_eq!(index("héllo", "l"), 3);
    }

    #[test]
    fn test_match_at_sets_rstart_rlength() {
        let mut vars = Vars::default();
        assert_eq!(vars.match_at("foobar", "o+b").unwrap(), 2);
        assert_eq!(vars.rstart, 2);
        assert_eq!(vars.rlength, 3);

        assert_eq!(vars.match_at("foobar", "z").unwrap(), 0);
        assert_eq!(vars.rstart, 0);
        assert_eq!(vars.rlength, -1);
    }

    #[test]
    fn test_sub_and_gsub_counts() {
        let mut vars = Vars::default();
        assert_eq!(
            vars.sub("o", "0", "foo boo").unwrap(),
            ("f0o boo".to_string(), 1)
        );
        assert_eq!(
            vars.gsub("o", "0", "foo boo").unwrap(),
            ("f00 b00".to_string(), 4)
        );
        assert_eq!(vars.gsub("z", "0", "foo").unwrap(), ("foo".to_string(), 0));
    }

    #[test]
    fn test_gsub_group_reference() {
        let mut vars = Vars::default();
        let (out, n) = vars.gsub(r"(\w+)@", "<$1>", "a@ b@").unwrap();
        assert_eq!(out, "<a> <b>");
        assert_eq!(n, 2);
    }

    #[test]
    fn test_substitution_honors_ignore_case() {
        let mut vars = Vars::default();
        assert_eq!(vars.gsub("a", "x", "AaA").unwrap().1, 1);
        vars.ignore_case = true;
        assert_eq!(vars.gsub("a", "x", "AaA").unwrap(), ("xxx".to_string(), 3));
    }

    #[test]
    fn test_split_defaults_to_fs() {
        let mut vars = Vars::default();
        vars.fs = ",".to_string();
        assert_eq!(vars.split("a,b,,c", None).unwrap(), vec!["a", "b", "", "c"]);
    }

    #[test]
    fn test_split_single_space_trims() {
        let mut vars = Vars::default();
        assert_eq!(vars.split("  a  b ", Some(" ")).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_split_into_returns_count() {
        let mut vars = Vars::default();
        let mut parts = vec!["stale".to_string()];
        let n = vars.split_into("x:y:z", &mut parts, Some(":")).unwrap();
        assert_eq!(n, 3);
        assert_eq!(parts, vec!["x", "y", "z"]);
    }
}
