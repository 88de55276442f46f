//! Match rules and their evaluation against a record.

use crate::error::{AwkError, Result};
use crate::record::{FieldKey, Record};
use std::fmt;

/// A declarative condition under which a handler fires.
///
/// Rules are table keys: two equal rules share one handler slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatchRule {
    /// Fires on the n-th record of the whole run (`NR == n`), for `n > 0`.
    AtGlobalLine(i64),
    /// Fires on the |n|-th record of every input (`FNR == -n`). Stored
    /// negative, so only `n < 0` ever fires.
    AtFileLine(i64),
    /// Fires on every `|stride|`-th record from `start` (inclusive) up to
    /// `stop` (exclusive). A positive stride counts records across the whole
    /// run, a negative one counts within each input.
    Range {
        start: usize,
        stop: Option<usize>,
        stride: i64,
    },
    /// Fires when the pattern matches anywhere in the record text.
    RecordPattern(String),
    /// Fires when the pattern matches anywhere in the given field.
    FieldPattern(FieldKey, String),
}

impl MatchRule {
    /// Line rule from a signed line number: positive counts across the
    /// run, negative within each input.
    pub fn line(n: i64) -> Self {
        if n < 0 {
            MatchRule::AtFileLine(n)
        } else {
            MatchRule::AtGlobalLine(n)
        }
    }

    pub fn range(start: usize, stop: Option<usize>, stride: i64) -> Self {
        MatchRule::Range {
            start,
            stop,
            stride,
        }
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        MatchRule::RecordPattern(pattern.into())
    }

    pub fn field(key: impl Into<FieldKey>, pattern: impl Into<String>) -> Self {
        MatchRule::FieldPattern(key.into(), pattern.into())
    }

    /// Reject rules that can never be evaluated.
    ///
    /// Patterns are not compiled here; that happens at first use.
    pub fn validate(&self) -> Result<()> {
        match self {
            MatchRule::Range { stride: 0, .. } => {
                Err(AwkError::InvalidRule(format!("{self}: stride must not be zero")))
            }
            _ => Ok(()),
        }
    }

    /// Evaluate against the record currently being dispatched.
    pub fn matches(&self, record: &mut Record<'_>) -> Result<bool> {
        match self {
            MatchRule::AtGlobalLine(n) => Ok(*n > 0 && record.vars().nr as i64 == *n),
            MatchRule::AtFileLine(n) => Ok(*n < 0 && record.vars().fnr as i64 == -*n),
            MatchRule::Range {
                start,
                stop,
                stride,
            } => {
                let vars = record.vars();
                let idx = if *stride > 0 { vars.nr } else { vars.fnr };
                let step = stride.unsigned_abs() as usize;
                if step == 0 {
                    return Err(AwkError::InvalidRule(format!(
                        "{self}: stride must not be zero"
                    )));
                }
                Ok(stop.is_none_or(|stop| idx < stop)
                    && idx >= *start
                    && (idx - start) % step == 0)
            }
            MatchRule::RecordPattern(pattern) => {
                let re = record.vars_mut().regex(pattern)?;
                Ok(re.is_match(record.as_str()))
            }
            MatchRule::FieldPattern(key, pattern) => {
                let text = record.text(key)?;
                let re = record.vars_mut().regex(pattern)?;
                Ok(re.is_match(&text))
            }
        }
    }
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchRule::AtGlobalLine(n) | MatchRule::AtFileLine(n) => write!(f, "{n}"),
            MatchRule::Range {
                start,
                stop,
                stride,
            } => {
                write!(f, "{start}:")?;
                if let Some(stop) = stop {
                    write!(f, "{stop}")?;
                }
                write!(f, ":{stride}")
            }
            MatchRule::RecordPattern(pattern) => write!(f, "/{pattern}/"),
            MatchRule::FieldPattern(key, pattern) => write!(f, "{key}~/{pattern}/"),
        }
    }
}

/// Where a record handler is registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Before any input is read.
    Begin,
    /// After every input has been processed.
    End,
    /// Every record: replaces the default per-record hook.
    Every,
    /// A rule-table entry.
    Rule(MatchRule),
}

impl From<MatchRule> for Selector {
    fn from(rule: MatchRule) -> Self {
        Selector::Rule(rule)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Begin => f.write_str("BEGIN"),
            Selector::End => f.write_str("END"),
            Selector::Every => f.write_str("..."),
            Selector::Rule(rule) => rule.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vars::Vars;

    fn check(rule: &MatchRule, vars: &mut Vars, raw: &str) -> bool {
        let mut record = Record::new(vars, raw).unwrap();
        rule.matches(&mut record).unwrap()
    }

    fn at(nr: usize, fnr: usize) -> Vars {
        let mut vars = Vars::default();
        vars.nr = nr;
        vars.fnr = fnr;
        vars
    }

    #[test]
    fn test_global_line() {
        let rule = MatchRule::line(3);
        assert_eq!(rule, MatchRule::AtGlobalLine(3));
        assert!(check(&rule, &mut at(3, 1), "x"));
        assert!(!check(&rule, &mut at(2, 3), "x"));
    }

    #[test]
    fn test_file_line() {
        let rule = MatchRule::line(-2);
        assert_eq!(rule, MatchRule::AtFileLine(-2));
        assert!(check(&rule, &mut at(5, 2), "x"));
        assert!(!check(&rule, &mut at(2, 1), "x"));
    }

    #[test]
    fn test_wrong_sign_never_fires() {
        assert!(!check(&MatchRule::AtGlobalLine(-1), &mut at(1, 1), "x"));
        assert!(!check(&MatchRule::AtFileLine(1), &mut at(1, 1), "x"));
        assert!(!check(&MatchRule::AtGlobalLine(0), &mut at(0, 0), "x"));
    }

    #[test]
    fn test_range_global() {
        let rule = MatchRule::range(2, None, 1);
        assert!(!check(&rule, &mut at(1, 1), "x"));
        assert!(check(&rule, &mut at(2, 1), "x"));
        assert!(check(&rule, &mut at(100, 1), "x"));
    }

    #[test]
    fn test_range_stop_is_exclusive() {
        let rule = MatchRule::range(1, Some(3), 1);
        assert!(check(&rule, &mut at(2, 9), "x"));
        assert!(!check(&rule, &mut at(3, 9), "x"));
    }

    #[test]
    fn test_range_stride() {
        let rule = MatchRule::range(2, Some(10), 3);
        let fired: Vec<usize> = (1..12)
            .filter(|&nr| check(&rule, &mut at(nr, 1), "x"))
            .collect();
        assert_eq!(fired, vec![2, 5, 8]);
    }

    #[test]
    fn test_negative_stride_uses_file_index() {
        let rule = MatchRule::range(1, None, -2);
        assert!(check(&rule, &mut at(2, 1), "x"));
        assert!(!check(&rule, &mut at(3, 2), "x"));
        assert!(check(&rule, &mut at(4, 3), "x"));
    }

    #[test]
    fn test_zero_stride_rejected() {
        let rule = MatchRule::range(1, None, 0);
        assert!(matches!(rule.validate(), Err(AwkError::InvalidRule(_))));
        let mut vars = at(1, 1);
        let mut record = Record::new(&mut vars, "x").unwrap();
        assert!(rule.matches(&mut record).is_err());
    }

    #[test]
    fn test_record_pattern() {
        let rule = MatchRule::pattern("err(or)?");
        assert!(check(&rule, &mut at(1, 1), "an error here"));
        assert!(!check(&rule, &mut at(1, 1), "ERROR"));
    }

    #[test]
    fn test_record_pattern_ignore_case() {
        let rule = MatchRule::pattern("error");
        let mut vars = at(1, 1);
        vars.ignore_case = true;
        assert!(check(&rule, &mut vars, "ERROR"));
    }

    #[test]
    fn test_field_pattern() {
        let rule = MatchRule::field("$2", "^b");
        assert!(check(&rule, &mut at(1, 1), "a bee c"));
        assert!(!check(&rule, &mut at(1, 1), "bee a c"));
        // Missing fields read as empty.
        assert!(!check(&rule, &mut at(1, 1), "a"));
    }

    #[test]
    fn test_field_pattern_on_coerced_field() {
        let rule = MatchRule::field(1usize, "^4");
        let mut vars = at(1, 1);
        vars.autoparse = true;
        assert!(check(&rule, &mut vars, "42 x"));
    }

    #[test]
    fn test_bad_pattern_fails_at_first_use() {
        let rule = MatchRule::pattern("(");
        assert!(rule.validate().is_ok());
        let mut vars = at(1, 1);
        let mut record = Record::new(&mut vars, "x").unwrap();
        assert!(matches!(
            rule.matches(&mut record),
            Err(AwkError::Pattern { .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(MatchRule::line(-2).to_string(), "-2");
        assert_eq!(MatchRule::range(2, None, 1).to_string(), "2::1");
        assert_eq!(MatchRule::range(1, Some(9), -2).to_string(), "1:9:-2");
        assert_eq!(MatchRule::pattern("x+").to_string(), "/x+/");
        assert_eq!(MatchRule::field(2usize, "y").to_string(), "$2~/y/");
        assert_eq!(Selector::Every.to_string(), "...");
        assert_eq!(Selector::Begin.to_string(), "BEGIN");
        assert_eq!(Selector::End.to_string(), "END");
    }
}
