//! Engine state shared with every record.
//!
//! [`Vars`] holds what awk calls the built-in variables (`FS`, `NR`, `NF`,
//! ...) plus the compiled-pattern cache and the output sink. The engine owns
//! it; each [`Record`](crate::Record) borrows it mutably while its handlers
//! run, so handlers can read counters, change separators (effective from the
//! next record) and print.

use crate::error::Result;
use crate::output::{Mode, Output};
use crate::pattern::PatternCache;
use crate::value::FieldValue;
use regex::Regex;
use std::fmt::Display;

/// Default field separator: runs of blanks, tabs and newlines.
pub const DEFAULT_FS: &str = r"[ \t\n]+";
/// Default record separator.
pub const DEFAULT_RS: &str = "\n";

/// Initial configuration for an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Field separator, a regular expression.
    pub fs: String,
    /// Record separator, a regular expression.
    pub rs: String,
    /// Output field separator.
    pub ofs: String,
    /// Output record separator.
    pub ors: String,
    /// Match rule patterns (and regex utilities) ignoring case.
    pub ignore_case: bool,
    /// Coerce fields to numbers when they parse as such.
    pub autoparse: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            fs: DEFAULT_FS.to_string(),
            rs: DEFAULT_RS.to_string(),
            ofs: " ".to_string(),
            ors: "\n".to_string(),
            ignore_case: false,
            autoparse: false,
        }
    }
}

/// Process-wide engine state.
#[derive(Debug)]
pub struct Vars {
    /// Input currently being processed (`FILENAME`).
    pub filename: Option<String>,
    /// Records seen across all inputs of the current run (`NR`).
    pub nr: usize,
    /// Records seen in the current input (`FNR`).
    pub fnr: usize,
    /// Field count of the current record (`NF`).
    pub nf: usize,
    pub fs: String,
    pub rs: String,
    pub ofs: String,
    pub ors: String,
    pub ignore_case: bool,
    pub autoparse: bool,
    /// Start of the last `match_at` hit, 1-based, 0 when none (`RSTART`).
    pub rstart: usize,
    /// Length of the last `match_at` hit, -1 when none (`RLENGTH`).
    pub rlength: i64,
    patterns: PatternCache,
    output: Output,
}

impl Vars {
    pub fn new(options: Options) -> Self {
        Self {
            filename: None,
            nr: 0,
            fnr: 0,
            nf: 0,
            fs: options.fs,
            rs: options.rs,
            ofs: options.ofs,
            ors: options.ors,
            ignore_case: options.ignore_case,
            autoparse: options.autoparse,
            rstart: 0,
            rlength: -1,
            patterns: PatternCache::new(),
            output: Output::stdout(),
        }
    }

    /// Look up a built-in variable by its awk name.
    ///
    /// This is the first tier of name resolution for field keys; names not
    /// listed here are not engine variables.
    pub fn lookup(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "FILENAME" => FieldValue::from(self.filename.clone().unwrap_or_default()),
            "NR" => FieldValue::from(self.nr),
            "FNR" => FieldValue::from(self.fnr),
            "NF" => FieldValue::from(self.nf),
            "FS" => FieldValue::from(self.fs.as_str()),
            "RS" => FieldValue::from(self.rs.as_str()),
            "OFS" => FieldValue::from(self.ofs.as_str()),
            "ORS" => FieldValue::from(self.ors.as_str()),
            "RSTART" => FieldValue::from(self.rstart),
            "RLENGTH" => FieldValue::Int(self.rlength),
            "IGNORECASE" => FieldValue::Int(i64::from(self.ignore_case)),
            _ => return None,
        };
        Some(value)
    }

    /// Compile `pattern` honoring the case-sensitivity flag.
    pub fn regex(&mut self, pattern: &str) -> Result<Regex> {
        self.patterns.get(pattern, self.ignore_case)
    }

    pub(crate) fn field_regex(&mut self) -> Result<Regex> {
        self.patterns.get(&self.fs, false)
    }

    pub(crate) fn record_regex(&mut self) -> Result<Regex> {
        self.patterns.get(&self.rs, false)
    }

    /// Set the field separator, escaping it first when `literal`.
    pub fn set_field_separator(&mut self, fs: &str, literal: bool) {
        self.fs = if literal {
            regex::escape(fs)
        } else {
            fs.to_string()
        };
    }

    /// The active output sink.
    pub fn output(&mut self) -> &mut Output {
        &mut self.output
    }

    /// Replace the default output sink.
    pub fn set_output(&mut self, output: Output) {
        self.output = output;
    }

    /// Send output to `path` until [`Vars::reset_output`].
    pub fn redirect_output(&mut self, path: &str, mode: Mode) -> Result<()> {
        self.output.redirect(path, mode)
    }

    /// Close any redirection and restore the default sink.
    pub fn reset_output(&mut self) -> Result<()> {
        self.output.reset()
    }

    /// Write `items` joined by `OFS`, terminated by `ORS`.
    pub fn print<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let line = items
            .into_iter()
            .map(|item| item.to_string())
            .collect::<Vec<_>>()
            .join(&self.ofs);
        self.output.write_str(&line)?;
        self.output.write_str(&self.ors)
    }
}

impl Default for Vars {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemorySink;

    #[test]
    fn test_defaults() {
        let vars = Vars::default();
        assert_eq!(vars.fs, DEFAULT_FS);
        assert_eq!(vars.rs, "\n");
        assert_eq!(vars.ofs, " ");
        assert_eq!(vars.ors, "\n");
        assert!(!vars.ignore_case);
        assert!(!vars.autoparse);
        assert!(vars.filename.is_none());
    }

    #[test]
    fn test_lookup_counters() {
        let mut vars = Vars::default();
        vars.nr = 5;
        vars.fnr = 2;
        vars.nf = 3;
        assert_eq!(vars.lookup("NR"), Some(FieldValue::Int(5)));
        assert_eq!(vars.lookup("FNR"), Some(FieldValue::Int(2)));
        assert_eq!(vars.lookup("NF"), Some(FieldValue::Int(3)));
        assert_eq!(vars.lookup("OFS"), Some(FieldValue::from(" ")));
        assert_eq!(vars.lookup("nope"), None);
    }

    #[test]
    fn test_literal_field_separator_is_escaped() {
        let mut vars = Vars::default();
        vars.set_field_separator("a.b", true);
        assert_eq!(vars.fs, r"a\.b");
        vars.set_field_separator("a.b", false);
        assert_eq!(vars.fs, "a.b");
    }

    #[test]
    fn test_field_regex_ignores_case_flag() {
        let mut vars = Vars::default();
        vars.fs = "x".to_string();
        vars.ignore_case = true;
        assert!(!vars.field_regex().unwrap().is_match("X"));
        assert!(vars.regex("x").unwrap().is_match("X"));
    }

    #[test]
    fn test_print_uses_output_separators() {
        let sink = MemorySink::new();
        let mut vars = Vars::default();
        vars.set_output(Output::new(Box::new(sink.clone()), "mem"));
        vars.ofs = ",".to_string();
        vars.ors = ";".to_string();
        vars.print(["a", "b"]).unwrap();
        vars.print([1, 2, 3]).unwrap();
        assert_eq!(sink.contents(), "a,b;1,2,3;");
    }
}
