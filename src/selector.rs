//! Textual selector syntax.
//!
//! Selector format:
//! ```text
//! BEGIN  END        before and after all inputs
//! ...  :  ::        every record
//! 3                 third record of the run
//! -2                second record of each input
//! 2:                every record from the second on
//! 1:10:2            records 1, 3, 5, 7, 9 of the run
//! ::-2              odd-numbered records of each input
//! /error/           records matching a pattern
//! $2 ~ /^x/         records whose second field matches a pattern
//! NF ~ #3#          the pattern delimiter is any punctuation character
//! ```

use crate::error::{AwkError, Result};
use crate::record::FieldKey;
use crate::rule::{MatchRule, Selector};
use std::str::FromStr;

impl FromStr for Selector {
    type Err = AwkError;

    fn from_str(text: &str) -> Result<Self> {
        parse_selector(text)
    }
}

/// Parse selector text.
pub fn parse_selector(text: &str) -> Result<Selector> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AwkError::InvalidRule("empty selector".to_string()));
    }
    match text {
        "..." => return Ok(Selector::Every),
        "BEGIN" => return Ok(Selector::Begin),
        "END" => return Ok(Selector::End),
        _ => {}
    }

    let first = text.chars().next().unwrap_or(' ');
    if is_delimiter(first) {
        let (pattern, rest) = parse_delimited_string(text)?;
        if !rest.trim().is_empty() {
            return Err(AwkError::InvalidRule(format!(
                "unexpected text after pattern: '{}'",
                rest.trim()
            )));
        }
        return Ok(Selector::Rule(MatchRule::RecordPattern(pattern)));
    }

    if let Some(idx) = text.find('~') {
        return parse_field_pattern(&text[..idx], &text[idx + 1..]);
    }
    if text.contains(':') {
        return parse_range(text);
    }

    let n: i64 = text
        .parse()
        .map_err(|_| AwkError::InvalidRule(format!("unrecognised selector '{text}'")))?;
    if n == 0 {
        return Err(AwkError::InvalidRule("line 0 never matches".to_string()));
    }
    Ok(Selector::Rule(MatchRule::line(n)))
}

/// Pattern delimiters: any punctuation that cannot start another form.
fn is_delimiter(c: char) -> bool {
    c.is_ascii_punctuation() && !matches!(c, '$' | '-' | '+' | ':' | '.' | '_')
}

/// Parse a delimited string. The first non-blank character is the
/// delimiter and the string runs to its next occurrence.
/// Returns (extracted_string, rest_of_input).
fn parse_delimited_string(s: &str) -> Result<(String, &str)> {
    let s = s.trim_start();
    let Some(delim) = s.chars().next() else {
        return Err(AwkError::InvalidRule("expected delimited pattern".to_string()));
    };
    let after_delim = &s[delim.len_utf8()..];

    match after_delim.find(delim) {
        Some(end) => Ok((
            after_delim[..end].to_string(),
            &after_delim[end + delim.len_utf8()..],
        )),
        None => Err(AwkError::InvalidRule(format!("unclosed delimiter '{delim}'"))),
    }
}

/// `KEY ~ /pattern/`
fn parse_field_pattern(key: &str, pattern: &str) -> Result<Selector> {
    let key = key.trim();
    if key.is_empty() {
        return Err(AwkError::InvalidRule(
            "field pattern requires a field before '~'".to_string(),
        ));
    }
    let key = match key.parse::<usize>() {
        Ok(n) => FieldKey::Nth(n),
        Err(_) => FieldKey::Name(key.to_string()),
    };
    let (pattern, rest) = parse_delimited_string(pattern)?;
    if !rest.trim().is_empty() {
        return Err(AwkError::InvalidRule(format!(
            "unexpected text after pattern: '{}'",
            rest.trim()
        )));
    }
    Ok(Selector::Rule(MatchRule::FieldPattern(key, pattern)))
}

/// `start:stop:stride`, each part optional. All parts empty means every
/// record.
fn parse_range(text: &str) -> Result<Selector> {
    let parts: Vec<&str> = text.split(':').map(str::trim).collect();
    if parts.len() > 3 {
        return Err(AwkError::InvalidRule(format!(
            "range '{text}' has more than three parts"
        )));
    }
    if parts.iter().all(|p| p.is_empty()) {
        return Ok(Selector::Every);
    }

    let bound = |part: &str, what: &str| -> Result<Option<usize>> {
        if part.is_empty() {
            return Ok(None);
        }
        part.parse::<usize>().map(Some).map_err(|_| {
            AwkError::InvalidRule(format!("invalid range {what} '{part}' (must be >= 0)"))
        })
    };
    let start = bound(parts[0], "start")?.unwrap_or(1);
    let stop = bound(parts.get(1).copied().unwrap_or(""), "stop")?;
    let stride = match parts.get(2).copied().unwrap_or("") {
        "" => 1,
        s => s
            .parse::<i64>()
            .map_err(|_| AwkError::InvalidRule(format!("invalid range stride '{s}'")))?,
    };

    let rule = MatchRule::range(start, stop, stride);
    rule.validate()?;
    Ok(Selector::Rule(rule))
}
