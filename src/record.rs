//! The record abstraction.
//!
//! A [`Record`] is one input line split into fields. It keeps the raw text
//! and the field list consistent: writing the whole record (`$0`) re-splits
//! the fields with `FS`, writing any single field re-joins the raw text with
//! `OFS`.
//!
//! Fields are reachable two ways:
//! - name-style keys ([`FieldKey`]): 1-based, `0` is the whole record, and
//!   reading past the last field yields an empty string;
//! - positional access ([`Record::field`], [`Record::set_field`]): 0-based
//!   over the field list, out-of-range is [`AwkError::FieldIndex`].

use crate::error::{AwkError, Result};
use crate::pattern::split_on;
use crate::value::FieldValue;
use crate::vars::Vars;
use std::fmt;

/// A name-style field key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKey {
    /// 1-based field number, 0 for the whole record.
    Nth(usize),
    /// Textual key such as `$1`, `1`, `S2`, `$NF` or `NF`.
    Name(String),
}

impl FieldKey {
    /// Resolve to a 1-based field number.
    ///
    /// A name is stripped of a leading `$` (or of an `S`, `D` or `F` prefix
    /// directly followed by digits) and parsed as an integer. Failing that,
    /// it is looked up as an engine variable, which must be a non-negative
    /// integer (so `$NF` is the last field).
    pub fn resolve(&self, vars: &Vars) -> Result<usize> {
        let name = match self {
            FieldKey::Nth(n) => return Ok(*n),
            FieldKey::Name(name) => name.trim(),
        };
        let bare = match name.strip_prefix('$') {
            Some(rest) => rest.trim(),
            None => strip_letter_prefix(name),
        };
        if let Ok(n) = bare.parse::<usize>() {
            return Ok(n);
        }
        match vars.lookup(bare) {
            Some(FieldValue::Int(n)) if n >= 0 => Ok(n as usize),
            _ => Err(AwkError::UnknownName(name.to_string())),
        }
    }
}

/// `S1`, `D1`, `F1` are aliases of `1`; anything else is returned as is.
fn strip_letter_prefix(name: &str) -> &str {
    let mut chars = name.chars();
    match chars.next() {
        Some('S' | 'D' | 'F') => {
            let rest = chars.as_str();
            if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
                rest
            } else {
                name
            }
        }
        _ => name,
    }
}

impl From<usize> for FieldKey {
    fn from(n: usize) -> Self {
        FieldKey::Nth(n)
    }
}

impl From<&str> for FieldKey {
    fn from(s: &str) -> Self {
        FieldKey::Name(s.to_string())
    }
}

impl From<String> for FieldKey {
    fn from(s: String) -> Self {
        FieldKey::Name(s)
    }
}

impl From<&FieldKey> for FieldKey {
    fn from(key: &FieldKey) -> Self {
        key.clone()
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Nth(n) => write!(f, "${n}"),
            FieldKey::Name(name) => f.write_str(name),
        }
    }
}

/// One input record, live for the duration of its dispatch.
pub struct Record<'a> {
    raw: String,
    fields: Vec<FieldValue>,
    vars: &'a mut Vars,
}

impl<'a> Record<'a> {
    /// Split `raw` by the current field separator.
    ///
    /// Updates `NF` and coerces fields when autoparse is on.
    pub fn new(vars: &'a mut Vars, raw: impl Into<String>) -> Result<Self> {
        let mut record = Self {
            raw: raw.into(),
            fields: Vec::new(),
            vars,
        };
        record.resplit()?;
        Ok(record)
    }

    /// A record with no text and no fields, handed to BEGIN and END
    /// handlers. `NF` is left as it is.
    pub(crate) fn blank(vars: &'a mut Vars) -> Self {
        Self {
            raw: String::new(),
            fields: Vec::new(),
            vars,
        }
    }

    fn resplit(&mut self) -> Result<()> {
        let re = self.vars.field_regex()?;
        self.fields = split_on(&re, &self.raw)
            .into_iter()
            .map(FieldValue::Str)
            .collect();
        self.vars.nf = self.fields.len();
        self.parse_fields(false);
        Ok(())
    }

    fn rejoin(&mut self) {
        self.raw = self.joined(&self.vars.ofs);
        self.parse_fields(false);
    }

    fn joined(&self, separator: &str) -> String {
        self.fields
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Coerce fields to integers or floats where they parse.
    ///
    /// Only applies when autoparse is enabled, unless `forced`. Fields that
    /// parse as neither keep their string value.
    pub fn parse_fields(&mut self, forced: bool) {
        if !(self.vars.autoparse || forced) {
            return;
        }
        for field in &mut self.fields {
            *field = std::mem::take(field).coerce();
        }
    }

    /// Read a field by name-style key.
    ///
    /// Key 0 is the whole record; keys past the last field read as "".
    pub fn get(&self, key: impl Into<FieldKey>) -> Result<FieldValue> {
        let idx = key.into().resolve(&*self.vars)?;
        Ok(match idx {
            0 => FieldValue::Str(self.raw.clone()),
            n if n <= self.fields.len() => self.fields[n - 1].clone(),
            _ => FieldValue::default(),
        })
    }

    /// String form of [`Record::get`].
    pub fn text(&self, key: impl Into<FieldKey>) -> Result<String> {
        Ok(self.get(key)?.to_string())
    }

    /// Write a field by name-style key.
    ///
    /// Key 0 replaces the whole record and re-splits it. A key past the
    /// last field pads with empty fields first. Any other write re-joins
    /// the record text with `OFS`.
    pub fn set(&mut self, key: impl Into<FieldKey>, value: impl Into<FieldValue>) -> Result<()> {
        let idx = key.into().resolve(&*self.vars)?;
        let value = value.into();
        if idx == 0 {
            self.raw = value.to_string();
            return self.resplit();
        }
        let len = self.fields.len();
        if idx > len {
            self.fields
                .try_reserve(idx - len)
                .map_err(|_| AwkError::FieldIndex { index: idx, len })?;
            self.fields.resize(idx, FieldValue::default());
            self.vars.nf = idx;
        }
        self.fields[idx - 1] = value;
        self.rejoin();
        Ok(())
    }

    /// Read a field by 0-based position.
    pub fn field(&self, index: usize) -> Result<&FieldValue> {
        self.fields.get(index).ok_or(AwkError::FieldIndex {
            index,
            len: self.fields.len(),
        })
    }

    /// Write a field by 0-based position. Never extends the record.
    pub fn set_field(&mut self, index: usize, value: impl Into<FieldValue>) -> Result<()> {
        let len = self.fields.len();
        let slot = self
            .fields
            .get_mut(index)
            .ok_or(AwkError::FieldIndex { index, len })?;
        *slot = value.into();
        self.rejoin();
        Ok(())
    }

    /// Number of fields (`NF`).
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The whole record text (`$0`).
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }

    /// Iterate the fields in order. Each call starts again from field 1.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldValue> {
        self.fields.iter()
    }

    pub fn vars(&self) -> &Vars {
        &*self.vars
    }

    pub fn vars_mut(&mut self) -> &mut Vars {
        &mut *self.vars
    }

    /// Write the fields joined by `OFS`, then `ORS`.
    pub fn print(&mut self) -> Result<()> {
        let mut line = self.joined(&self.vars.ofs);
        line.push_str(&self.vars.ors);
        self.vars.output().write_str(&line)
    }

    /// [`Vars::sub`] against the record text.
    pub fn sub(&mut self, pattern: &str, replacement: &str) -> Result<(String, usize)> {
        self.vars.sub(pattern, replacement, &self.raw)
    }

    /// [`Vars::gsub`] against the record text.
    pub fn gsub(&mut self, pattern: &str, replacement: &str) -> Result<(String, usize)> {
        self.vars.gsub(pattern, replacement, &self.raw)
    }

    /// [`Vars::split`] of the record text.
    pub fn split(&mut self, separator: Option<&str>) -> Result<Vec<String>> {
        self.vars.split(&self.raw, separator)
    }
}

impl<'r> IntoIterator for &'r Record<'_> {
    type Item = &'r FieldValue;
    type IntoIter = std::slice::Iter<'r, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl fmt::Display for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl fmt::Debug for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("raw", &self.raw)
            .field("fields", &self.fields)
            .finish()
    }
}
