//! The dispatch engine.
//!
//! Drives inputs record by record: BEGIN hook, then for every input the
//! records split by `RS`, each one handed to the per-record hook and then
//! to every matching rule in registration order, then the END hook.

use crate::error::{AwkError, Result};
use crate::output::Mode;
use crate::pattern::split_on;
use crate::record::Record;
use crate::rule::{MatchRule, Selector};
use crate::vars::{Options, Vars};
use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, trace};

/// Handler invoked with a record. BEGIN and END handlers get a blank one.
pub type RecordHandler = Box<dyn FnMut(&mut Record<'_>) -> Result<()>>;

/// One input of a run.
enum Source<'s> {
    File(&'s Path),
    Text { name: &'s str, content: &'s str },
}

impl<'s> Source<'s> {
    fn name(&self) -> String {
        match self {
            Source::File(path) => path.display().to_string(),
            Source::Text { name, .. } => name.to_string(),
        }
    }

    fn load(&self) -> Result<Cow<'s, str>> {
        match self {
            Source::File(path) => fs::read_to_string(path)
                .map(Cow::Owned)
                .map_err(|e| AwkError::io(*path, e)),
            Source::Text { content, .. } => Ok(Cow::Borrowed(*content)),
        }
    }
}

/// Record-processing engine: state, rule table and lifecycle hooks.
pub struct Engine {
    vars: Vars,
    /// Rules in registration order; a re-registered rule keeps its slot.
    rules: Vec<(MatchRule, RecordHandler)>,
    on_begin: Option<RecordHandler>,
    on_record: Option<RecordHandler>,
    on_end: Option<RecordHandler>,
}

impl Engine {
    /// Engine with default options. The per-record hook prints each record.
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            vars: Vars::new(options),
            rules: Vec::new(),
            on_begin: None,
            on_record: Some(Box::new(print_record)),
            on_end: None,
        }
    }

    pub fn vars(&self) -> &Vars {
        &self.vars
    }

    /// Engine state; changes take effect from the next record.
    pub fn vars_mut(&mut self) -> &mut Vars {
        &mut self.vars
    }

    /// Register a handler. This is the only way to change what runs.
    ///
    /// [`Selector::Begin`] and [`Selector::End`] set the lifecycle hooks.
    /// [`Selector::Every`] replaces the per-record hook, including the
    /// default print; register a no-op to silence it. A rule replaces the
    /// handler of an equal rule already in the table (keeping its position)
    /// or is appended.
    pub fn register<F>(&mut self, selector: impl Into<Selector>, handler: F) -> Result<()>
    where
        F: FnMut(&mut Record<'_>) -> Result<()> + 'static,
    {
        let handler: RecordHandler = Box::new(handler);
        match selector.into() {
            Selector::Begin => {
                self.on_begin = Some(handler);
            }
            Selector::End => {
                self.on_end = Some(handler);
            }
            Selector::Every => {
                self.on_record = Some(handler);
            }
            Selector::Rule(rule) => {
                rule.validate()?;
                match self.rules.iter_mut().find(|(existing, _)| *existing == rule) {
                    Some(slot) => slot.1 = handler,
                    None => self.rules.push((rule, handler)),
                }
            }
        }
        Ok(())
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Registered rules in evaluation order.
    pub fn rules(&self) -> impl Iterator<Item = &MatchRule> {
        self.rules.iter().map(|(rule, _)| rule)
    }

    /// Send output to `path` until [`Engine::reset_output`].
    pub fn redirect_output(&mut self, path: &str, mode: Mode) -> Result<()> {
        self.vars.redirect_output(path, mode)
    }

    /// Restore the default output sink. No-op without a redirection.
    pub fn reset_output(&mut self) -> Result<()> {
        self.vars.reset_output()
    }

    /// Process `files` in order.
    ///
    /// `field_separator` becomes `FS`, escaped first when `literal`. An
    /// unreadable file aborts the run; the END hook is not called.
    pub fn run<P: AsRef<Path>>(
        &mut self,
        files: &[P],
        field_separator: &str,
        literal: bool,
    ) -> Result<()> {
        self.vars.set_field_separator(field_separator, literal);
        let sources: Vec<Source<'_>> = files.iter().map(|p| Source::File(p.as_ref())).collect();
        self.drive(&sources)
    }

    /// Process in-memory inputs, given as `(name, content)`, with the
    /// current `FS`.
    pub fn run_texts(&mut self, inputs: &[(&str, &str)]) -> Result<()> {
        let sources: Vec<Source<'_>> = inputs
            .iter()
            .map(|&(name, content)| Source::Text { name, content })
            .collect();
        self.drive(&sources)
    }

    fn drive(&mut self, sources: &[Source<'_>]) -> Result<()> {
        debug!(inputs = sources.len(), rules = self.rules.len(), "Starting run");
        if let Some(begin) = self.on_begin.as_mut() {
            begin(&mut Record::blank(&mut self.vars))?;
        }
        self.vars.nr = 0;

        for source in sources {
            let name = source.name();
            let content = source.load()?;
            self.vars.fnr = 0;

            let records = self.split_records(&content)?;
            debug!(
                input = %name,
                records = records.len(),
                "Processing input"
            );
            self.vars.filename = Some(name);
            for raw in records {
                self.dispatch(raw)?;
            }
        }

        if let Some(end) = self.on_end.as_mut() {
            end(&mut Record::blank(&mut self.vars))?;
        }
        debug!(records = self.vars.nr, "Run complete");
        self.vars
            .output()
            .flush()
            .map_err(|source| AwkError::Output {
                path: "<output>".to_string(),
                source,
            })
    }

    /// Split content by `RS`. A separator at the very end does not start
    /// another record, and empty content has no records.
    fn split_records(&mut self, content: &str) -> Result<Vec<String>> {
        if content.is_empty() {
            return Ok(Vec::new());
        }
        let re = self.vars.record_regex()?;
        let mut records = split_on(&re, content);
        if records.len() > 1 && records.last().is_some_and(|r| r.is_empty()) {
            records.pop();
        }
        Ok(records)
    }

    fn dispatch(&mut self, raw: String) -> Result<()> {
        self.vars.fnr += 1;
        self.vars.nr += 1;

        let Engine {
            vars,
            rules,
            on_record,
            ..
        } = self;
        let mut record = Record::new(vars, raw)?;

        if let Some(handler) = on_record.as_mut() {
            handler(&mut record)?;
        }
        for (rule, handler) in rules.iter_mut() {
            if rule.matches(&mut record)? {
                trace!(rule = %rule, nr = record.vars().nr, "Rule fired");
                handler(&mut record)?;
            }
        }
        Ok(())
    }
}

/// The default per-record hook.
fn print_record(record: &mut Record<'_>) -> Result<()> {
    record.print()
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
