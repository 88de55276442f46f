//! Output sink with scoped redirection.
//!
//! The engine writes everything through an [`Output`]. By default that is
//! stdout; [`Output::redirect`] swaps in a file (truncating or appending) and
//! [`Output::reset`] closes it and restores the default sink. Only one
//! redirection is active at a time.

use crate::error::{AwkError, Result};
use std::cell::RefCell;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::rc::Rc;
use tracing::debug;

/// How a redirection target file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Create or truncate (`>`).
    Truncate,
    /// Create or append (`>>`).
    Append,
}

/// The engine's output target.
pub struct Output {
    current: Box<dyn Write>,
    /// Default sink and its label, held while a redirection is active.
    saved: Option<(Box<dyn Write>, String)>,
    /// Label of the active sink, used in error messages.
    label: String,
}

impl Output {
    /// Output going to the process's stdout.
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()), "<stdout>")
    }

    /// Output going to an arbitrary default writer.
    pub fn new(writer: Box<dyn Write>, label: impl Into<String>) -> Self {
        Self {
            current: writer,
            saved: None,
            label: label.into(),
        }
    }

    /// Redirect output to `path`, replacing any active redirection.
    pub fn redirect(&mut self, path: &str, mode: Mode) -> Result<()> {
        let mut options = OpenOptions::new();
        match mode {
            Mode::Truncate => options.write(true).create(true).truncate(true),
            Mode::Append => options.append(true).create(true),
        };
        let file = options.open(path).map_err(|source| AwkError::Output {
            path: path.to_string(),
            source,
        })?;
        debug!(path, ?mode, "Redirecting output");
        self.swap_in(Box::new(file), path)
    }

    /// Redirect output to an already open writer.
    pub fn redirect_writer(&mut self, writer: Box<dyn Write>, label: &str) -> Result<()> {
        self.swap_in(writer, label)
    }

    fn swap_in(&mut self, writer: Box<dyn Write>, label: &str) -> Result<()> {
        let mut previous = std::mem::replace(&mut self.current, writer);
        let previous_label = std::mem::replace(&mut self.label, label.to_string());
        if self.saved.is_none() {
            self.saved = Some((previous, previous_label));
            return Ok(());
        }
        // Close the redirection being replaced.
        previous.flush().map_err(|source| AwkError::Output {
            path: previous_label,
            source,
        })
    }

    /// Close the active redirection and restore the default sink.
    ///
    /// No-op when nothing is redirected.
    pub fn reset(&mut self) -> Result<()> {
        let Some((default, default_label)) = self.saved.take() else {
            return Ok(());
        };
        let mut redirected = std::mem::replace(&mut self.current, default);
        let flushed = redirected.flush();
        let label = std::mem::replace(&mut self.label, default_label);
        debug!(path = %label, "Restored default output");
        flushed.map_err(|source| AwkError::Output {
            path: label,
            source,
        })
    }

    pub fn is_redirected(&self) -> bool {
        self.saved.is_some()
    }

    /// Write a string to the active sink.
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.current
            .write_all(s.as_bytes())
            .map_err(|source| AwkError::Output {
                path: self.label.clone(),
                source,
            })
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.current.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.current.flush()
    }
}

impl std::fmt::Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Output")
            .field("label", &self.label)
            .field("redirected", &self.is_redirected())
            .finish()
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::stdout()
    }
}

/// An in-memory sink whose contents stay readable after it is handed to
/// an [`Output`].
#[derive(Debug, Clone, Default)]
pub struct MemorySink(Rc<RefCell<Vec<u8>>>);

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
