//! # awkish
//!
//! Record-oriented text processing with awk-style rule dispatch.
//!
//! Inputs are split into records (by `RS`), records into fields (by `FS`),
//! and caller-supplied handlers run against each record according to
//! declarative match rules.
//!
//! ## Overview
//!
//! - **Records**: raw text plus fields, kept consistent on every write
//! - **Match rules**: line number, line range with stride, record pattern,
//!   field pattern
//! - **Hooks**: BEGIN, per-record (prints by default), END, all set through
//!   [`Engine::register`]
//! - **Counters**: `NR` across the whole run, `FNR` within each input
//!
//! ## Example
//!
//! ```
//! use awkish::{Engine, MatchRule, MemorySink, Output, Selector};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let sink = MemorySink::new();
//! let mut engine = Engine::new();
//! engine.vars_mut().set_output(Output::new(Box::new(sink.clone()), "mem"));
//! engine.vars_mut().autoparse = true;
//! // Replace the default print of every record with a no-op.
//! engine.register(Selector::Every, |_| Ok(())).unwrap();
//!
//! let total = Rc::new(Cell::new(0));
//! let acc = Rc::clone(&total);
//! // Every record from the second on: skip the header.
//! engine
//!     .register(MatchRule::range(2, None, 1), move |r| {
//!         let sum = r.get("$2")?.as_i64().unwrap_or(0) + r.get("$3")?.as_i64().unwrap_or(0);
//!         acc.set(acc.get() + sum);
//!         let name = r.text(1)?;
//!         r.vars_mut().print([name, sum.to_string()])
//!     })
//!     .unwrap();
//!
//! engine
//!     .run_texts(&[("marks", "name a b\nann 1 2\nbob 3 4\n")])
//!     .unwrap();
//!
//! assert_eq!(sink.contents(), "ann 3\nbob 7\n");
//! assert_eq!(total.get(), 10);
//! ```

pub mod builtins;
pub mod engine;
pub mod error;
pub mod format;
pub mod output;
pub mod pattern;
pub mod record;
pub mod rule;
pub mod selector;
pub mod value;
pub mod vars;

pub use builtins::{index, length, substr, tolower, toupper};
pub use engine::{Engine, RecordHandler};
pub use error::{AwkError, Result};
pub use format::sprintf;
pub use output::{MemorySink, Mode, Output};
pub use record::{FieldKey, Record};
pub use rule::{MatchRule, Selector};
pub use selector::parse_selector;
pub use value::FieldValue;
pub use vars::{DEFAULT_FS, DEFAULT_RS, Options, Vars};
