//! Event log format parsers
//!
//! This module turns the textual race log into structured `Event` values.
//! Parsers implement an iterator pattern over events so callers can stop at
//! the first malformed line.

pub mod event_log;

// Re-export parser types
pub use event_log::{
    parse_event_line, read_event_file, sort_events, EventLogIterator, EventLogParser,
};
