//! Decoding of watcher output lines into status events.
//!
//! Workers are independently evolving programs, so malformed output is an
//! expected case: parsing never panics and never returns an error, it
//! returns [`ParsedLine::Unparseable`] with a reason the caller can log.

mod printer;
mod tagged;

use std::fmt;

use crate::domain::WatcherKind;
use crate::events::StatusEvent;

/// Line protocol spoken by a watcher on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineProtocol {
    /// One JSON record per line: `{"printer_name": str, "setup_required": bool}`.
    PrinterStatus,
    /// `[WATCHER_SUCCESS] msg` / `[WATCHER_ERROR] msg` progress lines.
    TaggedLog(WatcherKind),
}

/// Result of decoding one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Event(StatusEvent),
    Unparseable(Unparseable),
}

impl ParsedLine {
    pub fn into_event(self) -> Option<StatusEvent> {
        match self {
            Self::Event(event) => Some(event),
            Self::Unparseable(_) => None,
        }
    }
}

/// Why a line was not turned into an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unparseable {
    /// Empty or whitespace-only line.
    Blank,
    /// Not a structured record at all (free text).
    NotStructured,
    /// Structured, but missing fields or with wrong field types.
    InvalidRecord(String),
}

impl fmt::Display for Unparseable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => f.write_str("blank line"),
            Self::NotStructured => f.write_str("free text"),
            Self::InvalidRecord(reason) => write!(f, "invalid record: {reason}"),
        }
    }
}

/// Decode one line of watcher stdout.
pub fn parse_line(protocol: LineProtocol, line: &str) -> ParsedLine {
    let line = line.trim_end();
    if line.trim_start().is_empty() {
        return ParsedLine::Unparseable(Unparseable::Blank);
    }

    match protocol {
        LineProtocol::PrinterStatus => printer::parse(line),
        LineProtocol::TaggedLog(kind) => tagged::parse(kind, line),
    }
}
