//! Printer watcher records.

use serde::Deserialize;

use super::{ParsedLine, Unparseable};
use crate::events::StatusEvent;

#[derive(Debug, Deserialize)]
struct PrinterRecord {
    #[serde(default)]
    printer_name: Option<String>,
    setup_required: bool,
}

pub(super) fn parse(line: &str) -> ParsedLine {
    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(_) => return ParsedLine::Unparseable(Unparseable::NotStructured),
    };

    if !value.is_object() {
        return ParsedLine::Unparseable(Unparseable::NotStructured);
    }

    match serde_json::from_value::<PrinterRecord>(value) {
        Ok(record) => ParsedLine::Event(StatusEvent::printer_status(
            record.printer_name.unwrap_or_default(),
            record.setup_required,
        )),
        Err(e) => ParsedLine::Unparseable(Unparseable::InvalidRecord(e.to_string())),
    }
}
