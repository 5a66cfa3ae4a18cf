//! Tagged progress lines (`[WATCHER_SUCCESS] ...`).

use super::{ParsedLine, Unparseable};
use crate::domain::WatcherKind;
use crate::events::{StatusEvent, WatcherLogLevel};

const TAGS: [(&str, WatcherLogLevel); 2] = [
    ("[WATCHER_SUCCESS]", WatcherLogLevel::Success),
    ("[WATCHER_ERROR]", WatcherLogLevel::Error),
];

pub(super) fn parse(watcher: WatcherKind, line: &str) -> ParsedLine {
    let line = line.trim_start();

    for (tag, level) in TAGS {
        if let Some(rest) = line.strip_prefix(tag) {
            return ParsedLine::Event(StatusEvent::WatcherLog {
                watcher,
                level,
                message: rest.trim().to_string(),
            });
        }
    }

    ParsedLine::Unparseable(Unparseable::NotStructured)
}
