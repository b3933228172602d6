//! External lifecycle events driving the simulation.
//!
//! The scheduler core consumes an ordered stream of [`EventRecord`]s
//! through the [`EventSource`] trait and never parses anything itself.
//! [`ScriptSource`] feeds records from memory (tests, programmatic use);
//! [`crate::input::LogReader`] reads the text event-log format.

use std::collections::VecDeque;

use crate::types::{Pid, TimeMs};

/// What happens to a task at an event's timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A new task arrives with `duration` units of work.
    Start { duration: i64 },
    /// The task stops competing for the processor.
    Sleep,
    /// The task resumes competing, fields unchanged.
    Wakeup,
    /// The task is destroyed wherever it currently resides.
    Exit,
}

/// One record of the external event stream, ordered by `time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRecord {
    pub time: TimeMs,
    pub pid: Pid,
    pub kind: EventKind,
    /// Relative-share weight. Accepted on every record and carried
    /// through, but not consumed by the fairness math. Reserved.
    pub weight: i64,
}

impl EventRecord {
    pub fn start(time: TimeMs, pid: Pid, duration: i64) -> Self {
        EventRecord {
            time,
            pid,
            kind: EventKind::Start { duration },
            weight: 0,
        }
    }

    pub fn sleep(time: TimeMs, pid: Pid) -> Self {
        EventRecord {
            time,
            pid,
            kind: EventKind::Sleep,
            weight: 0,
        }
    }

    pub fn wakeup(time: TimeMs, pid: Pid) -> Self {
        EventRecord {
            time,
            pid,
            kind: EventKind::Wakeup,
            weight: 0,
        }
    }

    pub fn exit(time: TimeMs, pid: Pid) -> Self {
        EventRecord {
            time,
            pid,
            kind: EventKind::Exit,
            weight: 0,
        }
    }
}

/// An ordered, pull-based event stream.
///
/// `None` means exhausted, permanently, including after a malformed
/// record. The scheduler loop holds a single record of lookahead.
pub trait EventSource {
    fn next_event(&mut self) -> Option<EventRecord>;
}

/// In-memory event source for tests and programmatic scenarios.
#[derive(Debug, Default)]
pub struct ScriptSource {
    records: VecDeque<EventRecord>,
}

impl ScriptSource {
    /// Records must already be ordered by timestamp.
    pub fn new(records: impl IntoIterator<Item = EventRecord>) -> Self {
        ScriptSource {
            records: records.into_iter().collect(),
        }
    }
}

impl EventSource for ScriptSource {
    fn next_event(&mut self) -> Option<EventRecord> {
        self.records.pop_front()
    }
}
