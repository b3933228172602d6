//! Text event-log reader.
//!
//! A collaborator outside the scheduling core: it turns the
//! whitespace-separated 6-column log format into [`EventRecord`]s.
//! Each line is `time action pid runtime weight duration` with
//! `action` one of `START`, `SLEEP`, `WAKEUP`, `EXIT`. `runtime` is the
//! total work of a `START`; `weight` and `duration` are carried for
//! compatibility and not consumed.
//!
//! Error policy per the simulator's taxonomy: a line that cannot be
//! decoded (or a short read) marks the stream exhausted from that point;
//! already-admitted tasks keep being serviced. A well-formed line
//! with an unknown action is reported and skipped. Only failing to open
//! the file at all is an error.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use sscanf::sscanf;
use tracing::warn;

use crate::error::SimError;
use crate::event::{EventKind, EventRecord, EventSource};
use crate::types::Pid;

/// Pull-parser over a buffered reader of event-log lines.
pub struct LogReader<R: BufRead> {
    reader: R,
    exhausted: bool,
}

impl LogReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let file = File::open(path.as_ref())?;
        Ok(LogReader::new(BufReader::new(file)))
    }
}

impl<R: BufRead> LogReader<R> {
    pub fn new(reader: R) -> Self {
        LogReader {
            reader,
            exhausted: false,
        }
    }

    /// Decode one line. `Ok(None)` = skip (blank or unknown action),
    /// `Err(())` = malformed, ends the stream.
    fn decode(line: &str) -> Result<Option<EventRecord>, ()> {
        let normalized = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            return Ok(None);
        }

        let (time, action, pid, runtime, weight, _duration) =
            sscanf!(normalized.as_str(), "{u64} {String} {i64} {i64} {i64} {i64}")
                .map_err(|_| ())?;

        let kind = match action.as_str() {
            "START" => EventKind::Start { duration: runtime },
            "SLEEP" => EventKind::Sleep,
            "WAKEUP" => EventKind::Wakeup,
            "EXIT" => EventKind::Exit,
            other => {
                warn!(time, pid, action = other, "unknown action; record skipped");
                return Ok(None);
            }
        };

        Ok(Some(EventRecord {
            time,
            pid: Pid(pid),
            kind,
            weight,
        }))
    }
}

impl<R: BufRead> EventSource for LogReader<R> {
    fn next_event(&mut self) -> Option<EventRecord> {
        while !self.exhausted {
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => {
                    self.exhausted = true;
                }
                Ok(_) => match Self::decode(&line) {
                    Ok(Some(record)) => return Some(record),
                    Ok(None) => continue,
                    Err(()) => {
                        warn!(line = line.trim(), "malformed record; event stream ends here");
                        self.exhausted = true;
                    }
                },
                Err(err) => {
                    warn!(%err, "read error; event stream ends here");
                    self.exhausted = true;
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn drain(input: &str) -> Vec<EventRecord> {
        let mut reader = LogReader::new(Cursor::new(input.to_string()));
        let mut out = Vec::new();
        while let Some(record) = reader.next_event() {
            out.push(record);
        }
        out
    }

    #[test]
    fn test_well_formed_log() {
        let records = drain(
            "0 START 1 10 0 0\n\
             0 START 2 10 0 0\n\
             5 SLEEP 1 0 0 0\n\
             9 WAKEUP 1 0 0 0\n\
             12 EXIT 2 0 0 0\n",
        );
        assert_eq!(records.len(), 5);
        assert_eq!(records[0], EventRecord::start(0, Pid(1), 10));
        assert_eq!(records[2].kind, EventKind::Sleep);
        assert_eq!(records[3].kind, EventKind::Wakeup);
        assert_eq!(records[4], EventRecord::exit(12, Pid(2)));
    }

    #[test]
    fn test_weight_is_carried_not_invented() {
        let records = drain("0 START 1 10 7 3\n");
        assert_eq!(records[0].weight, 7);
        assert_eq!(records[0].kind, EventKind::Start { duration: 10 });
    }

    #[test]
    fn test_blank_lines_and_ragged_whitespace() {
        let records = drain("\n  0   START  1\t10 0 0  \n\n3 EXIT 1 0 0 0\n");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_malformed_line_truncates_stream() {
        let records = drain(
            "0 START 1 10 0 0\n\
             not a record\n\
             3 EXIT 1 0 0 0\n",
        );
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_short_record_truncates_stream() {
        let records = drain("0 START 1 10 0 0\n5 SLEEP 1\n");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_unknown_action_is_skipped_not_fatal() {
        let records = drain(
            "0 START 1 10 0 0\n\
             2 NAPTIME 1 0 0 0\n\
             3 EXIT 1 0 0 0\n",
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].kind, EventKind::Exit);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(LogReader::open("/nonexistent/fairsim-events.txt").is_err());
    }
}
