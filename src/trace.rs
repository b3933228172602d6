//! Trace recording for the simulator.
//!
//! Every state transition (task started, dispatched, slept, woke,
//! exited, processor idle) is recorded as a [`TraceEvent`] with the
//! simulated timestamp at which it took effect.

use crate::fmt::fmt_grouped;
use crate::types::{Pid, TimeMs, Vruntime};

/// A single trace event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEvent {
    /// Simulated time at which this transition occurred.
    pub time: TimeMs,
    pub kind: TraceKind,
}

/// The kind of state transition recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceKind {
    /// A task was admitted, seeded at the run queue's current minimum.
    TaskStarted {
        pid: Pid,
        vruntime: Vruntime,
        duration: i64,
    },
    /// A task received one dispatch slice; values are post-charge.
    Dispatched {
        pid: Pid,
        slice: TimeMs,
        vruntime: Vruntime,
        remaining: i64,
    },
    /// A task left the run queue for the sleep set, fields preserved.
    TaskSlept {
        pid: Pid,
        vruntime: Vruntime,
        remaining: i64,
    },
    /// A task rejoined the run queue, fields unchanged by the nap.
    TaskWoke {
        pid: Pid,
        vruntime: Vruntime,
        remaining: i64,
    },
    /// A task was destroyed (explicit EXIT or work exhausted).
    TaskExited { pid: Pid },
    /// No runnable tasks; the clock fast-forwarded to the next event.
    CpuIdle { until: TimeMs },
}

/// A complete simulation trace, in chronological order.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    events: Vec<TraceEvent>,
}

impl Trace {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, time: TimeMs, kind: TraceKind) {
        self.events.push(TraceEvent { time, kind });
    }

    /// All events in chronological order.
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Total service (sum of granted slices) for a pid.
    pub fn total_service(&self, pid: Pid) -> TimeMs {
        self.events
            .iter()
            .filter_map(|e| match e.kind {
                TraceKind::Dispatched { pid: p, slice, .. } if p == pid => Some(slice),
                _ => None,
            })
            .sum()
    }

    /// Number of dispatch slices granted to a pid.
    pub fn dispatch_count(&self, pid: Pid) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Dispatched { pid: p, .. } if p == pid))
            .count()
    }

    /// The last vruntime recorded for a pid, if any transition carried one.
    pub fn last_vruntime(&self, pid: Pid) -> Option<Vruntime> {
        self.events.iter().rev().find_map(|e| match e.kind {
            TraceKind::TaskStarted { pid: p, vruntime, .. }
            | TraceKind::Dispatched { pid: p, vruntime, .. }
            | TraceKind::TaskSlept { pid: p, vruntime, .. }
            | TraceKind::TaskWoke { pid: p, vruntime, .. }
                if p == pid =>
            {
                Some(vruntime)
            }
            _ => None,
        })
    }

    /// Pretty-print the trace for debugging.
    pub fn dump(&self) {
        for event in &self.events {
            let desc = match event.kind {
                TraceKind::TaskStarted {
                    pid,
                    vruntime,
                    duration,
                } => format!(
                    "START    pid={} vruntime={} duration={duration}",
                    pid.0, vruntime.0
                ),
                TraceKind::Dispatched {
                    pid,
                    slice,
                    vruntime,
                    remaining,
                } => format!(
                    "DISPATCH pid={} slice={slice} vruntime={} remaining={remaining}",
                    pid.0, vruntime.0
                ),
                TraceKind::TaskSlept {
                    pid,
                    vruntime,
                    remaining,
                } => format!(
                    "SLEEP    pid={} vruntime={} remaining={remaining}",
                    pid.0, vruntime.0
                ),
                TraceKind::TaskWoke {
                    pid,
                    vruntime,
                    remaining,
                } => format!(
                    "WAKEUP   pid={} vruntime={} remaining={remaining}",
                    pid.0, vruntime.0
                ),
                TraceKind::TaskExited { pid } => format!("EXIT     pid={}", pid.0),
                TraceKind::CpuIdle { until } => {
                    format!("IDLE     until={}", fmt_grouped(until))
                }
            };
            eprintln!("[{:>12} ms] {}", fmt_grouped(event.time), desc);
        }
    }
}
