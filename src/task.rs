//! Task model for the simulator.
//!
//! A task is pure virtual bookkeeping: nothing is executed. The record
//! is `Copy` so it can move freely between the run queue arena and the
//! sleep set without ownership gymnastics.

use crate::types::{Pid, RqKey, TimeMs, Vruntime};

/// The state a simulated task can be in.
///
/// State is represented structurally at runtime (a Runnable task lives
/// in the run queue, a Sleeping task in the sleep set), but the enum is
/// carried on trace events so consumers don't have to infer it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Competing for the processor.
    Runnable,
    /// Parked; not competing until a wakeup event.
    Sleeping,
}

/// A simulated task.
///
/// `remaining` is signed: the final dispatch slice may exceed the task's
/// remaining work, driving it below zero before the task exits (the
/// slice is never clamped; the clock and `vruntime` advance by the full
/// grant).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    pub pid: Pid,
    /// Accumulated service time; the fairness ordering key.
    pub vruntime: Vruntime,
    /// Work units left. The task is terminal once this reaches <= 0.
    pub remaining: i64,
}

impl Task {
    pub fn new(pid: Pid, vruntime: Vruntime, duration: i64) -> Self {
        Task {
            pid,
            vruntime,
            remaining: duration,
        }
    }

    /// The run-queue ordering key for this task.
    pub fn key(&self) -> RqKey {
        (self.vruntime, self.pid)
    }

    /// Account one granted slice: vruntime up, remaining down.
    pub fn charge(&mut self, slice: TimeMs) {
        self.vruntime.advance(slice);
        self.remaining -= slice as i64;
    }

    /// Whether the task has work left after its last slice.
    pub fn is_alive(&self) -> bool {
        self.remaining > 0
    }
}
