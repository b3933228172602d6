//! Newtype wrappers and type aliases for domain concepts.
//!
//! Newtypes for identifiers (PIDs) and virtual runtime prevent silent
//! type confusion between the three integer quantities the scheduler
//! juggles (pids, virtual time, simulated wall time). Type aliases for
//! plain quantities provide self-documenting code without the
//! boilerplate of implementing arithmetic traits.

/// Process identifier. Externally supplied, unique while the task is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pid(pub i64);

impl Pid {
    /// Key form for the hash indexes (pids are non-negative in event logs).
    pub fn as_key(self) -> u64 {
        self.0 as u64
    }
}

/// Simulated time in milliseconds. Advanced only by dispatch slices and
/// idle fast-forward jumps, never rewound.
pub type TimeMs = u64;

/// Accumulated virtual runtime for fair scheduling.
///
/// The primary fairness ordering key: smaller means more entitled to run
/// next. Starts at the run-queue minimum (or 0) and only ever grows by
/// granted slices, so plain integer ordering is correct and no wrapping
/// comparison is needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Vruntime(pub u64);

impl Vruntime {
    pub fn advance(&mut self, slice: TimeMs) {
        self.0 += slice;
    }
}

/// The composite run-queue ordering key. `pid` breaks ties because
/// virtual runtime alone is not unique.
pub type RqKey = (Vruntime, Pid);
