//! fairsim - Deterministic event-driven simulator for a CFS-style fair
//! scheduler.
//!
//! An ordered log of lifecycle events (start, sleep, wakeup, exit)
//! drives a single simulated core. Runnable tasks sit in an AVL run
//! queue ordered by accumulated virtual runtime (pid breaking ties); an
//! open-addressing hash index resolves pids to run-queue nodes in O(1)
//! and a second index holds sleeping tasks. Dispatch repeatedly grants
//! the most entitled task a slice of `max(min_granularity,
//! sched_latency / runnable_count)` simulated milliseconds, clamped so
//! it never overruns a pending event. Nothing executes: the work is
//! virtual bookkeeping and the clock is a logical counter.
//!
//! # Architecture
//!
//! - **Engine**: event application + dispatch loop owning all state
//! - **RunQueue**: arena-backed AVL tree keyed by `(vruntime, pid)`
//! - **HashIndex**: double-hashing open addressing with tombstones
//! - **Events**: `EventSource` stream (in-memory script or text log)
//! - **Trace**: per-transition record of the whole run
//!
//! # Usage
//!
//! ```rust
//! use fairsim::*;
//!
//! let events = ScriptSource::new([
//!     EventRecord::start(0, Pid(1), 10),
//!     EventRecord::start(0, Pid(2), 10),
//! ]);
//!
//! let sim = Simulator::new(SchedParams::default()).unwrap();
//! let result = sim.run(events);
//! result.trace.dump();
//! ```

pub mod engine;
pub mod error;
pub mod event;
pub mod fmt;
pub mod index;
pub mod input;
pub mod runqueue;
pub mod task;
pub mod trace;
pub mod types;

// Re-export the main public types for convenience.
pub use engine::{sim_clock, SchedParams, SimulationResult, Simulator};
pub use error::SimError;
pub use event::{EventKind, EventRecord, EventSource, ScriptSource};
pub use fmt::{FmtN, SimFormat};
pub use index::{HashIndex, ModHash, ProbeHash};
pub use input::LogReader;
pub use runqueue::{NodeId, Removal, RunQueue};
pub use task::{Task, TaskState};
pub use trace::{Trace, TraceEvent, TraceKind};
pub use types::{Pid, TimeMs, Vruntime};
