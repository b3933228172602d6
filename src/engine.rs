//! The scheduler loop: event application and virtual-time dispatch.
//!
//! All mutable state (run queue, task index, sleep set, the simulated
//! clock and the runnable counter) lives in one [`Simulator`] value, so
//! any number of independent simulations can run in a process and tests
//! get deterministic, isolated instances.
//!
//! Execution is single-threaded and fully synchronous. Two ordering
//! disciplines hold: all events due at a given clock value are applied
//! before the next dispatch slice is computed, and the clock only moves
//! forward, by dispatch slices or idle fast-forward jumps.

use std::cell::Cell;

use tracing::{debug, info, warn};

use crate::error::SimError;
use crate::event::{EventKind, EventRecord, EventSource};
use crate::fmt::FmtN;
use crate::index::HashIndex;
use crate::runqueue::{NodeId, Removal, RunQueue};
use crate::task::{Task, TaskState};
use crate::trace::{Trace, TraceKind};
use crate::types::{Pid, TimeMs, Vruntime};

/// Initial table sizing for the pid-keyed indexes.
const INITIAL_INDEX_SLOTS: usize = 11;

thread_local! {
    static SIM_CLOCK: Cell<TimeMs> = const { Cell::new(0) };
}

/// The simulated clock most recently published by an engine on this
/// thread. Feeds [`crate::fmt::SimFormat`] so log lines carry simulated
/// time instead of wall time.
pub fn sim_clock() -> TimeMs {
    SIM_CLOCK.with(Cell::get)
}

fn set_sim_clock(now: TimeMs) {
    SIM_CLOCK.with(|c| c.set(now));
}

/// Tunables of the dispatch formula, in simulated milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct SchedParams {
    /// Lower bound on slice length, limiting switching overhead.
    pub min_granularity: TimeMs,
    /// Target total time in which every runnable task gets a turn;
    /// divided by the runnable count to size a slice.
    pub sched_latency: TimeMs,
}

impl Default for SchedParams {
    fn default() -> Self {
        SchedParams {
            min_granularity: 4,
            sched_latency: 20,
        }
    }
}

/// Outcome of a completed simulation.
#[derive(Debug)]
pub struct SimulationResult {
    pub trace: Trace,
    /// Clock value when the loop halted.
    pub final_clock: TimeMs,
    /// Tasks still asleep when the stream ran dry, sorted by pid. They
    /// are never revisited; reporting them here keeps the leak
    /// observable without failing the run.
    pub parked: Vec<Pid>,
}

/// A single-core fair-scheduler simulation.
pub struct Simulator {
    params: SchedParams,
    clock: TimeMs,
    /// Tasks currently competing for the processor. Kept explicitly
    /// because it is the denominator of the slice formula; always equal to
    /// the run-queue population.
    nr_running: usize,
    run_queue: RunQueue,
    task_index: HashIndex<NodeId>,
    sleep_set: HashIndex<Task>,
    trace: Trace,
}

impl Simulator {
    /// Build a simulator. Fails only if the pid indexes cannot allocate
    /// their initial tables. Everything depends on them, so that
    /// failure is fatal here rather than deferred.
    pub fn new(params: SchedParams) -> Result<Self, SimError> {
        Ok(Simulator {
            params,
            clock: 0,
            nr_running: 0,
            run_queue: RunQueue::new(),
            task_index: HashIndex::new(INITIAL_INDEX_SLOTS)?,
            sleep_set: HashIndex::new(INITIAL_INDEX_SLOTS)?,
            trace: Trace::new(),
        })
    }

    /// Where a pid currently lives, if it is alive.
    pub fn task_state(&self, pid: Pid) -> Option<TaskState> {
        if self.task_index.lookup(pid.as_key()).is_some() {
            Some(TaskState::Runnable)
        } else if self.sleep_set.lookup(pid.as_key()).is_some() {
            Some(TaskState::Sleeping)
        } else {
            None
        }
    }

    /// Run the simulation to completion: consume `source` and dispatch
    /// until the stream is exhausted and the run queue is empty.
    pub fn run(mut self, mut source: impl EventSource) -> SimulationResult {
        set_sim_clock(self.clock);
        let mut pending = source.next_event();

        loop {
            // Apply every event due at the current clock before sizing
            // the next slice.
            while pending.as_ref().is_some_and(|ev| ev.time <= self.clock) {
                let ev = pending.take().expect("checked above");
                self.apply_event(ev);
                pending = source.next_event();
            }

            if !self.run_queue.is_empty() && self.nr_running > 0 {
                self.dispatch_one(pending.as_ref());
            } else if let Some(ev) = pending.as_ref() {
                // Idle fast-forward: nothing runnable, jump straight to
                // the next event instead of burning empty slices.
                debug!(from = self.clock, until = ev.time, "idle fast-forward");
                self.trace.record(self.clock, TraceKind::CpuIdle { until: ev.time });
                self.clock = ev.time;
                set_sim_clock(self.clock);
            } else {
                break;
            }
        }

        let mut parked: Vec<Pid> = self
            .sleep_set
            .iter()
            .map(|(key, _)| Pid(key as i64))
            .collect();
        parked.sort_unstable();
        if !parked.is_empty() {
            warn!(count = parked.len(), "stream exhausted with tasks still asleep");
        }

        SimulationResult {
            trace: self.trace,
            final_clock: self.clock,
            parked,
        }
    }

    fn apply_event(&mut self, ev: EventRecord) {
        debug_assert!(ev.time <= self.clock);
        match ev.kind {
            EventKind::Start { duration } => self.start_task(ev.pid, duration),
            EventKind::Sleep => self.sleep_task(ev.pid),
            EventKind::Wakeup => self.wake_task(ev.pid),
            EventKind::Exit => self.exit_task(ev.pid),
        }
    }

    /// Insert a task into the run queue and index its node.
    fn enqueue(&mut self, task: Task) {
        let node = self.run_queue.insert(task);
        self.task_index.insert(task.pid.as_key(), node);
    }

    /// Remove a pid from the run queue, reconciling the task index
    /// against whichever physical node the tree excised.
    ///
    /// On a two-child deletion the tree keeps the requested node's slot
    /// alive under the in-order successor's identity: the successor's
    /// index entry must be remapped onto that surviving slot before the
    /// requested pid's entry is retired, or the index silently points at
    /// a freed node.
    fn dequeue(&mut self, pid: Pid) -> Option<Task> {
        let &node = self.task_index.lookup(pid.as_key())?;
        let task = *self.run_queue.task(node);

        match self.run_queue.delete(task.pid, task.vruntime) {
            Removal::NotFound => {
                warn!(pid = pid.0, "run-queue delete miss for an indexed pid");
                None
            }
            Removal::Excised { .. } => {
                self.task_index.delete(pid.as_key());
                Some(task)
            }
            Removal::Relocated {
                excised: _,
                moved_pid,
                into,
            } => {
                self.task_index.insert(moved_pid.as_key(), into);
                self.task_index.delete(pid.as_key());
                Some(task)
            }
        }
    }

    fn start_task(&mut self, pid: Pid, duration: i64) {
        if self.task_state(pid).is_some() {
            warn!(pid = pid.0, "START for a live pid; ignored");
            return;
        }

        // Seed at the current minimum so the newcomer neither starves
        // the incumbents nor cuts ahead of them.
        let vruntime = self
            .run_queue
            .find_min()
            .map_or(Vruntime::default(), |t| t.vruntime);
        self.enqueue(Task::new(pid, vruntime, duration));
        self.nr_running += 1;

        self.trace.record(
            self.clock,
            TraceKind::TaskStarted {
                pid,
                vruntime,
                duration,
            },
        );
        info!(pid = pid.0, vruntime = vruntime.0, duration, "STARTED");
    }

    fn sleep_task(&mut self, pid: Pid) {
        let Some(task) = self.dequeue(pid) else {
            warn!(pid = pid.0, "SLEEP for a pid not on the run queue; ignored");
            return;
        };

        // Fields travel unchanged: sleeping neither advantages nor
        // disadvantages a task's future share.
        self.sleep_set.insert(pid.as_key(), task);
        self.nr_running -= 1;

        self.trace.record(
            self.clock,
            TraceKind::TaskSlept {
                pid,
                vruntime: task.vruntime,
                remaining: task.remaining,
            },
        );
        info!(
            pid = pid.0,
            vruntime = task.vruntime.0,
            remaining = task.remaining,
            "SLEEPING"
        );
    }

    fn wake_task(&mut self, pid: Pid) {
        let Some(task) = self.sleep_set.delete(pid.as_key()) else {
            warn!(pid = pid.0, "WAKEUP for a pid not in the sleep set; ignored");
            return;
        };

        self.enqueue(task);
        self.nr_running += 1;

        self.trace.record(
            self.clock,
            TraceKind::TaskWoke {
                pid,
                vruntime: task.vruntime,
                remaining: task.remaining,
            },
        );
        info!(
            pid = pid.0,
            vruntime = task.vruntime.0,
            remaining = task.remaining,
            "WOKE UP"
        );
    }

    fn exit_task(&mut self, pid: Pid) {
        if self.dequeue(pid).is_some() {
            self.nr_running -= 1;
        } else if self.sleep_set.delete(pid.as_key()).is_none() {
            warn!(pid = pid.0, "EXIT for an unknown pid; ignored");
            return;
        }

        self.trace.record(self.clock, TraceKind::TaskExited { pid });
        info!(pid = pid.0, "EXITED");
    }

    /// Grant one slice to the most entitled task.
    fn dispatch_one(&mut self, next_event: Option<&EventRecord>) {
        debug_assert_eq!(self.nr_running, self.run_queue.len());

        let min = *self
            .run_queue
            .find_min()
            .expect("dispatch requires a non-empty run queue");

        let mut slice = self
            .params
            .min_granularity
            .max(self.params.sched_latency / self.nr_running as u64);
        if let Some(ev) = next_event {
            // Never advance the clock past a still-pending event. The
            // due-event drain guarantees ev.time > clock here.
            debug_assert!(ev.time > self.clock);
            slice = slice.min(ev.time - self.clock);
        }

        let mut task = self
            .dequeue(min.pid)
            .expect("the minimum task is always indexed");

        self.clock += slice;
        set_sim_clock(self.clock);
        // The final slice is not clamped to the remaining work: the
        // clock and vruntime advance by the full grant even when the
        // task finishes early inside it.
        task.charge(slice);

        self.trace.record(
            self.clock,
            TraceKind::Dispatched {
                pid: task.pid,
                slice,
                vruntime: task.vruntime,
                remaining: task.remaining,
            },
        );
        debug!(
            pid = task.pid.0,
            slice = %FmtN(slice),
            vruntime = task.vruntime.0,
            remaining = task.remaining,
            "RAN"
        );

        if task.is_alive() {
            self.enqueue(task);
        } else {
            self.nr_running -= 1;
            self.trace
                .record(self.clock, TraceKind::TaskExited { pid: task.pid });
            info!(pid = task.pid.0, "EXITED");
        }
    }
}
