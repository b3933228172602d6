//! fairsim — run a fair-scheduler simulation from an event log.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fairsim::{LogReader, Pid, SchedParams, SimFormat, Simulator, TraceKind};

/// Simulate a CFS-style fair scheduler over a recorded event log.
#[derive(Parser)]
#[command(name = "fairsim")]
struct Cli {
    /// Path to the event log. One record per line:
    /// `time action pid runtime weight duration`,
    /// action one of START, SLEEP, WAKEUP, EXIT.
    log: PathBuf,

    /// Scheduling quantum floor (simulated ms).
    #[arg(long, default_value_t = 4)]
    min_granularity: u64,

    /// Target latency shared across all runnable tasks (simulated ms).
    #[arg(long, default_value_t = 20)]
    sched_latency: u64,

    /// Print every trace event to stderr after the run.
    #[arg(long)]
    dump_trace: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .event_format(SimFormat)
        .init();

    let source = LogReader::open(&cli.log)
        .with_context(|| format!("cannot open event log {}", cli.log.display()))?;

    let sim = Simulator::new(SchedParams {
        min_granularity: cli.min_granularity,
        sched_latency: cli.sched_latency,
    })?;
    let result = sim.run(source);

    if cli.dump_trace {
        result.trace.dump();
    }

    let dispatches = result
        .trace
        .events()
        .iter()
        .filter(|e| matches!(e.kind, TraceKind::Dispatched { .. }))
        .count();
    println!(
        "simulated {} ms: {} trace events, {} dispatches",
        result.final_clock,
        result.trace.events().len(),
        dispatches
    );
    if !result.parked.is_empty() {
        let pids: Vec<i64> = result.parked.iter().map(|Pid(p)| *p).collect();
        println!("left asleep at exit: {pids:?}");
    }

    Ok(())
}
