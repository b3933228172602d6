use fairsim::SimFormat;

/// Initialize tracing from `RUST_LOG` with the simulated-clock formatter.
///
/// `try_init()` is idempotent: the first call in the process succeeds,
/// subsequent calls are silently ignored. Simulators carry all their
/// own state, so no lock or other cross-test setup is needed.
pub fn setup_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .event_format(SimFormat)
        .try_init();
}
