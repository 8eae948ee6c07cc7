pub mod err;
#[cfg(feature = "tracing")]
pub mod trace;

/// Initialises the `log` backend from the environment (`RUST_LOG`).
///
/// With the `tracing` feature enabled the tracing subscriber is installed
/// instead, which also captures `log` records.
pub fn initialize_logger() {
    #[cfg(feature = "tracing")]
    trace::initialize_tracer();

    #[cfg(not(feature = "tracing"))]
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .try_init();
}
