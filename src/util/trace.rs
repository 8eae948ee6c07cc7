//! Creates the tracing subscriber used when the `tracing`
//! feature is enabled, filtering by the standard `RUST_LOG`
//! environment variable.
//!
//! ```bash
//! RUST_LOG=trace_matcher=debug trace-matcher network.json trace.json
//! ```

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialises the tracer, using tracing subscription.
/// This is optional, not calling this function will simply
/// not log traces.
///
/// Log records emitted through the `log` facade are bridged
/// into the subscriber by `tracing-subscriber`'s `tracing-log` feature.
pub fn initialize_tracer() {
    let fmt_layer = tracing_subscriber::fmt::layer();

    // Initialise tracing with subscribers and environment filter
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(fmt_layer)
        .try_init();
}
