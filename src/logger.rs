pub use tracing::{debug, error, info, instrument, trace, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
};

/// Install the global subscriber, filtering from `RUST_LOG` (default `info`).
pub fn init() {
    init_with_default("info");
}

/// Like [`init`] but with a caller-chosen fallback filter. Span close events,
/// which carry correction timings, are only emitted when debug output is on.
pub fn init_with_default(default_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let span_events = if env_filter.to_string().contains("debug") || env_filter.to_string().contains("trace") {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_timer(fmt::time::uptime())
        .with_span_events(span_events);

    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}
