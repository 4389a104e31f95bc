//! Logging setup.
//!
//! Logs go to stderr so stdout stays free for whatever the caller pipes
//! around. Set `DEBUG_LOGGING=1` for debug output from poptart crates, or
//! `RUST_LOG` for full control.

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEBUG_DIRECTIVE: &str = "info,poptart=debug,poptart_overlay=debug";
const DEFAULT_DIRECTIVE: &str = "warn";

/// Filter directive for the given environment
pub fn filter_directive(debug_logging: bool) -> &'static str {
    if debug_logging {
        DEBUG_DIRECTIVE
    } else {
        DEFAULT_DIRECTIVE
    }
}

pub fn init() {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(debug_logging)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter)
        .init();

    tracing::debug!(debug_logging, "logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_directive_targets_our_crates() {
        assert!(filter_directive(true).contains("poptart_overlay=debug"));
        assert_eq!(filter_directive(false), "warn");
    }
}
