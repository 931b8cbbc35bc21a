//! Structured logging configuration.
//!
//! The draft engine logs through the `log` facade; those records are bridged
//! into the tracing subscriber installed here.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Slow-operation threshold for [`log_performance`]
const SLOW_OPERATION_MS: u64 = 500;

/// Initialize structured logging
///
/// Log levels are read from the RUST_LOG env var, defaulting to `info`.
///
/// # Example
///
/// ```no_run
/// use draft_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,tower_http=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log performance metric
///
/// # Arguments
///
/// * `operation` - Operation name
/// * `duration_ms` - Duration in milliseconds
/// * `session_id` - Draft session the operation ran against
pub fn log_performance(operation: &str, duration_ms: u64, session_id: &str) {
    if duration_ms > SLOW_OPERATION_MS {
        tracing::warn!(
            operation = operation,
            duration_ms = duration_ms,
            session_id = session_id,
            "PERFORMANCE: Slow operation"
        );
    } else {
        tracing::debug!(
            operation = operation,
            duration_ms = duration_ms,
            session_id = session_id,
            "Performance metric"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_performance() {
        log_performance("suggestions", 20, "session");
        log_performance("suggestions", 2_000, "session");
    }
}
