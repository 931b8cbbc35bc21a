//! Prometheus metrics for monitoring draft server health and activity.
//!
//! Metrics are exposed in Prometheus text format on a separate listener when
//! `METRICS_BIND` is set. Without an installed exporter every recording
//! function is a no-op.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts and duration by route and status
//! - **Draft Metrics**: Sessions created, actions committed and rejected

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use draft_engine::{
    ActionKind, DraftError, DraftFormat,
    session::{DraftBroadcaster, DraftEvent},
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::{net::SocketAddr, time::Instant};

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
///
/// # Arguments
///
/// - `addr`: Address to bind the metrics server to (e.g., `0.0.0.0:9090`)
///
/// # Returns
///
/// Result indicating success or error message
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

/// Middleware recording request count and latency per matched route.
///
/// Must be installed with `route_layer` so the route template, not the
/// concrete URI, is used as the path label.
pub async fn track_http(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    http_requests_total(&method, &path, response.status().as_u16());
    http_request_duration_ms(&method, &path, started.elapsed().as_secs_f64() * 1_000.0);

    response
}

// ============================================================================
// Draft Metrics
// ============================================================================

/// Increment sessions created counter.
pub fn sessions_created_total(format: DraftFormat) {
    metrics::counter!("draft_sessions_created_total",
        "format" => format.to_string()
    )
    .increment(1);
}

/// Set current session count.
pub fn active_sessions(count: usize) {
    metrics::gauge!("draft_sessions_active").set(count as f64);
}

/// Increment committed actions counter.
pub fn actions_committed_total(kind: ActionKind) {
    metrics::counter!("draft_actions_committed_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Increment rejected actions counter.
///
/// Labelled by error code and by whether a draft rule or the infrastructure
/// rejected the action.
pub fn actions_rejected_total(error: &DraftError) {
    metrics::counter!("draft_actions_rejected_total",
        "code" => error.code(),
        "class" => rejection_class(error)
    )
    .increment(1);
}

/// `validation` for draft rule rejections, `infrastructure` otherwise.
pub fn rejection_class(error: &DraftError) -> &'static str {
    if error.is_validation() {
        "validation"
    } else {
        "infrastructure"
    }
}

/// Increment completed drafts counter.
pub fn drafts_completed_total() {
    metrics::counter!("draft_sessions_completed_total").increment(1);
}

/// Record suggestion latency, ranking included, in milliseconds.
pub fn suggestion_duration_ms(duration_ms: f64) {
    metrics::histogram!("draft_suggestion_duration_ms").record(duration_ms);
}

/// Broadcaster counting committed actions and completed drafts.
#[derive(Debug, Default)]
pub struct MetricsBroadcaster;

impl DraftBroadcaster for MetricsBroadcaster {
    fn action_committed(&self, event: &DraftEvent) {
        actions_committed_total(event.action.kind);
        if event.session.is_completed() {
            drafts_completed_total();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draft_engine::{ChampionRef, Team};
    use uuid::Uuid;

    #[test]
    fn test_rejection_class() {
        let rule = DraftError::BanBudgetExceeded {
            team: Team::Blue,
            budget: 5,
        };
        assert_eq!(rejection_class(&rule), "validation");
        assert_eq!(
            rejection_class(&DraftError::ChampionUnavailable(ChampionRef(4))),
            "validation"
        );

        let busy = DraftError::SessionBusy {
            session_id: Uuid::new_v4(),
            waited_ms: 2_000,
        };
        assert_eq!(rejection_class(&busy), "infrastructure");
        assert_eq!(
            rejection_class(&DraftError::SessionNotFound(Uuid::new_v4())),
            "infrastructure"
        );
    }

    #[test]
    fn test_recording_without_exporter_is_noop() {
        actions_rejected_total(&DraftError::DraftCompleted);
        actions_rejected_total(&DraftError::UnknownChampion(ChampionRef(999)));
    }
}
