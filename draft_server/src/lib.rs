//! HTTP server for pick/ban draft sessions.
//!
//! Exposes the draft manager over a versioned REST API, with structured
//! logging, request correlation and optional Prometheus metrics.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
