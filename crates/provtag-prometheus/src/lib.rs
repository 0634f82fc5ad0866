//! Prometheus metrics backend for provtag admission and routing.
//!
//! This crate provides a [`PrometheusMetrics`] implementation of [`provtag_core::MetricsBackend`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use provtag_core::router::ProvisionerRouter;
//! use provtag_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let router = ProvisionerRouter::new().with_metrics(Arc::new(metrics.clone()));
//!
//! // Serve `metrics.gather()` through the application's HTTP stack:
//! // let encoder = prometheus::TextEncoder::new();
//! // encoder.encode(&metrics.gather(), &mut response_buffer)?;
//! # let _ = router;
//! # Ok(())
//! # }
//! ```
//!
//! This crate does NOT serve a `/metrics` endpoint.

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
