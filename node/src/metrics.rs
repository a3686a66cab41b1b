//! # Prometheus Metrics
//!
//! Operational metrics for the ballot-intake service, scraped at the
//! `/metrics` endpoint on the configured metrics port.
//!
//! All metrics live in a dedicated [`prometheus::Registry`] so they do
//! not collide with any default global registry consumers.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use std::sync::Arc;

/// Holds all Prometheus metric handles for the node.
#[derive(Clone)]
pub struct NodeMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Total ballots accepted into the ledger.
    pub votes_submitted_total: IntCounter,
    /// Total ballots rejected for a duplicate voter identity.
    pub votes_rejected_total: IntCounter,
    /// Total blocks sealed since startup.
    pub blocks_sealed_total: IntCounter,
    /// Current chain height (sealed blocks, genesis included).
    pub chain_height: IntGauge,
    /// Entries currently waiting in the pending buffer.
    pub pending_entries: IntGauge,
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Self {
        let registry = Registry::new_custom(Some("vera".into()), None)
            .expect("failed to create prometheus registry");

        let votes_submitted_total = IntCounter::new(
            "votes_submitted_total",
            "Total ballots accepted into the ledger",
        )
        .expect("metric creation");
        registry
            .register(Box::new(votes_submitted_total.clone()))
            .expect("metric registration");

        let votes_rejected_total = IntCounter::new(
            "votes_rejected_total",
            "Total ballots rejected for duplicate voter identity",
        )
        .expect("metric creation");
        registry
            .register(Box::new(votes_rejected_total.clone()))
            .expect("metric registration");

        let blocks_sealed_total =
            IntCounter::new("blocks_sealed_total", "Total blocks sealed since startup")
                .expect("metric creation");
        registry
            .register(Box::new(blocks_sealed_total.clone()))
            .expect("metric registration");

        let chain_height = IntGauge::new(
            "chain_height",
            "Number of sealed blocks in the chain, genesis included",
        )
        .expect("metric creation");
        registry
            .register(Box::new(chain_height.clone()))
            .expect("metric registration");

        let pending_entries = IntGauge::new(
            "pending_entries",
            "Entries waiting in the pending buffer",
        )
        .expect("metric creation");
        registry
            .register(Box::new(pending_entries.clone()))
            .expect("metric registration");

        Self {
            registry,
            votes_submitted_total,
            votes_rejected_total,
            blocks_sealed_total,
            chain_height,
            pending_entries,
        }
    }

    /// Encodes all registered metrics in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Handler for `GET /metrics`.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<Arc<NodeMetrics>>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            tracing::error!("metrics encoding failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, String::new())
        }
    }
}
