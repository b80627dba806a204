//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the ledger.
//!
//! # Metrics
//!
//! - `credit_ledger_credits_minted_total` - Credits issued on verification or direct mint
//! - `credit_ledger_credits_transferred_total` - Credits moved between organizations
//! - `credit_ledger_credits_retired_total` - Credits retired
//! - `credit_ledger_purchases_total` - Completed purchases
//! - `credit_ledger_purchase_value` - Histogram of purchase total values
//! - `credit_ledger_project_transitions_total` - Verification transitions by target status
//! - `credit_ledger_rejected_operations_total` - Failed operations by error kind

use crate::error::ErrorKind;
use crate::types::ProjectStatus;
use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, Encoder, Histogram, HistogramOpts, IntCounter,
    IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Credits minted
    pub credits_minted: IntCounter,

    /// Credits transferred
    pub credits_transferred: IntCounter,

    /// Credits retired
    pub credits_retired: IntCounter,

    /// Completed purchases
    pub purchases_total: IntCounter,

    /// Purchase value histogram
    pub purchase_value: Histogram,

    /// Project transitions by target status
    pub project_transitions: IntCounterVec,

    /// Rejected operations by error kind
    pub rejected_operations: IntCounterVec,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let credits_minted = register_int_counter_with_registry!(
            Opts::new("credit_ledger_credits_minted_total", "Total credits minted"),
            registry
        )?;

        let credits_transferred = register_int_counter_with_registry!(
            Opts::new(
                "credit_ledger_credits_transferred_total",
                "Total credits transferred between organizations"
            ),
            registry
        )?;

        let credits_retired = register_int_counter_with_registry!(
            Opts::new("credit_ledger_credits_retired_total", "Total credits retired"),
            registry
        )?;

        let purchases_total = register_int_counter_with_registry!(
            Opts::new("credit_ledger_purchases_total", "Total completed purchases"),
            registry
        )?;

        let purchase_value = register_histogram_with_registry!(
            HistogramOpts::new("credit_ledger_purchase_value", "Histogram of purchase total values")
                .buckets(vec![100.0, 1_000.0, 5_000.0, 10_000.0, 50_000.0, 100_000.0, 500_000.0]),
            registry
        )?;

        let project_transitions = register_int_counter_vec_with_registry!(
            Opts::new(
                "credit_ledger_project_transitions_total",
                "Verification transitions by target status"
            ),
            &["status"],
            registry
        )?;

        let rejected_operations = register_int_counter_vec_with_registry!(
            Opts::new(
                "credit_ledger_rejected_operations_total",
                "Failed operations by error kind"
            ),
            &["kind"],
            registry
        )?;

        Ok(Self {
            credits_minted,
            credits_transferred,
            credits_retired,
            purchases_total,
            purchase_value,
            project_transitions,
            rejected_operations,
            registry: Arc::new(registry),
        })
    }

    /// Record a completed purchase
    pub fn record_purchase(&self, total_value: f64) {
        self.purchases_total.inc();
        self.purchase_value.observe(total_value);
    }

    /// Record a project entering a status
    pub fn record_transition(&self, status: ProjectStatus) {
        let label = match status {
            ProjectStatus::Draft => "draft",
            ProjectStatus::PendingVerification => "pending_verification",
            ProjectStatus::Verified => "verified",
            ProjectStatus::Rejected => "rejected",
        };
        self.project_transitions.with_label_values(&[label]).inc();
    }

    /// Record a failed operation
    pub fn record_rejection(&self, kind: ErrorKind) {
        self.rejected_operations
            .with_label_values(&[kind.as_str()])
            .inc();
    }

    /// Render all metrics in the Prometheus text format
    pub fn export(&self) -> crate::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| crate::Error::Metrics(format!("Failed to encode metrics: {}", e)))?;
        String::from_utf8(buffer)
            .map_err(|e| crate::Error::Metrics(format!("Metrics are not UTF-8: {}", e)))
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("credits_minted", &self.credits_minted.get())
            .field("purchases_total", &self.purchases_total.get())
            .finish_non_exhaustive()
    }
}
