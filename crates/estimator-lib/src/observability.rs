//! Structured logging for estimator events
//!
//! Every significant pipeline step is emitted as a tracing event with an
//! `event` field, so that JSON output can be filtered by event name.

use crate::artifact::ModelMetadata;
use crate::data::LoadStats;
use crate::training::TrainingReport;
use std::path::Path;
use tracing::{debug, info, warn};

/// Structured logger for estimator events
///
/// Carries the name of the component emitting the events so that logs of
/// several processes sharing one sink can be told apart.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    component: String,
}

impl Default for StructuredLogger {
    fn default() -> Self {
        Self::new("estimator")
    }
}

impl StructuredLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    /// Log a listings snapshot read from disk
    pub fn log_corpus_loaded(&self, path: &Path, stats: &LoadStats) {
        info!(
            event = "corpus_loaded",
            component = %self.component,
            path = %path.display(),
            rows = stats.rows,
            unknown_fuel_rows = stats.unknown_fuel_rows,
            invalid_gearbox_rows = stats.invalid_gearbox_rows,
            "Loaded listings snapshot"
        );
    }

    /// Log listings excluded from training for missing values
    pub fn log_rows_dropped(&self, dropped: usize, kept: usize) {
        debug!(
            event = "rows_dropped",
            component = %self.component,
            dropped = dropped,
            kept = kept,
            "Dropped listings with missing values"
        );
    }

    /// Log a completed training run
    pub fn log_training_complete(&self, report: &TrainingReport) {
        info!(
            event = "model_trained",
            component = %self.component,
            rows_total = report.rows_total,
            rows_complete = report.rows_complete,
            rows_train = report.rows_train,
            rows_test = report.rows_test,
            features = report.n_features,
            held_out_r2 = ?report.held_out_r2,
            held_out_mae_cents = ?report.held_out_mae_cents,
            seed = report.seed,
            duration_ms = report.duration_ms as u64,
            "Trained price model"
        );
    }

    /// Log a model loaded from disk
    pub fn log_model_loaded(&self, path: &Path, metadata: &ModelMetadata) {
        info!(
            event = "model_loaded",
            component = %self.component,
            path = %path.display(),
            trained_at = %metadata.trained_at,
            rows_train = metadata.rows_train,
            held_out_r2 = ?metadata.held_out_r2,
            "Loaded persisted price model"
        );
    }

    /// Log the fallback from a missing artifact to training
    pub fn log_training_fallback(&self, path: &Path) {
        warn!(
            event = "model_missing",
            component = %self.component,
            path = %path.display(),
            "No persisted model found, training from the listings snapshot"
        );
    }

    pub fn log_model_persisted(&self, path: &Path) {
        info!(
            event = "model_persisted",
            component = %self.component,
            path = %path.display(),
            "Persisted price model"
        );
    }

    /// Log a served estimate
    pub fn log_estimate(&self, brand: &str, model: &str, price_cents: f64, degraded: bool) {
        info!(
            event = "estimate_served",
            component = %self.component,
            brand = %brand,
            model = %model,
            price_cents = price_cents,
            degraded = degraded,
            "Served price estimate"
        );
    }

    /// Log a category the model has never seen
    pub fn log_unseen_category(&self, column: &str, value: &str, rejected: bool) {
        if rejected {
            warn!(
                event = "unseen_category",
                component = %self.component,
                column = %column,
                value = %value,
                action = "reject",
                "Rejected estimate for unseen category"
            );
        } else {
            warn!(
                event = "unseen_category",
                component = %self.component,
                column = %column,
                value = %value,
                action = "degrade",
                "Unseen category encoded as reference, estimate is degraded"
            );
        }
    }

    /// Log columns added or dropped while aligning a row with the schema
    pub fn log_reconciled(&self, added: usize, dropped: &[String]) {
        if !dropped.is_empty() {
            warn!(
                event = "columns_dropped",
                component = %self.component,
                added = added,
                dropped = ?dropped,
                "Dropped columns absent from the training schema"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("cli");
        assert_eq!(logger.component(), "cli");
        assert_eq!(StructuredLogger::default().component(), "estimator");
    }
}
