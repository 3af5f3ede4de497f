//! Estimator service
//!
//! Owns the listings corpus and the trained model for the lifetime of a
//! process. The model is obtained once by [`EstimatorService::initialize`],
//! which moves the service from `Uninitialized` to `Ready`.

use crate::artifact::{ModelArtifact, ModelStore};
use crate::config::{EstimatorConfig, UnseenCategoryPolicy};
use crate::data::ListingTable;
use crate::error::{EstimatorError, InitError, Result};
use crate::features::reconcile;
use crate::models::{EstimateRequest, PriceEstimate};
use crate::observability::StructuredLogger;
use crate::training::{ModelTrainer, TrainingReport};

/// Lifecycle state of the service
#[derive(Debug, Clone)]
pub enum ServiceState {
    Uninitialized,
    Ready(Box<ModelArtifact>),
}

/// How the model became available
#[derive(Debug, Clone)]
pub enum InitOutcome {
    /// Loaded from the persisted artifact
    Loaded,
    /// No artifact existed; trained from the corpus and persisted
    Trained(TrainingReport),
}

pub struct EstimatorService {
    config: EstimatorConfig,
    corpus: ListingTable,
    store: ModelStore,
    state: ServiceState,
    logger: StructuredLogger,
}

impl EstimatorService {
    pub fn new(config: EstimatorConfig, corpus: ListingTable) -> Self {
        let store = ModelStore::new(config.model_path.clone(), config.compression_level);
        Self {
            config,
            corpus,
            store,
            state: ServiceState::Uninitialized,
            logger: StructuredLogger::new("estimator-service"),
        }
    }

    /// Load the persisted model, training a new one only when none exists.
    ///
    /// A corrupt or incompatible artifact is reported as
    /// [`InitError::LoadFailed`] and is not overwritten.
    pub fn initialize(&mut self) -> std::result::Result<InitOutcome, InitError> {
        match self.store.load() {
            Ok(artifact) => {
                self.logger
                    .log_model_loaded(self.store.path(), &artifact.metadata);
                self.state = ServiceState::Ready(Box::new(artifact));
                Ok(InitOutcome::Loaded)
            }
            Err(e) if e.is_artifact_not_found() => {
                self.logger.log_training_fallback(self.store.path());
                let report = self.retrain().map_err(InitError::TrainingFailed)?;
                Ok(InitOutcome::Trained(report))
            }
            Err(e) => Err(InitError::LoadFailed(e)),
        }
    }

    /// Train on the owned corpus and overwrite the persisted artifact
    pub fn retrain(&mut self) -> Result<TrainingReport> {
        let trainer = ModelTrainer::new(self.config.clone()).with_logger(self.logger.clone());
        let (artifact, report) = trainer.train_and_persist(&self.corpus, &self.store)?;
        self.state = ServiceState::Ready(Box::new(artifact));
        Ok(report)
    }

    /// Estimate the price of one car
    pub fn estimate(&self, request: &EstimateRequest) -> Result<PriceEstimate> {
        let artifact = self.model().ok_or(EstimatorError::NotInitialized)?;
        let attributes = request.validate()?;

        let unseen = artifact.schema.unseen_categories(&attributes);
        let reject = self.config.unseen_category == UnseenCategoryPolicy::Reject;
        for (column, value) in &unseen {
            self.logger.log_unseen_category(column.name(), value, reject);
        }
        if reject {
            if let Some((column, value)) = unseen.first() {
                return Err(EstimatorError::UnseenCategory {
                    column: column.name().to_string(),
                    value: value.clone(),
                });
            }
        }

        let row = artifact.schema.encode_row(&attributes);
        let reconciled = reconcile(&row, &artifact.schema);
        self.logger
            .log_reconciled(reconciled.added.len(), &reconciled.dropped);

        let predictions = artifact.predict(&reconciled.frame)?;
        let price_cents = predictions
            .first()
            .copied()
            .ok_or(EstimatorError::ModelNotFitted)?;

        let estimate = PriceEstimate {
            price_cents,
            degraded: !unseen.is_empty(),
            model_trained_at: artifact.metadata.trained_at,
        };
        self.logger.log_estimate(
            &attributes.brand,
            &attributes.model,
            estimate.price_cents,
            estimate.degraded,
        );
        Ok(estimate)
    }

    pub fn state(&self) -> &ServiceState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ServiceState::Ready(_))
    }

    /// The active model, once initialized
    pub fn model(&self) -> Option<&ModelArtifact> {
        match &self.state {
            ServiceState::Ready(artifact) => Some(artifact.as_ref()),
            ServiceState::Uninitialized => None,
        }
    }

    pub fn corpus(&self) -> &ListingTable {
        &self.corpus
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }
}
