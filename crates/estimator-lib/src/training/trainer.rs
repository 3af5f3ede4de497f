use super::forest::RandomForestRegressor;
use super::metrics::{mean_absolute_error, r2_score};
use super::split::train_test_split;
use crate::artifact::{ModelArtifact, ModelMetadata, ModelStore};
use crate::config::EstimatorConfig;
use crate::data::ListingTable;
use crate::error::{EstimatorError, Result};
use crate::features::OneHotEncoder;
use crate::models::CarAttributes;
use crate::observability::StructuredLogger;
use ndarray::{Array1, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

/// Number of most important features kept in the report
const REPORT_TOP_FEATURES: usize = 10;

/// Outcome of a training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub rows_total: usize,
    /// Rows left after dropping listings with missing values
    pub rows_complete: usize,
    pub rows_train: usize,
    pub rows_test: usize,
    pub n_features: usize,
    pub held_out_r2: Option<f64>,
    pub held_out_mae_cents: Option<f64>,
    pub seed: u64,
    pub duration_ms: u128,
    pub top_features: Vec<(String, f64)>,
}

/// Fits the price model on a listings table
pub struct ModelTrainer {
    config: EstimatorConfig,
    encoder: OneHotEncoder,
    logger: StructuredLogger,
}

impl ModelTrainer {
    pub fn new(config: EstimatorConfig) -> Self {
        Self {
            config,
            encoder: OneHotEncoder::default(),
            logger: StructuredLogger::default(),
        }
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Encode, split, fit and score; nothing is written to disk
    pub fn train(&self, table: &ListingTable) -> Result<(ModelArtifact, TrainingReport)> {
        let start = Instant::now();

        let listings = table.complete_rows();
        if listings.is_empty() {
            return Err(EstimatorError::EmptyCorpus);
        }

        let attributes: Vec<CarAttributes> = listings.iter().map(|l| l.attributes.clone()).collect();
        let prices: Vec<f64> = listings.iter().map(|l| l.price_cents as f64).collect();
        let (frame, schema) = self.encoder.encode(&attributes);

        let seed = self.config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let (train_idx, test_idx) = train_test_split(listings.len(), self.config.test_fraction, &mut rng);

        debug!(
            rows_train = train_idx.len(),
            rows_test = test_idx.len(),
            features = schema.len(),
            seed,
            "Fitting random forest"
        );

        let x = frame.values();
        let x_train = x.select(Axis(0), &train_idx);
        let y_train: Array1<f64> = train_idx.iter().map(|&i| prices[i]).collect();

        let mut forest = RandomForestRegressor::new(self.config.forest.clone());
        forest.fit(&x_train, &y_train, rng.gen())?;

        let (held_out_r2, held_out_mae_cents) = if test_idx.is_empty() {
            (None, None)
        } else {
            let x_test = x.select(Axis(0), &test_idx);
            let y_test: Vec<f64> = test_idx.iter().map(|&i| prices[i]).collect();
            let predicted = forest.predict(&x_test)?.to_vec();
            (
                r2_score(&y_test, &predicted),
                mean_absolute_error(&y_test, &predicted),
            )
        };

        let artifact = ModelArtifact {
            metadata: ModelMetadata {
                trained_at: chrono::Utc::now(),
                rows_train: train_idx.len(),
                rows_test: test_idx.len(),
                held_out_r2,
                seed,
                forest: self.config.forest.clone(),
            },
            schema,
            forest,
        };

        let report = TrainingReport {
            rows_total: table.len(),
            rows_complete: listings.len(),
            rows_train: train_idx.len(),
            rows_test: test_idx.len(),
            n_features: artifact.schema.len(),
            held_out_r2,
            held_out_mae_cents,
            seed,
            duration_ms: start.elapsed().as_millis(),
            top_features: artifact
                .ranked_importances()
                .into_iter()
                .take(REPORT_TOP_FEATURES)
                .collect(),
        };

        self.logger.log_training_complete(&report);

        Ok((artifact, report))
    }

    /// Train, then overwrite the persisted artifact
    pub fn train_and_persist(
        &self,
        table: &ListingTable,
        store: &ModelStore,
    ) -> Result<(ModelArtifact, TrainingReport)> {
        let (artifact, report) = self.train(table)?;
        store.save(&artifact)?;
        self.logger.log_model_persisted(store.path());
        Ok((artifact, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForestConfig;
    use crate::models::{FuelType, Gearbox, RawListing};

    fn listing(brand: &str, model: &str, mileage: f64, price_cents: i64) -> RawListing {
        RawListing {
            brand: Some(brand.to_string()),
            model: Some(model.to_string()),
            year: Some(2018),
            horsepower: Some(90.0),
            f_horsepower: Some(5.0),
            mileage: Some(mileage),
            nb_doors: Some(5),
            nb_seats: Some(5),
            gearbox: Some(Gearbox::Manual),
            fuel_type: Some(FuelType::Essence),
            price_cents: Some(price_cents),
        }
    }

    fn config() -> EstimatorConfig {
        EstimatorConfig {
            seed: Some(11),
            forest: ForestConfig {
                n_estimators: 8,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_corpus_is_an_error() {
        let table = ListingTable::from_rows(vec![RawListing::default()]);
        let result = ModelTrainer::new(config()).train(&table);
        assert!(matches!(result, Err(EstimatorError::EmptyCorpus)));
    }

    #[test]
    fn test_report_counts() {
        let mut rows: Vec<RawListing> = (0..10)
            .map(|i| listing("Renault", "Clio", 10_000.0 * i as f64, 1_000_000 - 50_000 * i))
            .collect();
        rows.push(RawListing::default());
        let table = ListingTable::from_rows(rows);

        let (artifact, report) = ModelTrainer::new(config()).train(&table).unwrap();
        assert_eq!(report.rows_total, 11);
        assert_eq!(report.rows_complete, 10);
        assert_eq!(report.rows_train, 8);
        assert_eq!(report.rows_test, 2);
        assert_eq!(report.seed, 11);
        assert_eq!(artifact.forest.n_trees(), 8);
        assert_eq!(artifact.schema.len(), 8);
        assert!(report.top_features.len() <= REPORT_TOP_FEATURES);
    }

    #[test]
    fn test_fixed_seed_reproduces_model() {
        let rows: Vec<RawListing> = (0..20)
            .map(|i| {
                let model = if i % 2 == 0 { "Clio" } else { "Megane" };
                listing("Renault", model, 5_000.0 * i as f64, 1_500_000 - 40_000 * i)
            })
            .collect();
        let table = ListingTable::from_rows(rows);

        let trainer = ModelTrainer::new(config());
        let (a, _) = trainer.train(&table).unwrap();
        let (b, _) = trainer.train(&table).unwrap();
        assert_eq!(a.forest, b.forest);
        assert_eq!(a.schema, b.schema);
    }
}
