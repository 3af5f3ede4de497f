//! Estimator library for used-car price analysis
//!
//! This crate provides the core functionality for:
//! - Loading listing snapshots and recoding categorical values
//! - One-hot feature encoding against a fixed training schema
//! - Random-forest training, persistence and reloading
//! - Single-listing price estimation
//! - Market and per-model statistics

pub mod analysis;
pub mod artifact;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod models;
pub mod observability;
pub mod service;
pub mod training;


pub use config::{EstimatorConfig, ForestConfig, UnseenCategoryPolicy};
pub use error::{EstimatorError, InitError, Result};
pub use models::*;
pub use observability::StructuredLogger;
pub use service::{EstimatorService, InitOutcome, ServiceState};
