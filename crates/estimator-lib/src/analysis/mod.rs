//! Market and per-model statistics over the listings corpus
//!
//! Outliers are trimmed to the [1%, 99%] quantile band of each column
//! before any statistic that is sensitive to them.

mod market;
mod model_stats;
mod stats;
mod trend;

pub use market::{brand_distribution, correlation_matrix, BrandCount, CorrelationMatrix};
pub use model_stats::{model_summary, ModelSummary};
pub use stats::{mean, median, pearson, quantile, TRIM_LOWER, TRIM_UPPER};
pub use trend::{price_trend, PriceTrend, TrendPoint, DEFAULT_TREND_POINTS};
