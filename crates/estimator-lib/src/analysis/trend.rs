use super::stats::{mean, trim_bounds};
use crate::data::ListingTable;
use crate::error::{EstimatorError, Result};
use serde::Serialize;

/// Points on the fitted curve when the caller does not choose
pub const DEFAULT_TREND_POINTS: usize = 100;

/// A degree-2 polynomial has three coefficients
const MIN_TREND_SAMPLES: usize = 3;

/// One (mileage, price) pair; price in currency units
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub mileage: f64,
    pub price: f64,
}

/// Quadratic fit of price against mileage for one brand and model
#[derive(Debug, Clone, Serialize)]
pub struct PriceTrend {
    pub brand: String,
    pub model: String,
    /// Highest degree first: price = c[0]·m² + c[1]·m + c[2]
    pub coefficients: [f64; 3],
    /// Observations left after outlier trimming
    pub samples: Vec<TrendPoint>,
    /// Evenly spaced points on the fitted curve
    pub curve: Vec<TrendPoint>,
}

impl PriceTrend {
    pub fn evaluate(&self, mileage: f64) -> f64 {
        let [a, b, c] = self.coefficients;
        (a * mileage + b) * mileage + c
    }
}

/// Fit the price/mileage trend of an exact brand and model.
///
/// Prices then mileages are trimmed to their [1%, 99%] quantile band
/// before fitting.
pub fn price_trend(
    table: &ListingTable,
    brand: &str,
    model: &str,
    points: usize,
) -> Result<PriceTrend> {
    let rows: Vec<(Option<f64>, Option<f64>)> = table
        .rows()
        .iter()
        .filter(|r| r.brand.as_deref() == Some(brand) && r.model.as_deref() == Some(model))
        .map(|r| (r.mileage, r.price_cents.map(|p| p as f64)))
        .collect();

    let prices: Vec<f64> = rows.iter().filter_map(|r| r.1).collect();
    let mut kept: Vec<(Option<f64>, f64)> = match trim_bounds(&prices) {
        Some((low, high)) => rows
            .into_iter()
            .filter_map(|(m, p)| p.filter(|p| *p >= low && *p <= high).map(|p| (m, p)))
            .collect(),
        None => Vec::new(),
    };

    let mileages: Vec<f64> = kept.iter().filter_map(|r| r.0).collect();
    let samples: Vec<TrendPoint> = match trim_bounds(&mileages) {
        Some((low, high)) => {
            kept.retain(|(m, _)| m.map_or(false, |m| m >= low && m <= high));
            kept.into_iter()
                .filter_map(|(m, price_cents)| {
                    m.map(|mileage| TrendPoint {
                        mileage,
                        price: price_cents / 100.0,
                    })
                })
                .collect()
        }
        None => Vec::new(),
    };

    if samples.len() < MIN_TREND_SAMPLES {
        return Err(EstimatorError::InsufficientData(format!(
            "{} {}: {} listing(s) after trimming, need at least {}",
            brand,
            model,
            samples.len(),
            MIN_TREND_SAMPLES
        )));
    }

    let coefficients = fit_quadratic(&samples).ok_or_else(|| {
        EstimatorError::InsufficientData(format!(
            "{} {}: fewer than {} distinct mileages",
            brand, model, MIN_TREND_SAMPLES
        ))
    })?;

    let mut trend = PriceTrend {
        brand: brand.to_string(),
        model: model.to_string(),
        coefficients,
        samples,
        curve: Vec::new(),
    };
    trend.curve = curve_points(&trend, points);
    Ok(trend)
}

fn curve_points(trend: &PriceTrend, points: usize) -> Vec<TrendPoint> {
    let (min, max) = trend
        .samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.mileage), hi.max(p.mileage))
        });
    let step = if points > 1 {
        (max - min) / (points - 1) as f64
    } else {
        0.0
    };
    (0..points)
        .map(|i| {
            let mileage = min + step * i as f64;
            TrendPoint {
                mileage,
                price: trend.evaluate(mileage),
            }
        })
        .collect()
}

/// Least-squares quadratic through the samples, highest degree first.
///
/// Mileage is centred and scaled before solving the normal equations,
/// then the coefficients are mapped back to raw mileage. Returns None
/// when the mileages do not determine a quadratic.
fn fit_quadratic(samples: &[TrendPoint]) -> Option<[f64; 3]> {
    let xs: Vec<f64> = samples.iter().map(|p| p.mileage).collect();
    let center = mean(&xs)?;
    let scale = xs.iter().map(|x| (x - center).abs()).fold(0.0, f64::max);
    if scale == 0.0 {
        return None;
    }

    // Normal equations in t = (x - center) / scale, for y = c0 + c1·t + c2·t²
    let mut power_sums = [0.0f64; 5];
    let mut rhs = [0.0f64; 3];
    for p in samples {
        let t = (p.mileage - center) / scale;
        let mut tk = 1.0;
        for (k, sum) in power_sums.iter_mut().enumerate() {
            *sum += tk;
            if k < 3 {
                rhs[k] += tk * p.price;
            }
            tk *= t;
        }
    }
    let mut system = [[0.0f64; 4]; 3];
    for (i, row) in system.iter_mut().enumerate() {
        for j in 0..3 {
            row[j] = power_sums[i + j];
        }
        row[3] = rhs[i];
    }
    let [c0, c1, c2] = solve3(system)?;

    let (m, s) = (center, scale);
    Some([
        c2 / (s * s),
        c1 / s - 2.0 * c2 * m / (s * s),
        c0 - c1 * m / s + c2 * m * m / (s * s),
    ])
}

/// Gaussian elimination with partial pivoting on an augmented 3x4 system
fn solve3(mut a: [[f64; 4]; 3]) -> Option<[f64; 3]> {
    const SINGULAR: f64 = 1e-10;

    for col in 0..3 {
        let pivot = (col..3).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < SINGULAR {
            return None;
        }
        a.swap(col, pivot);
        for row in col + 1..3 {
            let factor = a[row][col] / a[col][col];
            for k in col..4 {
                a[row][k] -= factor * a[col][k];
            }
        }
    }

    let mut x = [0.0f64; 3];
    for row in (0..3).rev() {
        let tail: f64 = (row + 1..3).map(|k| a[row][k] * x[k]).sum();
        x[row] = (a[row][3] - tail) / a[row][row];
    }
    Some(x)
}
