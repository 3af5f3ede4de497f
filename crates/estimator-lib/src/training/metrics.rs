//! Goodness-of-fit metrics for held-out scoring

/// Coefficient of determination; None when undefined
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return None;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    if ss_tot <= 0.0 {
        return None;
    }
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    Some(1.0 - ss_res / ss_tot)
}

pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return None;
    }
    let total: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).abs()).sum();
    Some(total / actual.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_fit() {
        assert_eq!(r2_score(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), Some(1.0));
    }

    #[test]
    fn test_mean_prediction_scores_zero() {
        let r2 = r2_score(&[1.0, 2.0, 3.0], &[2.0, 2.0, 2.0]).unwrap();
        assert!(r2.abs() < 1e-12);
    }

    #[test]
    fn test_undefined_cases() {
        assert_eq!(r2_score(&[], &[]), None);
        assert_eq!(r2_score(&[5.0], &[4.0]), None);
        assert_eq!(r2_score(&[1.0, 2.0], &[1.0]), None);
    }

    #[test]
    fn test_mae() {
        assert_eq!(mean_absolute_error(&[1.0, 3.0], &[2.0, 5.0]), Some(1.5));
    }
}
