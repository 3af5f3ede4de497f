use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffle row indices and split them into (train, test).
///
/// The test partition holds `floor(n * test_fraction)` rows and never
/// takes the last remaining row, so even a one-row corpus trains.
pub fn train_test_split<R: Rng>(n: usize, test_fraction: f64, rng: &mut R) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);

    let fraction = test_fraction.clamp(0.0, 1.0);
    let n_test = ((n as f64 * fraction).floor() as usize).min(n.saturating_sub(1));

    let test = indices.split_off(n - n_test);
    (indices, test)
}
