//! Local-maximum peak search

/// Indices of samples strictly greater than both immediate neighbours.
///
/// The first and last samples have only one neighbour and are never peaks.
/// With `min_height`, peaks below that height are dropped.
pub fn find_peaks(values: &[f64], min_height: Option<f64>) -> Vec<usize> {
    if values.len() < 3 {
        return Vec::new();
    }

    values
        .windows(3)
        .enumerate()
        .filter(|(_, w)| w[1] > w[0] && w[1] > w[2])
        .map(|(i, _)| i + 1)
        .filter(|&i| min_height.map_or(true, |h| values[i] >= h))
        .collect()
}
