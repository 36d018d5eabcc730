//! Descriptive statistics: correlation and histograms

pub use handemg_core::ChannelStats;
use handemg_core::{HandEmgError, HandEmgResult};
use serde::{Deserialize, Serialize};

/// Pearson correlation over the pairs where both values are finite.
///
/// `None` when fewer than two such pairs exist or either side is constant.
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| (x, y))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return None;
    }

    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Symmetric matrix of pairwise Pearson coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// Row-major; NaN where a coefficient is undefined
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Correlate every pair of labelled columns
    pub fn compute(columns: &[(String, &[f64])]) -> HandEmgResult<Self> {
        if columns.is_empty() {
            return Err(HandEmgError::InvalidSignal {
                reason: "no columns to correlate".to_string(),
            });
        }

        let n = columns.len();
        let mut values = vec![vec![f64::NAN; n]; n];
        for i in 0..n {
            for j in i..n {
                let r = pearson(columns[i].1, columns[j].1).unwrap_or(f64::NAN);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Ok(CorrelationMatrix {
            labels: columns.iter().map(|(label, _)| label.clone()).collect(),
            values,
        })
    }

    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }

    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        let n = self.size();
        (0..n).all(|i| {
            (0..n).all(|j| {
                let (a, b) = (self.values[i][j], self.values[j][i]);
                (a.is_nan() && b.is_nan()) || (a - b).abs() <= tolerance
            })
        })
    }
}

/// (min, max) over the finite values
pub fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Fixed-width histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// `bins + 1` ascending edges
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin the finite values over their own range
    pub fn compute(values: &[f64], bins: usize) -> HandEmgResult<Self> {
        let range = value_range(values).unwrap_or((0.0, 1.0));
        Self::compute_with_range(values, bins, range)
    }

    /// Bin the finite values over `range`. Every bin is half-open except the
    /// last, which also takes the upper edge. Values outside are ignored.
    pub fn compute_with_range(values: &[f64], bins: usize, range: (f64, f64)) -> HandEmgResult<Self> {
        if bins == 0 {
            return Err(HandEmgError::config("Histogram needs at least one bin"));
        }

        let (mut lo, mut hi) = range;
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return Err(HandEmgError::config(format!("Invalid histogram range [{}, {}]", lo, hi)));
        }
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * width).collect();

        let mut counts = vec![0usize; bins];
        for &v in values.iter().filter(|v| v.is_finite()) {
            if v < lo || v > hi {
                continue;
            }
            let bin = (((v - lo) / width) as usize).min(bins - 1);
            counts[bin] += 1;
        }

        Ok(Histogram { edges, counts })
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn bin_width(&self, bin: usize) -> f64 {
        self.edges[bin + 1] - self.edges[bin]
    }

    /// Probability density per bin; integrates to 1 over the range
    pub fn density(&self) -> Vec<f64> {
        let total = self.total() as f64;
        if total == 0.0 {
            return vec![0.0; self.bins()];
        }

        self.counts
            .iter()
            .enumerate()
            .map(|(i, &c)| c as f64 / (total * self.bin_width(i)))
            .collect()
    }

    pub fn bin_centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pearson_perfect() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 4.0, 6.0, 8.0];
        let c = [4.0, 3.0, 2.0, 1.0];
        assert!((pearson(&a, &b).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&a, &c).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_undefined() {
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), None);
        assert_eq!(pearson(&[1.0], &[1.0]), None);
    }

    #[test]
    fn test_pearson_skips_nan_pairs() {
        let a = [1.0, f64::NAN, 3.0, 4.0];
        let b = [1.0, 100.0, 3.0, 4.0];
        assert!((pearson(&a, &b).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_density_integrates_to_one() {
        let values: Vec<f64> = (0..100).map(|i| i as f64 / 10.0).collect();
        let hist = Histogram::compute(&values, 10).unwrap();

        assert_eq!(hist.total(), 100);
        let area: f64 = hist.density().iter().enumerate().map(|(i, d)| d * hist.bin_width(i)).sum();
        assert!((area - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_upper_edge_in_last_bin() {
        let hist = Histogram::compute_with_range(&[0.0, 0.5, 1.0], 2, (0.0, 1.0)).unwrap();
        assert_eq!(hist.counts, vec![1, 2]);
        assert_eq!(hist.bin_centers(), vec![0.25, 0.75]);
    }

    #[test]
    fn test_histogram_constant_values() {
        let hist = Histogram::compute(&[2.0, 2.0], 4).unwrap();
        assert_eq!(hist.edges[0], 1.5);
        assert_eq!(hist.total(), 2);
    }

    #[test]
    fn test_histogram_rejects_zero_bins() {
        assert!(Histogram::compute(&[1.0], 0).is_err());
    }

    proptest! {
        #[test]
        fn test_correlation_matrix_symmetric_unit_diagonal(
            columns in proptest::collection::vec(
                proptest::collection::vec(-1000.0f64..1000.0, 20),
                8,
            )
        ) {
            let labelled: Vec<(String, &[f64])> = columns
                .iter()
                .enumerate()
                .map(|(i, c)| (format!("Sensor_{}", i + 1), c.as_slice()))
                .collect();
            let matrix = CorrelationMatrix::compute(&labelled).unwrap();

            prop_assert!(matrix.is_symmetric(1e-12));
            for i in 0..matrix.size() {
                let d = matrix.get(i, i);
                prop_assert!(d.is_nan() || (d - 1.0).abs() < 1e-9);
            }
        }
    }
}
