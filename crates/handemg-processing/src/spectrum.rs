//! Single-sided magnitude spectrum of a real signal

use handemg_core::{FrequencyBand, HandEmgError, HandEmgResult};
use num_complex::Complex;
use realfft::RealFftPlanner;
use std::ops::Range;

/// `20 * log10(value)`; zero maps to negative infinity
pub fn to_decibels(value: f64) -> f64 {
    20.0 * value.log10()
}

/// Single-sided spectrum over the bins `i in [0, N/2)`.
///
/// Magnitudes are scaled as `(2 / N) * |X[i]|`. That is an amplitude
/// spectrum, although reports call it the power spectral density.
#[derive(Debug, Clone)]
pub struct Spectrum {
    sampling_rate: f64,
    sample_count: usize,
    frequencies: Vec<f64>,
    magnitudes: Vec<f64>,
}

impl Spectrum {
    /// Transform `samples` taken at `sampling_rate` Hz
    pub fn compute(samples: &[f64], sampling_rate: f64) -> HandEmgResult<Self> {
        if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
            return Err(HandEmgError::config(format!(
                "Sampling rate must be positive, got {}", sampling_rate
            )));
        }

        let n = samples.len();
        if n < 2 {
            return Err(HandEmgError::InvalidSignal {
                reason: format!("at least 2 samples are required, got {}", n),
            });
        }

        if let Some(index) = samples.iter().position(|x| !x.is_finite()) {
            return Err(HandEmgError::InvalidSignal {
                reason: format!("sample {} is not a finite number", index),
            });
        }

        let mut planner = RealFftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(n);

        let mut input = samples.to_vec();
        let mut output: Vec<Complex<f64>> = fft.make_output_vec();
        fft.process(&mut input, &mut output)
            .map_err(|e| HandEmgError::InvalidSignal { reason: e.to_string() })?;

        let bins = n / 2;
        let scale = 2.0 / n as f64;
        let frequencies = (0..bins).map(|i| i as f64 * sampling_rate / n as f64).collect();
        let magnitudes = output[..bins].iter().map(|c| scale * c.norm()).collect();

        Ok(Spectrum {
            sampling_rate,
            sample_count: n,
            frequencies,
            magnitudes,
        })
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    /// Length N of the transformed signal
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Bin spacing `R / N` in Hz
    pub fn resolution(&self) -> f64 {
        self.sampling_rate / self.sample_count as f64
    }

    pub fn nyquist(&self) -> f64 {
        self.sampling_rate / 2.0
    }

    /// Magnitudes in dB
    pub fn decibels(&self) -> Vec<f64> {
        self.magnitudes.iter().map(|&m| to_decibels(m)).collect()
    }

    /// Bins whose frequency lies in the band (inclusive); `None` if no bin does
    pub fn band_range(&self, band: &FrequencyBand) -> Option<Range<usize>> {
        let start = self.frequencies.iter().position(|&f| band.contains(f))?;
        let len = self.frequencies[start..]
            .iter()
            .take_while(|&&f| band.contains(f))
            .count();
        Some(start..start + len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, amplitude: f64, rate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / rate).sin())
            .collect()
    }

    #[test]
    fn test_bin_layout() {
        let spectrum = Spectrum::compute(&sine(10.0, 1.0, 200.0, 1000), 200.0).unwrap();
        assert_eq!(spectrum.len(), 500);
        assert!((spectrum.resolution() - 0.2).abs() < 1e-12);
        assert_eq!(spectrum.frequencies()[0], 0.0);
        assert!((spectrum.frequencies()[499] - 99.8).abs() < 1e-9);
    }

    #[test]
    fn test_amplitude_scaling() {
        // On-bin sine of amplitude A gives magnitude A
        let spectrum = Spectrum::compute(&sine(30.0, 2.5, 200.0, 1000), 200.0).unwrap();
        let bin = 150;
        assert!((spectrum.frequencies()[bin] - 30.0).abs() < 1e-9);
        assert!((spectrum.magnitudes()[bin] - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_dc_component() {
        let spectrum = Spectrum::compute(&[1.0; 64], 64.0).unwrap();
        // (2/N) * |sum| = 2 for a constant 1
        assert!((spectrum.magnitudes()[0] - 2.0).abs() < 1e-12);
        assert!(spectrum.magnitudes()[1..].iter().all(|&m| m < 1e-12));
    }

    #[test]
    fn test_odd_length() {
        let spectrum = Spectrum::compute(&sine(5.0, 1.0, 101.0, 101), 101.0).unwrap();
        assert_eq!(spectrum.len(), 50);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(Spectrum::compute(&[1.0], 200.0).is_err());
        assert!(Spectrum::compute(&[1.0, 2.0], 0.0).is_err());
        assert!(Spectrum::compute(&[1.0, f64::NAN, 2.0], 200.0).is_err());
    }

    #[test]
    fn test_band_range_inclusive() {
        let spectrum = Spectrum::compute(&sine(10.0, 1.0, 200.0, 1000), 200.0).unwrap();

        let low = spectrum.band_range(&FrequencyBand::new(0.0, 20.0, "a")).unwrap();
        let next = spectrum.band_range(&FrequencyBand::new(20.0, 50.0, "b")).unwrap();
        assert_eq!(low, 0..101);
        assert_eq!(next, 100..251);

        assert!(spectrum.band_range(&FrequencyBand::new(200.0, 500.0, "c")).is_none());
    }

    #[test]
    fn test_decibels() {
        assert!((to_decibels(1.0)).abs() < 1e-12);
        assert!((to_decibels(10.0) - 20.0).abs() < 1e-12);
        assert_eq!(to_decibels(0.0), f64::NEG_INFINITY);
    }
}
