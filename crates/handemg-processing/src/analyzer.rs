//! Per-band spectral peak analysis of one EMG column

use crate::config::SpectralConfig;
use crate::peaks::find_peaks;
use crate::spectrum::{to_decibels, Spectrum};
use handemg_core::{DataTable, FrequencyBand, HandEmgError, HandEmgResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Dominant spectral component of a band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralPeak {
    pub frequency_hz: f64,
    pub magnitude: f64,
    pub decibels: f64,
}

impl SpectralPeak {
    fn new(frequency_hz: f64, magnitude: f64) -> Self {
        SpectralPeak {
            frequency_hz,
            magnitude,
            decibels: to_decibels(magnitude),
        }
    }
}

/// What the peak search found in one band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BandOutcome {
    /// No spectrum bin falls inside the band
    NoData,
    /// Highest local maximum in the band
    Peak(SpectralPeak),
    /// No local maximum qualified; largest sample in the band
    Fallback(SpectralPeak),
}

/// Band paired with its outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandPeak {
    pub band: FrequencyBand,
    pub outcome: BandOutcome,
}

impl BandPeak {
    /// Reported component, whether a true peak or the fallback maximum
    pub fn peak(&self) -> Option<&SpectralPeak> {
        match &self.outcome {
            BandOutcome::Peak(peak) | BandOutcome::Fallback(peak) => Some(peak),
            BandOutcome::NoData => None,
        }
    }

    pub fn is_detected_peak(&self) -> bool {
        matches!(self.outcome, BandOutcome::Peak(_))
    }
}

impl fmt::Display for BandPeak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            BandOutcome::NoData => write!(f, "{}: no data", self.band),
            BandOutcome::Peak(p) => write!(
                f,
                "{}: peak frequency = {:.2} Hz, peak value = {:.2e} (dB = {:.2} dB)",
                self.band, p.frequency_hz, p.magnitude, p.decibels
            ),
            BandOutcome::Fallback(p) => write!(
                f,
                "{}: no peak detected, max value = {:.2e} (dB = {:.2} dB) @ {:.2} Hz",
                self.band, p.magnitude, p.decibels, p.frequency_hz
            ),
        }
    }
}

/// Result of analysing one EMG column
#[derive(Debug, Clone)]
pub struct SpectralReport {
    pub column: String,
    pub samples: Vec<f64>,
    pub spectrum: Spectrum,
    pub bands: Vec<BandPeak>,
}

impl SpectralReport {
    pub fn sampling_rate(&self) -> f64 {
        self.spectrum.sampling_rate()
    }

    /// Look up a band by label
    pub fn band(&self, label: &str) -> Option<&BandPeak> {
        self.bands.iter().find(|b| b.band.label == label)
    }

    /// Sample times `i / R` in seconds
    pub fn time_axis(&self) -> Vec<f64> {
        let rate = self.sampling_rate();
        (0..self.samples.len()).map(|i| i as f64 / rate).collect()
    }
}

impl fmt::Display for SpectralReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(50);
        writeln!(
            f,
            "Spectral peaks per frequency band ('{}', {} samples @ {} Hz):",
            self.column,
            self.samples.len(),
            self.sampling_rate()
        )?;
        writeln!(f, "{}", rule)?;
        for band in &self.bands {
            writeln!(f, "{}", band)?;
        }
        write!(f, "{}", rule)
    }
}

/// Analyse `samples` without touching any table or terminal.
///
/// Each band takes the bins with `low <= f <= high`. Among those, the
/// highest sample strictly above both neighbours (and not below zero) is
/// the peak; if there is none, the band maximum is reported instead.
pub fn analyze_spectrum(
    samples: &[f64],
    sampling_rate: f64,
    column: &str,
    bands: &[FrequencyBand],
) -> HandEmgResult<SpectralReport> {
    let spectrum = Spectrum::compute(samples, sampling_rate)?;
    debug!(
        "Spectrum of '{}': {} bins, resolution {:.4} Hz",
        column,
        spectrum.len(),
        spectrum.resolution()
    );

    let bands = bands
        .iter()
        .map(|band| BandPeak {
            band: band.clone(),
            outcome: band_outcome(&spectrum, band),
        })
        .collect();

    Ok(SpectralReport {
        column: column.to_string(),
        samples: samples.to_vec(),
        spectrum,
        bands,
    })
}

fn band_outcome(spectrum: &Spectrum, band: &FrequencyBand) -> BandOutcome {
    let Some(range) = spectrum.band_range(band) else {
        warn!("{}", HandEmgError::EmptyBand { band: band.label.clone() });
        return BandOutcome::NoData;
    };

    let freqs = &spectrum.frequencies()[range.clone()];
    let mags = &spectrum.magnitudes()[range];

    let peaks = find_peaks(mags, Some(0.0));
    if let Some(i) = strongest(mags, peaks.into_iter()) {
        return BandOutcome::Peak(SpectralPeak::new(freqs[i], mags[i]));
    }

    match strongest(mags, 0..mags.len()) {
        Some(i) => BandOutcome::Fallback(SpectralPeak::new(freqs[i], mags[i])),
        None => BandOutcome::NoData,
    }
}

/// Index of the largest magnitude; the first one wins ties
fn strongest(mags: &[f64], indices: impl Iterator<Item = usize>) -> Option<usize> {
    indices.reduce(|best, i| if mags[i] > mags[best] { i } else { best })
}

/// Spectral analyzer bound to a validated configuration
#[derive(Debug, Clone)]
pub struct SpectralAnalyzer {
    config: SpectralConfig,
}

impl SpectralAnalyzer {
    pub fn new(config: SpectralConfig) -> HandEmgResult<Self> {
        config.validate()?;
        Ok(SpectralAnalyzer { config })
    }

    pub fn config(&self) -> &SpectralConfig {
        &self.config
    }

    /// Analyse raw samples of the configured column
    pub fn analyze(&self, samples: &[f64]) -> HandEmgResult<SpectralReport> {
        analyze_spectrum(
            samples,
            self.config.sampling_rate,
            &self.config.emg_column,
            &self.config.bands,
        )
    }

    /// Extract the configured column from `table` and analyse it.
    ///
    /// A missing column fails with the list of available columns.
    pub fn analyze_table(&self, table: &DataTable) -> HandEmgResult<SpectralReport> {
        let samples = table.numeric_column(&self.config.emg_column)?;
        self.analyze(&samples)
    }
}
