//! Frequency band definitions for spectral analysis

use crate::error::{HandEmgError, HandEmgResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed frequency interval `[low_hz, high_hz]` with a display label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBand {
    pub low_hz: f64,
    pub high_hz: f64,
    pub label: String,
}

impl FrequencyBand {
    pub fn new(low_hz: f64, high_hz: f64, label: impl Into<String>) -> Self {
        FrequencyBand {
            low_hz,
            high_hz,
            label: label.into(),
        }
    }

    /// The five bands covering 0-500 Hz.
    ///
    /// Neighbouring bands share their boundary frequency, and both
    /// include it.
    pub fn default_bands() -> Vec<FrequencyBand> {
        vec![
            FrequencyBand::new(0.0, 20.0, "Delta-Theta (0-20Hz)"),
            FrequencyBand::new(20.0, 50.0, "Low Beta (20-50Hz)"),
            FrequencyBand::new(50.0, 100.0, "High Beta (50-100Hz)"),
            FrequencyBand::new(100.0, 200.0, "Gamma (100-200Hz)"),
            FrequencyBand::new(200.0, 500.0, "High Gamma (200-500Hz)"),
        ]
    }

    /// Inclusive on both ends
    pub fn contains(&self, frequency_hz: f64) -> bool {
        self.low_hz <= frequency_hz && frequency_hz <= self.high_hz
    }

    pub fn width(&self) -> f64 {
        self.high_hz - self.low_hz
    }

    pub fn validate(&self) -> HandEmgResult<()> {
        if self.label.trim().is_empty() {
            return Err(HandEmgError::config("Frequency band label cannot be empty"));
        }

        if !self.low_hz.is_finite() || !self.high_hz.is_finite() {
            return Err(HandEmgError::config(format!(
                "Band '{}' has non-finite bounds", self.label
            )));
        }

        if self.low_hz < 0.0 {
            return Err(HandEmgError::config(format!(
                "Band '{}' starts below 0 Hz ({})", self.label, self.low_hz
            )));
        }

        if self.low_hz > self.high_hz {
            return Err(HandEmgError::config(format!(
                "Band '{}' has low bound {} above high bound {}",
                self.label, self.low_hz, self.high_hz
            )));
        }

        Ok(())
    }
}

impl fmt::Display for FrequencyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Validate a band set: at least one band, each band well-formed
pub fn validate_bands(bands: &[FrequencyBand]) -> HandEmgResult<()> {
    if bands.is_empty() {
        return Err(HandEmgError::config("At least one frequency band is required"));
    }

    for band in bands {
        band.validate()?;
    }

    Ok(())
}
