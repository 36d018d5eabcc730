//! Configuration for spectral analysis

use handemg_core::{validate_bands, FrequencyBand, HandEmgError, HandEmgResult};
use serde::{Deserialize, Serialize};

/// Parameters of one spectral analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralConfig {
    /// Sampling rate of the EMG column in Hz
    pub sampling_rate: f64,
    /// Column holding the EMG samples
    pub emg_column: String,
    /// Bands searched for peaks, in report order
    pub bands: Vec<FrequencyBand>,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        SpectralConfig {
            sampling_rate: 200.0,
            emg_column: "emg".to_string(),
            bands: FrequencyBand::default_bands(),
        }
    }
}

impl SpectralConfig {
    pub fn validate(&self) -> HandEmgResult<()> {
        if !self.sampling_rate.is_finite() || self.sampling_rate <= 0.0 {
            return Err(HandEmgError::config(format!(
                "Sampling rate must be positive, got {}", self.sampling_rate
            )));
        }

        if self.emg_column.trim().is_empty() {
            return Err(HandEmgError::config("EMG column name cannot be empty"));
        }

        validate_bands(&self.bands)
    }

    /// Export configuration to JSON
    pub fn to_json(&self) -> HandEmgResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| HandEmgError::config(format!("Failed to serialize configuration: {}", e)))
    }

    /// Import configuration from JSON
    pub fn from_json(json: &str) -> HandEmgResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| HandEmgError::config(format!("Failed to deserialize configuration: {}", e)))
    }
}
