//! HandEMG-Processing: spectral analysis and descriptive statistics
//!
//! FFT magnitude spectrum, per-band peak search, Pearson correlation and
//! histogram binning for the hand-pose / EMG logs.

pub mod spectrum;
pub mod peaks;
pub mod analyzer;
pub mod stats;
pub mod config;

pub use spectrum::{to_decibels, Spectrum};
pub use peaks::find_peaks;
pub use analyzer::{analyze_spectrum, BandOutcome, BandPeak, SpectralAnalyzer, SpectralPeak, SpectralReport};
pub use stats::{pearson, value_range, ChannelStats, CorrelationMatrix, Histogram};
pub use config::SpectralConfig;
