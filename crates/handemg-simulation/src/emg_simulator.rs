//! Synthetic EMG logs: eight sensor channels plus an optional EMG column

use crate::signal_patterns::SignalPattern;
use handemg_core::records::EMG_TIMESTAMP_COLUMN;
use handemg_core::{HandEmgError, HandEmgResult, SensorId, SENSOR_COUNT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// One sinusoid mixed into the EMG column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneComponent {
    pub frequency_hz: f64,
    pub amplitude: f64,
}

/// Configuration for EMG log synthesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmgSimConfig {
    /// Sampling rate in Hz
    pub sampling_rate: f64,
    /// Length of the log in seconds
    pub duration_s: f64,
    pub start_timestamp: f64,
    /// Activation envelope shared by all sensors
    pub pattern: SignalPattern,
    /// Carrier of sensor k is `carrier_base_hz + k * carrier_step_hz`
    pub carrier_base_hz: f64,
    pub carrier_step_hz: f64,
    /// Gaussian noise on the sensor channels (0.0 = none)
    pub noise_std: f64,
    /// Name of the EMG column; `None` leaves it out
    pub emg_column: Option<String>,
    pub emg_tones: Vec<ToneComponent>,
    /// Gaussian noise on the EMG column (0.0 = none)
    pub emg_noise_std: f64,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl Default for EmgSimConfig {
    fn default() -> Self {
        EmgSimConfig {
            sampling_rate: 200.0,
            duration_s: 5.0,
            start_timestamp: 0.0,
            pattern: SignalPattern::default(),
            carrier_base_hz: 20.0,
            carrier_step_hz: 8.0,
            noise_std: 0.05,
            emg_column: Some("emg".to_string()),
            emg_tones: vec![ToneComponent { frequency_hz: 30.0, amplitude: 1.0 }],
            emg_noise_std: 0.0,
            seed: None,
        }
    }
}

impl EmgSimConfig {
    /// Number of rows the log will have
    pub fn sample_count(&self) -> usize {
        (self.duration_s * self.sampling_rate).round() as usize
    }

    pub fn validate(&self) -> HandEmgResult<()> {
        if !self.sampling_rate.is_finite() || self.sampling_rate <= 0.0 {
            return Err(HandEmgError::config(format!(
                "Sampling rate must be positive, got {}", self.sampling_rate
            )));
        }

        if !self.duration_s.is_finite() || self.sample_count() < 2 {
            return Err(HandEmgError::config(format!(
                "Duration {} s yields fewer than 2 samples", self.duration_s
            )));
        }

        if self.noise_std < 0.0 || self.emg_noise_std < 0.0 {
            return Err(HandEmgError::config("Noise standard deviation cannot be negative"));
        }

        if let Some(name) = &self.emg_column {
            if name.trim().is_empty() {
                return Err(HandEmgError::config("EMG column name cannot be empty"));
            }
        }

        if let Some(tone) = self.emg_tones.iter().find(|t| t.frequency_hz < 0.0) {
            return Err(HandEmgError::config(format!(
                "Tone frequency must be non-negative, got {}", tone.frequency_hz
            )));
        }

        Ok(())
    }

    fn carrier_hz(&self, sensor_index: usize) -> f64 {
        self.carrier_base_hz + sensor_index as f64 * self.carrier_step_hz
    }
}

/// Generated EMG log, column-major
#[derive(Debug, Clone)]
pub struct SyntheticEmgLog {
    pub timestamps: Vec<f64>,
    /// One vector per sensor, `Sensor_1` first
    pub sensors: Vec<Vec<f64>>,
    pub emg: Option<(String, Vec<f64>)>,
}

impl SyntheticEmgLog {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn header(&self) -> Vec<String> {
        let mut header = vec![EMG_TIMESTAMP_COLUMN.to_string()];
        header.extend(SensorId::all().map(|id| id.column_name()));
        if let Some((name, _)) = &self.emg {
            header.push(name.clone());
        }
        header
    }

    /// Write the log as CSV with a header row
    pub fn write_csv<W: Write>(&self, writer: W) -> HandEmgResult<()> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(self.header()).map_err(csv_error)?;

        for row in 0..self.len() {
            let mut record = Vec::with_capacity(SENSOR_COUNT + 2);
            record.push(self.timestamps[row].to_string());
            record.extend(self.sensors.iter().map(|s| s[row].to_string()));
            if let Some((_, values)) = &self.emg {
                record.push(values[row].to_string());
            }
            out.write_record(&record).map_err(csv_error)?;
        }

        out.flush()?;
        Ok(())
    }

    pub fn write_to_path(&self, path: impl AsRef<Path>) -> HandEmgResult<()> {
        let path = path.as_ref();
        self.write_csv(File::create(path)?)?;
        info!("Wrote {} EMG rows to {}", self.len(), path.display());
        Ok(())
    }
}

pub(crate) fn csv_error(err: csv::Error) -> HandEmgError {
    HandEmgError::Io { reason: err.to_string() }
}

/// Seeded generator of [`SyntheticEmgLog`]s
pub struct EmgLogSimulator {
    config: EmgSimConfig,
    rng: StdRng,
    sensor_noise: Normal<f64>,
    emg_noise: Normal<f64>,
}

impl EmgLogSimulator {
    pub fn new(config: EmgSimConfig) -> HandEmgResult<Self> {
        config.validate()?;

        let nyquist = config.sampling_rate / 2.0;
        if config.carrier_hz(SENSOR_COUNT - 1) >= nyquist {
            warn!(
                "Sensor carriers reach {} Hz, at or above the Nyquist frequency {} Hz",
                config.carrier_hz(SENSOR_COUNT - 1),
                nyquist
            );
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let sensor_noise = normal(config.noise_std)?;
        let emg_noise = normal(config.emg_noise_std)?;

        Ok(EmgLogSimulator { config, rng, sensor_noise, emg_noise })
    }

    pub fn config(&self) -> &EmgSimConfig {
        &self.config
    }

    /// Generate a full log
    pub fn generate(&mut self) -> SyntheticEmgLog {
        let n = self.config.sample_count();
        let dt = 1.0 / self.config.sampling_rate;
        debug!("Generating {} EMG rows at {} Hz", n, self.config.sampling_rate);

        let timestamps: Vec<f64> = (0..n)
            .map(|i| self.config.start_timestamp + i as f64 * dt)
            .collect();

        let mut sensors = vec![Vec::with_capacity(n); SENSOR_COUNT];
        let mut emg = Vec::with_capacity(if self.config.emg_column.is_some() { n } else { 0 });

        for i in 0..n {
            let time = i as f64 * dt;
            for (index, channel) in sensors.iter_mut().enumerate() {
                let value = self.sensor_sample(time, index);
                channel.push(value);
            }
            if self.config.emg_column.is_some() {
                let value = self.emg_sample(time);
                emg.push(value);
            }
        }

        SyntheticEmgLog {
            timestamps,
            sensors,
            emg: self.config.emg_column.clone().map(|name| (name, emg)),
        }
    }

    fn sensor_sample(&mut self, time: f64, index: usize) -> f64 {
        let activation = self.config.pattern.value_at(time);
        let amplitude = activation * 2.0;
        let carrier = self.config.carrier_hz(index);
        let phase = index as f64 * PI / SENSOR_COUNT as f64;

        let mut value = amplitude * (2.0 * PI * carrier * time + phase).sin();

        // Keep the harmonic only while it is representable
        if 2.0 * carrier < self.config.sampling_rate / 2.0 {
            value += amplitude * 0.3 * (2.0 * PI * 2.0 * carrier * time + phase).sin();
        }

        // Fibre recruitment jitter
        value += activation * self.rng.gen_range(-0.2..0.2);
        value += self.sensor_noise.sample(&mut self.rng);

        value.clamp(-5.0, 5.0)
    }

    fn emg_sample(&mut self, time: f64) -> f64 {
        let tones: f64 = self
            .config
            .emg_tones
            .iter()
            .map(|t| t.amplitude * (2.0 * PI * t.frequency_hz * time).sin())
            .sum();
        tones + self.emg_noise.sample(&mut self.rng)
    }
}

pub(crate) fn normal(std_dev: f64) -> HandEmgResult<Normal<f64>> {
    Normal::new(0.0, std_dev)
        .map_err(|e| HandEmgError::config(format!("Failed to create normal distribution: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use handemg_core::{ChannelStats, DataTable, EmgLog};

    fn seeded() -> EmgSimConfig {
        EmgSimConfig { seed: Some(7), ..EmgSimConfig::default() }
    }

    #[test]
    fn test_generate_shape() {
        let mut simulator = EmgLogSimulator::new(seeded()).unwrap();
        let log = simulator.generate();

        assert_eq!(log.len(), 1000);
        assert_eq!(log.sensors.len(), SENSOR_COUNT);
        assert!(log.sensors.iter().all(|s| s.len() == 1000));
        assert_eq!(log.emg.as_ref().map(|(name, v)| (name.as_str(), v.len())), Some(("emg", 1000)));
        assert!((log.timestamps[1] - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_sensors_vary_and_stay_bounded() {
        let mut simulator = EmgLogSimulator::new(seeded()).unwrap();
        let log = simulator.generate();

        for channel in &log.sensors {
            let stats = ChannelStats::calculate(channel);
            assert!(stats.std_dev > 0.0);
            assert!(stats.min >= -5.0 && stats.max <= 5.0);
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = EmgLogSimulator::new(seeded()).unwrap().generate();
        let b = EmgLogSimulator::new(seeded()).unwrap().generate();
        assert_eq!(a.sensors, b.sensors);
    }

    #[test]
    fn test_pure_tone_column() {
        let mut simulator = EmgLogSimulator::new(seeded()).unwrap();
        let log = simulator.generate();
        let (_, emg) = log.emg.unwrap();

        assert_eq!(emg[0], 0.0);
        assert!(emg.iter().all(|v| v.abs() <= 1.0 + 1e-12));
    }

    #[test]
    fn test_csv_loads_as_emg_log() {
        let mut simulator = EmgLogSimulator::new(seeded()).unwrap();
        let log = simulator.generate();

        let mut buffer = Vec::new();
        log.write_csv(&mut buffer).unwrap();

        let table = DataTable::from_reader("synthetic", buffer.as_slice()).unwrap();
        assert_eq!(table.shape(), (1000, 10));

        let parsed = EmgLog::from_table(&table, Some("emg")).unwrap();
        assert_eq!(parsed.len(), 1000);
        assert!(parsed.emg().is_some());
    }

    #[test]
    fn test_without_emg_column() {
        let config = EmgSimConfig { emg_column: None, ..seeded() };
        let log = EmgLogSimulator::new(config).unwrap().generate();
        assert!(log.emg.is_none());
        assert_eq!(log.header().len(), 9);
    }

    #[test]
    fn test_invalid_config() {
        let config = EmgSimConfig { sampling_rate: 0.0, ..EmgSimConfig::default() };
        assert!(EmgLogSimulator::new(config).is_err());

        let config = EmgSimConfig { duration_s: 0.001, ..EmgSimConfig::default() };
        assert!(EmgLogSimulator::new(config).is_err());

        let config = EmgSimConfig { noise_std: -1.0, ..EmgSimConfig::default() };
        assert!(EmgLogSimulator::new(config).is_err());
    }
}
