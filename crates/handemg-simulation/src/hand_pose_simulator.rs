//! Synthetic hand-pose logs: per-joint unit quaternions for a flexing hand

use crate::emg_simulator::{csv_error, normal};
use handemg_core::records::{HAND_SIDE_COLUMN, HAND_TIMESTAMP_COLUMN};
use handemg_core::{Finger, HandEmgError, HandEmgResult, Joint, JointChannel};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Configuration for hand-pose synthesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandPoseSimConfig {
    /// Frame rate in Hz
    pub frame_rate: f64,
    pub duration_s: f64,
    pub start_timestamp: f64,
    /// Fingers to emit, each with MCP, PIP and DIP
    pub fingers: Vec<Finger>,
    /// Tracked hand alternates left/right with this period
    pub hand_switch_period_s: f64,
    pub flexion_frequency_hz: f64,
    /// Peak flexion angle of the MCP joint in radians
    pub max_flexion_rad: f64,
    /// Gaussian noise on the vector part before renormalising
    pub noise_std: f64,
    pub seed: Option<u64>,
}

impl Default for HandPoseSimConfig {
    fn default() -> Self {
        HandPoseSimConfig {
            frame_rate: 30.0,
            duration_s: 10.0,
            start_timestamp: 0.0,
            fingers: Finger::ALL.to_vec(),
            hand_switch_period_s: 2.0,
            flexion_frequency_hz: 0.5,
            max_flexion_rad: 1.2,
            noise_std: 0.01,
            seed: None,
        }
    }
}

impl HandPoseSimConfig {
    pub fn frame_count(&self) -> usize {
        (self.duration_s * self.frame_rate).round() as usize
    }

    pub fn validate(&self) -> HandEmgResult<()> {
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(HandEmgError::config(format!(
                "Frame rate must be positive, got {}", self.frame_rate
            )));
        }

        if !self.duration_s.is_finite() || self.frame_count() == 0 {
            return Err(HandEmgError::config(format!(
                "Duration {} s yields no frames", self.duration_s
            )));
        }

        if self.fingers.is_empty() {
            return Err(HandEmgError::config("At least one finger is required"));
        }

        if self.hand_switch_period_s <= 0.0 {
            return Err(HandEmgError::config("Hand switch period must be positive"));
        }

        if self.noise_std < 0.0 {
            return Err(HandEmgError::config("Noise standard deviation cannot be negative"));
        }

        Ok(())
    }
}

/// Generated hand-pose log; quaternions are stored `[w, x, y, z]`
#[derive(Debug, Clone)]
pub struct SyntheticHandPoseLog {
    pub timestamps: Vec<f64>,
    pub is_left: Vec<bool>,
    pub joints: BTreeMap<(Finger, Joint), Vec<[f64; 4]>>,
}

impl SyntheticHandPoseLog {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn header(&self) -> HandEmgResult<Vec<String>> {
        let mut header = vec![HAND_TIMESTAMP_COLUMN.to_string(), HAND_SIDE_COLUMN.to_string()];
        for &(finger, joint) in self.joints.keys() {
            for component in 0..4 {
                header.push(JointChannel::new(finger, joint, component)?.column_name());
            }
        }
        Ok(header)
    }

    /// Write the log as CSV; booleans are spelled `True`/`False`
    pub fn write_csv<W: Write>(&self, writer: W) -> HandEmgResult<()> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(self.header()?).map_err(csv_error)?;

        for row in 0..self.len() {
            let mut record = vec![
                self.timestamps[row].to_string(),
                if self.is_left[row] { "True" } else { "False" }.to_string(),
            ];
            for quats in self.joints.values() {
                record.extend(quats[row].iter().map(|c| c.to_string()));
            }
            out.write_record(&record).map_err(csv_error)?;
        }

        out.flush()?;
        Ok(())
    }

    pub fn write_to_path(&self, path: impl AsRef<Path>) -> HandEmgResult<()> {
        let path = path.as_ref();
        self.write_csv(File::create(path)?)?;
        info!("Wrote {} hand-pose rows to {}", self.len(), path.display());
        Ok(())
    }
}

/// Seeded generator of [`SyntheticHandPoseLog`]s
pub struct HandPoseSimulator {
    config: HandPoseSimConfig,
    rng: StdRng,
    noise: Normal<f64>,
}

impl HandPoseSimulator {
    pub fn new(config: HandPoseSimConfig) -> HandEmgResult<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let noise = normal(config.noise_std)?;

        Ok(HandPoseSimulator { config, rng, noise })
    }

    pub fn config(&self) -> &HandPoseSimConfig {
        &self.config
    }

    pub fn generate(&mut self) -> SyntheticHandPoseLog {
        let n = self.config.frame_count();
        let dt = 1.0 / self.config.frame_rate;
        debug!("Generating {} hand-pose frames at {} Hz", n, self.config.frame_rate);

        let times: Vec<f64> = (0..n).map(|i| i as f64 * dt).collect();
        let timestamps = times.iter().map(|t| self.config.start_timestamp + t).collect();
        let is_left = times
            .iter()
            .map(|t| (t / self.config.hand_switch_period_s).floor() as u64 % 2 == 0)
            .collect();

        let mut joints = BTreeMap::new();
        let fingers = self.config.fingers.clone();
        for (finger_index, finger) in fingers.into_iter().enumerate() {
            for (joint_index, joint) in Joint::ALL.into_iter().enumerate() {
                let quats = times
                    .iter()
                    .map(|&t| self.joint_rotation(t, finger_index, joint_index))
                    .collect();
                joints.insert((finger, joint), quats);
            }
        }

        SyntheticHandPoseLog { timestamps, is_left, joints }
    }

    /// Flexion about the joint's x axis, phase-shifted along the finger
    fn joint_rotation(&mut self, time: f64, finger_index: usize, joint_index: usize) -> [f64; 4] {
        const JOINT_SCALE: [f64; 3] = [1.0, 0.9, 0.6];

        let phase = finger_index as f64 * 0.4 + joint_index as f64 * 0.2;
        let cycle = 0.5 - 0.5 * (2.0 * PI * self.config.flexion_frequency_hz * time + phase).cos();
        let angle = self.config.max_flexion_rad * JOINT_SCALE[joint_index] * cycle;

        let (s, c) = (angle / 2.0).sin_cos();
        let q = [
            c,
            s + self.noise.sample(&mut self.rng),
            self.noise.sample(&mut self.rng),
            self.noise.sample(&mut self.rng),
        ];

        let norm = q.iter().map(|v| v * v).sum::<f64>().sqrt();
        q.map(|v| v / norm)
    }
}
