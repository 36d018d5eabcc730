//! Muscle activation envelopes used to shape synthetic sensor channels

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Activation envelope over time, nominally in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalPattern {
    /// Constant activation level
    Constant { level: f64 },
    /// Periodic contraction around a baseline
    Sinusoidal {
        frequency: f64,
        amplitude: f64,
        baseline: f64,
    },
    /// Linear change, then hold at `end_level`
    Ramp {
        start_level: f64,
        end_level: f64,
        duration: f64,
    },
    /// On/off cycles
    Burst {
        on_duration: f64,
        off_duration: f64,
        amplitude: f64,
    },
    /// Exponentially decaying amplitude
    Fatigue {
        initial_amplitude: f64,
        decay_rate: f64,
    },
    /// Steady activation with physiological tremor
    Tremor {
        base_activation: f64,
        tremor_frequency: f64,
        tremor_amplitude: f64,
    },
}

impl Default for SignalPattern {
    fn default() -> Self {
        SignalPattern::Tremor {
            base_activation: 0.4,
            tremor_frequency: 8.0,
            tremor_amplitude: 0.05,
        }
    }
}

impl SignalPattern {
    /// Activation level at `time` seconds
    pub fn value_at(&self, time: f64) -> f64 {
        match *self {
            SignalPattern::Constant { level } => level,

            SignalPattern::Sinusoidal { frequency, amplitude, baseline } => {
                baseline + amplitude * (2.0 * PI * frequency * time).sin()
            }

            SignalPattern::Ramp { start_level, end_level, duration } => {
                if duration <= 0.0 || time >= duration {
                    end_level
                } else {
                    start_level + (end_level - start_level) * (time / duration)
                }
            }

            SignalPattern::Burst { on_duration, off_duration, amplitude } => {
                let cycle = on_duration + off_duration;
                if cycle <= 0.0 {
                    return 0.0;
                }
                if time.rem_euclid(cycle) < on_duration {
                    amplitude
                } else {
                    0.0
                }
            }

            SignalPattern::Fatigue { initial_amplitude, decay_rate } => {
                initial_amplitude * (-decay_rate * time).exp()
            }

            SignalPattern::Tremor { base_activation, tremor_frequency, tremor_amplitude } => {
                let tremor = tremor_amplitude * (2.0 * PI * tremor_frequency * time).sin();
                (base_activation + tremor).clamp(0.0, 1.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_and_ramp() {
        assert_eq!(SignalPattern::Constant { level: 0.3 }.value_at(12.0), 0.3);

        let ramp = SignalPattern::Ramp { start_level: 0.0, end_level: 1.0, duration: 10.0 };
        assert!((ramp.value_at(5.0) - 0.5).abs() < 1e-12);
        assert_eq!(ramp.value_at(20.0), 1.0);
    }

    #[test]
    fn test_burst_cycle() {
        let burst = SignalPattern::Burst { on_duration: 1.0, off_duration: 1.0, amplitude: 0.8 };
        assert_eq!(burst.value_at(0.5), 0.8);
        assert_eq!(burst.value_at(1.5), 0.0);
        assert_eq!(burst.value_at(2.5), 0.8);
    }

    #[test]
    fn test_tremor_stays_in_unit_range() {
        let tremor = SignalPattern::Tremor {
            base_activation: 0.98,
            tremor_frequency: 8.0,
            tremor_amplitude: 0.5,
        };
        for i in 0..200 {
            let v = tremor.value_at(i as f64 / 200.0);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_serde_tagged() {
        let json = serde_json::to_string(&SignalPattern::Constant { level: 0.2 }).unwrap();
        assert!(json.contains("\"type\":\"constant\""));
    }
}
