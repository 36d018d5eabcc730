//! Report configuration: input paths, analysis parameters, figure output

use handemg_core::{config_error, Finger, HandEmgError, HandEmgResult, JointChannel};
use handemg_processing::SpectralConfig;
use handemg_simulation::{EmgSimConfig, HandPoseSimConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Complete configuration of one `handemg-report` invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReportConfig {
    pub inputs: InputPaths,
    pub spectral: SpectralConfig,
    pub visualization: VisualizationConfig,
    pub output: OutputConfig,
    pub simulation: SimulationConfig,
}

/// Locations of the two logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputPaths {
    pub hand_data: PathBuf,
    pub emg_data: PathBuf,
}

impl Default for InputPaths {
    fn default() -> Self {
        InputPaths {
            hand_data: PathBuf::from("hand_data_log.csv"),
            emg_data: PathBuf::from("emg_data.csv"),
        }
    }
}

/// Which hand-pose fields the figures show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    /// Joint channel plotted on the pose timeline and the left/right histograms
    pub pose_field: String,
    pub histogram_bins: usize,
    /// Finger shown in the per-joint detail figure
    pub detail_finger: Finger,
    /// Quaternion component shown in the per-joint detail figure
    pub detail_component: u8,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        VisualizationConfig {
            pose_field: "thumb_mcp_quat_0".to_string(),
            histogram_bins: 50,
            detail_finger: Finger::Index,
            detail_component: 0,
        }
    }
}

impl VisualizationConfig {
    /// Parsed `pose_field`
    pub fn pose_channel(&self) -> HandEmgResult<JointChannel> {
        self.pose_field.parse()
    }
}

/// Where figures go and how large they are
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub fft_figure: String,
    pub overview_figure: String,
    pub joints_figure: String,
    pub sensors_figure: String,
    /// Multiplier on every figure's base pixel size
    pub scale: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            directory: PathBuf::from("."),
            fft_figure: "emg_fft_analysis.png".to_string(),
            overview_figure: "hand_emg_analysis.png".to_string(),
            joints_figure: "index_finger_analysis.png".to_string(),
            sensors_figure: "emg_sensors_comparison.png".to_string(),
            scale: 1.0,
        }
    }
}

impl OutputConfig {
    /// `directory` joined with `file_name`
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.directory.join(file_name)
    }

    /// Scaled pixel size of a figure
    pub fn figure_size(&self, base: (u32, u32)) -> (u32, u32) {
        let scale = |v: u32| ((v as f64) * self.scale).round().max(1.0) as u32;
        (scale(base.0), scale(base.1))
    }
}

/// Parameters of the `generate` command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimulationConfig {
    pub emg: EmgSimConfig,
    pub hand_pose: HandPoseSimConfig,
}

impl ReportConfig {
    /// Read and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> HandEmgResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| HandEmgError::config(format!(
            "Failed to read configuration '{}': {}", path.display(), e
        )))?;

        let config = Self::from_json(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Export configuration to JSON
    pub fn to_json(&self) -> HandEmgResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| HandEmgError::config(format!("Failed to serialize configuration: {}", e)))
    }

    /// Import configuration from JSON; absent fields take their defaults
    pub fn from_json(json: &str) -> HandEmgResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| HandEmgError::config(format!("Failed to deserialize configuration: {}", e)))
    }

    pub fn validate(&self) -> HandEmgResult<()> {
        self.spectral.validate()?;
        self.visualization.pose_channel()?;

        if self.visualization.histogram_bins == 0 {
            return Err(HandEmgError::config("Histogram bins must be at least 1"));
        }

        if self.visualization.detail_component > 3 {
            return Err(config_error!(
                "Quaternion component {} out of range 0-3", self.visualization.detail_component
            ));
        }

        let figures = [
            &self.output.fft_figure,
            &self.output.overview_figure,
            &self.output.joints_figure,
            &self.output.sensors_figure,
        ];
        if let Some(name) = figures.iter().find(|n| !n.to_ascii_lowercase().ends_with(".png")) {
            return Err(config_error!("Figure '{}' must be a .png file", name));
        }

        if !self.output.scale.is_finite() || self.output.scale <= 0.0 || self.output.scale > 8.0 {
            return Err(config_error!("Figure scale must be in (0, 8], got {}", self.output.scale));
        }

        Ok(())
    }

    /// Full path of a figure file name
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output.output_path(file_name)
    }
}
