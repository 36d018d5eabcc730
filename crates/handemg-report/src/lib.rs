//! HandEMG-Report: console reports and PNG figures for hand-pose and EMG logs

pub mod settings;
pub mod render;
pub mod figures;
pub mod commands;

pub use commands::{run, Command, Invocation, USAGE};
pub use settings::{InputPaths, OutputConfig, ReportConfig, SimulationConfig, VisualizationConfig};
