//! The four report figures

pub mod spectrum;
pub mod overview;
pub mod joints;
pub mod sensors;

pub use joints::{render_joint_detail, JointDetailData, JOINTS_FIGURE_SIZE};
pub use overview::{render_overview, OverviewData, OVERVIEW_FIGURE_SIZE};
pub use sensors::{render_sensor_grid, SensorGridData, SENSORS_FIGURE_SIZE};
pub use spectrum::{render_spectrum_figure, SpectrumFigureData, SPECTRUM_FIGURE_SIZE};
