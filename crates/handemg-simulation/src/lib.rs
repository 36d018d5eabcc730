//! HandEMG-Simulation: synthetic hand-pose and EMG logs
//!
//! Seeded generators that write CSV files in the same layout as recorded
//! sessions, for tests and demonstrations.

pub mod signal_patterns;
pub mod emg_simulator;
pub mod hand_pose_simulator;

pub use emg_simulator::*;
pub use hand_pose_simulator::*;
pub use signal_patterns::*;
