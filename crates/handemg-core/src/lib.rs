//! HandEMG-Core: foundation types for hand-pose and EMG log analysis
//!
//! Tabular CSV model, typed log schemas, frequency bands and the loader.

pub mod error;
pub mod table;
pub mod bands;
pub mod records;
pub mod loader;

pub use error::{HandEmgError, HandEmgResult};
pub use table::{ChannelStats, Column, ColumnData, DataTable, DataType};
pub use bands::{validate_bands, FrequencyBand};
pub use records::{
    EmgLog, EmgRecord, Finger, HandPoseLog, HandPoseRecord, Joint, JointChannel, SensorId,
    SENSOR_COUNT,
};
pub use loader::{load_table, HandDataLoader};
