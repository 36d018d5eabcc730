//! Typed schemas for hand-pose and EMG logs
//!
//! A `DataTable` is checked once against the expected columns; after that,
//! joints and sensors are addressed by typed keys instead of column strings.

use crate::error::{HandEmgError, HandEmgResult};
use crate::table::DataTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Number of EMG sensor channels in an EMG log
pub const SENSOR_COUNT: usize = 8;

pub const HAND_TIMESTAMP_COLUMN: &str = "timestamp";
pub const HAND_SIDE_COLUMN: &str = "is_left";
pub const EMG_TIMESTAMP_COLUMN: &str = "Timestamp";

/// Tracked fingers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// Column-name prefix
    pub fn key(&self) -> &'static str {
        match self {
            Finger::Thumb => "thumb",
            Finger::Index => "index",
            Finger::Middle => "middle",
            Finger::Ring => "ring",
            Finger::Pinky => "pinky",
        }
    }
}

impl fmt::Display for Finger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finger::Thumb => write!(f, "Thumb"),
            Finger::Index => write!(f, "Index"),
            Finger::Middle => write!(f, "Middle"),
            Finger::Ring => write!(f, "Ring"),
            Finger::Pinky => write!(f, "Pinky"),
        }
    }
}

impl FromStr for Finger {
    type Err = HandEmgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Finger::ALL
            .into_iter()
            .find(|f| f.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| HandEmgError::config(format!("Unknown finger '{}'", s)))
    }
}

/// Finger joints, proximal to distal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Joint {
    Mcp,
    Pip,
    Dip,
}

impl Joint {
    pub const ALL: [Joint; 3] = [Joint::Mcp, Joint::Pip, Joint::Dip];

    pub fn key(&self) -> &'static str {
        match self {
            Joint::Mcp => "mcp",
            Joint::Pip => "pip",
            Joint::Dip => "dip",
        }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key().to_ascii_uppercase())
    }
}

impl FromStr for Joint {
    type Err = HandEmgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Joint::ALL
            .into_iter()
            .find(|j| j.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| HandEmgError::config(format!("Unknown joint '{}'", s)))
    }
}

/// One quaternion component of one joint, e.g. `index_pip_quat_2`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JointChannel {
    pub finger: Finger,
    pub joint: Joint,
    pub component: u8,
}

impl JointChannel {
    pub fn new(finger: Finger, joint: Joint, component: u8) -> HandEmgResult<Self> {
        if component > 3 {
            return Err(HandEmgError::config(format!(
                "Quaternion component {} out of range 0-3", component
            )));
        }
        Ok(JointChannel { finger, joint, component })
    }

    pub fn column_name(&self) -> String {
        format!("{}_{}_quat_{}", self.finger.key(), self.joint.key(), self.component)
    }
}

impl fmt::Display for JointChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} Quat {}", self.finger, self.joint, self.component)
    }
}

impl FromStr for JointChannel {
    type Err = HandEmgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HandEmgError::config(format!(
            "'{}' is not a joint channel (expected <finger>_<joint>_quat_<0-3>)", s
        ));

        let parts: Vec<&str> = s.split('_').collect();
        match parts.as_slice() {
            [finger, joint, "quat", component] => {
                let component = component.parse::<u8>().map_err(|_| invalid())?;
                JointChannel::new(finger.parse()?, joint.parse()?, component)
            }
            _ => Err(invalid()),
        }
    }
}

/// EMG sensor number, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SensorId(u8);

impl SensorId {
    pub fn new(number: u8) -> HandEmgResult<Self> {
        if number == 0 || number as usize > SENSOR_COUNT {
            return Err(HandEmgError::config(format!(
                "Sensor number {} out of range 1-{}", number, SENSOR_COUNT
            )));
        }
        Ok(SensorId(number))
    }

    pub fn all() -> impl Iterator<Item = SensorId> {
        (1..=SENSOR_COUNT as u8).map(SensorId)
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    pub fn index(&self) -> usize {
        self.0 as usize - 1
    }

    pub fn column_name(&self) -> String {
        format!("Sensor_{}", self.0)
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sensor {}", self.0)
    }
}

/// One row of a hand-pose log
#[derive(Debug, Clone, PartialEq)]
pub struct HandPoseRecord {
    pub timestamp: f64,
    pub is_left: bool,
    /// Quaternion `[q0, q1, q2, q3]` per tracked joint
    pub joints: BTreeMap<(Finger, Joint), [f64; 4]>,
}

/// Validated hand-pose log
#[derive(Debug, Clone)]
pub struct HandPoseLog {
    timestamps: Vec<f64>,
    is_left: Vec<bool>,
    joints: BTreeMap<(Finger, Joint), [Vec<f64>; 4]>,
}

impl HandPoseLog {
    /// Check the table against the hand-pose schema.
    ///
    /// Requires `timestamp`, a boolean `is_left`, and at least one joint with
    /// all four quaternion components. A joint with only some of its
    /// components present is rejected.
    pub fn from_table(table: &DataTable) -> HandEmgResult<Self> {
        let timestamps = table.numeric_column(HAND_TIMESTAMP_COLUMN)?;
        let is_left = table.bool_column(HAND_SIDE_COLUMN)?;

        let mut joints = BTreeMap::new();
        for finger in Finger::ALL {
            for joint in Joint::ALL {
                let names: Vec<String> = (0..4u8)
                    .map(|c| JointChannel { finger, joint, component: c }.column_name())
                    .collect();

                let present = names.iter().filter(|n| table.has_column(n)).count();
                if present == 0 {
                    continue;
                }

                let [q0, q1, q2, q3] = [&names[0], &names[1], &names[2], &names[3]];
                joints.insert(
                    (finger, joint),
                    [
                        table.numeric_column(q0)?,
                        table.numeric_column(q1)?,
                        table.numeric_column(q2)?,
                        table.numeric_column(q3)?,
                    ],
                );
            }
        }

        if joints.is_empty() {
            return Err(HandEmgError::MissingColumn {
                column: JointChannel { finger: Finger::Thumb, joint: Joint::Mcp, component: 0 }
                    .column_name(),
                available: table.column_names().into_iter().map(str::to_string).collect(),
            });
        }

        Ok(HandPoseLog { timestamps, is_left, joints })
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    pub fn is_left(&self) -> &[bool] {
        &self.is_left
    }

    /// Tracked joints in finger/joint order
    pub fn joints(&self) -> impl Iterator<Item = (Finger, Joint)> + '_ {
        self.joints.keys().copied()
    }

    pub fn has_joint(&self, finger: Finger, joint: Joint) -> bool {
        self.joints.contains_key(&(finger, joint))
    }

    pub fn channel(&self, channel: JointChannel) -> HandEmgResult<&[f64]> {
        self.joints
            .get(&(channel.finger, channel.joint))
            .map(|components| components[channel.component as usize].as_slice())
            .ok_or_else(|| HandEmgError::MissingColumn {
                column: channel.column_name(),
                available: self.channel_names(),
            })
    }

    fn channel_names(&self) -> Vec<String> {
        self.joints
            .keys()
            .flat_map(|&(finger, joint)| {
                (0..4u8).map(move |component| JointChannel { finger, joint, component }.column_name())
            })
            .collect()
    }

    pub fn records(&self) -> impl Iterator<Item = HandPoseRecord> + '_ {
        (0..self.len()).map(move |row| HandPoseRecord {
            timestamp: self.timestamps[row],
            is_left: self.is_left[row],
            joints: self
                .joints
                .iter()
                .map(|(&key, q)| (key, [q[0][row], q[1][row], q[2][row], q[3][row]]))
                .collect(),
        })
    }

    /// Values of one channel partitioned into (left hand, right hand)
    pub fn split_by_hand(&self, channel: JointChannel) -> HandEmgResult<(Vec<f64>, Vec<f64>)> {
        let values = self.channel(channel)?;
        let mut left = Vec::new();
        let mut right = Vec::new();

        for (&value, &is_left) in values.iter().zip(&self.is_left) {
            if is_left {
                left.push(value);
            } else {
                right.push(value);
            }
        }

        Ok((left, right))
    }
}

/// One row of an EMG log
#[derive(Debug, Clone, PartialEq)]
pub struct EmgRecord {
    pub timestamp: f64,
    pub sensors: [f64; SENSOR_COUNT],
    /// Value of the named EMG column, when one was requested
    pub emg: Option<f64>,
}

/// Validated EMG log
#[derive(Debug, Clone)]
pub struct EmgLog {
    timestamps: Vec<f64>,
    sensors: Vec<Vec<f64>>,
    emg: Option<(String, Vec<f64>)>,
}

impl EmgLog {
    /// Check the table against the EMG schema: `Timestamp` and
    /// `Sensor_1`..`Sensor_8`, plus `emg_column` when given.
    pub fn from_table(table: &DataTable, emg_column: Option<&str>) -> HandEmgResult<Self> {
        let timestamps = table.numeric_column(EMG_TIMESTAMP_COLUMN)?;

        let sensors = SensorId::all()
            .map(|id| table.numeric_column(&id.column_name()))
            .collect::<HandEmgResult<Vec<_>>>()?;

        let emg = match emg_column {
            Some(name) => Some((name.to_string(), table.numeric_column(name)?)),
            None => None,
        };

        Ok(EmgLog { timestamps, sensors, emg })
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    pub fn sensor(&self, id: SensorId) -> &[f64] {
        &self.sensors[id.index()]
    }

    /// All sensors in order, paired with their id
    pub fn sensors(&self) -> impl Iterator<Item = (SensorId, &[f64])> + '_ {
        SensorId::all().zip(self.sensors.iter().map(Vec::as_slice))
    }

    /// Name and samples of the named EMG column
    pub fn emg(&self) -> Option<(&str, &[f64])> {
        self.emg.as_ref().map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn records(&self) -> impl Iterator<Item = EmgRecord> + '_ {
        (0..self.len()).map(move |row| {
            let mut sensors = [0.0; SENSOR_COUNT];
            for (slot, values) in sensors.iter_mut().zip(&self.sensors) {
                *slot = values[row];
            }
            EmgRecord {
                timestamp: self.timestamps[row],
                sensors,
                emg: self.emg.as_ref().map(|(_, values)| values[row]),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hand_table() -> DataTable {
        let csv = "timestamp,is_left,index_mcp_quat_0,index_mcp_quat_1,index_mcp_quat_2,index_mcp_quat_3\n\
                   0.0,True,1.0,0.0,0.0,0.0\n\
                   0.1,False,0.9,0.1,0.0,0.0\n\
                   0.2,True,0.8,0.2,0.0,0.0\n";
        DataTable::from_reader("hand", csv.as_bytes()).unwrap()
    }

    fn emg_table() -> DataTable {
        let mut csv = String::from("Timestamp,Sensor_1,Sensor_2,Sensor_3,Sensor_4,Sensor_5,Sensor_6,Sensor_7,Sensor_8,emg\n");
        for row in 0..4 {
            let sensors: Vec<String> = (1..=8).map(|s| (row * 10 + s).to_string()).collect();
            csv.push_str(&format!("{},{},{}\n", row, sensors.join(","), row as f64 * 0.5));
        }
        DataTable::from_reader("emg", csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_joint_channel_names() {
        let channel = JointChannel::new(Finger::Thumb, Joint::Mcp, 0).unwrap();
        assert_eq!(channel.column_name(), "thumb_mcp_quat_0");
        assert_eq!("index_dip_quat_3".parse::<JointChannel>().unwrap(),
                   JointChannel::new(Finger::Index, Joint::Dip, 3).unwrap());
        assert!("index_dip_quat_4".parse::<JointChannel>().is_err());
        assert!("index_knuckle_quat_0".parse::<JointChannel>().is_err());
        assert!("Sensor_1".parse::<JointChannel>().is_err());
    }

    #[test]
    fn test_sensor_ids() {
        let names: Vec<String> = SensorId::all().map(|s| s.column_name()).collect();
        assert_eq!(names.len(), SENSOR_COUNT);
        assert_eq!(names[0], "Sensor_1");
        assert_eq!(names[7], "Sensor_8");
        assert!(SensorId::new(0).is_err());
        assert!(SensorId::new(9).is_err());
    }

    #[test]
    fn test_hand_pose_schema() {
        let log = HandPoseLog::from_table(&hand_table()).unwrap();
        assert_eq!(log.len(), 3);
        assert!(log.has_joint(Finger::Index, Joint::Mcp));
        assert!(!log.has_joint(Finger::Thumb, Joint::Mcp));

        let records: Vec<HandPoseRecord> = log.records().collect();
        assert_eq!(records[1].joints[&(Finger::Index, Joint::Mcp)], [0.9, 0.1, 0.0, 0.0]);
        assert!(!records[1].is_left);
    }

    #[test]
    fn test_partial_joint_rejected() {
        let csv = "timestamp,is_left,index_mcp_quat_0,index_mcp_quat_1\n0,True,1,0\n";
        let table = DataTable::from_reader("partial", csv.as_bytes()).unwrap();
        match HandPoseLog::from_table(&table) {
            Err(HandEmgError::MissingColumn { column, .. }) => assert_eq!(column, "index_mcp_quat_2"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_untracked_channel_is_missing_column() {
        let log = HandPoseLog::from_table(&hand_table()).unwrap();
        let thumb = JointChannel::new(Finger::Thumb, Joint::Mcp, 0).unwrap();
        match log.channel(thumb) {
            Err(HandEmgError::MissingColumn { available, .. }) => {
                assert_eq!(available.len(), 4);
                assert!(available.contains(&"index_mcp_quat_0".to_string()));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_split_by_hand() {
        let log = HandPoseLog::from_table(&hand_table()).unwrap();
        let channel = JointChannel::new(Finger::Index, Joint::Mcp, 0).unwrap();
        let (left, right) = log.split_by_hand(channel).unwrap();
        assert_eq!(left, vec![1.0, 0.8]);
        assert_eq!(right, vec![0.9]);
    }

    #[test]
    fn test_emg_schema() {
        let log = EmgLog::from_table(&emg_table(), Some("emg")).unwrap();
        assert_eq!(log.len(), 4);
        assert_eq!(log.sensor(SensorId::new(3).unwrap()), &[3.0, 13.0, 23.0, 33.0]);

        let record = log.records().nth(2).unwrap();
        assert_eq!(record.sensors[7], 28.0);
        assert_eq!(record.emg, Some(1.0));
        assert_eq!(log.sensors().count(), SENSOR_COUNT);
    }

    #[test]
    fn test_emg_schema_missing_sensor() {
        let csv = "Timestamp,Sensor_1\n0,1\n";
        let table = DataTable::from_reader("short", csv.as_bytes()).unwrap();
        match EmgLog::from_table(&table, None) {
            Err(HandEmgError::MissingColumn { column, .. }) => assert_eq!(column, "Sensor_2"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_emg_column_validated() {
        assert!(matches!(
            EmgLog::from_table(&emg_table(), Some("emg_raw")),
            Err(HandEmgError::MissingColumn { .. })
        ));
    }

    proptest! {
        #[test]
        fn test_split_is_a_partition(flags in proptest::collection::vec(any::<bool>(), 1..200)) {
            let mut csv = String::from("timestamp,is_left,thumb_mcp_quat_0,thumb_mcp_quat_1,thumb_mcp_quat_2,thumb_mcp_quat_3\n");
            for (i, flag) in flags.iter().enumerate() {
                let side = if *flag { "True" } else { "False" };
                csv.push_str(&format!("{},{},{},0,0,0\n", i, side, i));
            }
            let table = DataTable::from_reader("prop", csv.as_bytes()).unwrap();
            let log = HandPoseLog::from_table(&table).unwrap();
            let channel = JointChannel::new(Finger::Thumb, Joint::Mcp, 0).unwrap();
            let (left, right) = log.split_by_hand(channel).unwrap();

            prop_assert_eq!(left.len() + right.len(), flags.len());
            for value in &left {
                prop_assert!(!right.contains(value));
            }
        }
    }
}
