//! Per-joint movement detail for one finger

use crate::render::{padded_range, render_png_atomically, sensor_color, Canvas, DrawResult};
use handemg_core::{Finger, HandEmgResult, HandPoseLog, Joint, JointChannel};
use plotters::prelude::*;
use std::path::Path;

pub const JOINTS_FIGURE_SIZE: (u32, u32) = (1200, 800);

/// MCP, PIP and DIP traces of one finger
#[derive(Debug, Clone)]
pub struct JointDetailData {
    pub finger: Finger,
    pub component: u8,
    /// `(joint, points)` in proximal-to-distal order
    pub traces: Vec<(Joint, Vec<(f64, f64)>)>,
}

impl JointDetailData {
    /// Collect the three joint traces; every joint of the finger must be logged
    pub fn prepare(hand: &HandPoseLog, finger: Finger, component: u8) -> HandEmgResult<Self> {
        let traces = Joint::ALL
            .into_iter()
            .map(|joint| -> HandEmgResult<(Joint, Vec<(f64, f64)>)> {
                let values = hand.channel(JointChannel::new(finger, joint, component)?)?;
                let points = hand.timestamps().iter().copied().zip(values.iter().copied()).collect();
                Ok((joint, points))
            })
            .collect::<HandEmgResult<Vec<_>>>()?;

        Ok(JointDetailData { finger, component, traces })
    }
}

pub fn render_joint_detail(data: &JointDetailData, path: &Path, size: (u32, u32)) -> HandEmgResult<()> {
    render_png_atomically(path, size, |root| draw_joints(root, data))
}

fn draw_joints(root: &Canvas<'_>, data: &JointDetailData) -> DrawResult {
    let panels = root.split_evenly((2, 2));

    for (i, (joint, points)) in data.traces.iter().enumerate() {
        draw_panel(
            &panels[i],
            &format!("{} Finger {} Joint Movement", data.finger, joint),
            &[(format!("{} {}", data.finger, joint), points.as_slice(), sensor_color(i))],
        )?;
    }

    let overlay: Vec<(String, &[(f64, f64)], RGBColor)> = data
        .traces
        .iter()
        .enumerate()
        .map(|(i, (joint, points))| (joint.to_string(), points.as_slice(), sensor_color(i)))
        .collect();
    draw_panel(&panels[3], &format!("{} Finger - All Joints", data.finger), &overlay)
}

fn draw_panel(area: &Canvas<'_>, title: &str, series: &[(String, &[(f64, f64)], RGBColor)]) -> DrawResult {
    let all = || series.iter().flat_map(|(_, points, _)| points.iter());

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(padded_range(all().map(|p| p.0)), padded_range(all().map(|p| p.1)))?;

    chart
        .configure_mesh()
        .x_desc("Timestamp")
        .y_desc("Quaternion Value")
        .draw()?;

    for (label, points, color) in series {
        let color = *color;
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.mix(0.8)))?
            .label(label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::partial_path;
    use handemg_core::{DataTable, HandEmgError};
    use tempfile::tempdir;

    const CSV: &str = "timestamp,is_left,index_mcp_quat_0,index_mcp_quat_1,index_mcp_quat_2,index_mcp_quat_3,\
index_pip_quat_0,index_pip_quat_1,index_pip_quat_2,index_pip_quat_3,\
index_dip_quat_0,index_dip_quat_1,index_dip_quat_2,index_dip_quat_3\n\
0.0,True,1,0,0,0,0.9,0.1,0,0,0.8,0.2,0,0\n\
0.1,False,0.99,0.1,0,0,0.95,0.2,0,0,0.7,0.3,0,0\n";

    fn hand() -> HandPoseLog {
        HandPoseLog::from_table(&DataTable::from_reader("hand", CSV.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn test_prepare_index_finger() {
        let data = JointDetailData::prepare(&hand(), Finger::Index, 0).unwrap();

        let joints: Vec<Joint> = data.traces.iter().map(|(j, _)| *j).collect();
        assert_eq!(joints, vec![Joint::Mcp, Joint::Pip, Joint::Dip]);
        assert_eq!(data.traces[2].1, vec![(0.0, 0.8), (0.1, 0.7)]);
    }

    #[test]
    fn test_missing_finger() {
        match JointDetailData::prepare(&hand(), Finger::Thumb, 0) {
            Err(HandEmgError::MissingColumn { column, .. }) => assert_eq!(column, "thumb_mcp_quat_0"),
            other => panic!("unexpected result: {:?}", other.map(|d| d.finger)),
        }
    }

    #[test]
    fn test_component_out_of_range() {
        assert!(JointDetailData::prepare(&hand(), Finger::Index, 4).is_err());
    }

    #[test]
    fn test_render_joint_detail_png() {
        let data = JointDetailData::prepare(&hand(), Finger::Index, 0).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("joint_analysis.png");

        render_joint_detail(&data, &path, JOINTS_FIGURE_SIZE).unwrap();

        assert!(path.metadata().unwrap().len() > 0);
        assert!(!partial_path(&path).unwrap().exists());
    }
}
