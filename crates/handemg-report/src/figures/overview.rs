//! Composite overview: pose timeline, sensor traces, left/right histograms
//! and the inter-sensor correlation heatmap

use crate::render::{
    coolwarm, padded_range, render_png_atomically, sensor_color, Canvas, DrawResult,
};
use crate::settings::VisualizationConfig;
use handemg_core::{EmgLog, HandEmgResult, HandPoseLog, JointChannel};
use handemg_processing::{value_range, CorrelationMatrix, Histogram};
use plotters::prelude::*;
use std::path::Path;

pub const OVERVIEW_FIGURE_SIZE: (u32, u32) = (1500, 1000);

const LEFT_COLOR: RGBColor = RGBColor(31, 119, 180);
const RIGHT_COLOR: RGBColor = RGBColor(255, 127, 14);

/// Data behind the four overview panels
#[derive(Debug, Clone)]
pub struct OverviewData {
    pub pose_channel: JointChannel,
    /// `(timestamp, value)` of the pose field
    pub pose_points: Vec<(f64, f64)>,
    /// One `(label, points)` trace per sensor
    pub sensor_traces: Vec<(String, Vec<(f64, f64)>)>,
    /// Left and right hand histograms over a shared range
    pub left: Histogram,
    pub right: Histogram,
    pub correlation: CorrelationMatrix,
}

impl OverviewData {
    pub fn prepare(hand: &HandPoseLog, emg: &EmgLog, config: &VisualizationConfig) -> HandEmgResult<Self> {
        let pose_channel = config.pose_channel()?;
        let values = hand.channel(pose_channel)?;

        let pose_points = hand
            .timestamps()
            .iter()
            .copied()
            .zip(values.iter().copied())
            .collect();

        let sensor_traces = emg
            .sensors()
            .map(|(id, samples)| {
                let points = emg.timestamps().iter().copied().zip(samples.iter().copied()).collect();
                (id.to_string(), points)
            })
            .collect();

        let (left_values, right_values) = hand.split_by_hand(pose_channel)?;
        let range = value_range(values).unwrap_or((0.0, 1.0));
        let left = Histogram::compute_with_range(&left_values, config.histogram_bins, range)?;
        let right = Histogram::compute_with_range(&right_values, config.histogram_bins, range)?;

        let columns: Vec<(String, &[f64])> = emg
            .sensors()
            .map(|(id, samples)| (id.column_name(), samples))
            .collect();
        let correlation = CorrelationMatrix::compute(&columns)?;

        Ok(OverviewData {
            pose_channel,
            pose_points,
            sensor_traces,
            left,
            right,
            correlation,
        })
    }
}

pub fn render_overview(data: &OverviewData, path: &Path, size: (u32, u32)) -> HandEmgResult<()> {
    render_png_atomically(path, size, |root| draw_overview(root, data))
}

fn draw_overview(root: &Canvas<'_>, data: &OverviewData) -> DrawResult {
    let root = root.titled("Hand Data and EMG Analysis", ("sans-serif", 26))?;
    let panels = root.split_evenly((2, 2));

    draw_pose_timeline(&panels[0], data)?;
    draw_sensor_traces(&panels[1], data)?;
    draw_hand_histograms(&panels[2], data)?;
    draw_correlation(&panels[3], &data.correlation)?;
    Ok(())
}

fn draw_pose_timeline(area: &Canvas<'_>, data: &OverviewData) -> DrawResult {
    let channel = data.pose_channel;
    let mut chart = ChartBuilder::on(area)
        .caption(
            format!("Hand Pose Timeline ({} {})", channel.finger, channel.joint),
            ("sans-serif", 18),
        )
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(
            padded_range(data.pose_points.iter().map(|p| p.0)),
            padded_range(data.pose_points.iter().map(|p| p.1)),
        )?;

    chart
        .configure_mesh()
        .x_desc("Timestamp")
        .y_desc("Quaternion Value")
        .draw()?;

    chart
        .draw_series(
            data.pose_points
                .iter()
                .map(|&p| Circle::new(p, 1, LEFT_COLOR.mix(0.6).filled())),
        )?
        .label(channel.to_string())
        .legend(|(x, y)| Circle::new((x + 7, y), 3, LEFT_COLOR.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_sensor_traces(area: &Canvas<'_>, data: &OverviewData) -> DrawResult {
    let all_points = || data.sensor_traces.iter().flat_map(|(_, p)| p.iter());

    let mut chart = ChartBuilder::on(area)
        .caption("EMG Sensor Data", ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(
            padded_range(all_points().map(|p| p.0)),
            padded_range(all_points().map(|p| p.1)),
        )?;

    chart
        .configure_mesh()
        .x_desc("Timestamp")
        .y_desc("Sensor Value")
        .draw()?;

    for (i, (label, points)) in data.sensor_traces.iter().enumerate() {
        let color = sensor_color(i);
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.mix(0.7)))?
            .label(label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], color));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_hand_histograms(area: &Canvas<'_>, data: &OverviewData) -> DrawResult {
    let left_density = data.left.density();
    let right_density = data.right.density();
    let top = left_density
        .iter()
        .chain(&right_density)
        .copied()
        .fold(0.0f64, f64::max)
        .max(1e-9)
        * 1.1;

    let edges = &data.left.edges;
    let x_range = edges[0]..edges[edges.len() - 1];

    let mut chart = ChartBuilder::on(area)
        .caption("Left vs Right Hand Distribution", ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(x_range, 0.0..top)?;

    chart
        .configure_mesh()
        .x_desc(data.pose_channel.to_string())
        .y_desc("Density")
        .draw()?;

    for (label, density, color) in [
        ("Left Hand", &left_density, LEFT_COLOR),
        ("Right Hand", &right_density, RIGHT_COLOR),
    ] {
        chart
            .draw_series(density.iter().enumerate().map(|(i, &d)| {
                Rectangle::new([(edges[i], 0.0), (edges[i + 1], d)], color.mix(0.6).filled())
            }))?
            .label(label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.mix(0.6).filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_correlation(area: &Canvas<'_>, matrix: &CorrelationMatrix) -> DrawResult {
    let (width, _) = area.dim_in_pixel();
    let (heat_area, bar_area) = area.split_horizontally((width * 85 / 100) as i32);

    let n = matrix.size() as i32;
    let labels = &matrix.labels;
    let label_at = |i: i32| -> String {
        usize::try_from(i)
            .ok()
            .and_then(|i| labels.get(i))
            .cloned()
            .unwrap_or_default()
    };

    let mut chart = ChartBuilder::on(&heat_area)
        .caption("EMG Sensor Correlation Matrix", ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(70)
        .build_cartesian_2d(0..n, 0..n)?;

    let (half_w, half_h) = half_cell(chart.plotting_area().dim_in_pixel(), matrix.size());

    // Row 0 is drawn at the top
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n as usize + 1)
        .y_labels(n as usize + 1)
        .x_label_offset(half_w)
        .y_label_offset(-half_h)
        .x_label_formatter(&|x| label_at(*x))
        .y_label_formatter(&|y| label_at(n - 1 - *y))
        .draw()?;

    chart.draw_series((0..n).flat_map(|row| {
        (0..n).map(move |col| {
            let value = matrix.get(row as usize, col as usize);
            let y = n - 1 - row;
            Rectangle::new([(col, y), (col + 1, y + 1)], coolwarm(value).filled())
        })
    }))?;

    let mut bar = ChartBuilder::on(&bar_area)
        .margin_top(40)
        .margin_bottom(45)
        .margin_right(10)
        .y_label_area_size(45)
        .build_cartesian_2d(0.0..1.0, -1.0..1.0)?;

    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_desc("Correlation")
        .y_labels(5)
        .draw()?;

    let steps = 100;
    bar.draw_series((0..steps).map(|i| {
        let lo = -1.0 + 2.0 * i as f64 / steps as f64;
        let hi = lo + 2.0 / steps as f64;
        Rectangle::new([(0.0, lo), (1.0, hi)], coolwarm((lo + hi) / 2.0).filled())
    }))?;

    Ok(())
}

/// Half a heatmap cell in pixels; ticks sit on cell edges and labels are
/// shifted by this much to land on cell centres
fn half_cell((width, height): (u32, u32), cells: usize) -> (i32, i32) {
    let cells = cells.max(1) as u32;
    ((width / cells / 2) as i32, (height / cells / 2) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::partial_path;
    use handemg_core::DataTable;
    use tempfile::tempdir;
    use handemg_simulation::{
        EmgLogSimulator, EmgSimConfig, HandPoseSimConfig, HandPoseSimulator,
    };

    fn logs() -> (HandPoseLog, EmgLog) {
        let mut buffer = Vec::new();
        HandPoseSimulator::new(HandPoseSimConfig { seed: Some(1), ..HandPoseSimConfig::default() })
            .unwrap()
            .generate()
            .write_csv(&mut buffer)
            .unwrap();
        let hand = HandPoseLog::from_table(&DataTable::from_reader("hand", buffer.as_slice()).unwrap()).unwrap();

        let mut buffer = Vec::new();
        EmgLogSimulator::new(EmgSimConfig { seed: Some(2), ..EmgSimConfig::default() })
            .unwrap()
            .generate()
            .write_csv(&mut buffer)
            .unwrap();
        let emg = EmgLog::from_table(&DataTable::from_reader("emg", buffer.as_slice()).unwrap(), None).unwrap();

        (hand, emg)
    }

    #[test]
    fn test_prepare_overview() {
        let (hand, emg) = logs();
        let data = OverviewData::prepare(&hand, &emg, &VisualizationConfig::default()).unwrap();

        assert_eq!(data.pose_points.len(), hand.len());
        assert_eq!(data.sensor_traces.len(), 8);
        assert_eq!(data.sensor_traces[0].0, "Sensor 1");
        assert_eq!(data.left.total() + data.right.total(), hand.len());
        assert_eq!(data.left.edges, data.right.edges);
        assert_eq!(data.left.bins(), 50);
        assert_eq!(data.correlation.size(), 8);
        assert!(data.correlation.is_symmetric(1e-12));
    }

    #[test]
    fn test_unknown_pose_field() {
        let (hand, emg) = logs();
        let config = VisualizationConfig {
            pose_field: "thumb_mcp_quat_9".to_string(),
            ..VisualizationConfig::default()
        };
        assert!(OverviewData::prepare(&hand, &emg, &config).is_err());
    }

    #[test]
    fn test_heatmap_labels_centred() {
        assert_eq!(half_cell((800, 400), 8), (50, 25));
        assert_eq!(half_cell((100, 60), 0), (50, 30));
    }

    #[test]
    fn test_render_overview_png() {
        let (hand, emg) = logs();
        let data = OverviewData::prepare(&hand, &emg, &VisualizationConfig::default()).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("hand_emg_overview.png");

        render_overview(&data, &path, OVERVIEW_FIGURE_SIZE).unwrap();

        assert!(path.metadata().unwrap().len() > 0);
        assert!(!partial_path(&path).unwrap().exists());
    }
}
