//! One panel per EMG sensor

use crate::render::{padded_range, render_png_atomically, sensor_color, Canvas, DrawResult};
use handemg_core::{EmgLog, HandEmgResult};
use plotters::prelude::*;
use std::path::Path;

pub const SENSORS_FIGURE_SIZE: (u32, u32) = (1500, 1000);

/// Raw trace of each sensor, `Sensor_1` first
#[derive(Debug, Clone)]
pub struct SensorGridData {
    pub traces: Vec<(String, Vec<(f64, f64)>)>,
}

impl SensorGridData {
    pub fn prepare(emg: &EmgLog) -> Self {
        let traces = emg
            .sensors()
            .map(|(id, samples)| {
                let points = emg.timestamps().iter().copied().zip(samples.iter().copied()).collect();
                (id.column_name(), points)
            })
            .collect();
        SensorGridData { traces }
    }
}

/// 2 x 4 grid of sensor traces
pub fn render_sensor_grid(data: &SensorGridData, path: &Path, size: (u32, u32)) -> HandEmgResult<()> {
    render_png_atomically(path, size, |root| draw_grid(root, data))
}

fn draw_grid(root: &Canvas<'_>, data: &SensorGridData) -> DrawResult {
    let panels = root.split_evenly((2, 4));

    for (i, ((label, points), panel)) in data.traces.iter().zip(&panels).enumerate() {
        let mut chart = ChartBuilder::on(panel)
            .caption(label.as_str(), ("sans-serif", 16))
            .margin(8)
            .x_label_area_size(30)
            .y_label_area_size(45)
            .build_cartesian_2d(
                padded_range(points.iter().map(|p| p.0)),
                padded_range(points.iter().map(|p| p.1)),
            )?;

        chart
            .configure_mesh()
            .x_desc("Timestamp")
            .y_desc("Value")
            .x_labels(4)
            .draw()?;

        chart.draw_series(LineSeries::new(points.iter().copied(), sensor_color(i)))?;
    }

    Ok(())
}
