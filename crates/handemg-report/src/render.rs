//! PNG output and shared chart helpers

use handemg_core::{HandEmgError, HandEmgResult};
use handemg_processing::value_range;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result type of drawing closures; plotters errors are boxed
pub type DrawResult = Result<(), Box<dyn Error>>;

/// Root drawing area of a PNG figure
pub type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Sensor line colours, `Sensor_1` first
pub const SENSOR_COLORS: [RGBColor; 8] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
];

/// Background shading of the frequency bands, in band order
pub const BAND_COLORS: [RGBColor; 5] = [
    RGBColor(173, 216, 230),
    RGBColor(144, 238, 144),
    RGBColor(255, 255, 224),
    RGBColor(240, 128, 128),
    RGBColor(221, 160, 221),
];

/// Band colour, cycling when there are more bands than colours
pub fn band_color(index: usize) -> RGBColor {
    BAND_COLORS[index % BAND_COLORS.len()]
}

pub fn sensor_color(index: usize) -> RGBColor {
    SENSOR_COLORS[index % SENSOR_COLORS.len()]
}

/// Diverging blue-white-red map for `value` in [-1, 1]
pub fn coolwarm(value: f64) -> RGBColor {
    const COLD: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    if !value.is_finite() {
        return RGBColor(255, 255, 255);
    }

    let t = value.clamp(-1.0, 1.0);
    let (from, to, w) = if t < 0.0 { (MID, COLD, -t) } else { (MID, WARM, t) };
    let mix = |a: f64, b: f64| (a + (b - a) * w).round() as u8;
    RGBColor(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

/// Axis range over the finite values with 5% padding on each side
pub fn padded_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let values: Vec<f64> = values.into_iter().collect();
    match value_range(&values) {
        None => 0.0..1.0,
        Some((lo, hi)) if lo == hi => (lo - 0.5)..(hi + 0.5),
        Some((lo, hi)) => {
            let pad = (hi - lo) * 0.05;
            (lo - pad)..(hi + pad)
        }
    }
}

/// Hidden sibling the figure is rendered into before the final rename
pub fn partial_path(path: &Path) -> HandEmgResult<PathBuf> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| HandEmgError::config(format!("'{}' has no file name", path.display())))?;
    Ok(path.with_file_name(format!(".{}.partial.png", stem)))
}

/// Render a PNG so that `path` only ever holds a complete image.
///
/// The figure is drawn into a hidden sibling file which is renamed onto
/// `path` once the backend has written it. On any failure the sibling is
/// removed and `path` is left untouched.
pub fn render_png_atomically<F>(path: &Path, size: (u32, u32), draw: F) -> HandEmgResult<()>
where
    F: FnOnce(&Canvas<'_>) -> DrawResult,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let partial = partial_path(path)?;
    debug!("Rendering {}x{} figure into {}", size.0, size.1, partial.display());

    let drawn = draw_to(&partial, size, draw);
    match drawn {
        Ok(()) => {
            fs::rename(&partial, path)?;
            info!("Figure saved to {}", path.display());
            Ok(())
        }
        Err(e) => {
            if partial.exists() {
                if let Err(cleanup) = fs::remove_file(&partial) {
                    warn!("Could not remove {}: {}", partial.display(), cleanup);
                }
            }
            Err(HandEmgError::render(e))
        }
    }
}

fn draw_to<F>(partial: &Path, size: (u32, u32), draw: F) -> DrawResult
where
    F: FnOnce(&Canvas<'_>) -> DrawResult,
{
    let root = BitMapBackend::new(partial, size).into_drawing_area();
    root.fill(&WHITE)?;
    draw(&root)?;
    root.present()?;
    Ok(())
}
