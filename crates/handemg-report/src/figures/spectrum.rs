//! Two-panel spectral figure: time domain above, dB spectrum with bands below

use crate::render::{band_color, padded_range, render_png_atomically, Canvas, DrawResult};
use handemg_core::HandEmgResult;
use handemg_processing::{to_decibels, SpectralReport};
use plotters::prelude::*;
use std::path::Path;

/// Base pixel size of the figure
pub const SPECTRUM_FIGURE_SIZE: (u32, u32) = (1200, 1000);

/// Shaded frequency band, clipped to the plotted range
#[derive(Debug, Clone, PartialEq)]
pub struct BandSpan {
    pub label: String,
    pub low_hz: f64,
    pub high_hz: f64,
    pub color: RGBColor,
}

/// Text marker at the strongest bin of a band
#[derive(Debug, Clone, PartialEq)]
pub struct PeakAnnotation {
    pub frequency_hz: f64,
    pub decibels: f64,
    pub text: String,
}

/// Everything the figure draws, computed up front
#[derive(Debug, Clone)]
pub struct SpectrumFigureData {
    pub column: String,
    pub time_series: Vec<(f64, f64)>,
    /// `(frequency, dB)`; bins with zero magnitude are left out
    pub spectrum_db: Vec<(f64, f64)>,
    pub spans: Vec<BandSpan>,
    pub annotations: Vec<PeakAnnotation>,
    pub nyquist: f64,
}

impl SpectrumFigureData {
    pub fn prepare(report: &SpectralReport) -> Self {
        let spectrum = &report.spectrum;
        let nyquist = spectrum.nyquist();

        let time_series = report
            .time_axis()
            .into_iter()
            .zip(report.samples.iter().copied())
            .collect();

        let spectrum_db = spectrum
            .frequencies()
            .iter()
            .zip(spectrum.decibels())
            .filter(|(_, db)| db.is_finite())
            .map(|(&f, db)| (f, db))
            .collect();

        let mut spans = Vec::new();
        let mut annotations = Vec::new();
        for (i, band_peak) in report.bands.iter().enumerate() {
            let band = &band_peak.band;
            if band.low_hz <= nyquist {
                spans.push(BandSpan {
                    label: band.label.clone(),
                    low_hz: band.low_hz.max(0.0),
                    high_hz: band.high_hz.min(nyquist),
                    color: band_color(i),
                });
            }

            // Marker goes on the band maximum, whatever the peak search chose
            let Some(range) = spectrum.band_range(band) else {
                continue;
            };
            let freqs = &spectrum.frequencies()[range.clone()];
            let mags = &spectrum.magnitudes()[range];
            let strongest = (0..mags.len()).reduce(|best, j| if mags[j] > mags[best] { j } else { best });

            if let Some(j) = strongest.filter(|&j| mags[j] > 0.0) {
                annotations.push(PeakAnnotation {
                    frequency_hz: freqs[j],
                    decibels: to_decibels(mags[j]),
                    text: format!("{:.1}Hz", freqs[j]),
                });
            }
        }

        SpectrumFigureData {
            column: report.column.clone(),
            time_series,
            spectrum_db,
            spans,
            annotations,
            nyquist,
        }
    }
}

/// Render the report's figure to `path`
pub fn render_spectrum_figure(report: &SpectralReport, path: &Path, size: (u32, u32)) -> HandEmgResult<()> {
    let data = SpectrumFigureData::prepare(report);
    render_png_atomically(path, size, |root| draw_spectrum(root, &data))
}

fn draw_spectrum(root: &Canvas<'_>, data: &SpectrumFigureData) -> DrawResult {
    let panels = root.split_evenly((2, 1));

    let t_range = padded_range(data.time_series.iter().map(|p| p.0));
    let a_range = padded_range(data.time_series.iter().map(|p| p.1));

    let mut time_chart = ChartBuilder::on(&panels[0])
        .caption(format!("EMG Signal (Time Domain): {}", data.column), ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(t_range, a_range)?;

    time_chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Amplitude")
        .draw()?;

    time_chart.draw_series(LineSeries::new(data.time_series.iter().copied(), &BLUE))?;

    let db_range = padded_range(
        data.spectrum_db
            .iter()
            .map(|p| p.1)
            .chain(data.annotations.iter().map(|a| a.decibels)),
    );
    let (db_lo, db_hi) = (db_range.start, db_range.end);

    let mut freq_chart = ChartBuilder::on(&panels[1])
        .caption("EMG Signal (Frequency Domain) with Frequency Bands", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..data.nyquist, db_range)?;

    freq_chart
        .configure_mesh()
        .x_desc("Frequency (Hz)")
        .y_desc("Power/Frequency (dB)")
        .draw()?;

    for span in &data.spans {
        let color = span.color;
        freq_chart
            .draw_series(std::iter::once(Rectangle::new(
                [(span.low_hz, db_lo), (span.high_hz, db_hi)],
                color.mix(0.2).filled(),
            )))?
            .label(span.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.mix(0.5).filled()));
    }

    freq_chart.draw_series(LineSeries::new(data.spectrum_db.iter().copied(), &BLUE))?;

    freq_chart.draw_series(data.annotations.iter().map(|a| {
        EmptyElement::at((a.frequency_hz, a.decibels))
            + Circle::new((0, 0), 3, BLACK.filled())
            + Text::new(a.text.clone(), (8, -16), ("sans-serif", 14).into_font())
    }))?;

    freq_chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}
