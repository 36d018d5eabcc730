//! Command-line commands and their dispatch

use crate::figures::{
    render_joint_detail, render_overview, render_sensor_grid, render_spectrum_figure,
    JointDetailData, OverviewData, SensorGridData, JOINTS_FIGURE_SIZE, OVERVIEW_FIGURE_SIZE,
    SENSORS_FIGURE_SIZE, SPECTRUM_FIGURE_SIZE,
};
use crate::settings::ReportConfig;
use handemg_core::records::EMG_TIMESTAMP_COLUMN;
use handemg_core::{
    load_table, DataTable, EmgLog, HandDataLoader, HandEmgError, HandEmgResult, HandPoseLog,
    SensorId,
};
use handemg_processing::{SpectralAnalyzer, SpectralReport};
use handemg_simulation::{EmgLogSimulator, HandPoseSimulator};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{error, info};

pub const USAGE: &str = "\
Usage: handemg-report [--config <file.json>] <command>

Commands:
  info       Load both logs and print shape, dtypes, preview and statistics
  fft        Spectral peaks of the EMG column, printed and plotted
  overview   Pose timeline, sensor traces, left/right histograms, correlation
  joints     Per-joint movement of one finger
  sensors    One panel per EMG sensor
  visualize  overview, joints and sensors
  generate   Write synthetic hand-pose and EMG logs to the input paths
  all        info, fft and visualize
  config     Print the effective configuration as JSON
  help       Show this message";

/// Top-level command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Info,
    Fft,
    Overview,
    Joints,
    Sensors,
    Visualize,
    Generate,
    All,
    Config,
    Help,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Info => "info",
            Command::Fft => "fft",
            Command::Overview => "overview",
            Command::Joints => "joints",
            Command::Sensors => "sensors",
            Command::Visualize => "visualize",
            Command::Generate => "generate",
            Command::All => "all",
            Command::Config => "config",
            Command::Help => "help",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Command {
    type Err = HandEmgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Command::Info),
            "fft" => Ok(Command::Fft),
            "overview" => Ok(Command::Overview),
            "joints" => Ok(Command::Joints),
            "sensors" => Ok(Command::Sensors),
            "visualize" => Ok(Command::Visualize),
            "generate" => Ok(Command::Generate),
            "all" => Ok(Command::All),
            "config" => Ok(Command::Config),
            "help" | "-h" | "--help" => Ok(Command::Help),
            other => Err(HandEmgError::config(format!("Unknown command '{}'", other))),
        }
    }
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub config_path: Option<PathBuf>,
    pub command: Command,
}

impl Invocation {
    /// Parse the arguments after the program name
    pub fn parse<I>(args: I) -> HandEmgResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut config_path = None;
        let mut command = None;
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            if arg == "--config" || arg == "-c" {
                let path = args
                    .next()
                    .ok_or_else(|| HandEmgError::config("--config requires a file path"))?;
                config_path = Some(PathBuf::from(path));
            } else if let Some(path) = arg.strip_prefix("--config=") {
                config_path = Some(PathBuf::from(path));
            } else if command.is_some() {
                return Err(HandEmgError::config(format!("Unexpected argument '{}'", arg)));
            } else {
                command = Some(arg.parse()?);
            }
        }

        Ok(Invocation {
            config_path,
            command: command.unwrap_or(Command::Help),
        })
    }

    /// Configuration named by `--config`, or the defaults
    pub fn load_config(&self) -> HandEmgResult<ReportConfig> {
        match &self.config_path {
            Some(path) => ReportConfig::from_file(path),
            None => Ok(ReportConfig::default()),
        }
    }
}

/// Run one command, writing console output to `out`
pub fn run<W: Write>(command: Command, config: &ReportConfig, out: &mut W) -> HandEmgResult<()> {
    info!("Running '{}'", command);
    match command {
        Command::Info => run_info(config, out),
        Command::Fft => run_fft(config, out).map(|_| ()),
        Command::Overview => run_overview(config, out).map(|_| ()),
        Command::Joints => run_joints(config, out).map(|_| ()),
        Command::Sensors => run_sensors(config, out).map(|_| ()),
        Command::Visualize => run_visualize(config, out),
        Command::Generate => run_generate(config, out),
        Command::All => {
            run_info(config, out)?;
            run_fft(config, out)?;
            run_visualize(config, out)
        }
        Command::Config => {
            writeln!(out, "{}", config.to_json()?)?;
            Ok(())
        }
        Command::Help => {
            writeln!(out, "{}", USAGE)?;
            Ok(())
        }
    }
}

/// Shape, dtypes, a five-row preview and descriptive statistics of both logs
pub fn run_info<W: Write>(config: &ReportConfig, out: &mut W) -> HandEmgResult<()> {
    let mut loader = HandDataLoader::new();
    loader.load_all(&config.inputs.hand_data, &config.inputs.emg_data);
    loader.describe_to(out)?;

    for (title, table) in [("Hand Data", loader.hand_data()), ("EMG Data", loader.emg_data())] {
        let Some(table) = table else {
            continue;
        };

        writeln!(out)?;
        writeln!(out, "=== {} Preview ===", title)?;
        write!(out, "{}", table.head(5))?;
        write_statistics(out, table)?;
    }

    Ok(())
}

fn write_statistics<W: Write>(out: &mut W, table: &DataTable) -> HandEmgResult<()> {
    let stats = table.describe_numeric();
    if stats.is_empty() {
        return Ok(());
    }

    let width = stats.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    writeln!(out)?;
    writeln!(
        out,
        "{:<width$}  {:>8}  {:>12}  {:>12}  {:>12}  {:>12}",
        "column", "count", "mean", "std", "min", "max",
        width = width
    )?;
    for (name, s) in stats {
        writeln!(
            out,
            "{:<width$}  {:>8}  {:>12.6}  {:>12.6}  {:>12.6}  {:>12.6}",
            name, s.count, s.mean, s.std_dev, s.min, s.max,
            width = width
        )?;
    }
    Ok(())
}

/// Spectral peaks per band of the configured EMG column.
///
/// Prints the report, saves the two-panel figure and returns the report.
pub fn run_fft<W: Write>(config: &ReportConfig, out: &mut W) -> HandEmgResult<SpectralReport> {
    let analyzer = SpectralAnalyzer::new(config.spectral.clone())?;

    let path = &config.inputs.emg_data;
    let table = load_table(path).map_err(|e| {
        error!("Error loading EMG data: {}", e);
        e
    })?;

    let report = analyzer.analyze_table(&table)?;
    writeln!(out)?;
    writeln!(out, "{}", report)?;

    let figure = config.output_path(&config.output.fft_figure);
    render_spectrum_figure(&report, &figure, config.output.figure_size(SPECTRUM_FIGURE_SIZE))?;
    writeln!(out, "FFT analysis saved as '{}'", figure.display())?;

    Ok(report)
}

pub fn run_overview<W: Write>(config: &ReportConfig, out: &mut W) -> HandEmgResult<PathBuf> {
    let mut loader = HandDataLoader::new();
    loader.load_all(&config.inputs.hand_data, &config.inputs.emg_data);

    let hand = HandPoseLog::from_table(required(loader.hand_data(), &config.inputs.hand_data)?)?;
    let emg = EmgLog::from_table(required(loader.emg_data(), &config.inputs.emg_data)?, None)?;

    let data = OverviewData::prepare(&hand, &emg, &config.visualization)?;
    let figure = config.output_path(&config.output.overview_figure);
    render_overview(&data, &figure, config.output.figure_size(OVERVIEW_FIGURE_SIZE))?;

    writeln!(out, "Visualization saved as '{}'", figure.display())?;
    Ok(figure)
}

pub fn run_joints<W: Write>(config: &ReportConfig, out: &mut W) -> HandEmgResult<PathBuf> {
    let mut loader = HandDataLoader::new();
    let table = required(loader.load_hand_data(&config.inputs.hand_data), &config.inputs.hand_data)?;
    let hand = HandPoseLog::from_table(table)?;

    let viz = &config.visualization;
    let data = JointDetailData::prepare(&hand, viz.detail_finger, viz.detail_component)?;
    let figure = config.output_path(&config.output.joints_figure);
    render_joint_detail(&data, &figure, config.output.figure_size(JOINTS_FIGURE_SIZE))?;

    writeln!(out, "{} finger analysis saved as '{}'", viz.detail_finger, figure.display())?;
    Ok(figure)
}

pub fn run_sensors<W: Write>(config: &ReportConfig, out: &mut W) -> HandEmgResult<PathBuf> {
    let mut loader = HandDataLoader::new();
    let table = required(loader.load_emg_data(&config.inputs.emg_data), &config.inputs.emg_data)?;
    let emg = EmgLog::from_table(table, None)?;

    let data = SensorGridData::prepare(&emg);
    let figure = config.output_path(&config.output.sensors_figure);
    render_sensor_grid(&data, &figure, config.output.figure_size(SENSORS_FIGURE_SIZE))?;

    writeln!(out, "EMG sensor comparison saved as '{}'", figure.display())?;
    Ok(figure)
}

/// All three visualization figures; one failing does not stop the others
pub fn run_visualize<W: Write>(config: &ReportConfig, out: &mut W) -> HandEmgResult<()> {
    let results = [
        ("overview", run_overview(config, out)),
        ("joints", run_joints(config, out)),
        ("sensors", run_sensors(config, out)),
    ];

    let mut first_error = None;
    for (name, result) in results {
        if let Err(e) = result {
            error!("Figure '{}' failed: {}", name, e);
            if first_error.is_none() {
                first_error = Some(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Write synthetic logs to the configured input paths.
///
/// The EMG log follows the spectral settings: it is sampled at the analysis
/// rate and carries the analysed column unless that name is already taken by
/// a timestamp or sensor column.
pub fn run_generate<W: Write>(config: &ReportConfig, out: &mut W) -> HandEmgResult<()> {
    let mut emg_config = config.simulation.emg.clone();
    emg_config.sampling_rate = config.spectral.sampling_rate;
    let column = &config.spectral.emg_column;
    let reserved = column == EMG_TIMESTAMP_COLUMN || SensorId::all().any(|id| id.column_name() == *column);
    emg_config.emg_column = if reserved { None } else { Some(column.clone()) };

    let emg = EmgLogSimulator::new(emg_config)?.generate();
    let hand = HandPoseSimulator::new(config.simulation.hand_pose.clone())?.generate();

    create_parent(&config.inputs.emg_data)?;
    create_parent(&config.inputs.hand_data)?;
    emg.write_to_path(&config.inputs.emg_data)?;
    hand.write_to_path(&config.inputs.hand_data)?;

    writeln!(out, "Wrote {} EMG rows to '{}'", emg.len(), config.inputs.emg_data.display())?;
    writeln!(out, "Wrote {} hand-pose rows to '{}'", hand.len(), config.inputs.hand_data.display())?;
    Ok(())
}

fn required<'a>(table: Option<&'a DataTable>, path: &Path) -> HandEmgResult<&'a DataTable> {
    table.ok_or_else(|| HandEmgError::DataUnavailable {
        path: path.display().to_string(),
    })
}

fn create_parent(path: &Path) -> HandEmgResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_invocation() {
        let invocation = Invocation::parse(["--config", "report.json", "fft"]).unwrap();
        assert_eq!(invocation.command, Command::Fft);
        assert_eq!(invocation.config_path, Some(PathBuf::from("report.json")));

        let invocation = Invocation::parse(["all", "--config=x.json"]).unwrap();
        assert_eq!(invocation.command, Command::All);
        assert_eq!(invocation.config_path, Some(PathBuf::from("x.json")));

        assert_eq!(Invocation::parse(Vec::<String>::new()).unwrap().command, Command::Help);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Invocation::parse(["plot"]).is_err());
        assert!(Invocation::parse(["fft", "info"]).is_err());
        assert!(Invocation::parse(["fft", "--config"]).is_err());
    }

    #[test]
    fn test_command_names_round_trip() {
        for command in [Command::Info, Command::Fft, Command::Visualize, Command::Generate, Command::Config] {
            assert_eq!(command.name().parse::<Command>().unwrap(), command);
        }
    }

    fn config_in(dir: &Path) -> ReportConfig {
        let mut config = ReportConfig::default();
        config.inputs.hand_data = dir.join("hand_data_log.csv");
        config.inputs.emg_data = dir.join("emg_data.csv");
        config.output.directory = dir.to_path_buf();
        config.simulation.emg.seed = Some(4);
        config.simulation.hand_pose.seed = Some(4);
        config
    }

    #[test]
    fn test_generate_then_info() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let mut out = Vec::new();
        run(Command::Generate, &config, &mut out).unwrap();
        assert!(config.inputs.hand_data.exists());
        assert!(config.inputs.emg_data.exists());

        let mut out = Vec::new();
        run_info(&config, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("=== Hand Data Info ==="));
        assert!(text.contains("Shape: (1000, 10)"));
        assert!(text.contains("=== EMG Data Preview ==="));
        assert!(text.contains("Sensor_8"));
    }

    #[test]
    fn test_generate_skips_reserved_column() {
        let dir = tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.spectral.emg_column = "Sensor_2".to_string();

        run_generate(&config, &mut Vec::new()).unwrap();
        let table = load_table(&config.inputs.emg_data).unwrap();
        assert_eq!(table.column_count(), 9);
    }

    #[test]
    fn test_info_without_files_prints_nothing() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let mut out = Vec::new();
        run_info(&config, &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_figures_abort_when_data_missing() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        assert!(matches!(
            run_sensors(&config, &mut Vec::new()),
            Err(HandEmgError::DataUnavailable { .. })
        ));
        assert!(matches!(
            run_fft(&config, &mut Vec::new()),
            Err(HandEmgError::FileNotFound { .. })
        ));
        assert!(run_visualize(&config, &mut Vec::new()).is_err());
        assert!(!config.output_path(&config.output.sensors_figure).exists());
    }

    #[test]
    fn test_config_command_prints_json() {
        let mut out = Vec::new();
        run(Command::Config, &ReportConfig::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(ReportConfig::from_json(&text).is_ok());
    }
}
