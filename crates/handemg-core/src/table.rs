//! DataTable: in-memory columnar view of a CSV log
//!
//! Columns are typed once at load time by inferring the narrowest type every
//! cell parses as (`int64` → `float64` → `bool` → `object`).

use crate::error::{HandEmgError, HandEmgResult};
use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Inferred column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Int64,
    Float64,
    Bool,
    Object,
}

impl DataType {
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int64 => "int64",
            DataType::Float64 => "float64",
            DataType::Bool => "bool",
            DataType::Object => "object",
        }
    }

    /// Whether the column can be read as a real-valued sequence
    pub fn is_numeric(&self) -> bool {
        !matches!(self, DataType::Object)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed column storage
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Bool(Vec<bool>),
    Object(Vec<String>),
}

impl ColumnData {
    /// Infer the narrowest type all cells parse as
    fn infer(cells: Vec<String>) -> ColumnData {
        if cells.is_empty() {
            return ColumnData::Object(cells);
        }

        if let Some(values) = cells.iter().map(|c| c.parse::<i64>().ok()).collect::<Option<Vec<_>>>() {
            return ColumnData::Int64(values);
        }

        // Empty cells are missing values, as NaN
        let floats: Option<Vec<f64>> = cells
            .iter()
            .map(|c| if c.is_empty() { Some(f64::NAN) } else { c.parse::<f64>().ok() })
            .collect();
        if let Some(values) = floats {
            return ColumnData::Float64(values);
        }

        if let Some(values) = cells.iter().map(|c| parse_bool(c)).collect::<Option<Vec<_>>>() {
            return ColumnData::Bool(values);
        }

        ColumnData::Object(cells)
    }

    pub fn dtype(&self) -> DataType {
        match self {
            ColumnData::Int64(_) => DataType::Int64,
            ColumnData::Float64(_) => DataType::Float64,
            ColumnData::Bool(_) => DataType::Bool,
            ColumnData::Object(_) => DataType::Object,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int64(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Object(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render one cell for console previews
    fn cell(&self, row: usize) -> String {
        match self {
            ColumnData::Int64(v) => v[row].to_string(),
            ColumnData::Float64(v) => format!("{:.6}", v[row]),
            ColumnData::Bool(v) => if v[row] { "True".to_string() } else { "False".to_string() },
            ColumnData::Object(v) => v[row].clone(),
        }
    }
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell {
        "True" | "true" | "TRUE" => Some(true),
        "False" | "false" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Named, typed column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn dtype(&self) -> DataType {
        self.data.dtype()
    }

    /// Column as real values; booleans map to 0.0 / 1.0
    pub fn as_f64(&self) -> HandEmgResult<Vec<f64>> {
        match &self.data {
            ColumnData::Int64(v) => Ok(v.iter().map(|&x| x as f64).collect()),
            ColumnData::Float64(v) => Ok(v.clone()),
            ColumnData::Bool(v) => Ok(v.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect()),
            ColumnData::Object(_) => Err(HandEmgError::ColumnType {
                column: self.name.clone(),
                expected: "numeric",
                found: DataType::Object.name(),
            }),
        }
    }

    /// Column as flags; integer columns are accepted when every value is 0 or 1
    pub fn as_bool(&self) -> HandEmgResult<Vec<bool>> {
        match &self.data {
            ColumnData::Bool(v) => Ok(v.clone()),
            ColumnData::Int64(v) if v.iter().all(|&x| x == 0 || x == 1) => {
                Ok(v.iter().map(|&x| x == 1).collect())
            }
            other => Err(HandEmgError::ColumnType {
                column: self.name.clone(),
                expected: "bool",
                found: other.dtype().name(),
            }),
        }
    }
}

/// Basic statistics for a numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub rms: f64,
    pub min: f64,
    pub max: f64,
    pub peak_to_peak: f64,
}

impl ChannelStats {
    /// Statistics over the finite values of `data`; NaN cells are skipped
    pub fn calculate(data: &[f64]) -> Self {
        let values: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
        if values.is_empty() {
            return Self {
                count: 0,
                mean: 0.0,
                std_dev: 0.0,
                rms: 0.0,
                min: 0.0,
                max: 0.0,
                peak_to_peak: 0.0,
            };
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;

        let sum_sq: f64 = values.iter().map(|x| x * x).sum();
        let rms = (sum_sq / n).sqrt();

        // Sample standard deviation (ddof = 1)
        let std_dev = if values.len() > 1 {
            let ss: f64 = values.iter().map(|x| (x - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt()
        } else {
            0.0
        };

        let min = values.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        let max = values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));

        Self {
            count: values.len(),
            mean,
            std_dev,
            rms,
            min,
            max,
            peak_to_peak: max - min,
        }
    }
}

/// Column-oriented table parsed from one CSV file
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    source: String,
    columns: Vec<Column>,
    rows: usize,
}

impl DataTable {
    /// Parse a CSV file
    pub fn from_path(path: impl AsRef<Path>) -> HandEmgResult<Self> {
        let path = path.as_ref();
        let source = path.display().to_string();

        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => HandEmgError::FileNotFound { path: source.clone() },
            _ => HandEmgError::Io { reason: format!("{}: {}", source, e) },
        })?;

        Self::from_reader(&source, file)
    }

    /// Parse CSV content from any reader; `source` names it in errors
    pub fn from_reader<R: Read>(source: &str, reader: R) -> HandEmgResult<Self> {
        let parse_error = |err: csv::Error| HandEmgError::ParseError {
            path: source.to_string(),
            line: err.position().map(|p| p.line()),
            reason: err.to_string(),
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(parse_error)?
            .iter()
            .map(str::to_string)
            .collect();

        if headers.is_empty() || headers.iter().all(String::is_empty) {
            return Err(HandEmgError::ParseError {
                path: source.to_string(),
                line: Some(1),
                reason: "missing header row".to_string(),
            });
        }

        for (i, name) in headers.iter().enumerate() {
            if headers[..i].contains(name) {
                return Err(HandEmgError::ParseError {
                    path: source.to_string(),
                    line: Some(1),
                    reason: format!("duplicate column '{}'", name),
                });
            }
        }

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        let mut rows = 0;
        for record in reader.records() {
            let record = record.map_err(parse_error)?;
            for (column, field) in cells.iter_mut().zip(record.iter()) {
                column.push(field.to_string());
            }
            rows += 1;
        }

        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(name, cells)| Column { name, data: ColumnData::infer(cells) })
            .collect();

        Ok(DataTable {
            source: source.to_string(),
            columns,
            rows,
        })
    }

    /// Where the table was read from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns.len())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn dtypes(&self) -> Vec<(&str, DataType)> {
        self.columns.iter().map(|c| (c.name.as_str(), c.dtype())).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Look up a column, naming the available ones on failure
    pub fn column(&self, name: &str) -> HandEmgResult<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| HandEmgError::MissingColumn {
                column: name.to_string(),
                available: self.column_names().into_iter().map(str::to_string).collect(),
            })
    }

    pub fn numeric_column(&self, name: &str) -> HandEmgResult<Vec<f64>> {
        self.column(name)?.as_f64()
    }

    pub fn bool_column(&self, name: &str) -> HandEmgResult<Vec<bool>> {
        self.column(name)?.as_bool()
    }

    /// Statistics for every numeric column, in column order
    pub fn describe_numeric(&self) -> Vec<(&str, ChannelStats)> {
        self.columns
            .iter()
            .filter(|c| c.dtype().is_numeric())
            .filter_map(|c| c.as_f64().ok().map(|v| (c.name.as_str(), ChannelStats::calculate(&v))))
            .collect()
    }

    /// Text preview of the first `n` rows with a row index column
    pub fn head(&self, n: usize) -> String {
        let shown = n.min(self.rows);
        let index_width = shown.saturating_sub(1).to_string().len();

        let rendered: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|c| (0..shown).map(|row| c.data.cell(row)).collect())
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .zip(&rendered)
            .map(|(c, cells)| cells.iter().map(String::len).chain([c.name.len()]).max().unwrap_or(0))
            .collect();

        let mut out = String::new();
        out.push_str(&" ".repeat(index_width));
        for (column, width) in self.columns.iter().zip(&widths) {
            out.push_str(&format!("  {:>width$}", column.name, width = width));
        }
        out.push('\n');

        for row in 0..shown {
            out.push_str(&format!("{:>width$}", row, width = index_width));
            for (cells, width) in rendered.iter().zip(&widths) {
                out.push_str(&format!("  {:>width$}", cells[row], width = width));
            }
            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "timestamp,is_left,thumb_mcp_quat_0,label\n\
                          1,True,0.5,a\n\
                          2,False,0.25,b\n\
                          3,True,,c\n";

    #[test]
    fn test_shape_and_dtypes() {
        let table = DataTable::from_reader("sample", SAMPLE.as_bytes()).unwrap();

        assert_eq!(table.shape(), (3, 4));
        assert_eq!(
            table.dtypes(),
            vec![
                ("timestamp", DataType::Int64),
                ("is_left", DataType::Bool),
                ("thumb_mcp_quat_0", DataType::Float64),
                ("label", DataType::Object),
            ]
        );
    }

    #[test]
    fn test_missing_cells_are_nan() {
        let table = DataTable::from_reader("sample", SAMPLE.as_bytes()).unwrap();
        let values = table.numeric_column("thumb_mcp_quat_0").unwrap();
        assert_eq!(values[0], 0.5);
        assert!(values[2].is_nan());
    }

    #[test]
    fn test_missing_column_lists_available() {
        let table = DataTable::from_reader("sample", SAMPLE.as_bytes()).unwrap();
        match table.column("emg") {
            Err(HandEmgError::MissingColumn { column, available }) => {
                assert_eq!(column, "emg");
                assert_eq!(available.len(), 4);
                assert!(available.contains(&"is_left".to_string()));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_object_column_is_not_numeric() {
        let table = DataTable::from_reader("sample", SAMPLE.as_bytes()).unwrap();
        assert!(matches!(
            table.numeric_column("label"),
            Err(HandEmgError::ColumnType { expected: "numeric", .. })
        ));
    }

    #[test]
    fn test_bool_from_integer_flags() {
        let table = DataTable::from_reader("flags", "t,is_left\n0,1\n1,0\n2,1\n".as_bytes()).unwrap();
        assert_eq!(table.bool_column("is_left").unwrap(), vec![true, false, true]);
        assert!(table.bool_column("t").is_err());
    }

    #[test]
    fn test_ragged_row_is_parse_error() {
        let result = DataTable::from_reader("ragged", "a,b\n1,2\n3\n".as_bytes());
        match result {
            Err(HandEmgError::ParseError { line, .. }) => assert_eq!(line, Some(3)),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let result = DataTable::from_reader("dup", "a,a\n1,2\n".as_bytes());
        assert!(matches!(result, Err(HandEmgError::ParseError { .. })));
    }

    #[test]
    fn test_header_only_table() {
        let table = DataTable::from_reader("empty", "a,b\n".as_bytes()).unwrap();
        assert_eq!(table.shape(), (0, 2));
        assert_eq!(table.dtypes()[0].1, DataType::Object);
    }

    #[test]
    fn test_head_preview() {
        let table = DataTable::from_reader("sample", SAMPLE.as_bytes()).unwrap();
        let preview = table.head(2);
        let lines: Vec<&str> = preview.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("thumb_mcp_quat_0"));
        assert!(lines[1].contains("True"));
        assert!(lines[2].contains("0.250000"));
    }

    #[test]
    fn test_channel_stats() {
        let stats = ChannelStats::calculate(&[1.0, 2.0, 3.0, 4.0, f64::NAN]);
        assert_eq!(stats.count, 4);
        assert!((stats.mean - 2.5).abs() < 1e-12);
        assert!((stats.std_dev - 1.290_994_448_7).abs() < 1e-9);
        assert_eq!(stats.peak_to_peak, 3.0);
    }

    #[test]
    fn test_describe_numeric_skips_objects() {
        let table = DataTable::from_reader("sample", SAMPLE.as_bytes()).unwrap();
        let names: Vec<&str> = table.describe_numeric().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["timestamp", "is_left", "thumb_mcp_quat_0"]);
    }
}
