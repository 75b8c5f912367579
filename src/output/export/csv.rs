//! CSV export of simulation trajectories
//!
//! Writes one row per output time: `time` followed by one column per state
//! component (Susceptible, Exposed, Infected, Recovered, Dead for SEIRD).
//! The format opens directly in spreadsheets, pandas or R.
//!
//! # Features
//!
//! - **Metadata header**: optional `#` comment block with model, solver,
//!   parameters and generation timestamp
//! - **Customizable**: delimiter, decimal separator, precision
//! - **Downsampling**: uniform, first and last rows always kept
//! - **Validation**: NaN/Inf and inconsistent separators are rejected
//!
//! # Example
//!
//! ```rust,ignore
//! use seird_rs::output::export::{CsvConfig, CsvExporter, CsvMetadata, Exporter};
//!
//! let metadata = CsvMetadata::from_trajectory(&trajectory).with_parameters(&parameters);
//! let exporter = CsvExporter::new(CsvConfig::default().with_metadata(metadata));
//! exporter.export(&trajectory, None, "run.csv")?;
//! ```
//!
//! **Output** (`run.csv`):
//! ```csv
//! # SEIRD Simulation Data
//! # Generated: 2026-02-11T15:30:00+00:00
//! # Model: SEIRD
//! # Solver: Dormand-Prince 5(4)
//! # population: 8000000000
//! # beta: 1
//! # ...
//! #
//! time,Susceptible,Exposed,Infected,Recovered,Dead
//! 0.000000,7999199999.000000,0.000000,1.000000,0.000000,0.000000
//! ...
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{Exporter, sample_indices};
use crate::model::SeirdParameters;
use crate::output::OutputError;
use crate::solver::Trajectory;

// =============================================================================
// Configuration Structures
// =============================================================================

/// Configuration for CSV export
///
/// ```rust
/// use seird_rs::output::export::CsvConfig;
///
/// let config = CsvConfig {
///     delimiter: ';',
///     precision: 10,
///     ..Default::default()
/// };
/// assert!(!config.include_metadata);
/// ```
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Column delimiter (default: ',')
    pub delimiter: char,

    /// Decimal separator (default: '.')
    pub decimal_separator: char,

    /// Number of decimal places (default: 6)
    pub precision: usize,

    /// Include the `#` metadata header (default: false)
    pub include_metadata: bool,

    pub metadata: Option<CsvMetadata>,

    /// Header of the first column (default: "time")
    pub time_header: String,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            decimal_separator: '.',
            precision: 6,
            include_metadata: false,
            metadata: None,
            time_header: "time".to_string(),
        }
    }
}

impl CsvConfig {
    /// Semicolon-delimited, comma as decimal separator
    pub fn european() -> Self {
        Self {
            delimiter: ';',
            decimal_separator: ',',
            ..Default::default()
        }
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Enable the metadata header
    pub fn with_metadata(mut self, metadata: CsvMetadata) -> Self {
        self.include_metadata = true;
        self.metadata = Some(metadata);
        self
    }

    fn validate(&self) -> Result<(), OutputError> {
        if self.delimiter == self.decimal_separator {
            return Err(OutputError::InvalidData(format!(
                "delimiter and decimal separator are both '{}'",
                self.delimiter
            )));
        }
        Ok(())
    }
}

/// Content of the `#` header block; only `Some`/non-empty fields are written
#[derive(Debug, Clone, Default)]
pub struct CsvMetadata {
    pub model_name: Option<String>,
    pub solver_name: Option<String>,

    /// `(name, value)` pairs, written one per line
    pub parameters: Vec<(String, f64)>,

    pub custom: Vec<(String, String)>,
}

impl CsvMetadata {
    /// Model and solver names as recorded in the trajectory metadata
    pub fn from_trajectory(trajectory: &Trajectory) -> Self {
        Self {
            model_name: trajectory.get_metadata("model").map(str::to_string),
            solver_name: trajectory.get_metadata("solver").map(str::to_string),
            ..Default::default()
        }
    }

    pub fn with_parameters(mut self, parameters: &SeirdParameters) -> Self {
        self.parameters = parameters
            .named_values()
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect();
        self
    }

    pub fn add_custom(&mut self, key: &str, value: &str) {
        self.custom.push((key.to_string(), value.to_string()));
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn write_metadata_header<W: Write>(writer: &mut W, metadata: &CsvMetadata) -> Result<(), OutputError> {
    writeln!(writer, "# SEIRD Simulation Data")?;
    writeln!(writer, "# Generated: {}", chrono::Utc::now().to_rfc3339())?;

    if let Some(model) = &metadata.model_name {
        writeln!(writer, "# Model: {}", model)?;
    }
    if let Some(solver) = &metadata.solver_name {
        writeln!(writer, "# Solver: {}", solver)?;
    }
    for (name, value) in &metadata.parameters {
        writeln!(writer, "# {}: {}", name, value)?;
    }
    for (key, value) in &metadata.custom {
        writeln!(writer, "# {}: {}", key, value)?;
    }

    writeln!(writer, "#")?;
    Ok(())
}

/// Format number with configured precision and decimal separator
fn format_number(value: f64, config: &CsvConfig) -> String {
    let formatted = format!("{:.prec$}", value, prec = config.precision);

    if config.decimal_separator != '.' {
        formatted.replace('.', &config.decimal_separator.to_string())
    } else {
        formatted
    }
}

// =============================================================================
// Writer
// =============================================================================

/// Write `trajectory` as CSV to any writer
///
/// # Errors
///
/// - `EmptyTrajectory` when there is nothing to write
/// - `InvalidData` for NaN/Inf values, `n_points < 2` or a delimiter equal
///   to the decimal separator
/// - `Io` for write failures
pub fn write_trajectory<W: Write>(
    writer: &mut W,
    trajectory: &Trajectory,
    n_points: Option<usize>,
    config: &CsvConfig,
) -> Result<(), OutputError> {
    // ============================= Validation =============================

    if trajectory.is_empty() {
        return Err(OutputError::EmptyTrajectory);
    }
    config.validate()?;

    for (t, state) in trajectory.iter() {
        if !t.is_finite() || state.iter().any(|v| !v.is_finite()) {
            return Err(OutputError::InvalidData(format!("NaN or Inf in state at t = {t}")));
        }
    }

    let rows = sample_indices(trajectory.len(), n_points)?;

    // ============================= Write Metadata =========================

    if config.include_metadata
        && let Some(metadata) = &config.metadata
    {
        write_metadata_header(writer, metadata)?;
    }

    // ============================= Write Header ===========================

    write!(writer, "{}", config.time_header)?;
    for label in trajectory.labels() {
        write!(writer, "{}{}", config.delimiter, label)?;
    }
    writeln!(writer)?;

    // ============================= Write Data =============================

    let times = trajectory.times();
    let states = trajectory.states();

    for row in rows {
        write!(writer, "{}", format_number(times[row], config))?;
        for value in states[row].iter() {
            write!(writer, "{}{}", config.delimiter, format_number(*value, config))?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

// =============================================================================
// Exporter
// =============================================================================

/// CSV implementation of [`Exporter`]
#[derive(Debug, Clone, Default)]
pub struct CsvExporter {
    pub config: CsvConfig,
}

impl CsvExporter {
    pub fn new(config: CsvConfig) -> Self {
        Self { config }
    }
}

impl Exporter for CsvExporter {
    type Error = OutputError;

    fn export<P: AsRef<Path>>(
        &self,
        trajectory: &Trajectory,
        n_points: Option<usize>,
        path: P,
    ) -> Result<(), OutputError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        write_trajectory(&mut writer, trajectory, n_points, &self.config)?;

        log::info!("trajectory exported to {}", path.display());
        Ok(())
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SolverStats;
    use nalgebra::DVector;
    use std::fs;
    use tempfile::NamedTempFile;

    fn labels() -> Vec<String> {
        ["Susceptible", "Exposed", "Infected", "Recovered", "Dead"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn sample(n: usize) -> Trajectory {
        let times: Vec<f64> = (0..n).map(|i| i as f64 * 0.5).collect();
        let states = (0..n)
            .map(|i| {
                let x = i as f64;
                DVector::from_vec(vec![100.0 - x, x * 0.25, x * 0.5, x * 0.2, x * 0.05])
            })
            .collect();
        let mut trajectory = Trajectory::new(times, states, labels(), SolverStats::default());
        trajectory.add_metadata("model", "SEIRD");
        trajectory.add_metadata("solver", "Forward Euler");
        trajectory
    }

    fn to_string(trajectory: &Trajectory, n_points: Option<usize>, config: &CsvConfig) -> String {
        let mut buffer = Vec::new();
        write_trajectory(&mut buffer, trajectory, n_points, config).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_header_and_rows() {
        let csv = to_string(&sample(3), None, &CsvConfig::default());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "time,Susceptible,Exposed,Infected,Recovered,Dead");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "0.000000,100.000000,0.000000,0.000000,0.000000,0.000000");
        assert!(lines[3].starts_with("1.000000,98.000000,0.500000"));
    }

    #[test]
    fn test_european_format() {
        let config = CsvConfig::european().precision(2);
        let csv = to_string(&sample(2), None, &config);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "time;Susceptible;Exposed;Infected;Recovered;Dead");
        assert_eq!(lines[2], "0,50;99,00;0,25;0,50;0,20;0,05");
    }

    #[test]
    fn test_conflicting_separators_rejected() {
        let config = CsvConfig {
            decimal_separator: ',',
            ..Default::default()
        };
        let mut buffer = Vec::new();
        let result = write_trajectory(&mut buffer, &sample(2), None, &config);
        assert!(matches!(result, Err(OutputError::InvalidData(_))));
    }

    #[test]
    fn test_metadata_header() {
        let trajectory = sample(2);
        let parameters = SeirdParameters::new(1000.0, 1.0, 0.5, 0.4, 0.01).unwrap();
        let mut metadata = CsvMetadata::from_trajectory(&trajectory).with_parameters(&parameters);
        metadata.add_custom("Scenario", "moderate");

        let csv = to_string(&trajectory, None, &CsvConfig::default().with_metadata(metadata));

        assert!(csv.starts_with("# SEIRD Simulation Data\n# Generated: "));
        assert!(csv.contains("# Model: SEIRD\n"));
        assert!(csv.contains("# Solver: Forward Euler\n"));
        assert!(csv.contains("# beta: 1\n"));
        assert!(csv.contains("# Scenario: moderate\n"));

        let data: Vec<&str> = csv.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn test_downsampling_keeps_first_and_last() {
        let trajectory = sample(101);
        let csv = to_string(&trajectory, Some(5), &CsvConfig::default().precision(1));
        let lines: Vec<&str> = csv.lines().skip(1).collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("0.0,"));
        assert!(lines[4].starts_with("50.0,"));
    }

    #[test]
    fn test_non_finite_rejected() {
        let states = vec![
            DVector::from_vec(vec![1.0, 0.0, 0.0, 0.0, 0.0]),
            DVector::from_vec(vec![f64::NAN, 0.0, 0.0, 0.0, 0.0]),
        ];
        let trajectory = Trajectory::new(vec![0.0, 1.0], states, labels(), SolverStats::default());

        let mut buffer = Vec::new();
        let result = write_trajectory(&mut buffer, &trajectory, None, &CsvConfig::default());
        assert!(matches!(result, Err(OutputError::InvalidData(_))));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_export_to_file() {
        let file = NamedTempFile::new().unwrap();
        CsvExporter::default().export(&sample(4), None, file.path()).unwrap();

        let content = fs::read_to_string(file.path()).unwrap();
        assert_eq!(content.lines().count(), 5);
    }

    #[test]
    fn test_export_to_missing_directory() {
        let result = CsvExporter::default().export(&sample(2), None, "/nonexistent/dir/out.csv");
        assert!(matches!(result, Err(OutputError::Io(_))));
    }
}
