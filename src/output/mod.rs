//! Presentation of simulation results
//!
//! Everything in this module consumes a finished [`Trajectory`](crate::solver::Trajectory);
//! the computational core never prints, plots or writes files itself.
//!
//! # Architecture
//!
//! ```text
//! output/
//! ├── mod.rs              ← OutputError
//! ├── report.rs           ← RunReport (text summary of one run)
//! ├── visualization/      ← Epidemic curves (PNG/SVG via plotters)
//! │   ├── mod.rs
//! │   ├── config.rs
//! │   └── epidemic_curve.rs
//! └── export/             ← Data export
//!     ├── mod.rs
//!     └── csv.rs
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use seird_rs::config::{Preset, SimulationConfig};
//! use seird_rs::output::export::{CsvExporter, Exporter};
//! use seird_rs::output::visualization::plot_trajectory;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let trajectory = SimulationConfig::preset(Preset::Moderate)?.run()?;
//!
//! CsvExporter::default().export(&trajectory, None, "moderate.csv")?;
//! plot_trajectory(&trajectory, "moderate.png", None)?;
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

pub mod export;
pub mod report;
pub mod visualization;

pub use export::{CsvConfig, CsvExporter, CsvMetadata, Exporter};
pub use report::RunReport;
pub use visualization::{PlotConfig, plot_compartment_comparison, plot_trajectory};

/// Errors raised while writing results
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("nothing to write: trajectory is empty")]
    EmptyTrajectory,

    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Backend failure reported by plotters
    #[error("plotting failed: {0}")]
    Plot(String),
}
