//! Export module for simulation results.
//!
//! # Architecture
//!
//! This module defines the [`Exporter`] trait that abstracts the export format.
//! Each format is an independent implementation in its own sub-module, so a
//! new format is a new file.
//!
//! # Available formats
//!
//! | Format  | Module          |
//! |---------|-----------------|
//! | CSV     | [`csv`]         |
//!
//! # Usage example
//!
//! ```rust,ignore
//! use seird_rs::output::export::{CsvExporter, Exporter};
//!
//! let exporter = CsvExporter::default();
//!
//! // Full export (every output time)
//! exporter.export(&trajectory, None, "world.csv")?;
//!
//! // Downsampled export to 50 rows
//! exporter.export(&trajectory, Some(50), "world_light.csv")?;
//! ```

pub mod csv;

pub use csv::{CsvConfig, CsvExporter, CsvMetadata};

use std::path::Path;

use super::OutputError;
use crate::solver::Trajectory;

/// Abstraction trait for all export formats.
///
/// # Parameter `n_points`
///
/// - `None`: exports every output time (default behaviour)
/// - `Some(n)`: uniformly downsamples to `n` rows, always keeping the
///   **first and last** rows (initial state and final outcome)
pub trait Exporter {
    /// Error type specific to this export format.
    type Error: std::error::Error;

    /// Write `trajectory` to `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created, the trajectory holds
    /// no data or `n_points` is smaller than 2.
    fn export<P: AsRef<Path>>(
        &self,
        trajectory: &Trajectory,
        n_points: Option<usize>,
        path: P,
    ) -> Result<(), Self::Error>;
}

/// Row indices kept when downsampling `len` rows to `n_points`
///
/// Indices are evenly spread, strictly increasing, and always include
/// `0` and `len - 1`.
pub(crate) fn sample_indices(len: usize, n_points: Option<usize>) -> Result<Vec<usize>, OutputError> {
    let Some(n) = n_points else {
        return Ok((0..len).collect());
    };

    if n < 2 {
        return Err(OutputError::InvalidData(format!(
            "downsampling needs at least 2 points (first and last), got {n}"
        )));
    }
    if n >= len {
        return Ok((0..len).collect());
    }

    let stride = (len - 1) as f64 / (n - 1) as f64;
    let mut indices: Vec<usize> = (0..n).map(|i| (i as f64 * stride).round() as usize).collect();
    indices.dedup();
    Ok(indices)
}
