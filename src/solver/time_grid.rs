//! Output time grid
//!
//! The grid lists the times at which the trajectory is reported. Adaptive
//! solvers choose their own internal steps and only report at these times.

use std::ops::Index;

use crate::error::{Result, SimulationError};

/// Strictly increasing, non-empty sequence of finite output times
///
/// # Example
///
/// ```rust
/// use seird_rs::solver::TimeGrid;
///
/// let grid = TimeGrid::linspace(0.0, 10.0, 11).unwrap();
/// assert_eq!(grid.len(), 11);
/// assert_eq!(grid[3], 3.0);
/// assert_eq!(grid.end(), 10.0);
///
/// assert!(TimeGrid::new(vec![0.0, 2.0, 1.0]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    points: Vec<f64>,
}

impl TimeGrid {
    /// Build a grid from explicit times
    ///
    /// # Errors
    ///
    /// `InvalidParameter` when the list is empty, contains a non-finite
    /// value, or is not strictly increasing.
    pub fn new(points: Vec<f64>) -> Result<Self> {
        if points.is_empty() {
            return Err(SimulationError::invalid_parameter(
                "time grid",
                0.0,
                "at least one output time is required",
            ));
        }

        if let Some(bad) = points.iter().find(|t| !t.is_finite()) {
            return Err(SimulationError::invalid_parameter(
                "time grid",
                *bad,
                "output times must be finite",
            ));
        }

        if let Some(pair) = points.windows(2).find(|w| w[1] <= w[0]) {
            return Err(SimulationError::invalid_parameter(
                "time grid",
                pair[1],
                format!("output times must be strictly increasing (follows {})", pair[0]),
            ));
        }

        Ok(Self { points })
    }

    /// `count` evenly spaced times from `start` to `end` (both included)
    ///
    /// The last point is exactly `end`. A single-point grid is `[start]`.
    pub fn linspace(start: f64, end: f64, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(SimulationError::invalid_parameter(
                "time points",
                0.0,
                "at least one output time is required",
            ));
        }
        if count == 1 {
            return Self::new(vec![start]);
        }
        if !start.is_finite() || !end.is_finite() || end <= start {
            return Err(SimulationError::invalid_parameter(
                "time end",
                end,
                format!("must be greater than the start time {}", start),
            ));
        }

        let span = end - start;
        let last = (count - 1) as f64;
        let mut points: Vec<f64> = (0..count)
            .map(|i| start + span * (i as f64) / last)
            .collect();
        points[count - 1] = end;

        Self::new(points)
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: a grid holds at least one time
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start(&self) -> f64 {
        self.points[0]
    }

    pub fn end(&self) -> f64 {
        self.points[self.points.len() - 1]
    }

    /// Consecutive `(t_i, t_{i+1})` pairs
    pub fn intervals(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.points.iter()
    }
}

impl Index<usize> for TimeGrid {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.points[index]
    }
}
