//! Compartments of the SEIRD model
//!
//! - `Compartment`: type-safe identifier of a sub-population
//! - `Compartments`: the five sub-population sizes at one instant

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

use crate::error::{Result, SimulationError};

// =================================================================================================
// Compartment (Type-safe Identifier)
// =================================================================================================

/// Mutually exclusive sub-population category
///
/// The discriminant order is the state-vector order used by the solver:
/// S = 0, E = 1, I = 2, R = 3, D = 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Compartment {
    /// Never infected, can be infected
    Susceptible,

    /// Infected but not yet infectious (incubation)
    Exposed,

    /// Infectious
    Infected,

    /// Recovered and immune
    Recovered,

    /// Died from the disease
    Dead,
}

impl Compartment {
    /// All compartments, in state-vector order
    pub const ALL: [Compartment; 5] = [
        Compartment::Susceptible,
        Compartment::Exposed,
        Compartment::Infected,
        Compartment::Recovered,
        Compartment::Dead,
    ];

    /// Number of compartments
    pub const COUNT: usize = 5;

    /// Position in the state vector
    pub fn index(self) -> usize {
        match self {
            Compartment::Susceptible => 0,
            Compartment::Exposed => 1,
            Compartment::Infected => 2,
            Compartment::Recovered => 3,
            Compartment::Dead => 4,
        }
    }

    /// Compartment stored at `index` in the state vector
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            Compartment::Susceptible => "Susceptible",
            Compartment::Exposed => "Exposed",
            Compartment::Infected => "Infected",
            Compartment::Recovered => "Recovered",
            Compartment::Dead => "Dead",
        }
    }

    /// One-letter symbol (S, E, I, R, D)
    pub fn symbol(self) -> char {
        match self {
            Compartment::Susceptible => 'S',
            Compartment::Exposed => 'E',
            Compartment::Infected => 'I',
            Compartment::Recovered => 'R',
            Compartment::Dead => 'D',
        }
    }
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =================================================================================================
// Compartments (Compartment Vector)
// =================================================================================================

/// Sizes of the five sub-populations at one instant
///
/// Built from user input through [`Compartments::new`], which rejects
/// negative and non-finite values. Values read back from a trajectory
/// ([`Compartments::from_state`]) are reported as computed, without clipping.
///
/// # Example
///
/// ```rust
/// use seird_rs::model::{Compartment, Compartments};
///
/// let initial = Compartments::new(999.0, 0.0, 1.0, 0.0, 0.0).unwrap();
/// assert_eq!(initial.total(), 1000.0);
/// assert_eq!(initial[Compartment::Infected], 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CompartmentValues", into = "CompartmentValues")]
pub struct Compartments {
    values: [f64; 5],
}

impl Compartments {
    /// Create a validated compartment vector
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if any value is negative, NaN or infinite.
    pub fn new(susceptible: f64, exposed: f64, infected: f64, recovered: f64, dead: f64) -> Result<Self> {
        let values = [susceptible, exposed, infected, recovered, dead];

        for (compartment, value) in Compartment::ALL.iter().zip(values.iter()) {
            if !value.is_finite() {
                return Err(SimulationError::invalid_parameter(
                    compartment.label(),
                    *value,
                    "initial compartment size must be finite",
                ));
            }
            if *value < 0.0 {
                return Err(SimulationError::invalid_parameter(
                    compartment.label(),
                    *value,
                    "initial compartment size must be non-negative",
                ));
            }
        }

        Ok(Self { values })
    }

    /// Read a solver state vector back as compartments
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if the vector does not have exactly five components.
    pub fn from_state(state: &DVector<f64>) -> Result<Self> {
        if state.len() != Compartment::COUNT {
            return Err(SimulationError::invalid_parameter(
                "state dimension",
                state.len() as f64,
                format!("a SEIRD state has {} components", Compartment::COUNT),
            ));
        }

        let mut values = [0.0; 5];
        values.copy_from_slice(state.as_slice());
        Ok(Self { values })
    }

    /// Convert to the solver's state vector
    pub fn to_state(&self) -> DVector<f64> {
        DVector::from_row_slice(&self.values)
    }

    /// Value of one compartment
    pub fn get(&self, compartment: Compartment) -> f64 {
        self.values[compartment.index()]
    }

    pub fn susceptible(&self) -> f64 {
        self.values[0]
    }

    pub fn exposed(&self) -> f64 {
        self.values[1]
    }

    pub fn infected(&self) -> f64 {
        self.values[2]
    }

    pub fn recovered(&self) -> f64 {
        self.values[3]
    }

    pub fn dead(&self) -> f64 {
        self.values[4]
    }

    /// S + E + I + R + D
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Values in state-vector order
    pub fn as_array(&self) -> [f64; 5] {
        self.values
    }
}

impl Index<Compartment> for Compartments {
    type Output = f64;

    fn index(&self, compartment: Compartment) -> &f64 {
        &self.values[compartment.index()]
    }
}

impl fmt::Display for Compartments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = Compartment::ALL
            .iter()
            .map(|c| format!("{}={:.6e}", c.symbol(), self.get(*c)))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Serialized form of [`Compartments`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CompartmentValues {
    susceptible: f64,
    #[serde(default)]
    exposed: f64,
    infected: f64,
    #[serde(default)]
    recovered: f64,
    #[serde(default)]
    dead: f64,
}

impl TryFrom<CompartmentValues> for Compartments {
    type Error = SimulationError;

    fn try_from(v: CompartmentValues) -> Result<Self> {
        Compartments::new(v.susceptible, v.exposed, v.infected, v.recovered, v.dead)
    }
}

impl From<Compartments> for CompartmentValues {
    fn from(c: Compartments) -> Self {
        Self {
            susceptible: c.susceptible(),
            exposed: c.exposed(),
            infected: c.infected(),
            recovered: c.recovered(),
            dead: c.dead(),
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compartment_order() {
        for (i, compartment) in Compartment::ALL.iter().enumerate() {
            assert_eq!(compartment.index(), i);
            assert_eq!(Compartment::from_index(i), Some(*compartment));
        }
        assert_eq!(Compartment::from_index(5), None);
    }

    #[test]
    fn test_compartment_labels() {
        assert_eq!(Compartment::Exposed.label(), "Exposed");
        assert_eq!(Compartment::Dead.symbol(), 'D');
        assert_eq!(Compartment::Infected.to_string(), "Infected");
    }

    #[test]
    fn test_new_compartments() {
        let c = Compartments::new(90.0, 4.0, 3.0, 2.0, 1.0).unwrap();
        assert_eq!(c.total(), 100.0);
        assert_eq!(c.exposed(), 4.0);
        assert_eq!(c[Compartment::Recovered], 2.0);
    }

    #[test]
    fn test_reject_negative_compartment() {
        let err = Compartments::new(10.0, -1.0, 0.0, 0.0, 0.0).unwrap_err();
        match err {
            SimulationError::InvalidParameter { name, value, .. } => {
                assert_eq!(name, "Exposed");
                assert_eq!(value, -1.0);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_reject_non_finite_compartment() {
        assert!(Compartments::new(f64::NAN, 0.0, 0.0, 0.0, 0.0).is_err());
        assert!(Compartments::new(1.0, 0.0, f64::INFINITY, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_state_round_trip_keeps_order() {
        let c = Compartments::new(5.0, 4.0, 3.0, 2.0, 1.0).unwrap();
        let state = c.to_state();
        assert_eq!(state.as_slice(), &[5.0, 4.0, 3.0, 2.0, 1.0]);
        assert_eq!(Compartments::from_state(&state).unwrap(), c);
    }

    #[test]
    fn test_from_state_wrong_dimension() {
        let state = DVector::from_vec(vec![1.0, 2.0]);
        assert!(Compartments::from_state(&state).is_err());
    }

    #[test]
    fn test_from_state_keeps_negative_values() {
        let state = DVector::from_vec(vec![1.0, -1e-9, 0.0, 0.0, 0.0]);
        let c = Compartments::from_state(&state).unwrap();
        assert_eq!(c.exposed(), -1e-9);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let c: Compartments = serde_json::from_str(r#"{"susceptible": 99.0, "infected": 1.0}"#).unwrap();
        assert_eq!(c.as_array(), [99.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        let parsed: std::result::Result<Compartments, _> =
            serde_json::from_str(r#"{"susceptible": 99.0, "infected": -1.0}"#);
        assert!(parsed.is_err());
    }
}
