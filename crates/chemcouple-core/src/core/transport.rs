//! The seam between the chemistry and the transport solver.
//!
//! The transport solver owns one global vector per transported quantity. The coupling only
//! ever touches them through indexed `get`/`set` and never keeps a reference past one call.

use crate::core::models::lookup::LookupError;
use serde::Deserialize;
use thiserror::Error;

/// Indexed access to one transport quantity over all mesh nodes.
pub trait TransportVector {
    fn get(&self, global_id: usize) -> Option<f64>;

    fn set(&mut self, global_id: usize, value: f64) -> bool;
}

impl TransportVector for Vec<f64> {
    fn get(&self, global_id: usize) -> Option<f64> {
        self.as_slice().get(global_id).copied()
    }

    fn set(&mut self, global_id: usize, value: f64) -> bool {
        match self.get_mut(global_id) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BindingRole {
    /// The transported value is the amount of the component with the same name.
    #[default]
    Component,
    /// The transported value is the hydrogen-ion concentration; the solution stores it as pH.
    Hydrogen,
}

/// Associates one transport process solution with a chemical quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportBinding {
    pub process_id: usize,
    pub variable: String,
    pub role: BindingRole,
}

impl TransportBinding {
    pub fn component(process_id: usize, variable: impl Into<String>) -> Self {
        Self {
            process_id,
            variable: variable.into(),
            role: BindingRole::Component,
        }
    }

    pub fn hydrogen(process_id: usize, variable: impl Into<String>) -> Self {
        Self {
            process_id,
            variable: variable.into(),
            role: BindingRole::Hydrogen,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Transport vectors -> chemical entities.
    Load,
    /// Chemical entities -> transport vectors.
    Store,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    #[error("No transport solution is available for process {process_id}")]
    MissingProcess { process_id: usize },

    #[error("Transport solution of process {process_id} has no entry for node {global_id}")]
    MissingEntry { process_id: usize, global_id: usize },

    #[error(
        "Hydrogen concentration {value} at node {global_id} is not positive; pH is undefined"
    )]
    NonPositiveHydrogen { global_id: usize, value: f64 },

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

pub fn ph_from_hydrogen(concentration: f64) -> f64 {
    -concentration.log10()
}

pub fn hydrogen_from_ph(ph: f64) -> f64 {
    10f64.powf(-ph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hydrogen_ph_inversion_round_trips() {
        for concentration in [1.0e-12, 3.7e-8, 1.0e-7, 2.5e-3, 0.9] {
            let restored = hydrogen_from_ph(ph_from_hydrogen(concentration));
            assert!((restored - concentration).abs() <= concentration * 1e-12);
        }
    }

    #[test]
    fn neutral_water_has_ph_seven() {
        assert!((ph_from_hydrogen(1.0e-7) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn vec_transport_vector_reports_out_of_range_access() {
        let mut vector = vec![1.0, 2.0];
        assert_eq!(TransportVector::get(&vector, 1), Some(2.0));
        assert_eq!(TransportVector::get(&vector, 2), None);
        assert!(TransportVector::set(&mut vector, 0, 5.0));
        assert!(!TransportVector::set(&mut vector, 2, 5.0));
        assert_eq!(vector, vec![5.0, 2.0]);
    }
}
