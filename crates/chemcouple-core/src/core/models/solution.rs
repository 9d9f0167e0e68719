use crate::core::io::script::ScriptError;
use crate::core::io::traits::ScriptBlock;
use crate::core::models::lookup::{self, EntityKind, LookupError, Named};
use crate::core::transport::{
    BindingRole, Direction, TransportBinding, TransportError, TransportVector, hydrogen_from_ph,
    ph_from_hydrogen,
};
use serde::Deserialize;
use std::io::Write;

#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub name: String,
    pub amount: f64,
    pub chemical_formula: Option<String>, // Written as `as <formula>` when present
}

impl Component {
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount,
            chemical_formula: None,
        }
    }

    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.chemical_formula = Some(formula.into());
        self
    }
}

impl Named for Component {
    const KIND: EntityKind = EntityKind::Component;

    fn name(&self) -> &str {
        &self.name
    }
}

/// Which quantity the engine adjusts to reach electroneutrality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChargeBalance {
    #[default]
    None,
    #[serde(rename = "pH")]
    Ph,
    #[serde(rename = "pe")]
    Pe,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AqueousSolution {
    pub temperature: f64, // deg C
    pub pressure: f64,    // atm
    pub ph: f64,
    pub pe: f64,
    pub charge_balance: ChargeBalance,
    pub components: Vec<Component>,
}

impl Default for AqueousSolution {
    fn default() -> Self {
        Self {
            temperature: 25.0,
            pressure: 1.0,
            ph: 7.0,
            pe: 4.0,
            charge_balance: ChargeBalance::None,
            components: Vec::new(),
        }
    }
}

impl AqueousSolution {
    pub fn new(components: Vec<Component>) -> Self {
        Self {
            components,
            ..Self::default()
        }
    }

    pub fn component(&self, name: &str) -> Result<&Component, LookupError> {
        lookup::find_by_name(&self.components, name)
    }

    pub fn component_mut(&mut self, name: &str) -> Result<&mut Component, LookupError> {
        lookup::find_by_name_mut(&mut self.components, name)
    }

    /// Moves values between this solution and the transport vectors for one node.
    ///
    /// Loading and storing share this traversal so every binding touched in one direction
    /// is touched in the other.
    pub fn exchange<V: TransportVector>(
        &mut self,
        vectors: &mut [V],
        bindings: &[TransportBinding],
        global_id: usize,
        direction: Direction,
    ) -> Result<(), TransportError> {
        for binding in bindings {
            let process_id = binding.process_id;
            let vector = vectors
                .get_mut(process_id)
                .ok_or(TransportError::MissingProcess { process_id })?;

            match (binding.role, direction) {
                (BindingRole::Component, Direction::Load) => {
                    let value = read_entry(vector, process_id, global_id)?;
                    self.component_mut(&binding.variable)?.amount = value;
                }
                (BindingRole::Component, Direction::Store) => {
                    let amount = self.component(&binding.variable)?.amount;
                    write_entry(vector, process_id, global_id, amount)?;
                }
                (BindingRole::Hydrogen, Direction::Load) => {
                    let value = read_entry(vector, process_id, global_id)?;
                    if value.is_nan() || value <= 0.0 {
                        return Err(TransportError::NonPositiveHydrogen { global_id, value });
                    }
                    self.ph = ph_from_hydrogen(value);
                }
                (BindingRole::Hydrogen, Direction::Store) => {
                    write_entry(vector, process_id, global_id, hydrogen_from_ph(self.ph))?;
                }
            }
        }
        Ok(())
    }

    pub fn load_from_transport<V: TransportVector>(
        &mut self,
        vectors: &mut [V],
        bindings: &[TransportBinding],
        global_id: usize,
    ) -> Result<(), TransportError> {
        self.exchange(vectors, bindings, global_id, Direction::Load)
    }

    pub fn store_to_transport<V: TransportVector>(
        &mut self,
        vectors: &mut [V],
        bindings: &[TransportBinding],
        global_id: usize,
    ) -> Result<(), TransportError> {
        self.exchange(vectors, bindings, global_id, Direction::Store)
    }
}

fn read_entry<V: TransportVector>(
    vector: &V,
    process_id: usize,
    global_id: usize,
) -> Result<f64, TransportError> {
    vector.get(global_id).ok_or(TransportError::MissingEntry {
        process_id,
        global_id,
    })
}

fn write_entry<V: TransportVector>(
    vector: &mut V,
    process_id: usize,
    global_id: usize,
    value: f64,
) -> Result<(), TransportError> {
    if vector.set(global_id, value) {
        Ok(())
    } else {
        Err(TransportError::MissingEntry {
            process_id,
            global_id,
        })
    }
}

impl ScriptBlock for AqueousSolution {
    fn write_block(&self, writer: &mut impl Write) -> Result<(), ScriptError> {
        writeln!(writer, "temp {}", self.temperature)?;
        writeln!(writer, "pressure {}", self.pressure)?;
        match self.charge_balance {
            ChargeBalance::Ph => {
                writeln!(writer, "pH {} charge", self.ph)?;
                writeln!(writer, "pe {}", self.pe)?;
            }
            ChargeBalance::Pe => {
                writeln!(writer, "pH {}", self.ph)?;
                writeln!(writer, "pe {} charge", self.pe)?;
            }
            ChargeBalance::None => {
                writeln!(writer, "pH {}", self.ph)?;
                writeln!(writer, "pe {}", self.pe)?;
            }
        }
        writeln!(writer, "units mol/kgw")?;
        for component in &self.components {
            match &component.chemical_formula {
                Some(formula) => {
                    writeln!(writer, "{} {} as {}", component.name, component.amount, formula)?
                }
                None => writeln!(writer, "{} {}", component.name, component.amount)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calcite_water() -> AqueousSolution {
        AqueousSolution::new(vec![
            Component::new("Ca", 1.0e-3),
            Component::new("C(4)", 2.0e-3).with_formula("HCO3"),
        ])
    }

    #[test]
    fn load_then_store_reproduces_transport_values() {
        let bindings = [
            TransportBinding::component(0, "Ca"),
            TransportBinding::hydrogen(1, "H"),
        ];
        let original = vec![vec![0.0, 4.2e-4], vec![0.0, 3.1e-8]];
        let mut vectors = original.clone();
        let mut solution = calcite_water();

        solution.load_from_transport(&mut vectors, &bindings, 1).unwrap();
        assert_eq!(solution.component("Ca").unwrap().amount, 4.2e-4);
        assert!((solution.ph - 7.508638306165727).abs() < 1e-9);

        vectors[0][1] = -1.0;
        vectors[1][1] = -1.0;
        solution.store_to_transport(&mut vectors, &bindings, 1).unwrap();

        assert_eq!(vectors[0][1], original[0][1]);
        assert!((vectors[1][1] - original[1][1]).abs() < 1e-20);
        assert_eq!(vectors[0][0], 0.0);
    }

    #[test]
    fn hydrogen_binding_does_not_touch_components() {
        let bindings = [TransportBinding::hydrogen(0, "H")];
        let mut vectors = vec![vec![1.0e-5]];
        let mut solution = calcite_water();
        let before = solution.components.clone();

        solution.load_from_transport(&mut vectors, &bindings, 0).unwrap();

        assert!((solution.ph - 5.0).abs() < 1e-12);
        assert_eq!(solution.components, before);
    }

    #[test]
    fn unknown_bound_component_is_a_lookup_error() {
        let bindings = [TransportBinding::component(0, "Na")];
        let mut vectors = vec![vec![1.0]];
        let err = calcite_water()
            .load_from_transport(&mut vectors, &bindings, 0)
            .unwrap_err();
        assert!(matches!(
            err,
            TransportError::Lookup(LookupError {
                kind: EntityKind::Component,
                ..
            })
        ));
    }

    #[test]
    fn missing_process_and_entry_are_reported() {
        let bindings = [TransportBinding::component(2, "Ca")];
        let mut vectors = vec![vec![1.0]];
        let err = calcite_water()
            .load_from_transport(&mut vectors, &bindings, 0)
            .unwrap_err();
        assert_eq!(err, TransportError::MissingProcess { process_id: 2 });

        let bindings = [TransportBinding::component(0, "Ca")];
        let err = calcite_water()
            .store_to_transport(&mut vectors, &bindings, 5)
            .unwrap_err();
        assert_eq!(
            err,
            TransportError::MissingEntry {
                process_id: 0,
                global_id: 5
            }
        );
    }

    #[test]
    fn non_positive_hydrogen_concentration_is_rejected() {
        let bindings = [TransportBinding::hydrogen(0, "H")];
        let mut vectors = vec![vec![0.0]];
        let err = calcite_water()
            .load_from_transport(&mut vectors, &bindings, 0)
            .unwrap_err();
        assert!(matches!(err, TransportError::NonPositiveHydrogen { .. }));
    }

    #[test]
    fn writes_solution_body_with_charge_keyword() {
        let mut solution = calcite_water();
        solution.charge_balance = ChargeBalance::Ph;
        let mut buffer = Vec::new();
        solution.write_block(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "temp 25\npressure 1\npH 7 charge\npe 4\nunits mol/kgw\nCa 0.001\nC(4) 0.002 as HCO3\n"
        );
    }
}
