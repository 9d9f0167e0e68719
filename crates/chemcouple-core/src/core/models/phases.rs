use crate::core::io::script::ScriptError;
use crate::core::io::traits::SystemBlock;
use crate::core::models::lookup::{EntityKind, Named};
use std::io::Write;

fn value_at(
    values: &[f64],
    name: &str,
    kind: EntityKind,
    global_id: usize,
) -> Result<f64, ScriptError> {
    values
        .get(global_id)
        .copied()
        .ok_or_else(|| ScriptError::MissingSystemValue {
            kind,
            name: name.to_string(),
            global_id,
        })
}

/// A solid phase brought to equilibrium with the solution in every system.
#[derive(Debug, Clone, PartialEq)]
pub struct EquilibriumPhase {
    pub name: String,
    pub saturation_index: f64,
    pub amount: Vec<f64>, // Indexed by global node id
}

impl EquilibriumPhase {
    pub fn new(name: impl Into<String>, saturation_index: f64, amount: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            saturation_index,
            amount,
        }
    }

    pub fn uniform(
        name: impl Into<String>,
        saturation_index: f64,
        initial_amount: f64,
        extent: usize,
    ) -> Self {
        Self::new(name, saturation_index, vec![initial_amount; extent])
    }
}

impl Named for EquilibriumPhase {
    const KIND: EntityKind = EntityKind::EquilibriumPhase;

    fn name(&self) -> &str {
        &self.name
    }
}

impl SystemBlock for EquilibriumPhase {
    fn write_for_system(
        &self,
        writer: &mut impl Write,
        global_id: usize,
    ) -> Result<(), ScriptError> {
        let amount = value_at(&self.amount, &self.name, Self::KIND, global_id)?;
        writeln!(writer, "{} {} {}", self.name, self.saturation_index, amount)?;
        Ok(())
    }
}

/// A reactant whose dissolution or precipitation is integrated over the step length.
#[derive(Debug, Clone, PartialEq)]
pub struct KineticReactant {
    pub name: String,
    pub chemical_formula: Option<String>,
    pub parameters: Vec<f64>,
    pub amount: Vec<f64>, // Indexed by global node id
}

impl KineticReactant {
    pub fn new(name: impl Into<String>, amount: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            chemical_formula: None,
            parameters: Vec::new(),
            amount,
        }
    }

    pub fn uniform(name: impl Into<String>, initial_amount: f64, extent: usize) -> Self {
        Self::new(name, vec![initial_amount; extent])
    }

    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.chemical_formula = Some(formula.into());
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<f64>) -> Self {
        self.parameters = parameters;
        self
    }
}

impl Named for KineticReactant {
    const KIND: EntityKind = EntityKind::KineticReactant;

    fn name(&self) -> &str {
        &self.name
    }
}

impl SystemBlock for KineticReactant {
    fn write_for_system(
        &self,
        writer: &mut impl Write,
        global_id: usize,
    ) -> Result<(), ScriptError> {
        let amount = value_at(&self.amount, &self.name, Self::KIND, global_id)?;
        writeln!(writer, "{}", self.name)?;
        if let Some(formula) = &self.chemical_formula {
            writeln!(writer, "-formula {}", formula)?;
        }
        writeln!(writer, "-m {}", amount)?;
        if !self.parameters.is_empty() {
            write!(writer, "-parms")?;
            for parameter in &self.parameters {
                write!(writer, " {}", parameter)?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}

/// A sorption site type; written under `-sites_units DENSITY`.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSite {
    pub name: String,
    pub site_density: f64,          // sites/nm^2
    pub specific_surface_area: f64, // m^2/g
    pub mass: Vec<f64>,             // g of sorbent, indexed by global node id
}

impl SurfaceSite {
    pub fn uniform(
        name: impl Into<String>,
        site_density: f64,
        specific_surface_area: f64,
        mass: f64,
        extent: usize,
    ) -> Self {
        Self {
            name: name.into(),
            site_density,
            specific_surface_area,
            mass: vec![mass; extent],
        }
    }
}

impl Named for SurfaceSite {
    const KIND: EntityKind = EntityKind::SurfaceSite;

    fn name(&self) -> &str {
        &self.name
    }
}

impl SystemBlock for SurfaceSite {
    fn write_for_system(
        &self,
        writer: &mut impl Write,
        global_id: usize,
    ) -> Result<(), ScriptError> {
        let mass = value_at(&self.mass, &self.name, Self::KIND, global_id)?;
        writeln!(
            writer,
            "{} {} {} {}",
            self.name, self.site_density, self.specific_surface_area, mass
        )?;
        Ok(())
    }
}
