use crate::core::io::dump::Dump;
use crate::core::io::output::OutputSchema;
use crate::core::io::traits::{ScriptBlock, write_all_for_system};
use crate::core::models::ids::{ChemicalSystemMap, block_id};
use crate::core::models::knobs::Knobs;
use crate::core::models::lookup::EntityKind;
use crate::core::models::rates::write_rates;
use crate::core::models::system::ChemicalSystems;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{kind} '{name}' holds no value for node {global_id}")]
    MissingSystemValue {
        kind: EntityKind,
        name: String,
        global_id: usize,
    },

    #[error("No aqueous solution exists for chemical system {local_id}")]
    MissingSolution { local_id: usize },
}

/// Solution number the surface of `global_id` equilibrates with.
///
/// When the previous-state block of that system is present it is numbered `N + global_id + 1`
/// and the surface equilibrates with it instead of the fresh solution.
pub fn surface_equilibration_id(
    num_systems: usize,
    global_id: usize,
    has_previous_solution: bool,
) -> usize {
    if has_previous_solution {
        num_systems + block_id(global_id)
    } else {
        block_id(global_id)
    }
}

/// Everything needed to render one engine input script.
#[derive(Debug, Clone, Copy)]
pub struct Script<'a> {
    pub knobs: &'a Knobs,
    pub schema: &'a OutputSchema,
    pub systems: &'a ChemicalSystems,
    pub system_map: &'a ChemicalSystemMap,
    pub dump: Option<&'a Dump>,
}

impl Script<'_> {
    /// Writes the full script; `dt` is `None` for the initial calculation.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or an entity has no value for one of the systems.
    pub fn write_to(&self, writer: &mut impl Write, dt: Option<f64>) -> Result<(), ScriptError> {
        self.knobs.write_block(writer)?;
        writeln!(writer)?;

        self.schema.write_block(writer)?;
        writeln!(writer)?;

        if let Some(user_punch) = &self.systems.user_punch {
            user_punch.write_block(writer)?;
            writeln!(writer)?;
        }

        if !self.systems.reaction_rates.is_empty() {
            write_rates(&self.systems.reaction_rates, writer)?;
            writeln!(writer)?;
        }

        for (local_id, global_id) in self.system_map.iter() {
            self.write_system(writer, local_id, global_id, dt)?;
        }

        if let Some(dump) = self.dump {
            dump.write_block(writer, self.system_map)?;
        }
        Ok(())
    }

    fn write_system(
        &self,
        writer: &mut impl Write,
        local_id: usize,
        global_id: usize,
        dt: Option<f64>,
    ) -> Result<(), ScriptError> {
        let id = block_id(global_id);
        let solution = self
            .systems
            .aqueous_solutions
            .get(local_id)
            .ok_or(ScriptError::MissingSolution { local_id })?;
        let previous_solution = self.dump.and_then(|dump| dump.previous_solution(local_id));

        writeln!(writer, "SOLUTION {}", id)?;
        solution.write_block(writer)?;
        writeln!(writer)?;
        if let Some(previous) = previous_solution {
            writeln!(writer, "{}", previous)?;
        }

        writeln!(writer, "USE solution none")?;
        writeln!(writer, "END")?;
        writeln!(writer)?;

        writeln!(writer, "USE solution {}", id)?;
        writeln!(writer)?;

        let phases = &self.systems.equilibrium_phases;
        if !phases.is_empty() {
            writeln!(writer, "EQUILIBRIUM_PHASES {}", id)?;
            write_all_for_system(phases, writer, global_id)?;
            writeln!(writer)?;
        }

        let reactants = &self.systems.kinetic_reactants;
        if !reactants.is_empty() {
            writeln!(writer, "KINETICS {}", id)?;
            write_all_for_system(reactants, writer, global_id)?;
            writeln!(writer, "-steps {}", dt.unwrap_or(0.0))?;
            writeln!(writer)?;
        }

        let surface = &self.systems.surface;
        if !surface.is_empty() {
            let equilibrate_with = surface_equilibration_id(
                self.system_map.len(),
                global_id,
                previous_solution.is_some(),
            );
            writeln!(writer, "SURFACE {}", id)?;
            writeln!(writer, "-equilibrate with solution {}", equilibrate_with)?;
            writeln!(writer, "-sites_units DENSITY")?;
            write_all_for_system(surface, writer, global_id)?;
            writeln!(writer)?;
            writeln!(writer, "SAVE solution {}", id)?;
        }

        writeln!(writer, "END")?;
        writeln!(writer)?;
        Ok(())
    }
}
