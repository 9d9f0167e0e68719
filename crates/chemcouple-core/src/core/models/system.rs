use super::phases::{EquilibriumPhase, KineticReactant, SurfaceSite};
use super::rates::ReactionRate;
use super::solution::AqueousSolution;
use super::user_punch::UserPunch;

/// Every chemical entity taking part in one coupling.
///
/// `aqueous_solutions` is indexed by local system position; the array-valued entities are
/// indexed by global node id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChemicalSystems {
    pub aqueous_solutions: Vec<AqueousSolution>,
    pub equilibrium_phases: Vec<EquilibriumPhase>,
    pub kinetic_reactants: Vec<KineticReactant>,
    pub reaction_rates: Vec<ReactionRate>,
    pub surface: Vec<SurfaceSite>,
    pub user_punch: Option<UserPunch>,
}

impl ChemicalSystems {
    pub fn num_systems(&self) -> usize {
        self.aqueous_solutions.len()
    }

    pub fn has_surface(&self) -> bool {
        !self.surface.is_empty()
    }

    /// Rows the engine emits per system before the one holding the reacted state.
    ///
    /// With surface complexation the engine also reports the solution before the surface
    /// was equilibrated, so one more row has to be skipped.
    pub fn skipped_lines(&self) -> usize {
        if self.has_surface() { 2 } else { 1 }
    }
}
