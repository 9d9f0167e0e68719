use crate::core::models::ids::ChemicalSystemMap;
use crate::core::models::knobs::Knobs;
use crate::core::models::lookup::{EntityKind, Named, first_duplicate_name};
use crate::core::models::phases::{EquilibriumPhase, KineticReactant, SurfaceSite};
use crate::core::models::rates::ReactionRate;
use crate::core::models::solution::AqueousSolution;
use crate::core::models::system::ChemicalSystems;
use crate::core::models::user_punch::UserPunch;
use crate::core::transport::{BindingRole, TransportBinding};
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Duplicate {kind} name '{name}'")]
    DuplicateName { kind: EntityKind, name: String },

    #[error("Transport process {process_id} is bound to '{name}', which is not a component of the solution")]
    UnknownBoundComponent { process_id: usize, name: String },

    #[error("Transport processes {first} and {second} are both bound to hydrogen")]
    MultipleHydrogenBindings { first: usize, second: usize },

    #[error("Transport process {process_id} is bound more than once")]
    DuplicateProcessBinding { process_id: usize },

    #[error("Rate law given for '{name}', which is not a kinetic reactant")]
    UnknownRateReactant { name: String },

    #[error("Chemical system map is empty; there is nothing to couple")]
    EmptySystemMap,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PhaseSpec {
    pub name: String,
    #[serde(default)]
    pub saturation_index: f64,
    pub initial_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct KineticReactantSpec {
    pub name: String,
    #[serde(default)]
    pub chemical_formula: Option<String>,
    #[serde(default)]
    pub parameters: Vec<f64>,
    pub initial_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct SurfaceSiteSpec {
    pub name: String,
    pub site_density: f64,
    pub specific_surface_area: f64,
    pub mass: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct UserPunchSpec {
    pub headings: Vec<String>,
    #[serde(default)]
    pub statements: Vec<String>,
}

/// Everything a coupling needs besides the system map and the engine instance.
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingConfig {
    /// Prefix of every file the coupling writes, e.g. `out/column` -> `out/column_phreeqc.inp`.
    pub project_file_prefix: PathBuf,
    pub database: PathBuf,
    /// Initial composition shared by every system.
    pub solution: AqueousSolution,
    pub equilibrium_phases: Vec<PhaseSpec>,
    pub kinetic_reactants: Vec<KineticReactantSpec>,
    pub reaction_rates: Vec<ReactionRate>,
    pub surface: Vec<SurfaceSiteSpec>,
    pub user_punch: Option<UserPunchSpec>,
    pub knobs: Knobs,
    pub bindings: Vec<TransportBinding>,
    pub use_high_precision: bool,
    pub enable_dump: bool,
}

impl CouplingConfig {
    fn project_file(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.project_file_prefix.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    pub fn input_file(&self) -> PathBuf {
        self.project_file("_phreeqc.inp")
    }

    pub fn output_file(&self) -> PathBuf {
        self.project_file("_phreeqc.out")
    }

    pub fn dump_file(&self) -> PathBuf {
        self.project_file("_phreeqc.dmp")
    }

    pub fn database(&self) -> &Path {
        &self.database
    }

    /// Checks the setup for inconsistencies that would only surface mid-run otherwise.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unique(&self.solution.components)?;

        let phases: Vec<_> = self.equilibrium_phases.iter().map(|p| p.name.as_str()).collect();
        check_unique_names(&phases, EntityKind::EquilibriumPhase)?;
        let reactants: Vec<_> = self.kinetic_reactants.iter().map(|k| k.name.as_str()).collect();
        check_unique_names(&reactants, EntityKind::KineticReactant)?;
        let sites: Vec<_> = self.surface.iter().map(|s| s.name.as_str()).collect();
        check_unique_names(&sites, EntityKind::SurfaceSite)?;
        if let Some(user_punch) = &self.user_punch {
            let headings: Vec<_> = user_punch.headings.iter().map(String::as_str).collect();
            check_unique_names(&headings, EntityKind::SecondaryVariable)?;
        }

        if let Some(rate) = self
            .reaction_rates
            .iter()
            .find(|rate| !reactants.contains(&rate.kinetic_reactant.as_str()))
        {
            return Err(ConfigError::UnknownRateReactant {
                name: rate.kinetic_reactant.clone(),
            });
        }

        let mut hydrogen_process: Option<usize> = None;
        for (i, binding) in self.bindings.iter().enumerate() {
            if self.bindings[..i]
                .iter()
                .any(|earlier| earlier.process_id == binding.process_id)
            {
                return Err(ConfigError::DuplicateProcessBinding {
                    process_id: binding.process_id,
                });
            }
            match binding.role {
                BindingRole::Component => {
                    if self.solution.component(&binding.variable).is_err() {
                        return Err(ConfigError::UnknownBoundComponent {
                            process_id: binding.process_id,
                            name: binding.variable.clone(),
                        });
                    }
                }
                BindingRole::Hydrogen => {
                    if let Some(first) = hydrogen_process {
                        return Err(ConfigError::MultipleHydrogenBindings {
                            first,
                            second: binding.process_id,
                        });
                    }
                    hydrogen_process = Some(binding.process_id);
                }
            }
        }
        Ok(())
    }

    /// Instantiates the entity templates for every system of `system_map`.
    ///
    /// Solutions are laid out by local position, array-valued entities are sized to hold
    /// every global id of the map.
    pub fn build_systems(&self, system_map: &ChemicalSystemMap) -> ChemicalSystems {
        let extent = system_map.extent();
        ChemicalSystems {
            aqueous_solutions: vec![self.solution.clone(); system_map.len()],
            equilibrium_phases: self
                .equilibrium_phases
                .iter()
                .map(|p| {
                    EquilibriumPhase::uniform(&p.name, p.saturation_index, p.initial_amount, extent)
                })
                .collect(),
            kinetic_reactants: self
                .kinetic_reactants
                .iter()
                .map(|k| {
                    let reactant = KineticReactant::uniform(&k.name, k.initial_amount, extent)
                        .with_parameters(k.parameters.clone());
                    match &k.chemical_formula {
                        Some(formula) => reactant.with_formula(formula),
                        None => reactant,
                    }
                })
                .collect(),
            reaction_rates: self.reaction_rates.clone(),
            surface: self
                .surface
                .iter()
                .map(|s| {
                    SurfaceSite::uniform(
                        &s.name,
                        s.site_density,
                        s.specific_surface_area,
                        s.mass,
                        extent,
                    )
                })
                .collect(),
            user_punch: self
                .user_punch
                .as_ref()
                .map(|u| UserPunch::new(&u.headings, u.statements.clone(), extent)),
        }
    }
}

fn check_unique<T: Named>(items: &[T]) -> Result<(), ConfigError> {
    match first_duplicate_name(items) {
        Some(name) => Err(ConfigError::DuplicateName {
            kind: T::KIND,
            name: name.to_string(),
        }),
        None => Ok(()),
    }
}

fn check_unique_names(names: &[&str], kind: EntityKind) -> Result<(), ConfigError> {
    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Err(ConfigError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

#[derive(Default)]
pub struct CouplingConfigBuilder {
    project_file_prefix: Option<PathBuf>,
    database: Option<PathBuf>,
    solution: Option<AqueousSolution>,
    equilibrium_phases: Vec<PhaseSpec>,
    kinetic_reactants: Vec<KineticReactantSpec>,
    reaction_rates: Vec<ReactionRate>,
    surface: Vec<SurfaceSiteSpec>,
    user_punch: Option<UserPunchSpec>,
    knobs: Option<Knobs>,
    bindings: Vec<TransportBinding>,
    use_high_precision: Option<bool>,
    enable_dump: Option<bool>,
}

impl CouplingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project_file_prefix(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.project_file_prefix = Some(prefix.into());
        self
    }
    pub fn database(mut self, path: impl Into<PathBuf>) -> Self {
        self.database = Some(path.into());
        self
    }
    pub fn solution(mut self, solution: AqueousSolution) -> Self {
        self.solution = Some(solution);
        self
    }
    pub fn equilibrium_phases(mut self, phases: Vec<PhaseSpec>) -> Self {
        self.equilibrium_phases = phases;
        self
    }
    pub fn kinetic_reactants(mut self, reactants: Vec<KineticReactantSpec>) -> Self {
        self.kinetic_reactants = reactants;
        self
    }
    pub fn reaction_rates(mut self, rates: Vec<ReactionRate>) -> Self {
        self.reaction_rates = rates;
        self
    }
    pub fn surface(mut self, sites: Vec<SurfaceSiteSpec>) -> Self {
        self.surface = sites;
        self
    }
    pub fn user_punch(mut self, user_punch: UserPunchSpec) -> Self {
        self.user_punch = Some(user_punch);
        self
    }
    pub fn knobs(mut self, knobs: Knobs) -> Self {
        self.knobs = Some(knobs);
        self
    }
    pub fn bindings(mut self, bindings: Vec<TransportBinding>) -> Self {
        self.bindings = bindings;
        self
    }
    pub fn use_high_precision(mut self, on: bool) -> Self {
        self.use_high_precision = Some(on);
        self
    }
    pub fn enable_dump(mut self, on: bool) -> Self {
        self.enable_dump = Some(on);
        self
    }

    pub fn build(self) -> Result<CouplingConfig, ConfigError> {
        let config = CouplingConfig {
            project_file_prefix: self
                .project_file_prefix
                .ok_or(ConfigError::MissingParameter("project_file_prefix"))?,
            database: self
                .database
                .ok_or(ConfigError::MissingParameter("database"))?,
            solution: self
                .solution
                .ok_or(ConfigError::MissingParameter("solution"))?,
            equilibrium_phases: self.equilibrium_phases,
            kinetic_reactants: self.kinetic_reactants,
            reaction_rates: self.reaction_rates,
            surface: self.surface,
            user_punch: self.user_punch,
            knobs: self.knobs.unwrap_or_default(),
            bindings: self.bindings,
            use_high_precision: self.use_high_precision.unwrap_or(true),
            enable_dump: self.enable_dump.unwrap_or(false),
        };
        config.validate()?;
        Ok(config)
    }
}
