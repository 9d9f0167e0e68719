use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use chemcouple::core::models::ids::ChemicalSystemMap;
use chemcouple::core::models::knobs::Knobs;
use chemcouple::core::models::rates::ReactionRate;
use chemcouple::core::models::solution::{AqueousSolution, ChargeBalance, Component};
use chemcouple::core::transport::{BindingRole, TransportBinding, hydrogen_from_ph};
use chemcouple::engine::config::{
    self as core_config, CouplingConfig, CouplingConfigBuilder, KineticReactantSpec, PhaseSpec,
    SurfaceSiteSpec, UserPunchSpec,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_ENGINE: &str = "phreeqc";
const DEFAULT_STEPS: usize = 1;

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialComponent {
    name: String,
    amount: f64,
    chemical_formula: Option<String>,
}

impl From<PartialComponent> for Component {
    fn from(p: PartialComponent) -> Self {
        let component = Component::new(p.name, p.amount);
        match p.chemical_formula {
            Some(formula) => component.with_formula(formula),
            None => component,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialSolution {
    temperature: Option<f64>,
    pressure: Option<f64>,
    #[serde(rename = "pH")]
    ph: Option<f64>,
    pe: Option<f64>,
    charge_balance: Option<ChargeBalance>,
    #[serde(default)]
    components: Vec<PartialComponent>,
}

impl From<PartialSolution> for AqueousSolution {
    fn from(p: PartialSolution) -> Self {
        let defaults = AqueousSolution::default();
        Self {
            temperature: p.temperature.unwrap_or(defaults.temperature),
            pressure: p.pressure.unwrap_or(defaults.pressure),
            ph: p.ph.unwrap_or(defaults.ph),
            pe: p.pe.unwrap_or(defaults.pe),
            charge_balance: p.charge_balance.unwrap_or_default(),
            components: p.components.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialNodes {
    count: Option<usize>,
    global_ids: Option<Vec<usize>>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialTransportVariable {
    variable: String,
    #[serde(default)]
    role: BindingRole,
    initial: Option<f64>,
    initial_values: Option<Vec<f64>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialRunConfig {
    steps: Option<usize>,
    dt: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialCouplingConfig {
    project_prefix: Option<PathBuf>,
    database: Option<PathBuf>,
    engine: Option<PathBuf>,
    use_high_precision: Option<bool>,
    enable_dump: Option<bool>,
    nodes: Option<PartialNodes>,
    solution: Option<PartialSolution>,
    #[serde(default)]
    equilibrium_phases: Vec<PhaseSpec>,
    #[serde(default)]
    kinetic_reactants: Vec<KineticReactantSpec>,
    #[serde(default)]
    rates: Vec<ReactionRate>,
    #[serde(default)]
    surface: Vec<SurfaceSiteSpec>,
    user_punch: Option<UserPunchSpec>,
    knobs: Option<Knobs>,
    #[serde(default)]
    transport: Vec<PartialTransportVariable>,
    run: Option<PartialRunConfig>,
}

/// A transported quantity with its initial values on every global node.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportVariable {
    pub name: String,
    pub values: Vec<f64>,
}

/// Everything the `run` command needs, merged from the config file and the CLI.
#[derive(Debug)]
pub struct RunConfig {
    pub coupling: CouplingConfig,
    pub engine: PathBuf,
    pub system_map: ChemicalSystemMap,
    pub transport: Vec<TransportVariable>,
    pub steps: usize,
    pub dt: Option<f64>,
}

impl PartialCouplingConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn merge_with_cli(self, args: &RunArgs) -> Result<RunConfig> {
        let system_map = Self::resolve_nodes(self.nodes.unwrap_or_default())?;
        let solution: AqueousSolution = self.solution.unwrap_or_default().into();

        let extent = system_map.extent();
        let mut bindings = Vec::with_capacity(self.transport.len());
        let mut transport = Vec::with_capacity(self.transport.len());
        for (process_id, variable) in self.transport.into_iter().enumerate() {
            let values = Self::initial_values(&variable, &solution, extent)?;
            bindings.push(TransportBinding {
                process_id,
                variable: variable.variable.clone(),
                role: variable.role,
            });
            transport.push(TransportVariable {
                name: variable.variable,
                values,
            });
        }

        let run = self.run.unwrap_or_default();
        let steps = args.steps.or(run.steps).unwrap_or(DEFAULT_STEPS);
        let dt = args.dt.or(run.dt);
        if steps > 0 && dt.is_none() {
            return Err(CliError::Config(
                "`run.dt` (or --dt) is required when time steps are requested.".to_string(),
            ));
        }
        if let Some(dt) = dt.filter(|dt| !dt.is_finite() || *dt <= 0.0) {
            return Err(CliError::Config(format!(
                "`run.dt` (or --dt) must be positive and finite, got {}.",
                dt
            )));
        }

        let database = args
            .database
            .clone()
            .or(self.database)
            .ok_or_else(|| CliError::Config("`database` is required.".to_string()))?;

        let mut builder = CouplingConfigBuilder::new()
            .project_file_prefix(
                self.project_prefix
                    .unwrap_or_else(|| PathBuf::from("chemcouple")),
            )
            .database(database)
            .solution(solution)
            .equilibrium_phases(self.equilibrium_phases)
            .kinetic_reactants(self.kinetic_reactants)
            .reaction_rates(self.rates)
            .surface(self.surface)
            .knobs(self.knobs.unwrap_or_default())
            .bindings(bindings)
            .use_high_precision(self.use_high_precision.unwrap_or(true))
            .enable_dump(self.enable_dump.unwrap_or(false));
        if let Some(user_punch) = self.user_punch {
            builder = builder.user_punch(user_punch);
        }
        let coupling = builder
            .build()
            .map_err(|e: core_config::ConfigError| CliError::Config(e.to_string()))?;

        Ok(RunConfig {
            coupling,
            engine: args
                .engine
                .clone()
                .or(self.engine)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ENGINE)),
            system_map,
            transport,
            steps,
            dt,
        })
    }

    fn resolve_nodes(nodes: PartialNodes) -> Result<ChemicalSystemMap> {
        match (nodes.count, nodes.global_ids) {
            (_, Some(global_ids)) => ChemicalSystemMap::new(global_ids)
                .map_err(|e| CliError::Config(format!("`nodes.global-ids`: {}", e))),
            (Some(count), None) => Ok(ChemicalSystemMap::identity(count)),
            (None, None) => Err(CliError::Config(
                "`nodes.count` or `nodes.global-ids` is required.".to_string(),
            )),
        }
    }

    /// Explicit per-node values win; otherwise the solution template provides a uniform start.
    fn initial_values(
        variable: &PartialTransportVariable,
        solution: &AqueousSolution,
        extent: usize,
    ) -> Result<Vec<f64>> {
        if let Some(values) = &variable.initial_values {
            if values.len() != extent {
                return Err(CliError::Config(format!(
                    "Transport variable '{}' has {} initial value(s), but the node map spans {} node(s).",
                    variable.variable,
                    values.len(),
                    extent
                )));
            }
            return Ok(values.clone());
        }

        let uniform = match (variable.initial, variable.role) {
            (Some(value), _) => value,
            (None, BindingRole::Hydrogen) => hydrogen_from_ph(solution.ph),
            (None, BindingRole::Component) => solution
                .component(&variable.variable)
                .map(|c| c.amount)
                .map_err(|e| CliError::Config(e.to_string()))?,
        };
        Ok(vec![uniform; extent])
    }
}
