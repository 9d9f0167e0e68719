use crate::core::io::dump::Dump;
use crate::core::io::output::{BasicOutputSetups, OutputSchema};
use crate::core::io::results::{ResultError, read_results};
use crate::core::io::script::{Script, ScriptError};
use crate::core::models::ids::ChemicalSystemMap;
use crate::core::models::system::ChemicalSystems;
use crate::core::transport::{Direction, TransportVector};
use crate::engine::config::{ConfigError, CouplingConfig};
use crate::engine::driver::{Engine, EngineDriver};
use crate::engine::error::CouplingError;
use crate::engine::state::CouplingPhase;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use tracing::{debug, info, instrument};

/// Couples one set of chemical systems to the transport solver through one engine.
#[derive(Debug)]
pub struct CouplingOrchestrator<E: Engine> {
    config: CouplingConfig,
    system_map: ChemicalSystemMap,
    systems: ChemicalSystems,
    schema: OutputSchema,
    dump: Option<Dump>,
    driver: EngineDriver<E>,
    phase: CouplingPhase,
}

impl<E: Engine> CouplingOrchestrator<E> {
    /// Validates the setup, instantiates one chemical system per map entry and initializes
    /// the engine.
    pub fn new(
        config: CouplingConfig,
        system_map: ChemicalSystemMap,
        engine: E,
    ) -> Result<Self, CouplingError> {
        if system_map.is_empty() {
            return Err(ConfigError::EmptySystemMap.into());
        }
        config.validate()?;

        let systems = config.build_systems(&system_map);
        let schema = OutputSchema::derive(
            BasicOutputSetups::new(config.output_file(), config.use_high_precision),
            &systems,
        );
        let dump = config.enable_dump.then(|| Dump::new(config.dump_file()));
        let driver =
            EngineDriver::new(engine, config.database(), config.input_file(), config.enable_dump)?;

        info!(
            num_systems = system_map.len(),
            num_columns = schema.num_columns(),
            dump = config.enable_dump,
            "Coupling set up."
        );
        Ok(Self {
            config,
            system_map,
            systems,
            schema,
            dump,
            driver,
            phase: CouplingPhase::Idle,
        })
    }

    pub fn config(&self) -> &CouplingConfig {
        &self.config
    }

    pub fn system_map(&self) -> &ChemicalSystemMap {
        &self.system_map
    }

    pub fn systems(&self) -> &ChemicalSystems {
        &self.systems
    }

    pub fn schema(&self) -> &OutputSchema {
        &self.schema
    }

    pub fn driver(&self) -> &EngineDriver<E> {
        &self.driver
    }

    pub fn phase(&self) -> CouplingPhase {
        self.phase
    }

    /// Equilibrates the initial state before time stepping starts.
    #[instrument(skip_all, name = "initial_calculation")]
    pub fn initial_calculation<V: TransportVector>(
        &mut self,
        vectors: &mut [V],
    ) -> Result<(), CouplingError> {
        self.react(vectors, None)
    }

    /// Reacts every system over a time step of length `dt`.
    #[instrument(skip_all, name = "coupling_step", fields(dt = dt))]
    pub fn step<V: TransportVector>(
        &mut self,
        vectors: &mut [V],
        dt: f64,
    ) -> Result<(), CouplingError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(CouplingError::InvalidTimeStep(dt));
        }
        self.react(vectors, Some(dt))
    }

    fn react<V: TransportVector>(
        &mut self,
        vectors: &mut [V],
        dt: Option<f64>,
    ) -> Result<(), CouplingError> {
        self.phase = CouplingPhase::SettingState;
        self.exchange(vectors, Direction::Load)?;
        if dt.is_some() {
            self.read_previous_state()?;
        }
        self.write_script(dt)?;
        self.discard_stale_results()?;
        self.driver.execute()?;

        self.phase = CouplingPhase::ReadingState;
        self.read_results()?;

        self.phase = CouplingPhase::UpdatingState;
        self.exchange(vectors, Direction::Store)?;

        self.phase = CouplingPhase::Idle;
        info!(num_systems = self.system_map.len(), "Chemistry updated.");
        Ok(())
    }

    fn exchange<V: TransportVector>(
        &mut self,
        vectors: &mut [V],
        direction: Direction,
    ) -> Result<(), CouplingError> {
        let bindings = &self.config.bindings;
        for (solution, (_, global_id)) in self
            .systems
            .aqueous_solutions
            .iter_mut()
            .zip(self.system_map.iter())
        {
            solution.exchange(vectors, bindings, global_id, direction)?;
        }
        Ok(())
    }

    fn read_previous_state(&mut self) -> Result<(), CouplingError> {
        if let Some(dump) = self.dump.as_mut() {
            debug!(dump_file = %dump.dump_file().display(), "Reading previous state.");
            dump.read_from_path(&self.system_map)?;
        }
        Ok(())
    }

    fn write_script(&self, dt: Option<f64>) -> Result<(), CouplingError> {
        let path = self.driver.input_file();
        debug!(input_file = %path.display(), "Writing engine input.");
        let script_err = |source: ScriptError| CouplingError::Script {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(|e| script_err(e.into()))?;
        let mut writer = BufWriter::new(file);
        let script = Script {
            knobs: &self.config.knobs,
            schema: &self.schema,
            systems: &self.systems,
            system_map: &self.system_map,
            dump: self.dump.as_ref(),
        };
        script.write_to(&mut writer, dt).map_err(script_err)?;
        writer.flush().map_err(|e| script_err(e.into()))?;
        Ok(())
    }

    /// Removes the result table of an earlier run so only a fresh one can be read back.
    fn discard_stale_results(&self) -> Result<(), CouplingError> {
        let path = self.schema.output_file();
        match fs::remove_file(path) {
            Ok(()) => {
                debug!(output_file = %path.display(), "Removed previous result table.");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CouplingError::Results {
                path: path.to_path_buf(),
                source: e.into(),
            }),
        }
    }

    fn read_results(&mut self) -> Result<(), CouplingError> {
        let path = self.schema.output_file().to_path_buf();
        debug!(output_file = %path.display(), "Reading engine results.");
        let results_err = |source: ResultError| CouplingError::Results {
            path: path.clone(),
            source,
        };

        let file = File::open(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => results_err(ResultError::NotWritten),
            _ => results_err(e.into()),
        })?;
        let mut reader = BufReader::new(file);
        read_results(
            &mut reader,
            &mut self.systems,
            &self.schema,
            &self.system_map,
        )
        .map_err(results_err)
    }
}
