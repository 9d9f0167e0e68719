use super::error::CouplingError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error};

/// Non-success status of an engine operation; the details are in [`Engine::last_diagnostic`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("engine reported a failure")]
pub struct EngineFailure;

/// One instance of a PHREEQC-compatible batch engine.
pub trait Engine {
    fn load_database(&mut self, database: &Path) -> Result<(), EngineFailure>;

    fn set_selected_output_file_on(&mut self, on: bool) -> Result<(), EngineFailure>;

    fn set_dump_file_on(&mut self, on: bool) -> Result<(), EngineFailure>;

    /// Runs the input script at `input_file` to completion.
    fn run_file(&mut self, input_file: &Path) -> Result<(), EngineFailure>;

    /// Error text accumulated by the most recent failing operation.
    fn last_diagnostic(&self) -> String;
}

/// Owns exactly one engine instance for the lifetime of a coupling.
#[derive(Debug)]
pub struct EngineDriver<E: Engine> {
    engine: E,
    input_file: PathBuf,
}

impl<E: Engine> EngineDriver<E> {
    /// Prepares `engine` for coupled runs: database, selected output and, optionally, dump.
    ///
    /// # Errors
    ///
    /// Any refused setup call is a fatal [`CouplingError::Initialization`].
    pub fn new(
        mut engine: E,
        database: &Path,
        input_file: PathBuf,
        enable_dump: bool,
    ) -> Result<Self, CouplingError> {
        let init_err = |engine: &E, stage: &'static str| {
            let diagnostic = engine.last_diagnostic();
            error!(stage, "{}", diagnostic);
            CouplingError::Initialization { stage, diagnostic }
        };

        engine
            .load_database(database)
            .map_err(|_| init_err(&engine, "loading the thermodynamic database"))?;
        engine
            .set_selected_output_file_on(true)
            .map_err(|_| init_err(&engine, "enabling selected output"))?;
        if enable_dump {
            engine
                .set_dump_file_on(true)
                .map_err(|_| init_err(&engine, "enabling the dump file"))?;
        }
        debug!(database = %database.display(), "Engine initialized.");

        Ok(Self { engine, input_file })
    }

    pub fn input_file(&self) -> &Path {
        &self.input_file
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Runs the most recently written input script. No retry is attempted.
    pub fn execute(&mut self) -> Result<(), CouplingError> {
        debug!(input_file = %self.input_file.display(), "Executing engine.");
        self.engine.run_file(&self.input_file).map_err(|_| {
            let diagnostic = self.engine.last_diagnostic();
            error!("{}", diagnostic);
            CouplingError::Execution {
                input_file: self.input_file.clone(),
                diagnostic,
            }
        })
    }
}
