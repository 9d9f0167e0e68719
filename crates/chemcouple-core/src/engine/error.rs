use std::path::PathBuf;
use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::dump::DumpError;
use crate::core::io::results::ResultError;
use crate::core::io::script::ScriptError;
use crate::core::models::ids::SystemMapError;
use crate::core::transport::TransportError;

#[derive(Debug, Error)]
pub enum CouplingError {
    #[error("Initialization failed while {stage}: {diagnostic}")]
    Initialization {
        stage: &'static str,
        diagnostic: String,
    },

    #[error("Engine failed to run input file '{}': {diagnostic}", input_file.display())]
    Execution {
        input_file: PathBuf,
        diagnostic: String,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid chemical system map: {0}")]
    SystemMap(#[from] SystemMapError),

    #[error("Could not write engine input file '{}': {source}", path.display())]
    Script {
        path: PathBuf,
        #[source]
        source: ScriptError,
    },

    #[error("Could not read engine results from '{}': {source}", path.display())]
    Results {
        path: PathBuf,
        #[source]
        source: ResultError,
    },

    #[error(transparent)]
    Dump(#[from] DumpError),

    #[error("Transport exchange failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Time step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),
}
