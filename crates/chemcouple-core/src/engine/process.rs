use super::driver::{Engine, EngineFailure};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// Drives a PHREEQC-compatible executable as a child process.
///
/// The executable is invoked as `<exe> <input> <log> <database>` and blocks until it exits.
/// Selected output and dump files are requested by the script itself, so the two toggles
/// only record the request.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    executable: PathBuf,
    database: Option<PathBuf>,
    selected_output_on: bool,
    dump_on: bool,
    diagnostic: String,
}

impl ProcessEngine {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            database: None,
            selected_output_on: false,
            dump_on: false,
            diagnostic: String::new(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn selected_output_on(&self) -> bool {
        self.selected_output_on
    }

    pub fn dump_on(&self) -> bool {
        self.dump_on
    }

    /// Log file the engine writes next to `input_file`.
    pub fn log_file(input_file: &Path) -> PathBuf {
        input_file.with_extension("log")
    }

    fn fail(&mut self, diagnostic: impl Into<String>) -> Result<(), EngineFailure> {
        self.diagnostic = diagnostic.into();
        Err(EngineFailure)
    }
}

/// Collects every line of an engine log that reports an error.
pub fn collect_errors(log: &str) -> Vec<&str> {
    log.lines()
        .map(str::trim)
        .filter(|line| line.starts_with("ERROR"))
        .collect()
}

impl Engine for ProcessEngine {
    fn load_database(&mut self, database: &Path) -> Result<(), EngineFailure> {
        if !database.is_file() {
            return self.fail(format!(
                "ERROR: Could not open thermodynamic database '{}'",
                database.display()
            ));
        }
        self.database = Some(database.to_path_buf());
        Ok(())
    }

    fn set_selected_output_file_on(&mut self, on: bool) -> Result<(), EngineFailure> {
        self.selected_output_on = on;
        Ok(())
    }

    fn set_dump_file_on(&mut self, on: bool) -> Result<(), EngineFailure> {
        self.dump_on = on;
        Ok(())
    }

    fn run_file(&mut self, input_file: &Path) -> Result<(), EngineFailure> {
        let Some(database) = self.database.clone() else {
            return self.fail("ERROR: No thermodynamic database has been loaded");
        };
        let log_file = Self::log_file(input_file);

        debug!(
            executable = %self.executable.display(),
            input_file = %input_file.display(),
            "Spawning engine process."
        );
        let output = match Command::new(&self.executable)
            .arg(input_file)
            .arg(&log_file)
            .arg(&database)
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                return self.fail(format!(
                    "ERROR: Could not start engine '{}': {}",
                    self.executable.display(),
                    e
                ));
            }
        };

        let log = fs::read_to_string(&log_file);
        if !output.status.success() {
            let errors = log.as_deref().map(collect_errors).unwrap_or_default();
            let diagnostic = if errors.is_empty() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                format!("ERROR: Engine exited with {}. {}", output.status, stderr.trim())
            } else {
                errors.join("\n")
            };
            warn!(log_file = %log_file.display(), "Engine run failed.");
            return self.fail(diagnostic);
        }

        let log = match log {
            Ok(log) => log,
            Err(e) => {
                warn!(log_file = %log_file.display(), "Engine left no readable log.");
                return self.fail(format!(
                    "ERROR: Could not read engine log '{}': {}",
                    log_file.display(),
                    e
                ));
            }
        };
        let errors = collect_errors(&log);
        if !errors.is_empty() {
            warn!(log_file = %log_file.display(), "Engine run reported errors.");
            return self.fail(errors.join("\n"));
        }

        self.diagnostic.clear();
        Ok(())
    }

    fn last_diagnostic(&self) -> String {
        self.diagnostic.clone()
    }
}
