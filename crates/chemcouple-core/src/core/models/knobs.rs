use crate::core::io::script::ScriptError;
use crate::core::io::traits::ScriptBlock;
use serde::Deserialize;
use std::io::Write;

/// Numerical tuning of the engine's equation solver.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Knobs {
    pub max_iterations: u32,
    pub convergence_tolerance: f64,
    pub tolerance: f64,
    pub step_size: f64,
    pub diagonal_scale: bool,
}

impl Default for Knobs {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            convergence_tolerance: 1e-8,
            tolerance: 1e-15,
            step_size: 100.0,
            diagonal_scale: false,
        }
    }
}

impl ScriptBlock for Knobs {
    fn write_block(&self, writer: &mut impl Write) -> Result<(), ScriptError> {
        writeln!(writer, "KNOBS")?;
        writeln!(writer, "-iterations {}", self.max_iterations)?;
        writeln!(
            writer,
            "-convergence_tolerance {:e}",
            self.convergence_tolerance
        )?;
        writeln!(writer, "-tolerance {:e}", self.tolerance)?;
        writeln!(writer, "-step_size {}", self.step_size)?;
        writeln!(writer, "-diagonal_scale {}", self.diagonal_scale)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_knobs_render_engine_defaults() {
        let mut buffer = Vec::new();
        Knobs::default().write_block(&mut buffer).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "KNOBS\n-iterations 100\n-convergence_tolerance 1e-8\n-tolerance 1e-15\n-step_size 100\n-diagonal_scale false\n"
        );
    }
}
