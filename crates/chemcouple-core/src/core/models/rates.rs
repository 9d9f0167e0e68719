use crate::core::io::script::ScriptError;
use crate::core::io::traits::ScriptBlock;
use serde::Deserialize;
use std::io::Write;

/// Rate law of one kinetic reactant, as BASIC statements.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ReactionRate {
    pub kinetic_reactant: String,
    pub expression_statements: Vec<String>,
}

impl ScriptBlock for ReactionRate {
    fn write_block(&self, writer: &mut impl Write) -> Result<(), ScriptError> {
        writeln!(writer, "{}", self.kinetic_reactant)?;
        writeln!(writer, "-start")?;
        for (line_number, statement) in (1..).zip(&self.expression_statements) {
            writeln!(writer, "{} {}", line_number, statement)?;
        }
        writeln!(writer, "-end")?;
        Ok(())
    }
}

/// Writes the RATES keyword followed by every rate definition.
pub fn write_rates(rates: &[ReactionRate], writer: &mut impl Write) -> Result<(), ScriptError> {
    writeln!(writer, "RATES")?;
    for rate in rates {
        rate.write_block(writer)?;
    }
    Ok(())
}
