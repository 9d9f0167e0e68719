use crate::core::io::script::ScriptError;
use crate::core::io::traits::ScriptBlock;
use crate::core::models::lookup::{self, EntityKind, LookupError, Named};
use std::io::Write;

/// A quantity the engine computes through USER_PUNCH statements.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryVariable {
    pub name: String,
    pub value: Vec<f64>, // Indexed by global node id
}

impl SecondaryVariable {
    pub fn new(name: impl Into<String>, extent: usize) -> Self {
        Self {
            name: name.into(),
            value: vec![f64::NAN; extent],
        }
    }
}

impl Named for SecondaryVariable {
    const KIND: EntityKind = EntityKind::SecondaryVariable;

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserPunch {
    pub secondary_variables: Vec<SecondaryVariable>,
    pub statements: Vec<String>, // BASIC statements without line numbers
}

impl UserPunch {
    pub fn new(headings: &[String], statements: Vec<String>, extent: usize) -> Self {
        Self {
            secondary_variables: headings
                .iter()
                .map(|name| SecondaryVariable::new(name.as_str(), extent))
                .collect(),
            statements,
        }
    }

    pub fn secondary_variable_mut(
        &mut self,
        name: &str,
    ) -> Result<&mut SecondaryVariable, LookupError> {
        lookup::find_by_name_mut(&mut self.secondary_variables, name)
    }
}

impl ScriptBlock for UserPunch {
    fn write_block(&self, writer: &mut impl Write) -> Result<(), ScriptError> {
        writeln!(writer, "USER_PUNCH")?;
        write!(writer, "-headings")?;
        for variable in &self.secondary_variables {
            write!(writer, " {}", variable.name)?;
        }
        writeln!(writer)?;
        writeln!(writer, "-start")?;
        for (line_number, statement) in (1..).zip(&self.statements) {
            writeln!(writer, "{} {}", line_number, statement)?;
        }
        writeln!(writer, "-end")?;
        Ok(())
    }
}
