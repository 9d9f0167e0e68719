use crate::core::io::script::ScriptError;
use std::io::Write;

/// Renders an entity that looks the same for every chemical system.
pub trait ScriptBlock {
    /// Writes the entity in engine input syntax.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    fn write_block(&self, writer: &mut impl Write) -> Result<(), ScriptError>;
}

/// Renders an entity whose values differ per chemical system.
pub trait SystemBlock {
    /// Writes the entity's lines for the system living on `global_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails or the entity holds no value for `global_id`.
    fn write_for_system(
        &self,
        writer: &mut impl Write,
        global_id: usize,
    ) -> Result<(), ScriptError>;
}

pub fn write_all_for_system<T: SystemBlock>(
    items: &[T],
    writer: &mut impl Write,
    global_id: usize,
) -> Result<(), ScriptError> {
    for item in items {
        item.write_for_system(writer, global_id)?;
    }
    Ok(())
}
