use crate::core::io::script::ScriptError;
use crate::core::io::traits::ScriptBlock;
use crate::core::models::system::ChemicalSystems;
use std::collections::BTreeSet;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    Ph,
    Pe,
    Component,
    EquilibriumPhase,
    KineticReactant,
    SecondaryVariable,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ItemType::Ph => "pH",
                ItemType::Pe => "pe",
                ItemType::Component => "Component",
                ItemType::EquilibriumPhase => "EquilibriumPhase",
                ItemType::KineticReactant => "KineticReactant",
                ItemType::SecondaryVariable => "SecondaryVariable",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputItem {
    pub name: String,
    pub item_type: ItemType,
}

impl OutputItem {
    pub fn new(name: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            name: name.into(),
            item_type,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Dropped column {column} lies outside the {num_columns} columns of a result row")]
    DroppedColumnOutOfRange { column: usize, num_columns: usize },
}

/// Fixed part of the SELECTED_OUTPUT block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicOutputSetups {
    pub output_file: PathBuf,
    pub use_high_precision: bool,
}

impl BasicOutputSetups {
    const DISPLAY_SIMULATION_ID: bool = false;
    const DISPLAY_STATE: bool = true;
    const DISPLAY_SOLUTION_ID: bool = true;
    const DISPLAY_DISTANCE: bool = false;
    const DISPLAY_TIME: bool = false;
    const DISPLAY_STEP: bool = false;

    pub fn new(output_file: impl Into<PathBuf>, use_high_precision: bool) -> Self {
        Self {
            output_file: output_file.into(),
            use_high_precision,
        }
    }

    /// Identifier columns the engine prints in front of pH; none of them carry chemistry.
    pub fn num_identifier_columns() -> usize {
        [
            Self::DISPLAY_SIMULATION_ID,
            Self::DISPLAY_STATE,
            Self::DISPLAY_SOLUTION_ID,
            Self::DISPLAY_DISTANCE,
            Self::DISPLAY_TIME,
            Self::DISPLAY_STEP,
        ]
        .into_iter()
        .filter(|&on| on)
        .count()
    }
}

impl ScriptBlock for BasicOutputSetups {
    fn write_block(&self, writer: &mut impl Write) -> Result<(), ScriptError> {
        writeln!(writer, "-file {}", self.output_file.display())?;
        writeln!(writer, "-high_precision {}", self.use_high_precision)?;
        writeln!(writer, "-simulation {}", Self::DISPLAY_SIMULATION_ID)?;
        writeln!(writer, "-state {}", Self::DISPLAY_STATE)?;
        writeln!(writer, "-solution {}", Self::DISPLAY_SOLUTION_ID)?;
        writeln!(writer, "-distance {}", Self::DISPLAY_DISTANCE)?;
        writeln!(writer, "-time {}", Self::DISPLAY_TIME)?;
        writeln!(writer, "-step {}", Self::DISPLAY_STEP)?;
        writeln!(writer, "-pH true")?;
        writeln!(writer, "-pe true")?;
        Ok(())
    }
}

/// Ordered description of the columns in the engine's result table.
///
/// `accepted_items` lists the columns that carry chemistry, in the order they appear once
/// the columns in `dropped_item_ids` have been removed from a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSchema {
    basic_output_setups: BasicOutputSetups,
    accepted_items: Vec<OutputItem>,
    dropped_item_ids: BTreeSet<usize>,
}

impl OutputSchema {
    /// Derives the schema matching the SELECTED_OUTPUT block written for `systems`.
    ///
    /// Column layout: identifier columns, pH, pe, component totals, one amount and one
    /// delta column per equilibrium phase and per kinetic reactant, then the user punch
    /// headings. Identifier and delta columns are dropped.
    pub fn derive(basic_output_setups: BasicOutputSetups, systems: &ChemicalSystems) -> Self {
        let mut accepted_items = Vec::new();
        let mut dropped_item_ids = BTreeSet::new();
        let mut column = 0;

        for _ in 0..BasicOutputSetups::num_identifier_columns() {
            dropped_item_ids.insert(column);
            column += 1;
        }

        let mut accept = |item: OutputItem, column: &mut usize| {
            accepted_items.push(item);
            *column += 1;
        };

        accept(OutputItem::new("pH", ItemType::Ph), &mut column);
        accept(OutputItem::new("pe", ItemType::Pe), &mut column);

        if let Some(solution) = systems.aqueous_solutions.first() {
            for component in &solution.components {
                accept(
                    OutputItem::new(&component.name, ItemType::Component),
                    &mut column,
                );
            }
        }

        for phase in &systems.equilibrium_phases {
            accept(
                OutputItem::new(&phase.name, ItemType::EquilibriumPhase),
                &mut column,
            );
            dropped_item_ids.insert(column);
            column += 1;
        }

        for reactant in &systems.kinetic_reactants {
            accept(
                OutputItem::new(&reactant.name, ItemType::KineticReactant),
                &mut column,
            );
            dropped_item_ids.insert(column);
            column += 1;
        }

        if let Some(user_punch) = &systems.user_punch {
            for variable in &user_punch.secondary_variables {
                accept(
                    OutputItem::new(&variable.name, ItemType::SecondaryVariable),
                    &mut column,
                );
            }
        }

        Self {
            basic_output_setups,
            accepted_items,
            dropped_item_ids,
        }
    }

    /// Builds a schema for an externally arranged result table.
    pub fn from_parts(
        basic_output_setups: BasicOutputSetups,
        accepted_items: Vec<OutputItem>,
        dropped_item_ids: impl IntoIterator<Item = usize>,
    ) -> Result<Self, SchemaError> {
        let dropped_item_ids: BTreeSet<usize> = dropped_item_ids.into_iter().collect();
        let num_columns = accepted_items.len() + dropped_item_ids.len();
        if let Some(&column) = dropped_item_ids.iter().find(|&&c| c >= num_columns) {
            return Err(SchemaError::DroppedColumnOutOfRange {
                column,
                num_columns,
            });
        }
        Ok(Self {
            basic_output_setups,
            accepted_items,
            dropped_item_ids,
        })
    }

    pub fn accepted_items(&self) -> &[OutputItem] {
        &self.accepted_items
    }

    pub fn dropped_item_ids(&self) -> &BTreeSet<usize> {
        &self.dropped_item_ids
    }

    pub fn is_dropped(&self, column: usize) -> bool {
        self.dropped_item_ids.contains(&column)
    }

    /// Number of tokens every data row must contain.
    pub fn num_columns(&self) -> usize {
        self.accepted_items.len() + self.dropped_item_ids.len()
    }

    pub fn output_file(&self) -> &Path {
        &self.basic_output_setups.output_file
    }

    pub fn items_of_type(&self, item_type: ItemType) -> impl Iterator<Item = &OutputItem> + '_ {
        self.accepted_items
            .iter()
            .filter(move |item| item.item_type == item_type)
    }
}

fn write_item_list(
    writer: &mut impl Write,
    directive: &str,
    schema: &OutputSchema,
    item_type: ItemType,
) -> Result<(), ScriptError> {
    let mut items = schema.items_of_type(item_type).peekable();
    if items.peek().is_none() {
        return Ok(());
    }
    write!(writer, "{}", directive)?;
    for item in items {
        write!(writer, " {}", item.name)?;
    }
    writeln!(writer)?;
    Ok(())
}

impl ScriptBlock for OutputSchema {
    fn write_block(&self, writer: &mut impl Write) -> Result<(), ScriptError> {
        writeln!(writer, "SELECTED_OUTPUT")?;
        self.basic_output_setups.write_block(writer)?;
        write_item_list(writer, "-totals", self, ItemType::Component)?;
        write_item_list(
            writer,
            "-equilibrium_phases",
            self,
            ItemType::EquilibriumPhase,
        )?;
        write_item_list(
            writer,
            "-kinetic_reactants",
            self,
            ItemType::KineticReactant,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::phases::{EquilibriumPhase, KineticReactant};
    use crate::core::models::solution::{AqueousSolution, Component};
    use crate::core::models::user_punch::UserPunch;

    fn systems() -> ChemicalSystems {
        ChemicalSystems {
            aqueous_solutions: vec![AqueousSolution::new(vec![
                Component::new("Ca", 1.0),
                Component::new("Mg", 1.0),
            ])],
            equilibrium_phases: vec![EquilibriumPhase::uniform("Calcite", 0.0, 1.0, 1)],
            kinetic_reactants: vec![KineticReactant::uniform("Pyrite", 1.0, 1)],
            user_punch: Some(UserPunch::new(&["porosity".to_string()], Vec::new(), 1)),
            ..Default::default()
        }
    }

    #[test]
    fn derived_schema_drops_identifier_and_delta_columns() {
        let schema = OutputSchema::derive(BasicOutputSetups::new("out.txt", true), &systems());

        let names: Vec<_> = schema
            .accepted_items()
            .iter()
            .map(|item| item.name.as_str())
            .collect();
        assert_eq!(
            names,
            ["pH", "pe", "Ca", "Mg", "Calcite", "Pyrite", "porosity"]
        );
        // state, soln | pH pe Ca Mg | Calcite d_Calcite | Pyrite dk_Pyrite | porosity
        assert_eq!(
            schema.dropped_item_ids().iter().copied().collect::<Vec<_>>(),
            vec![0, 1, 7, 9]
        );
        assert_eq!(schema.num_columns(), 11);
    }

    #[test]
    fn from_parts_rejects_drops_beyond_row_width() {
        let items = vec![OutputItem::new("pH", ItemType::Ph)];
        let err = OutputSchema::from_parts(BasicOutputSetups::new("out", false), items, [5])
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DroppedColumnOutOfRange {
                column: 5,
                num_columns: 2
            }
        );
    }

    #[test]
    fn selected_output_block_lists_items_by_type() {
        let schema = OutputSchema::derive(BasicOutputSetups::new("run.out", false), &systems());
        let mut buffer = Vec::new();
        schema.write_block(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("SELECTED_OUTPUT\n-file run.out\n-high_precision false\n"));
        assert!(text.contains("-state true\n-solution true\n"));
        assert!(text.contains("-totals Ca Mg\n"));
        assert!(text.contains("-equilibrium_phases Calcite\n"));
        assert!(text.ends_with("-kinetic_reactants Pyrite\n"));
    }

    #[test]
    fn selected_output_block_skips_empty_lists() {
        let systems = ChemicalSystems {
            aqueous_solutions: vec![AqueousSolution::default()],
            ..Default::default()
        };
        let schema = OutputSchema::derive(BasicOutputSetups::new("run.out", false), &systems);
        let mut buffer = Vec::new();
        schema.write_block(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(!text.contains("-totals"));
        assert!(!text.contains("-equilibrium_phases"));
        assert!(text.ends_with("-pe true\n"));
    }
}
