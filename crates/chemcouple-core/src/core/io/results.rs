use crate::core::io::output::{ItemType, OutputSchema};
use crate::core::models::ids::ChemicalSystemMap;
use crate::core::models::lookup::{EntityKind, LookupError, position_by_name};
use crate::core::models::system::ChemicalSystems;
use std::io::{self, BufRead};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error)]
pub enum ResultError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Engine run finished without writing a result table")]
    NotWritten,

    #[error("Result table is empty; the header line is missing")]
    MissingHeader,

    #[error("No aqueous solution is set up for chemical system {system_id}")]
    MissingSolution { system_id: usize },

    #[error("Error when reading calculation result of solution {system_id} after the reaction")]
    MissingRow { system_id: usize },

    #[error(
        "Row of chemical system {system_id} has {found} column(s), but the output schema expects {expected}"
    )]
    ColumnCount {
        system_id: usize,
        expected: usize,
        found: usize,
    },

    #[error(
        "Could not convert string '{value}' to a number for chemical system {system_id}, column {column}"
    )]
    Parse {
        value: String,
        system_id: usize,
        column: usize,
    },

    #[error("Chemical system {system_id}: {source}")]
    Lookup {
        system_id: usize,
        #[source]
        source: LookupError,
    },

    #[error("{kind} '{name}' has no slot for chemical system {system_id}")]
    MissingSlot {
        kind: EntityKind,
        name: String,
        system_id: usize,
    },
}

/// Where one accepted column of a row ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Ph,
    Pe,
    Component(usize),
    EquilibriumPhase(usize),
    KineticReactant(usize),
    SecondaryVariable(usize),
}

/// Splits a row on tabs and spaces, collapsing runs of separators.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.trim_end_matches(['\n', '\r'])
        .split([' ', '\t'])
        .filter(|token| !token.is_empty())
        .collect()
}

/// Parses the accepted columns of one row into numbers, in schema order.
pub fn parse_row(
    line: &str,
    schema: &OutputSchema,
    system_id: usize,
) -> Result<Vec<f64>, ResultError> {
    let tokens = tokenize(line);
    if tokens.len() != schema.num_columns() {
        return Err(ResultError::ColumnCount {
            system_id,
            expected: schema.num_columns(),
            found: tokens.len(),
        });
    }

    tokens
        .into_iter()
        .enumerate()
        .filter(|(column, _)| !schema.is_dropped(*column))
        .map(|(column, token)| {
            token.parse::<f64>().map_err(|_| ResultError::Parse {
                value: token.to_string(),
                system_id,
                column,
            })
        })
        .collect()
}

/// Reads the engine's selected-output table back into `systems`.
///
/// The table holds one header line and, for every system in local order, `skipped_lines`
/// intermediate rows followed by the row with the reacted state. A system is only modified
/// once its whole row has been parsed and every target has been resolved.
///
/// # Errors
///
/// Any malformed or missing row, unparsable token or unknown entity aborts the read.
pub fn read_results(
    reader: &mut impl BufRead,
    systems: &mut ChemicalSystems,
    schema: &OutputSchema,
    system_map: &ChemicalSystemMap,
) -> Result<(), ResultError> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(ResultError::MissingHeader);
    }

    let skipped_lines = systems.skipped_lines();
    for (local_id, global_id) in system_map.iter() {
        for _ in 0..skipped_lines {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Err(ResultError::MissingRow {
                    system_id: global_id,
                });
            }
        }

        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(ResultError::MissingRow {
                system_id: global_id,
            });
        }

        let values = parse_row(&line, schema, global_id)?;
        let targets = resolve_targets(systems, schema, local_id, global_id)?;
        apply(systems, local_id, global_id, &targets, &values);
        trace!(system_id = global_id, "Routed {} result value(s).", values.len());
    }
    Ok(())
}

fn resolve_targets(
    systems: &ChemicalSystems,
    schema: &OutputSchema,
    local_id: usize,
    global_id: usize,
) -> Result<Vec<Target>, ResultError> {
    let lookup_err = |source: LookupError| ResultError::Lookup {
        system_id: global_id,
        source,
    };
    let ensure_slot = |len: usize, kind: EntityKind, name: &str| {
        if global_id < len {
            Ok(())
        } else {
            Err(ResultError::MissingSlot {
                kind,
                name: name.to_string(),
                system_id: global_id,
            })
        }
    };

    let solution = systems
        .aqueous_solutions
        .get(local_id)
        .ok_or(ResultError::MissingSolution {
            system_id: global_id,
        })?;

    schema
        .accepted_items()
        .iter()
        .map(|item| {
            let name = item.name.as_str();
            match item.item_type {
                ItemType::Ph => Ok(Target::Ph),
                ItemType::Pe => Ok(Target::Pe),
                ItemType::Component => position_by_name(&solution.components, name)
                    .map(Target::Component)
                    .map_err(lookup_err),
                ItemType::EquilibriumPhase => {
                    let idx = position_by_name(&systems.equilibrium_phases, name)
                        .map_err(lookup_err)?;
                    let phase = &systems.equilibrium_phases[idx];
                    ensure_slot(phase.amount.len(), EntityKind::EquilibriumPhase, name)?;
                    Ok(Target::EquilibriumPhase(idx))
                }
                ItemType::KineticReactant => {
                    let idx = position_by_name(&systems.kinetic_reactants, name)
                        .map_err(lookup_err)?;
                    let reactant = &systems.kinetic_reactants[idx];
                    ensure_slot(reactant.amount.len(), EntityKind::KineticReactant, name)?;
                    Ok(Target::KineticReactant(idx))
                }
                ItemType::SecondaryVariable => {
                    let variables = systems
                        .user_punch
                        .as_ref()
                        .map(|punch| punch.secondary_variables.as_slice())
                        .unwrap_or_default();
                    let idx = position_by_name(variables, name).map_err(lookup_err)?;
                    ensure_slot(
                        variables[idx].value.len(),
                        EntityKind::SecondaryVariable,
                        name,
                    )?;
                    Ok(Target::SecondaryVariable(idx))
                }
            }
        })
        .collect()
}

fn apply(
    systems: &mut ChemicalSystems,
    local_id: usize,
    global_id: usize,
    targets: &[Target],
    values: &[f64],
) {
    for (&target, &value) in targets.iter().zip(values) {
        match target {
            Target::Ph => systems.aqueous_solutions[local_id].ph = value,
            Target::Pe => systems.aqueous_solutions[local_id].pe = value,
            Target::Component(idx) => {
                systems.aqueous_solutions[local_id].components[idx].amount = value
            }
            Target::EquilibriumPhase(idx) => {
                systems.equilibrium_phases[idx].amount[global_id] = value
            }
            Target::KineticReactant(idx) => systems.kinetic_reactants[idx].amount[global_id] = value,
            Target::SecondaryVariable(idx) => {
                if let Some(punch) = systems.user_punch.as_mut() {
                    punch.secondary_variables[idx].value[global_id] = value;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::output::{BasicOutputSetups, OutputItem};
    use crate::core::models::phases::{EquilibriumPhase, KineticReactant, SurfaceSite};
    use crate::core::models::solution::{AqueousSolution, Component};
    use crate::core::models::user_punch::UserPunch;
    use std::io::Cursor;

    fn ca_systems(amounts: &[f64]) -> ChemicalSystems {
        ChemicalSystems {
            aqueous_solutions: amounts
                .iter()
                .map(|&a| AqueousSolution::new(vec![Component::new("Ca", a)]))
                .collect(),
            ..Default::default()
        }
    }

    fn ph_pe_ca_schema(dropped: &[usize]) -> OutputSchema {
        OutputSchema::from_parts(
            BasicOutputSetups::new("run.out", false),
            vec![
                OutputItem::new("pH", ItemType::Ph),
                OutputItem::new("pe", ItemType::Pe),
                OutputItem::new("Ca", ItemType::Component),
            ],
            dropped.iter().copied(),
        )
        .unwrap()
    }

    // Each system emits one intermediate row before the reacted one.
    fn table(rows: &[&str]) -> String {
        let mut text = String::from("pH\tpe\tCa\n");
        for row in rows {
            text.push_str("0 0 0\n");
            text.push_str(row);
            text.push('\n');
        }
        text
    }

    #[test]
    fn three_system_table_routes_values_in_local_order() {
        let mut systems = ca_systems(&[1.0, 2.0, 3.0]);
        let map = ChemicalSystemMap::identity(3);
        let text = table(&["7.0 4.0 1.5", "7.1\t4.1\t2.5", "  7.2 \t 4.2   3.5  "]);

        read_results(
            &mut Cursor::new(text),
            &mut systems,
            &ph_pe_ca_schema(&[]),
            &map,
        )
        .unwrap();

        let ph: Vec<f64> = systems.aqueous_solutions.iter().map(|s| s.ph).collect();
        let pe: Vec<f64> = systems.aqueous_solutions.iter().map(|s| s.pe).collect();
        let ca: Vec<f64> = systems
            .aqueous_solutions
            .iter()
            .map(|s| s.components[0].amount)
            .collect();
        assert_eq!(ph, vec![7.0, 7.1, 7.2]);
        assert_eq!(pe, vec![4.0, 4.1, 4.2]);
        assert_eq!(ca, vec![1.5, 2.5, 3.5]);
    }

    #[test]
    fn permuted_map_routes_array_values_to_global_ids() {
        let mut systems = ca_systems(&[0.0, 0.0, 0.0]);
        systems.equilibrium_phases = vec![EquilibriumPhase::uniform("Calcite", 0.0, -1.0, 3)];
        let schema = OutputSchema::from_parts(
            BasicOutputSetups::new("run.out", false),
            vec![
                OutputItem::new("Ca", ItemType::Component),
                OutputItem::new("Calcite", ItemType::EquilibriumPhase),
            ],
            [],
        )
        .unwrap();
        let map = ChemicalSystemMap::new(vec![2, 1, 0]).unwrap();
        let text = table(&["10 100", "20 200", "30 300"]);

        read_results(&mut Cursor::new(text), &mut systems, &schema, &map).unwrap();

        assert_eq!(systems.aqueous_solutions[0].components[0].amount, 10.0);
        assert_eq!(systems.aqueous_solutions[2].components[0].amount, 30.0);
        assert_eq!(systems.equilibrium_phases[0].amount, vec![300.0, 200.0, 100.0]);
    }

    #[test]
    fn dropped_columns_never_reach_entities() {
        let schema = ph_pe_ca_schema(&[0, 2]);
        for junk in ["1e300", "-42", "NaN", "0"] {
            let mut systems = ca_systems(&[1.0]);
            let row = format!("{junk} 6.5 {junk} 3.0 0.25");
            read_results(
                &mut Cursor::new(table(&[row.as_str()])),
                &mut systems,
                &schema,
                &ChemicalSystemMap::identity(1),
            )
            .unwrap();
            let solution = &systems.aqueous_solutions[0];
            assert_eq!(solution.ph, 6.5);
            assert_eq!(solution.pe, 3.0);
            assert_eq!(solution.components[0].amount, 0.25);
        }
    }

    #[test]
    fn row_arity_must_match_schema_plus_drops() {
        let schema = ph_pe_ca_schema(&[0]);
        for row in ["1 7.0 4.0", "1 7.0 4.0 1.5 9.9"] {
            let mut systems = ca_systems(&[1.0]);
            let err = read_results(
                &mut Cursor::new(table(&[row])),
                &mut systems,
                &schema,
                &ChemicalSystemMap::identity(1),
            )
            .unwrap_err();
            assert!(matches!(
                err,
                ResultError::ColumnCount {
                    system_id: 0,
                    expected: 4,
                    ..
                }
            ));
        }
    }

    #[test]
    fn short_row_fails_without_touching_that_system() {
        let mut systems = ca_systems(&[1.0, 2.0]);
        let map = ChemicalSystemMap::new(vec![5, 9]).unwrap();
        let original_second = systems.aqueous_solutions[1].clone();
        let text = table(&["7.0 4.0 1.5", "7.1 4.1"]);

        let err = read_results(
            &mut Cursor::new(text),
            &mut systems,
            &ph_pe_ca_schema(&[]),
            &map,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ResultError::ColumnCount {
                system_id: 9,
                expected: 3,
                found: 2
            }
        ));
        assert!(err.to_string().contains("chemical system 9"));
        assert_eq!(systems.aqueous_solutions[1], original_second);
        assert_eq!(systems.aqueous_solutions[0].ph, 7.0);
    }

    #[test]
    fn non_numeric_token_reports_value_system_and_column() {
        let mut systems = ca_systems(&[1.0]);
        let err = read_results(
            &mut Cursor::new(table(&["7.0 abc 1.0"])),
            &mut systems,
            &ph_pe_ca_schema(&[]),
            &ChemicalSystemMap::identity(1),
        )
        .unwrap_err();
        match err {
            ResultError::Parse {
                value,
                system_id,
                column,
            } => {
                assert_eq!(value, "abc");
                assert_eq!(system_id, 0);
                assert_eq!(column, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(systems.aqueous_solutions[0].ph, 7.0);
    }

    #[test]
    fn unknown_component_in_schema_is_fatal_and_leaves_system_untouched() {
        let mut systems = ca_systems(&[1.0]);
        let schema = OutputSchema::from_parts(
            BasicOutputSetups::new("run.out", false),
            vec![
                OutputItem::new("pH", ItemType::Ph),
                OutputItem::new("Na", ItemType::Component),
            ],
            [],
        )
        .unwrap();
        let err = read_results(
            &mut Cursor::new(table(&["8.0 1.0"])),
            &mut systems,
            &schema,
            &ChemicalSystemMap::identity(1),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ResultError::Lookup {
                system_id: 0,
                source: LookupError {
                    kind: EntityKind::Component,
                    ..
                }
            }
        ));
        assert_eq!(systems.aqueous_solutions[0].ph, 7.0);
    }

    #[test]
    fn secondary_variable_without_user_punch_is_a_lookup_error() {
        let mut systems = ca_systems(&[1.0]);
        let schema = OutputSchema::from_parts(
            BasicOutputSetups::new("run.out", false),
            vec![OutputItem::new("porosity", ItemType::SecondaryVariable)],
            [],
        )
        .unwrap();
        let err = read_results(
            &mut Cursor::new(table(&["0.3"])),
            &mut systems,
            &schema,
            &ChemicalSystemMap::identity(1),
        )
        .unwrap_err();
        assert!(matches!(err, ResultError::Lookup { .. }));
    }

    #[test]
    fn missing_rows_and_header_are_reported() {
        let mut systems = ca_systems(&[1.0, 1.0]);
        let schema = ph_pe_ca_schema(&[]);
        let map = ChemicalSystemMap::identity(2);

        let err = read_results(&mut Cursor::new(""), &mut systems, &schema, &map).unwrap_err();
        assert!(matches!(err, ResultError::MissingHeader));

        let err = read_results(
            &mut Cursor::new(table(&["7 4 1"])),
            &mut systems,
            &schema,
            &map,
        )
        .unwrap_err();
        assert!(matches!(err, ResultError::MissingRow { system_id: 1 }));
    }

    #[test]
    fn row_without_a_solution_is_not_reported_as_missing_row() {
        let mut systems = ca_systems(&[1.0]);
        let map = ChemicalSystemMap::identity(2);

        let err = read_results(
            &mut Cursor::new(table(&["7 4 2", "7 4 3"])),
            &mut systems,
            &ph_pe_ca_schema(&[]),
            &map,
        )
        .unwrap_err();

        assert!(matches!(err, ResultError::MissingSolution { system_id: 1 }));
        assert!(err.to_string().contains("No aqueous solution"));
    }

    #[test]
    fn derived_schema_with_surface_skips_two_rows_and_fills_all_entities() {
        let mut systems = ca_systems(&[1.0, 1.0]);
        systems.equilibrium_phases = vec![EquilibriumPhase::uniform("Calcite", 0.0, 1.0, 2)];
        systems.kinetic_reactants = vec![KineticReactant::uniform("Pyrite", 1.0, 2)];
        systems.surface = vec![SurfaceSite::uniform("Hfo_w", 2.0, 600.0, 1.0, 2)];
        systems.user_punch = Some(UserPunch::new(&["phi".to_string()], Vec::new(), 2));
        let schema = OutputSchema::derive(BasicOutputSetups::new("run.out", true), &systems);

        let text = "\
state soln pH pe Ca Calcite d_Calcite k_Pyrite dk_Pyrite phi
i_soln 1 7 4 1 0 0 0 0 0
react 1 7 4 1 0 0 0 0 0
react 1 8.1 -2 0.5 0.9 -0.1 0.8 -0.2 0.31
i_soln 2 7 4 1 0 0 0 0 0
react 2 7 4 1 0 0 0 0 0
react 2 8.2 -3 0.6 0.7 -0.3 0.6 -0.4 0.32
";
        read_results(
            &mut Cursor::new(text),
            &mut systems,
            &schema,
            &ChemicalSystemMap::identity(2),
        )
        .unwrap();

        assert_eq!(systems.aqueous_solutions[1].ph, 8.2);
        assert_eq!(systems.aqueous_solutions[1].pe, -3.0);
        assert_eq!(systems.aqueous_solutions[0].components[0].amount, 0.5);
        assert_eq!(systems.equilibrium_phases[0].amount, vec![0.9, 0.7]);
        assert_eq!(systems.kinetic_reactants[0].amount, vec![0.8, 0.6]);
        let punch = systems.user_punch.as_ref().unwrap();
        assert_eq!(punch.secondary_variables[0].value, vec![0.31, 0.32]);
    }
}
