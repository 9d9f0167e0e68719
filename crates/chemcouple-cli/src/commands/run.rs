use crate::cli::RunArgs;
use crate::config::{PartialCouplingConfig, RunConfig};
use crate::error::{CliError, Result};
use crate::utils::progress::StepProgress;
use chemcouple::core::models::ids::ChemicalSystemMap;
use chemcouple::engine::process::ProcessEngine;
use chemcouple::workflows::coupling::CouplingOrchestrator;
use std::fs;
use std::path::Path;
use tracing::info;

pub fn run(args: RunArgs, quiet: bool) -> Result<()> {
    let partial_config = PartialCouplingConfig::from_file(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let RunConfig {
        coupling,
        engine,
        system_map,
        transport,
        steps,
        dt,
    } = partial_config.merge_with_cli(&args)?;

    if let Some(parent) = coupling.input_file().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let names: Vec<String> = transport.iter().map(|t| t.name.clone()).collect();
    let mut vectors: Vec<Vec<f64>> = transport.into_iter().map(|t| t.values).collect();

    info!("Setting up coupling with engine {:?}", &engine);
    let mut orchestrator =
        CouplingOrchestrator::new(coupling, system_map, ProcessEngine::new(engine))?;

    let progress = if quiet {
        StepProgress::hidden(steps as u64)
    } else {
        StepProgress::new(steps as u64)
    };

    progress.start_initial_calculation();
    orchestrator.initial_calculation(&mut vectors)?;

    if let Some(dt) = dt {
        progress.start_stepping();
        for _ in 0..steps {
            orchestrator.step(&mut vectors, dt)?;
            progress.step_done();
        }
    }
    progress.finish();

    write_results(&args.output, &names, &vectors, orchestrator.system_map())?;
    info!("Wrote final transport values to {:?}", &args.output);
    println!(
        "Coupled run complete ({} step(s)). Results written to: {}",
        steps,
        args.output.display()
    );
    Ok(())
}

/// Writes one row per node of `system_map`, in ascending global id, with one column per
/// transported quantity.
pub fn write_results(
    path: &Path,
    names: &[String],
    vectors: &[Vec<f64>],
    system_map: &ChemicalSystemMap,
) -> Result<()> {
    let output_err = |source: csv::Error| CliError::Output {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(output_err)?;
    let mut header = vec!["node".to_string()];
    header.extend(names.iter().cloned());
    writer.write_record(&header).map_err(output_err)?;

    let mut global_ids = system_map.global_ids().to_vec();
    global_ids.sort_unstable();
    for global_id in global_ids {
        let mut record = vec![global_id.to_string()];
        for (name, vector) in names.iter().zip(vectors) {
            let value = vector.get(global_id).copied().ok_or_else(|| {
                CliError::Argument(format!(
                    "Transport variable '{}' has no value for node {}",
                    name, global_id
                ))
            })?;
            record.push(value.to_string());
        }
        writer.write_record(&record).map_err(output_err)?;
    }
    writer.flush().map_err(|e| output_err(e.into()))?;
    Ok(())
}
