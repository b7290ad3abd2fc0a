use crate::cli::{Cli, Commands};
use crate::domain::models::CheckReport;
use crate::services::config::{check_max_iterations, load_config};
use crate::services::controller::Collaborators;
use crate::services::layout::RunLayout;
use crate::services::output::print_one;
use crate::services::pipeline::execute_run;
use crate::services::tools::CommandToolset;
use crate::services::workspace::prompt_overwrite;

pub fn handle_runtime_commands(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Run {
            max_iterations,
            yes,
        } => {
            let mut config = load_config(&cli.config)?;
            if let Some(n) = max_iterations {
                config.max_iterations = check_max_iterations(*n)?;
            }
            if *yes {
                config.interactive = false;
            }

            if !cli.json {
                println!("Welcome to brainviset");
            }
            let mut toolset = CommandToolset::from_config(&config.tools);
            let report = execute_run(
                &config,
                &mut toolset.initializer,
                &mut Collaborators {
                    engine: &mut toolset.engine,
                    similarity: &mut toolset.similarity,
                    updater: &mut toolset.updater,
                },
                prompt_overwrite,
            )?;
            print_one(cli.json, report, |r| {
                format!(
                    "{} after {} iterations. Final activity map is {}",
                    r.termination.reason,
                    r.termination.iterations_run,
                    r.termination.final_activity_map.display()
                )
            })?;
        }
        Commands::Check => {
            let config = load_config(&cli.config)?;
            let layout = RunLayout::new(&config.output_dir);
            let report = CheckReport {
                maps_dir: layout.maps_dir(),
                run_log: layout.run_log(),
                iteration_dir_pattern: layout.iteration_dir_pattern(),
                iteration_count: config.max_iterations.max(0) as usize,
                config,
            };
            print_one(cli.json, report, |r| {
                format!(
                    "patient: {}\nreference: {}\noutput: {}\nmax iterations: {}\niteration dirs: {} x{}\nscanner: {} {} x{}",
                    r.config.patient_dirname,
                    r.config.reference_image.display(),
                    r.config.output_dir.display(),
                    r.config.max_iterations,
                    r.iteration_dir_pattern.display(),
                    r.iteration_count,
                    r.config.scanner.name,
                    r.config.scanner.recons_type,
                    r.config.scanner.recons_iterations
                )
            })?;
        }
    }
    Ok(())
}
