use crate::domain::models::{MapPair, RunConfig, RunReport};
use crate::error::RunError;
use crate::services::config::check_max_iterations;
use crate::services::controller::{Collaborators, ConvergenceController};
use crate::services::layout::RunLayout;
use crate::services::runlog::RunLog;
use crate::services::workspace::prepare_workspace;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

pub struct InitJob<'a> {
    pub pet: &'a Path,
    pub mri: &'a Path,
    pub ct: Option<&'a Path>,
    pub work_dir: &'a Path,
    pub activity: PathBuf,
    pub attenuation: PathBuf,
}

pub trait MapInitializer {
    fn initialize(&mut self, job: &InitJob<'_>) -> anyhow::Result<MapPair>;
}

pub fn file_sha256(path: &Path) -> anyhow::Result<String> {
    let bytes = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// One full run: workspace, initial maps, convergence loop, `run.json`.
pub fn execute_run(
    config: &RunConfig,
    initializer: &mut dyn MapInitializer,
    tools: &mut Collaborators<'_>,
    confirm: impl FnMut(&Path) -> bool,
) -> anyhow::Result<RunReport> {
    check_max_iterations(config.max_iterations)?;
    std::fs::create_dir_all(&config.results_dir)?;
    let layout = RunLayout::new(&config.output_dir);
    if let Err(e) = prepare_workspace(&layout, config.interactive, config.max_iterations, confirm)
    {
        log::error!("{}", e);
        return Err(e);
    }

    let log = RunLog::new(layout.clone());
    log.run(&format!(
        "Starting brainviset for {} (max {} iterations)",
        config.patient_dirname, config.max_iterations
    ));
    log.run("Generating initial act and att maps from PET, (CT), and MRI data...");

    let maps_dir = layout.maps_dir();
    let job = InitJob {
        pet: &config.pet_image,
        mri: &config.mri_image,
        ct: config.ct_image.as_deref(),
        work_dir: &maps_dir,
        activity: layout.activity_map(0),
        attenuation: layout.attenuation_map(),
    };
    let maps = match initializer.initialize(&job) {
        Ok(m) => m,
        Err(e) => {
            let err = RunError::collaborator("map initializer", e);
            log.failure(None, &err.to_string());
            return Err(err.into());
        }
    };
    let attenuation_sha256 = file_sha256(&maps.attenuation)?;
    log.run(&format!(
        "Initial maps: activity {} attenuation {}",
        maps.activity.display(),
        maps.attenuation.display()
    ));

    let controller = ConvergenceController::for_run(config, &layout, &log);
    let termination = controller.run(&maps, tools)?;

    match file_sha256(&maps.attenuation) {
        Ok(d) if d == attenuation_sha256 => {}
        _ => log.failure(
            None,
            &format!(
                "Attenuation map {} changed during the run",
                maps.attenuation.display()
            ),
        ),
    }

    log.run(&format!(
        "Run finished: {} after {} iterations. Final activity map is {}",
        termination.reason,
        termination.iterations_run,
        termination.final_activity_map.display()
    ));

    let report = RunReport {
        patient: config.patient_dirname.clone(),
        output_dir: config.output_dir.clone(),
        maps,
        attenuation_sha256,
        max_iterations: config.max_iterations,
        termination,
    };
    std::fs::write(layout.report(), serde_json::to_string_pretty(&report)?)?;
    Ok(report)
}
