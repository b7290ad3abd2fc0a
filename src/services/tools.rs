//! External-command collaborators.
//!
//! Every tool is a `program` plus `args`; `{name}` tokens in the arguments are
//! substituted per invocation. Unknown tokens are passed through untouched.

use crate::domain::models::{MapPair, Reconstruction, ToolCommand, ToolsConfig};
use crate::services::controller::{
    MapUpdater, SimilarityEvaluator, SimulationEngine, SimulationJob, UpdateJob,
};
use crate::services::pipeline::{InitJob, MapInitializer};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub fn render_args(args: &[String], vars: &[(&str, String)]) -> Vec<String> {
    args.iter()
        .map(|a| {
            let mut out = a.clone();
            for (k, v) in vars {
                out = out.replace(&format!("{{{}}}", k), v);
            }
            out
        })
        .collect()
}

fn path_var(p: &Path) -> String {
    p.to_string_lossy().to_string()
}

fn invoke(tool: &str, cmd: &ToolCommand, vars: &[(&str, String)]) -> anyhow::Result<Output> {
    let args = render_args(&cmd.args, vars);
    log::debug!("{}: {} {}", tool, cmd.program, args.join(" "));
    let out = Command::new(&cmd.program).args(&args).output()?;
    let stderr = String::from_utf8_lossy(&out.stderr);
    if !stderr.trim().is_empty() {
        log::debug!("{} stderr: {}", tool, stderr.trim());
    }
    Ok(out)
}

fn require_success(tool: &str, out: &Output) -> anyhow::Result<()> {
    if out.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&out.stderr);
    let last = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("");
    anyhow::bail!("{} exited with {}: {}", tool, out.status, last.trim())
}

pub struct CommandInitializer {
    pub command: ToolCommand,
}

impl MapInitializer for CommandInitializer {
    fn initialize(&mut self, job: &InitJob<'_>) -> anyhow::Result<MapPair> {
        let vars = [
            ("pet", path_var(job.pet)),
            ("mri", path_var(job.mri)),
            ("ct", job.ct.map(path_var).unwrap_or_default()),
            ("maps_dir", path_var(job.work_dir)),
            ("act_map", path_var(&job.activity)),
            ("att_map", path_var(&job.attenuation)),
        ];
        let out = invoke("initializer", &self.command, &vars)?;
        require_success("initializer", &out)?;
        for p in [&job.activity, &job.attenuation] {
            if !p.exists() {
                anyhow::bail!("initializer did not write {}", p.display());
            }
        }
        Ok(MapPair {
            activity: job.activity.clone(),
            attenuation: job.attenuation.clone(),
        })
    }
}

pub struct CommandEngine {
    pub command: ToolCommand,
}

impl SimulationEngine for CommandEngine {
    fn simulate(&mut self, job: &SimulationJob<'_>) -> Option<Reconstruction> {
        let vars = [
            ("act_map", path_var(&job.maps.activity)),
            ("att_map", path_var(&job.maps.attenuation)),
            ("output_dir", path_var(&job.output_dir)),
            ("scanner", job.scanner.name.clone()),
            ("recons_type", job.scanner.recons_type.clone()),
            ("recons_iterations", job.scanner.recons_iterations.to_string()),
            ("sim_type", job.sim_type.unwrap_or_default().to_string()),
            ("iteration", job.iteration.to_string()),
            ("reconstruction", path_var(&job.expected.image)),
            ("registered", path_var(&job.expected.registered)),
        ];
        match invoke("engine", &self.command, &vars) {
            Ok(out) if !out.status.success() => {
                log::warn!("engine exited with {} for iteration {}", out.status, job.iteration)
            }
            Ok(_) => {}
            Err(e) => log::warn!("engine could not be started: {}", e),
        }
        (job.expected.image.exists() && job.expected.registered.exists())
            .then(|| job.expected.clone())
    }
}

pub struct CommandSimilarity {
    pub command: ToolCommand,
}

pub fn parse_score(stdout: &str) -> anyhow::Result<f64> {
    let line = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| anyhow::anyhow!("similarity evaluator printed nothing"))?;
    let score: f64 = line
        .parse()
        .map_err(|_| anyhow::anyhow!("not a similarity score: {:?}", line))?;
    if !score.is_finite() {
        anyhow::bail!("not a finite similarity score: {}", score);
    }
    Ok(score)
}

impl SimilarityEvaluator for CommandSimilarity {
    fn score(&mut self, reference: &Path, candidate: &Path) -> anyhow::Result<f64> {
        let vars = [
            ("reference", path_var(reference)),
            ("candidate", path_var(candidate)),
        ];
        let out = invoke("similarity", &self.command, &vars)?;
        require_success("similarity", &out)?;
        parse_score(&String::from_utf8_lossy(&out.stdout))
    }
}

pub struct CommandUpdater {
    pub command: ToolCommand,
}

impl MapUpdater for CommandUpdater {
    fn update(&mut self, job: &UpdateJob<'_>) -> anyhow::Result<PathBuf> {
        let vars = [
            ("previous", path_var(job.previous)),
            ("att_map", path_var(job.attenuation)),
            ("reference", path_var(job.reference)),
            ("reconstruction", path_var(job.reconstruction)),
            ("output", path_var(&job.output)),
            ("axial_fov", job.axial_fov.to_string()),
            ("iteration", job.iteration.to_string()),
        ];
        let out = invoke("updater", &self.command, &vars)?;
        require_success("updater", &out)?;
        if !job.output.exists() {
            anyhow::bail!("updater did not write {}", job.output.display());
        }
        Ok(job.output.clone())
    }
}

/// The four command-backed collaborators of one run.
pub struct CommandToolset {
    pub initializer: CommandInitializer,
    pub engine: CommandEngine,
    pub similarity: CommandSimilarity,
    pub updater: CommandUpdater,
}

impl CommandToolset {
    pub fn from_config(tools: &ToolsConfig) -> Self {
        Self {
            initializer: CommandInitializer {
                command: tools.initializer.clone(),
            },
            engine: CommandEngine {
                command: tools.engine.clone(),
            },
            similarity: CommandSimilarity {
                command: tools.similarity.clone(),
            },
            updater: CommandUpdater {
                command: tools.updater.clone(),
            },
        }
    }
}
