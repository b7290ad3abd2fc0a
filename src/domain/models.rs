use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub interactive_mode: bool,
    #[serde(default)]
    pub dir_data_path: Option<PathBuf>,
    #[serde(default)]
    pub dir_results_path: Option<PathBuf>,
    pub params: ParamsSection,
    pub scanner: ScannerSection,
    pub tools: ToolsConfig,
}

#[derive(Debug, Deserialize)]
pub struct ParamsSection {
    pub patient_dirname: String,
    pub pet_image: String,
    pub mri_image: String,
    #[serde(default)]
    pub ct_image: Option<String>,
    pub output_dir: String,
    #[serde(default)]
    pub maximum_iteration: i64,
    pub scanner: String,
    #[serde(default)]
    pub sim_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScannerSection {
    pub recons_type: String,
    pub number_of_iterations: u32,
    #[serde(default)]
    pub axial_fov: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ToolsConfig {
    pub initializer: ToolCommand,
    pub engine: ToolCommand,
    pub similarity: ToolCommand,
    pub updater: ToolCommand,
}

/// Scanner and reconstruction identifiers. Opaque to the controller, passed
/// through to the engine and updater.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ScannerConfig {
    pub name: String,
    pub recons_type: String,
    pub recons_iterations: u32,
    pub axial_fov: f64,
}

/// Resolved, read-only parameters of one run.
#[derive(Debug, Serialize, Clone)]
pub struct RunConfig {
    pub patient_dirname: String,
    pub pet_image: PathBuf,
    pub mri_image: PathBuf,
    pub ct_image: Option<PathBuf>,
    /// Preprocessed PET every reconstruction is scored against.
    pub reference_image: PathBuf,
    pub scanner: ScannerConfig,
    pub sim_type: Option<String>,
    pub max_iterations: i64,
    pub interactive: bool,
    pub results_dir: PathBuf,
    pub output_dir: PathBuf,
    pub tools: ToolsConfig,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct MapPair {
    pub activity: PathBuf,
    pub attenuation: PathBuf,
}

/// Engine output for one iteration. `registered` is the copy aligned to the
/// reference and is what gets scored.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Reconstruction {
    pub image: PathBuf,
    pub registered: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Converged,
    Worsened,
    Continue,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Decision::Converged => "converged",
            Decision::Worsened => "worsened",
            Decision::Continue => "continue",
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    Converged,
    Worsened,
    MaxIterationsReached,
    NoIterationsRequested,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TerminationReason::Converged => "converged",
            TerminationReason::Worsened => "worsened",
            TerminationReason::MaxIterationsReached => "max_iterations_reached",
            TerminationReason::NoIterationsRequested => "no_iterations_requested",
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct IterationRecord {
    pub iteration: usize,
    pub activity_map: PathBuf,
    pub score: f64,
    pub decision: Decision,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TerminationRecord {
    pub final_activity_map: PathBuf,
    pub reason: TerminationReason,
    pub iterations_run: usize,
    pub history: Vec<IterationRecord>,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub patient: String,
    pub output_dir: PathBuf,
    pub maps: MapPair,
    pub attenuation_sha256: String,
    pub max_iterations: i64,
    pub termination: TerminationRecord,
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub config: RunConfig,
    pub maps_dir: PathBuf,
    pub run_log: PathBuf,
    /// `It_<index>` under the run root, for indices `0..iteration_count`.
    pub iteration_dir_pattern: PathBuf,
    pub iteration_count: usize,
}
