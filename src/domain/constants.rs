/// Similarity above which a reconstruction is accepted. Compared with strict `>`.
pub const CONVERGENCE_THRESHOLD: f64 = 0.99;

/// Largest accepted `maximum_iteration`. One `It_<i>` directory is created per
/// planned iteration before the loop starts.
pub const MAX_ITERATIONS_LIMIT: i64 = 1000;

pub const DEFAULT_CONFIG_FILE: &str = "brainviset.toml";

pub const MAPS_DIRNAME: &str = "Maps";
pub const RUN_LOG_FILENAME: &str = "log_sim.log";
pub const HISTORY_FILENAME: &str = "history.jsonl";
pub const REPORT_FILENAME: &str = "run.json";

pub const ACTIVITY_MAP_PREFIX: &str = "act_map_";
pub const ATTENUATION_MAP_FILENAME: &str = "att_map.hdr";

/// Subdirectory the engine writes its reconstructions into, suffixed by scanner name.
pub const SIMULATION_DIR_PREFIX: &str = "SimSET_Sim_";
