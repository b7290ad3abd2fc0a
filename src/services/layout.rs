use crate::domain::constants::{
    ACTIVITY_MAP_PREFIX, ATTENUATION_MAP_FILENAME, HISTORY_FILENAME, MAPS_DIRNAME,
    REPORT_FILENAME, RUN_LOG_FILENAME, SIMULATION_DIR_PREFIX,
};
use crate::domain::models::{Reconstruction, ScannerConfig};
use std::path::{Path, PathBuf};

/// Path builder for one run's output tree. No filesystem access.
#[derive(Debug, Clone)]
pub struct RunLayout {
    root: PathBuf,
}

impl RunLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn maps_dir(&self) -> PathBuf {
        self.root.join(MAPS_DIRNAME)
    }

    pub fn run_log(&self) -> PathBuf {
        self.root.join(RUN_LOG_FILENAME)
    }

    pub fn history(&self) -> PathBuf {
        self.root.join(HISTORY_FILENAME)
    }

    pub fn report(&self) -> PathBuf {
        self.root.join(REPORT_FILENAME)
    }

    pub fn iteration_dir(&self, iteration: usize) -> PathBuf {
        self.root.join(format!("It_{}", iteration))
    }

    /// `It_<index>`, for reporting the iteration tree without listing it.
    pub fn iteration_dir_pattern(&self) -> PathBuf {
        self.root.join("It_<index>")
    }

    pub fn iteration_log(&self, iteration: usize) -> PathBuf {
        self.root.join(format!("log_sim_It_{}.log", iteration))
    }

    pub fn activity_map(&self, iteration: usize) -> PathBuf {
        self.maps_dir()
            .join(format!("{}{}.hdr", ACTIVITY_MAP_PREFIX, iteration))
    }

    pub fn attenuation_map(&self) -> PathBuf {
        self.maps_dir().join(ATTENUATION_MAP_FILENAME)
    }

    /// Where the engine is expected to leave the reconstruction of `iteration`.
    pub fn reconstruction(&self, iteration: usize, scanner: &ScannerConfig) -> Reconstruction {
        let dir = self
            .iteration_dir(iteration)
            .join(format!("{}{}", SIMULATION_DIR_PREFIX, scanner.name))
            .join(&scanner.recons_type);
        let stem = format!("{}_{}.hdr", scanner.recons_type, scanner.recons_iterations);
        Reconstruction {
            image: dir.join(format!("rec_{}", stem)),
            registered: dir.join(format!("rrec_{}", stem)),
        }
    }
}

/// Preprocessed PET next to the raw one: `r<stem>.hdr`.
pub fn preprocessed_reference(pet: &Path) -> PathBuf {
    let stem = pet
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    pet.with_file_name(format!("r{}.hdr", stem))
}
