//! Convergence controller: simulate → score → decide, up to N rounds.
//!
//! The loop state lives in [`ConvergenceState`]. [`ConvergenceState::observe`]
//! and [`PendingUpdate::advance`] are pure transitions, the controller only
//! wires them to the collaborators and the run log. Only a `Continue`
//! transition carries the score `advance` needs.

use crate::domain::constants::CONVERGENCE_THRESHOLD;
use crate::domain::models::{
    Decision, IterationRecord, MapPair, Reconstruction, RunConfig, ScannerConfig,
    TerminationReason, TerminationRecord,
};
use crate::error::RunError;
use crate::services::layout::RunLayout;
use crate::services::runlog::RunLog;
use std::path::{Path, PathBuf};

pub struct SimulationJob<'a> {
    pub iteration: usize,
    pub maps: &'a MapPair,
    pub scanner: &'a ScannerConfig,
    pub sim_type: Option<&'a str>,
    pub output_dir: PathBuf,
    pub expected: Reconstruction,
}

pub struct UpdateJob<'a> {
    pub iteration: usize,
    pub previous: &'a Path,
    pub attenuation: &'a Path,
    pub reference: &'a Path,
    pub reconstruction: &'a Path,
    pub output: PathBuf,
    pub axial_fov: f64,
}

pub trait SimulationEngine {
    /// Runs one simulated acquisition + reconstruction. `None` means the
    /// expected artifact is not on disk afterwards.
    fn simulate(&mut self, job: &SimulationJob<'_>) -> Option<Reconstruction>;
}

pub trait SimilarityEvaluator {
    fn score(&mut self, reference: &Path, candidate: &Path) -> anyhow::Result<f64>;
}

pub trait MapUpdater {
    /// Writes the next activity map and returns its path.
    fn update(&mut self, job: &UpdateJob<'_>) -> anyhow::Result<PathBuf>;
}

pub struct Collaborators<'a> {
    pub engine: &'a mut dyn SimulationEngine,
    pub similarity: &'a mut dyn SimilarityEvaluator,
    pub updater: &'a mut dyn MapUpdater,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviousIteration {
    pub score: f64,
    pub activity_map: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceState {
    pub iteration: usize,
    pub previous: Option<PreviousIteration>,
    pub current_score: Option<f64>,
    pub more_iterations: bool,
    /// Map fed to the engine in the current iteration.
    pub activity_map: PathBuf,
    pub best_map: PathBuf,
}

impl ConvergenceState {
    pub fn new(initial: PathBuf) -> Self {
        Self {
            iteration: 0,
            previous: None,
            current_score: None,
            more_iterations: true,
            best_map: initial.clone(),
            activity_map: initial,
        }
    }

    pub fn decide(&self, score: f64) -> Decision {
        if score > CONVERGENCE_THRESHOLD {
            return Decision::Converged;
        }
        match &self.previous {
            Some(prev) if prev.score > score => Decision::Worsened,
            _ => Decision::Continue,
        }
    }

    pub fn observe(mut self, score: f64) -> Transition {
        let decision = self.decide(score);
        self.current_score = Some(score);
        match decision {
            Decision::Converged => {
                self.more_iterations = false;
                self.best_map = self.activity_map.clone();
            }
            Decision::Worsened => {
                self.more_iterations = false;
                if let Some(prev) = &self.previous {
                    self.best_map = prev.activity_map.clone();
                }
            }
            Decision::Continue => {
                return Transition::Continue(PendingUpdate { state: self, score });
            }
        }
        Transition::Stop {
            state: self,
            decision,
        }
    }
}

/// Outcome of scoring one iteration.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Stop {
        state: ConvergenceState,
        decision: Decision,
    },
    Continue(PendingUpdate),
}

impl Transition {
    pub fn decision(&self) -> Decision {
        match self {
            Transition::Stop { decision, .. } => *decision,
            Transition::Continue(_) => Decision::Continue,
        }
    }

    pub fn state(&self) -> &ConvergenceState {
        match self {
            Transition::Stop { state, .. } => state,
            Transition::Continue(pending) => &pending.state,
        }
    }
}

/// A `Continue` decision waiting for the updater's next map.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpdate {
    state: ConvergenceState,
    score: f64,
}

impl PendingUpdate {
    pub fn state(&self) -> &ConvergenceState {
        &self.state
    }

    /// Moves to the next iteration with the map the updater produced.
    pub fn advance(self, next_map: PathBuf) -> ConvergenceState {
        let mut state = self.state;
        state.current_score = None;
        let used = std::mem::replace(&mut state.activity_map, next_map);
        state.previous = Some(PreviousIteration {
            score: self.score,
            activity_map: used,
        });
        state.best_map = state.activity_map.clone();
        state.iteration += 1;
        state
    }
}

pub struct ConvergenceController<'a> {
    pub layout: &'a RunLayout,
    pub log: &'a RunLog,
    pub scanner: &'a ScannerConfig,
    pub sim_type: Option<&'a str>,
    pub reference: &'a Path,
    pub max_iterations: i64,
}

impl<'a> ConvergenceController<'a> {
    pub fn for_run(config: &'a RunConfig, layout: &'a RunLayout, log: &'a RunLog) -> Self {
        Self {
            layout,
            log,
            scanner: &config.scanner,
            sim_type: config.sim_type.as_deref(),
            reference: &config.reference_image,
            max_iterations: config.max_iterations,
        }
    }

    pub fn run(
        &self,
        maps: &MapPair,
        tools: &mut Collaborators<'_>,
    ) -> Result<TerminationRecord, RunError> {
        if self.max_iterations < 1 {
            self.log.run(&format!(
                "No iterations requested (maximum iteration count {}). Final activity map is {}",
                self.max_iterations,
                maps.activity.display()
            ));
            return Ok(TerminationRecord {
                final_activity_map: maps.activity.clone(),
                reason: TerminationReason::NoIterationsRequested,
                iterations_run: 0,
                history: vec![],
            });
        }

        let n = self.max_iterations as usize;
        let mut state = ConvergenceState::new(maps.activity.clone());
        let mut history = Vec::new();
        let mut last = Decision::Continue;

        while state.more_iterations && state.iteration < n {
            let i = state.iteration;
            let current = MapPair {
                activity: state.activity_map.clone(),
                attenuation: maps.attenuation.clone(),
            };
            self.log.iteration(
                i,
                &format!("Simulating brain image for iteration {} of {}", i, n),
            );

            let job = SimulationJob {
                iteration: i,
                maps: &current,
                scanner: self.scanner,
                sim_type: self.sim_type,
                output_dir: self.layout.iteration_dir(i),
                expected: self.layout.reconstruction(i, self.scanner),
            };
            let rec = match tools.engine.simulate(&job) {
                Some(rec) => rec,
                None => {
                    return Err(self.fail(
                        i,
                        RunError::EngineOutputMissing {
                            iteration: i,
                            expected: job.expected.image.clone(),
                        },
                    ))
                }
            };

            let score = tools
                .similarity
                .score(self.reference, &rec.registered)
                .and_then(|s| {
                    if s.is_finite() {
                        Ok(s)
                    } else {
                        anyhow::bail!("non-finite similarity score {}", s)
                    }
                })
                .map_err(|e| self.fail(i, RunError::collaborator("similarity evaluator", e)))?;
            self.log.iteration(
                i,
                &format!("Correlation coefficient between images is {}", score),
            );

            let transition = state.observe(score);
            let decision = transition.decision();
            last = decision;
            let record = IterationRecord {
                iteration: i,
                activity_map: current.activity.clone(),
                score,
                decision,
            };
            self.log.record(&record);
            history.push(record);

            state = match transition {
                Transition::Stop { state, decision } => {
                    let msg = if decision == Decision::Converged {
                        format!(
                            "No further iterations are necessary. Final activity map is {}",
                            state.best_map.display()
                        )
                    } else {
                        format!(
                            "No further iterations will be done. The correlation coefficient has worsened. Final activity map is {}",
                            state.best_map.display()
                        )
                    };
                    self.log.decision(i, &msg);
                    state
                }
                Transition::Continue(pending) => {
                    self.log.decision(
                        i,
                        &format!(
                            "Not converging yet. Preparing for iteration {} of {}",
                            i + 1,
                            n
                        ),
                    );
                    self.log.iteration(i, "Updating activity map");
                    let update = UpdateJob {
                        iteration: i,
                        previous: &current.activity,
                        attenuation: &current.attenuation,
                        reference: self.reference,
                        reconstruction: &rec.image,
                        output: self.layout.activity_map(i + 1),
                        axial_fov: self.scanner.axial_fov,
                    };
                    let next_map = tools
                        .updater
                        .update(&update)
                        .and_then(|p| {
                            if p == current.activity {
                                anyhow::bail!("updated map overwrites {}", p.display())
                            }
                            Ok(p)
                        })
                        .map_err(|e| self.fail(i, RunError::collaborator("map updater", e)))?;
                    pending.advance(next_map)
                }
            };
        }

        let reason = match last {
            Decision::Converged => TerminationReason::Converged,
            Decision::Worsened => TerminationReason::Worsened,
            Decision::Continue => {
                self.log.run(&format!(
                    "Maximum number of iterations reached. Final activity map is {}",
                    state.best_map.display()
                ));
                TerminationReason::MaxIterationsReached
            }
        };

        Ok(TerminationRecord {
            final_activity_map: state.best_map,
            reason,
            iterations_run: history.len(),
            history,
        })
    }

    fn fail(&self, iteration: usize, err: RunError) -> RunError {
        self.log.failure(Some(iteration), &err.to_string());
        err
    }
}
