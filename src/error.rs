use std::path::PathBuf;

/// Terminal failures of a run. None of them is retried.
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("run aborted: overwrite of {} declined", .0.display())]
    UserAbort(PathBuf),
    #[error("engine produced no reconstruction for iteration {iteration}: expected {}", .expected.display())]
    EngineOutputMissing { iteration: usize, expected: PathBuf },
    #[error("{collaborator} failed: {source:#}")]
    CollaboratorFailure {
        collaborator: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl RunError {
    pub fn collaborator(collaborator: &'static str, source: anyhow::Error) -> Self {
        RunError::CollaboratorFailure {
            collaborator,
            source,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RunError::UserAbort(_) => "user_abort",
            RunError::EngineOutputMissing { .. } => "engine_output_missing",
            RunError::CollaboratorFailure { .. } => "collaborator_failure",
        }
    }
}
