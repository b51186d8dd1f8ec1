use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Target '{}' is declared twice in the same pipeline.", target)]
    DuplicateTarget { target: String },

    #[error(
        "Step '{}' failed with exit status {} on execute \'{}\'",
        description,
        status,
        cmd
    )]
    StepFailed {
        description: String,
        cmd: String,
        status: i32,
    },

    #[error("Failed to spawn \'{}\'. Make sure a POSIX shell is in your $PATH.", cmd)]
    SpawnFailed {
        cmd: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write completion marker {}.", path.display())]
    SentinelWriteFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    #[cold]
    pub fn duplicate_target<T: Into<String>>(target: T) -> Self {
        PipelineError::DuplicateTarget {
            target: target.into(),
        }
    }

    #[cold]
    pub fn step_failed<D: Into<String>, C: Into<String>>(
        description: D,
        cmd: C,
        status: i32,
    ) -> Self {
        PipelineError::StepFailed {
            description: description.into(),
            cmd: cmd.into(),
            status,
        }
    }
}
