#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("docker CLI not found; install it from https://docs.docker.com/get-docker/")]
    NotFound { source: std::io::Error },

    #[error("docker build failed with {}", describe_exit(*code))]
    BuildFailed { code: Option<i32> },
}

impl EngineError {
    /// Exit code of a failed build, if the engine exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            EngineError::BuildFailed { code } => *code,
            EngineError::NotFound { .. } => None,
        }
    }
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_owned(),
    }
}
