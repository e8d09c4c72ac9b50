use std::ffi::OsString;

use crate::engine::EngineError;

/// Build engine binary invoked by [`RealExecutor`].
pub const ENGINE_BINARY: &str = "docker";

/// Abstraction over build engine execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait EngineExecutor: Send + Sync {
    /// Run the engine with `args` and exactly the environment `env`,
    /// streaming its output to the terminal and waiting for it to exit.
    async fn run(&self, args: &[String], env: &[(String, OsString)]) -> Result<(), EngineError>;
}

/// Real docker CLI executor.
pub struct RealExecutor;

impl EngineExecutor for RealExecutor {
    async fn run(&self, args: &[String], env: &[(String, OsString)]) -> Result<(), EngineError> {
        use std::process::Stdio;

        let status = tokio::process::Command::new(ENGINE_BINARY)
            .args(args)
            .env_clear()
            .envs(env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| EngineError::NotFound { source: e })?;

        if status.success() {
            Ok(())
        } else {
            Err(EngineError::BuildFailed {
                code: status.code(),
            })
        }
    }
}
