use std::path::{Path, PathBuf};

use pydock_core::{RECIPE_FILE_NAME, SecretRegistry};

use crate::engine::EngineError;
use crate::executor::{EngineExecutor, RealExecutor};

/// What to build from a prepared context directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub context_dir: PathBuf,
    pub image_name: String,
    pub image_tag: String,
    /// Stop at this stage instead of building the final image.
    pub target: Option<String>,
}

impl BuildRequest {
    pub fn new(
        context_dir: impl Into<PathBuf>,
        image_name: impl Into<String>,
        image_tag: impl Into<String>,
    ) -> Self {
        Self {
            context_dir: context_dir.into(),
            image_name: image_name.into(),
            image_tag: image_tag.into(),
            target: None,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// `name:tag` reference the image is tagged with.
    pub fn image_ref(&self) -> String {
        format!("{}:{}", self.image_name, self.image_tag)
    }
}

/// Builds images from prepared contexts, parameterized over the executor
/// for testability.
pub struct ImageBuilder<E: EngineExecutor = RealExecutor> {
    executor: E,
}

impl ImageBuilder<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
        }
    }
}

impl Default for ImageBuilder<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EngineExecutor> ImageBuilder<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// Build `request` with the engine, handing `secrets` over through the
    /// child environment. Waits for the engine to exit.
    ///
    /// The registry is consumed: secrets live for one build only.
    pub async fn build(
        &self,
        request: &BuildRequest,
        secrets: SecretRegistry,
    ) -> Result<(), BuildError> {
        let args = build_args(request, &secrets)?;
        let env = secrets.to_process_environment();

        tracing::info!(
            image = %request.image_ref(),
            context = %request.context_dir.display(),
            target = request.target.as_deref().unwrap_or("final"),
            secrets = secrets.len(),
            "building image"
        );

        self.executor
            .run(&args, &env)
            .await
            .map_err(|e| BuildError::Engine { source: e })?;

        tracing::info!(image = %request.image_ref(), "image built");
        Ok(())
    }
}

/// Engine arguments for `request`:
/// `build [--secret id=N,env=N]* -f <ctx>/Dockerfile -t name:tag [--target s] <ctx>`.
pub fn build_args(
    request: &BuildRequest,
    secrets: &SecretRegistry,
) -> Result<Vec<String>, BuildError> {
    let context = path_str(&request.context_dir)?;
    let recipe = request.context_dir.join(RECIPE_FILE_NAME);
    let recipe = path_str(&recipe)?;

    let mut args = vec!["build".to_owned()];
    args.extend(secrets.to_build_engine_args());
    args.extend([
        "-f".to_owned(),
        recipe.to_owned(),
        "-t".to_owned(),
        request.image_ref(),
    ]);
    if let Some(target) = &request.target {
        args.extend(["--target".to_owned(), target.clone()]);
    }
    args.push(context.to_owned());

    Ok(args)
}

fn path_str(path: &Path) -> Result<&str, BuildError> {
    path.to_str()
        .ok_or_else(|| BuildError::InvalidPath(path.to_path_buf()))
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("context path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),

    #[error("image build failed")]
    Engine { source: EngineError },
}

impl BuildError {
    /// Exit code of the engine, if it ran and exited non-zero.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            BuildError::Engine { source } => source.exit_code(),
            BuildError::InvalidPath(_) => None,
        }
    }
}
