use std::path::{Path, PathBuf};

use pydock_core::{
    BOOTSTRAP_SCRIPT_NAME, BuildConfiguration, RECIPE_FILE_NAME, SecretRegistry,
    check_staged_names,
};
use secrecy::{ExposeSecret, SecretString};

use crate::credential::{CredentialError, INDEX_SECRET_NAME, render_index_url};
use crate::recipe::RecipeGenerator;

/// Bootstrap entrypoint staged into every context.
pub const BOOTSTRAP_SCRIPT: &str = include_str!("../assets/docker-entrypoint.sh");

/// Result of [`ContextBuilder::prepare`].
#[derive(Debug)]
pub struct RenderedContext {
    /// Rendered recipe, as written to the context directory.
    pub recipe: String,
    /// Every file written into the context directory.
    pub staged_files: Vec<PathBuf>,
    /// Secrets the build engine must receive for this recipe.
    pub secrets: SecretRegistry,
}

impl RenderedContext {
    pub fn into_secrets(self) -> SecretRegistry {
        self.secrets
    }
}

/// Stages a build context for a wheel.
///
/// The context directory holds the rendered recipe, the bootstrap
/// entrypoint, the wheel, the requirements file (if any) and every init
/// script, all under their base names. Preparing into the same directory
/// again overwrites these files; other files already present are left alone.
pub struct ContextBuilder<'a> {
    config: &'a BuildConfiguration,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(config: &'a BuildConfiguration) -> Self {
        Self { config }
    }

    /// Render the recipe and stage all files into `context_path`.
    ///
    /// The index URL is rendered and every staged name is checked before
    /// anything is written. A failure while staging leaves whatever was
    /// already written in place; callers must not build from it.
    ///
    /// # Errors
    ///
    /// - [`ContextError::Credential`] / [`ContextError::Config`] for invalid configuration
    /// - [`ContextError::CreateDir`] / [`ContextError::Write`] if the context cannot be written
    /// - [`ContextError::Stage`] if a file to copy is missing or unreadable
    pub fn prepare(
        &self,
        artifact: &Path,
        context_path: &Path,
    ) -> Result<RenderedContext, ContextError> {
        let artifact_name = artifact
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ContextError::InvalidArtifact(artifact.to_path_buf()))?;

        let mut sources: Vec<&Path> = vec![artifact];
        sources.extend(self.config.requirements_file());
        sources.extend(self.config.init_scripts().iter().map(PathBuf::as_path));
        check_staged_names(&sources)?;

        let index_url = render_index_url(
            self.config.index_url(),
            self.config.index_username(),
            self.config.index_password(),
        )?;

        let generator = RecipeGenerator::new(self.config, &artifact_name, index_url.as_deref());
        let recipe = generator.render();

        std::fs::create_dir_all(context_path).map_err(|e| ContextError::CreateDir {
            path: context_path.to_path_buf(),
            source: e,
        })?;

        let mut staged_files = Vec::new();

        let recipe_path = context_path.join(RECIPE_FILE_NAME);
        write_file(&recipe_path, &recipe)?;
        staged_files.push(recipe_path);

        let bootstrap_path = context_path.join(BOOTSTRAP_SCRIPT_NAME);
        write_file(&bootstrap_path, BOOTSTRAP_SCRIPT)?;
        staged_files.push(bootstrap_path);

        for source in sources {
            staged_files.push(stage_file(source, context_path)?);
        }

        tracing::info!(
            context = %context_path.display(),
            files = staged_files.len(),
            "build context prepared"
        );

        Ok(RenderedContext {
            recipe,
            staged_files,
            secrets: self.secrets(index_url.is_some()),
        })
    }

    /// Holds the index password iff one was configured.
    fn secrets(&self, has_index_url: bool) -> SecretRegistry {
        let mut secrets = SecretRegistry::new();
        if let Some(password) = self.config.index_password() {
            if !has_index_url {
                tracing::warn!("index password given without an index URL; it will not be used");
            }
            secrets.register(
                INDEX_SECRET_NAME,
                SecretString::from(password.expose_secret().to_owned()),
            );
        }
        secrets
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), ContextError> {
    std::fs::write(path, content).map_err(|e| ContextError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Copy `source` into `context_path` under its base name.
fn stage_file(source: &Path, context_path: &Path) -> Result<PathBuf, ContextError> {
    let name = source
        .file_name()
        .ok_or_else(|| ContextError::InvalidArtifact(source.to_path_buf()))?;
    let destination = context_path.join(name);

    std::fs::copy(source, &destination).map_err(|e| ContextError::Stage {
        path: source.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(from = %source.display(), to = %destination.display(), "staged file");

    Ok(destination)
}

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    Config(#[from] pydock_core::Error),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error("artifact path {0} has no file name")]
    InvalidArtifact(PathBuf),
    #[error("failed to create context directory {path}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to stage {path} into the build context")]
    Stage {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ContextError {
    /// Returns `true` if preparation failed before touching the filesystem.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ContextError::Config(_) | ContextError::Credential(_) | ContextError::InvalidArtifact(_)
        )
    }
}
