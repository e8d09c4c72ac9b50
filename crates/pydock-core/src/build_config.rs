use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};

use crate::config::BuildSettings;
use crate::env::{EnvVar, parse_env_vars};

/// File name of the rendered recipe inside the context directory.
pub const RECIPE_FILE_NAME: &str = "Dockerfile";

/// File name of the bootstrap entrypoint script inside the context directory.
pub const BOOTSTRAP_SCRIPT_NAME: &str = "docker-entrypoint.sh";

/// Variables every final image carries, ahead of any configured ones.
pub const DEFAULT_ENV: &[(&str, &str)] = &[
    ("PYTHONDONTWRITEBYTECODE", "1"),
    ("PYTHONUNBUFFERED", "1"),
];

/// Set by the recipe itself to put the virtualenv first.
const RESERVED_ENV: &[&str] = &["PATH"];

/// Validated, immutable input to context preparation.
///
/// Built only through [`BuildConfiguration::from_settings`], which rejects
/// malformed values before any file is touched.
#[derive(Debug)]
pub struct BuildConfiguration {
    base_image: String,
    builder_extra_packages: Vec<String>,
    final_extra_packages: Vec<String>,
    requirements_file: Option<PathBuf>,
    extra_requirements: Vec<String>,
    index_url: Option<String>,
    index_username: Option<String>,
    index_password: Option<SecretString>,
    user_id: Option<u32>,
    entrypoint: Vec<String>,
    command: Vec<String>,
    init_scripts: Vec<PathBuf>,
    pip_cache: bool,
    env: Vec<EnvVar>,
}

impl BuildConfiguration {
    /// Validate raw settings into a configuration.
    ///
    /// - `env` entries are parsed as `NAME=value`; a name seen earlier (or
    ///   one of the fixed defaults) keeps its first value and the later
    ///   entry is dropped with a warning.
    /// - An empty password counts as no password.
    /// - The requirements file and init scripts must have distinct base
    ///   names that do not clash with the recipe or bootstrap script.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidEnvVar`](crate::Error::InvalidEnvVar) for a malformed env entry
    /// - [`Error::DuplicateStagedName`](crate::Error::DuplicateStagedName) for clashing file names
    /// - [`Error::UnstageablePath`](crate::Error::UnstageablePath) for a path without a file name
    pub fn from_settings(
        settings: &BuildSettings,
        index_password: Option<SecretString>,
    ) -> crate::Result<Self> {
        let env = first_occurrence_wins(parse_env_vars(&settings.env)?);

        let staged: Vec<&Path> = settings
            .requirements_file
            .as_deref()
            .into_iter()
            .chain(settings.init_scripts.iter().map(PathBuf::as_path))
            .collect();
        check_staged_names(&staged)?;

        let index_password = index_password.filter(|p| !p.expose_secret().is_empty());

        Ok(Self {
            base_image: settings.base_image.clone(),
            builder_extra_packages: settings.builder_extra_packages.clone(),
            final_extra_packages: settings.final_extra_packages.clone(),
            requirements_file: settings.requirements_file.clone(),
            extra_requirements: settings.extra_requirements.clone(),
            index_url: settings.index_url.clone().filter(|u| !u.is_empty()),
            index_username: settings.index_username.clone().filter(|u| !u.is_empty()),
            index_password,
            user_id: settings.user_id,
            entrypoint: settings.entrypoint.clone(),
            command: settings.command.clone(),
            init_scripts: settings.init_scripts.clone(),
            pip_cache: settings.pip_cache,
            env,
        })
    }

    pub fn base_image(&self) -> &str {
        &self.base_image
    }

    pub fn builder_extra_packages(&self) -> &[String] {
        &self.builder_extra_packages
    }

    pub fn final_extra_packages(&self) -> &[String] {
        &self.final_extra_packages
    }

    pub fn requirements_file(&self) -> Option<&Path> {
        self.requirements_file.as_deref()
    }

    pub fn extra_requirements(&self) -> &[String] {
        &self.extra_requirements
    }

    pub fn index_url(&self) -> Option<&str> {
        self.index_url.as_deref()
    }

    pub fn index_username(&self) -> Option<&str> {
        self.index_username.as_deref()
    }

    pub fn index_password(&self) -> Option<&SecretString> {
        self.index_password.as_ref()
    }

    pub fn user_id(&self) -> Option<u32> {
        self.user_id
    }

    pub fn entrypoint(&self) -> &[String] {
        &self.entrypoint
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    pub fn init_scripts(&self) -> &[PathBuf] {
        &self.init_scripts
    }

    pub fn pip_cache(&self) -> bool {
        self.pip_cache
    }

    /// Configured variables, deduplicated, in configuration order.
    /// Does not include [`DEFAULT_ENV`].
    pub fn env(&self) -> &[EnvVar] {
        &self.env
    }
}

/// Ensure every path can be staged under its base name without clashing
/// with another staged file or with the generated files.
pub fn check_staged_names(paths: &[&Path]) -> crate::Result<()> {
    let mut seen: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

    for path in paths {
        let name = path
            .file_name()
            .ok_or_else(|| crate::Error::UnstageablePath {
                path: path.to_path_buf(),
            })?
            .to_string_lossy()
            .into_owned();
        seen.entry(name).or_default().push(path.to_path_buf());
    }

    for (name, paths) in seen {
        if paths.len() > 1 || name == RECIPE_FILE_NAME || name == BOOTSTRAP_SCRIPT_NAME {
            return Err(crate::Error::DuplicateStagedName { name, paths });
        }
    }

    Ok(())
}

fn first_occurrence_wins(vars: Vec<EnvVar>) -> Vec<EnvVar> {
    let mut seen: HashSet<String> = DEFAULT_ENV
        .iter()
        .map(|(name, _)| *name)
        .chain(RESERVED_ENV.iter().copied())
        .map(str::to_owned)
        .collect();

    vars.into_iter()
        .filter(|var| {
            let first = seen.insert(var.name.clone());
            if !first {
                tracing::warn!(
                    name = %var.name,
                    "environment variable already set; keeping the first value"
                );
            }
            first
        })
        .collect()
}
