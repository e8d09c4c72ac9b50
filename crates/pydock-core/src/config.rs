use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Name of the optional project-level configuration file.
pub const CONFIG_FILE_NAME: &str = "pydock.toml";

/// pydock.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PydockConfig {
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub build: BuildSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Image name (defaults to the pyproject.toml project name)
    pub name: Option<String>,
    /// Image tag (defaults to the pyproject.toml version)
    pub tag: Option<String>,
    /// Directory the build context is staged into
    #[serde(default = "default_context_dir")]
    pub context_dir: PathBuf,
}

/// Raw build settings as written in `[build]` or given on the command line.
///
/// These are not validated; see
/// [`BuildConfiguration::from_settings`](crate::BuildConfiguration::from_settings).
/// The index password is deliberately absent: it never lives in a file
/// that may be committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSettings {
    /// Image both stages start from
    #[serde(default = "default_base_image")]
    pub base_image: String,
    /// OS packages installed only in the builder stage
    #[serde(default)]
    pub builder_extra_packages: Vec<String>,
    /// OS packages installed only in the final stage
    #[serde(default)]
    pub final_extra_packages: Vec<String>,
    /// pip requirements file staged into the context
    #[serde(default)]
    pub requirements_file: Option<PathBuf>,
    /// Extra pip requirement specifiers, installed after the requirements file
    #[serde(default)]
    pub extra_requirements: Vec<String>,
    /// Package index URL passed to pip
    #[serde(default)]
    pub index_url: Option<String>,
    /// Package index user name
    #[serde(default)]
    pub index_username: Option<String>,
    /// Numeric OS user the container runs as
    #[serde(default)]
    pub user_id: Option<u32>,
    /// Arguments appended after the bootstrap entrypoint script
    #[serde(default)]
    pub entrypoint: Vec<String>,
    /// Default container command
    #[serde(default)]
    pub command: Vec<String>,
    /// Scripts run by the bootstrap entrypoint at container start
    #[serde(default)]
    pub init_scripts: Vec<PathBuf>,
    /// Reuse a build-engine cache mount for pip downloads
    #[serde(default = "default_pip_cache")]
    pub pip_cache: bool,
    /// `NAME=value` entries set in the final image
    #[serde(default)]
    pub env: Vec<String>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            name: None,
            tag: None,
            context_dir: default_context_dir(),
        }
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            base_image: default_base_image(),
            builder_extra_packages: Vec::new(),
            final_extra_packages: Vec::new(),
            requirements_file: None,
            extra_requirements: Vec::new(),
            index_url: None,
            index_username: None,
            user_id: None,
            entrypoint: Vec::new(),
            command: Vec::new(),
            init_scripts: Vec::new(),
            pip_cache: default_pip_cache(),
            env: Vec::new(),
        }
    }
}

impl PydockConfig {
    /// Load from pydock.toml at the given path, or return defaults if not found.
    pub fn load(project_dir: &std::path::Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            tracing::debug!(path = %config_path.display(), "loaded pydock config");
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })
        } else {
            Ok(Self::default())
        }
    }
}

fn default_context_dir() -> PathBuf {
    PathBuf::from("build/docker")
}

fn default_base_image() -> String {
    "python:3.8-slim-bullseye".to_owned()
}

fn default_pip_cache() -> bool {
    true
}
