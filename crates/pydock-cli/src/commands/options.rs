use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use pydock_core::{BuildConfiguration, BuildSettings, ProjectMeta, PydockConfig, parse_list};
use secrecy::SecretString;

/// Options shared by `prepare` and `build`.
///
/// List-valued options take a single space- or newline-separated string.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Wheel to install into the image
    #[arg(long, value_name = "WHEEL")]
    pub artifact: PathBuf,

    /// Directory the build context is staged into [default: build/docker]
    #[arg(long, value_name = "DIR")]
    pub context: Option<PathBuf>,

    /// Image name [default: pyproject.toml project name]
    #[arg(short = 'n', long)]
    pub image_name: Option<String>,

    /// Image tag [default: pyproject.toml version]
    #[arg(short = 't', long)]
    pub image_tag: Option<String>,

    /// Base image for both stages
    #[arg(short = 'b', long)]
    pub base_image: Option<String>,

    /// OS packages installed only in the builder stage
    #[arg(long, value_name = "PACKAGES")]
    pub builder_extra_os_packages: Option<String>,

    /// OS packages installed only in the final image
    #[arg(long, value_name = "PACKAGES")]
    pub extra_os_packages: Option<String>,

    /// pip requirements file installed before the wheel
    #[arg(short = 'r', long, value_name = "FILE")]
    pub requirements_file: Option<PathBuf>,

    /// Extra pip requirement specifiers
    #[arg(long, value_name = "REQUIREMENTS", allow_hyphen_values = true)]
    pub extra_requirements: Option<String>,

    /// Package index URL
    #[arg(short = 'i', long, value_name = "URL")]
    pub index_url: Option<String>,

    /// Package index user name
    #[arg(long, value_name = "USER")]
    pub index_username: Option<String>,

    /// Package index password, passed to the build as a secret
    #[arg(
        long,
        value_name = "PASSWORD",
        env = "PYDOCK_INDEX_PASSWORD",
        hide_env_values = true
    )]
    pub index_password: Option<String>,

    /// Numeric user the container runs as
    #[arg(short = 'u', long, value_name = "UID")]
    pub user_id: Option<u32>,

    /// Arguments passed to the bootstrap entrypoint
    #[arg(short = 'e', long, value_name = "ARGS", allow_hyphen_values = true)]
    pub entrypoint: Option<String>,

    /// Default container command
    #[arg(short = 'c', long, value_name = "ARGS", allow_hyphen_values = true)]
    pub command: Option<String>,

    /// Scripts run at container start, before the command
    #[arg(long, value_name = "FILES")]
    pub init_scripts: Option<String>,

    /// Do not mount a pip cache during the install
    #[arg(long)]
    pub no_pip_cache: bool,

    /// Environment variable for the final image (repeatable)
    #[arg(long = "env", value_name = "NAME=VALUE")]
    pub env: Vec<String>,
}

/// Settings resolved from `pydock.toml`, `pyproject.toml` and flags.
pub struct Resolved {
    pub config: BuildConfiguration,
    pub context_dir: PathBuf,
    image_name: Option<String>,
    image_tag: Option<String>,
}

impl Resolved {
    pub fn image_name(&self) -> anyhow::Result<&str> {
        self.image_name.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "image name not set; pass --image-name, set [image].name in pydock.toml, \
                 or add a [project] name to pyproject.toml"
            )
        })
    }

    pub fn image_tag(&self) -> &str {
        self.image_tag.as_deref().unwrap_or("latest")
    }
}

impl BuildArgs {
    /// Merge the project files in `project_dir` with these flags and validate.
    ///
    /// Flags win over `pydock.toml`, which wins over `pyproject.toml`.
    pub fn resolve(&self, project_dir: &Path) -> anyhow::Result<Resolved> {
        let file = PydockConfig::load(project_dir)?;
        let meta = ProjectMeta::from_pyproject_toml(project_dir)?;

        let settings = self.apply(file.build);
        let password = self.index_password.clone().map(SecretString::from);
        let config = BuildConfiguration::from_settings(&settings, password)
            .context("invalid build configuration")?;

        let image_name = self
            .image_name
            .clone()
            .or(file.image.name)
            .or_else(|| meta.as_ref().map(|m| m.image_name().to_owned()));
        let image_tag = self
            .image_tag
            .clone()
            .or(file.image.tag)
            .or_else(|| meta.as_ref().and_then(ProjectMeta::image_tag));

        Ok(Resolved {
            config,
            context_dir: self.context.clone().unwrap_or(file.image.context_dir),
            image_name,
            image_tag,
        })
    }

    /// Overlay the flags onto settings read from `pydock.toml`.
    fn apply(&self, mut settings: BuildSettings) -> BuildSettings {
        if let Some(base_image) = &self.base_image {
            settings.base_image = base_image.clone();
        }
        if let Some(packages) = &self.builder_extra_os_packages {
            settings.builder_extra_packages = parse_list(packages);
        }
        if let Some(packages) = &self.extra_os_packages {
            settings.final_extra_packages = parse_list(packages);
        }
        if let Some(file) = &self.requirements_file {
            settings.requirements_file = Some(file.clone());
        }
        if let Some(requirements) = &self.extra_requirements {
            settings.extra_requirements = parse_list(requirements);
        }
        if let Some(url) = &self.index_url {
            settings.index_url = Some(url.clone());
        }
        if let Some(username) = &self.index_username {
            settings.index_username = Some(username.clone());
        }
        if let Some(uid) = self.user_id {
            settings.user_id = Some(uid);
        }
        if let Some(entrypoint) = &self.entrypoint {
            settings.entrypoint = parse_list(entrypoint);
        }
        if let Some(command) = &self.command {
            settings.command = parse_list(command);
        }
        if let Some(scripts) = &self.init_scripts {
            settings.init_scripts = parse_list(scripts).into_iter().map(PathBuf::from).collect();
        }
        if self.no_pip_cache {
            settings.pip_cache = false;
        }
        // first occurrence wins, so flag entries go ahead of the file's
        if !self.env.is_empty() {
            let mut env = self.env.clone();
            env.append(&mut settings.env);
            settings.env = env;
        }
        settings
    }
}
