//! Core types and configuration for pydock.
//!
//! This crate defines the `pydock.toml` schema ([`PydockConfig`]), the
//! validated [`BuildConfiguration`] a build context is rendered from,
//! project discovery ([`ProjectMeta`]), the per-build [`SecretRegistry`],
//! and shared error types.

pub mod build_config;
pub mod config;
pub mod env;
pub mod error;
pub mod project;
pub mod secrets;

pub use build_config::{
    BOOTSTRAP_SCRIPT_NAME, BuildConfiguration, DEFAULT_ENV, RECIPE_FILE_NAME, check_staged_names,
};
pub use config::{BuildSettings, CONFIG_FILE_NAME, ImageConfig, PydockConfig};
pub use env::{EnvVar, parse_env_vars, parse_list};
pub use error::{Error, Result};
pub use project::ProjectMeta;
pub use secrets::SecretRegistry;
