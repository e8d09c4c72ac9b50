use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    // ── Project metadata ──
    #[error("failed to read {path}")]
    PyprojectRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    PyprojectParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    // ── Configuration validation ──
    #[error("invalid environment var mapping {entry:?}: expected NAME=value with NAME matching [A-Za-z_][A-Za-z0-9_]*")]
    InvalidEnvVar { entry: String },

    #[error(
        "staged file name {name:?} is used more than once ({}); every staged file needs a unique base name",
        format_paths(paths)
    )]
    DuplicateStagedName { name: String, paths: Vec<PathBuf> },

    #[error("path {path} has no file name and cannot be staged")]
    UnstageablePath { path: PathBuf },
}

impl Error {
    /// Returns `true` for errors raised while validating configuration,
    /// i.e. before any file has been read or written.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidEnvVar { .. }
                | Error::DuplicateStagedName { .. }
                | Error::UnstageablePath { .. }
        )
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
