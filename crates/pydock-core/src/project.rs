use serde::Deserialize;
use std::path::Path;

/// Metadata extracted from the project's pyproject.toml
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMeta {
    pub name: String,
    pub version: Option<String>,
}

#[derive(Deserialize)]
struct Pyproject {
    project: Option<PackageSection>,
    tool: Option<ToolSection>,
}

#[derive(Deserialize)]
struct ToolSection {
    poetry: Option<PackageSection>,
}

#[derive(Deserialize)]
struct PackageSection {
    name: Option<String>,
    version: Option<String>,
}

impl ProjectMeta {
    /// Extract project metadata from `pyproject.toml` in `project_dir`.
    ///
    /// Reads `[project]`, falling back to `[tool.poetry]`. Returns `Ok(None)`
    /// when there is no pyproject.toml or neither table names the project.
    pub fn from_pyproject_toml(project_dir: &Path) -> crate::Result<Option<Self>> {
        let path = project_dir.join("pyproject.toml");
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path).map_err(|e| crate::Error::PyprojectRead {
            path: path.clone(),
            source: e,
        })?;

        let parsed: Pyproject = toml::from_str(&content).map_err(|e| crate::Error::PyprojectParse {
            path: path.clone(),
            source: e,
        })?;

        let section = parsed
            .project
            .filter(|p| p.name.is_some())
            .or_else(|| parsed.tool.and_then(|t| t.poetry));

        let meta = section.and_then(|s| {
            s.name.map(|name| Self {
                name,
                version: s.version,
            })
        });

        tracing::debug!(path = %path.display(), found = meta.is_some(), "read project metadata");
        Ok(meta)
    }

    /// Default image name.
    pub fn image_name(&self) -> &str {
        &self.name
    }

    /// Default image tag: the version with `+` (not allowed in tags) replaced by `_`.
    pub fn image_tag(&self) -> Option<String> {
        self.version.as_ref().map(|v| v.replace('+', "_"))
    }
}
