use pydock_core::{BOOTSTRAP_SCRIPT_NAME, BuildConfiguration, DEFAULT_ENV};

use crate::credential::{INDEX_SECRET_NAME, secret_reference};

/// Virtualenv the builder stage installs into and the final stage copies.
pub const VENV_DIR: &str = "/opt/venv";

/// Working directory of the final image.
pub const APP_DIR: &str = "/app";

/// Directory the bootstrap entrypoint runs init scripts from.
pub const INIT_DIR: &str = "/app/init.d";

const PIP_CACHE_DIR: &str = "/root/.cache/pip";

/// Renders the two-stage Dockerfile for a wheel.
///
/// The builder stage installs OS build dependencies and every Python
/// package into a virtualenv; the final stage starts again from the base
/// image and copies only that virtualenv, so builder-only OS packages never
/// reach the shipped image.
pub struct RecipeGenerator<'a> {
    config: &'a BuildConfiguration,
    artifact_name: &'a str,
    index_url: Option<&'a str>,
}

impl<'a> RecipeGenerator<'a> {
    /// `artifact_name` is the staged base name of the wheel; `index_url` is
    /// the URL already rendered by [`crate::credential::render_index_url`].
    pub fn new(
        config: &'a BuildConfiguration,
        artifact_name: &'a str,
        index_url: Option<&'a str>,
    ) -> Self {
        Self {
            config,
            artifact_name,
            index_url,
        }
    }

    /// Whether the install instruction needs the index password mounted.
    pub fn needs_index_secret(&self) -> bool {
        self.index_url
            .is_some_and(|url| url.contains(&secret_reference(INDEX_SECRET_NAME)))
    }

    pub fn render(&self) -> String {
        let base = self.config.base_image();
        let builder_packages = apt_install(self.config.builder_extra_packages());
        let final_packages = apt_install(self.config.final_extra_packages());

        let staged_inputs = self
            .config
            .requirements_file()
            .and_then(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .into_iter()
            .chain([self.artifact_name.to_owned(), "./".to_owned()]);
        let staged_inputs = exec_form(staged_inputs);

        let install = self.install_instruction();

        let init_scripts = init_script_names(self.config);
        let init_scripts = if init_scripts.is_empty() {
            String::new()
        } else {
            let sources = init_scripts.into_iter().chain([format!("{INIT_DIR}/")]);
            format!("COPY --chmod=0755 {}\n", exec_form(sources))
        };

        let env = env_instruction(self.config);
        let user = self
            .config
            .user_id()
            .map(|uid| format!("USER {uid}\n"))
            .unwrap_or_default();
        let entrypoint = entrypoint_exec_form(self.config.entrypoint());
        let cmd = command_exec_form(self.config.command())
            .map(|cmd| format!("CMD {cmd}\n"))
            .unwrap_or_default();

        format!(
            r#"# syntax=docker/dockerfile:1

# === Stage 1: Builder ===
FROM {base} AS builder
{builder_packages}RUN python -m venv {VENV_DIR}
ENV PATH="{VENV_DIR}/bin:$PATH"
WORKDIR /build
COPY {staged_inputs}
{install}
# === Stage 2: Final ===
FROM {base} AS final
{final_packages}COPY --from=builder {VENV_DIR} {VENV_DIR}
WORKDIR {APP_DIR}
COPY --chmod=0755 {BOOTSTRAP_SCRIPT_NAME} {APP_DIR}/{BOOTSTRAP_SCRIPT_NAME}
{init_scripts}{env}{user}ENTRYPOINT {entrypoint}
{cmd}"#,
        )
    }

    /// The pip install instruction, with its mounts and the index
    /// configuration directly in front of `pip install`.
    fn install_instruction(&self) -> String {
        let mut parts = Vec::new();

        if self.needs_index_secret() {
            parts.push(format!("--mount=type=secret,id={INDEX_SECRET_NAME}"));
        }
        if self.config.pip_cache() {
            parts.push(format!("--mount=type=cache,target={PIP_CACHE_DIR}"));
        }
        if let Some(url) = self.index_url {
            parts.push(format!("export PIP_INDEX_URL={} &&", quote_index_url(url)));
        }

        let mut pip = vec!["pip".to_owned(), "install".to_owned()];
        if !self.config.pip_cache() {
            pip.push("--no-cache-dir".to_owned());
        }
        pip.extend(pip_install_args(self.config));
        pip.push(shell_quote(&format!("./{}", self.artifact_name)));
        parts.push(pip.join(" "));

        format!("RUN {}\n", parts.join(" \\\n    "))
    }
}

/// `["/app/docker-entrypoint.sh", ...overrides]` in JSON exec form.
pub fn entrypoint_exec_form(overrides: &[String]) -> String {
    let bootstrap = format!("{APP_DIR}/{BOOTSTRAP_SCRIPT_NAME}");
    exec_form(std::iter::once(bootstrap).chain(overrides.iter().cloned()))
}

/// The command in JSON exec form, or `None` to keep the base image default.
pub fn command_exec_form(command: &[String]) -> Option<String> {
    (!command.is_empty()).then(|| exec_form(command.iter().cloned()))
}

/// pip arguments: `-r <requirements>` first, then the extra specifiers.
pub fn pip_install_args(config: &BuildConfiguration) -> Vec<String> {
    let requirements = config
        .requirements_file()
        .and_then(|p| p.file_name())
        .map(|name| format!("-r {}", shell_quote(&name.to_string_lossy())));

    requirements
        .into_iter()
        .chain(config.extra_requirements().iter().map(|r| shell_quote(r)))
        .collect()
}

/// Base names of the init scripts, in configuration order.
pub fn init_script_names(config: &BuildConfiguration) -> Vec<String> {
    config
        .init_scripts()
        .iter()
        .filter_map(|p| p.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect()
}

fn exec_form(items: impl Iterator<Item = String>) -> String {
    serde_json::Value::from(items.collect::<Vec<_>>()).to_string()
}

fn apt_install(packages: &[String]) -> String {
    if packages.is_empty() {
        String::new()
    } else {
        let packages: Vec<String> = packages.iter().map(|p| shell_quote(p)).collect();
        format!(
            "RUN apt-get update && apt-get install -y {} && rm -rf /var/lib/apt/lists/*\n",
            packages.join(" ")
        )
    }
}

fn env_instruction(config: &BuildConfiguration) -> String {
    let path = format!("PATH=\"{VENV_DIR}/bin:$PATH\"");
    let defaults = DEFAULT_ENV
        .iter()
        .map(|(name, value)| format!("{name}={}", quote_env_value(value)));
    let configured = config
        .env()
        .iter()
        .map(|var| format!("{}={}", var.name, quote_env_value(&var.value)));

    let assignments: Vec<String> = std::iter::once(path)
        .chain(defaults)
        .chain(configured)
        .collect();

    format!("ENV {}\n", assignments.join(" \\\n    "))
}

/// Double-quote a value for an `ENV` instruction; `$` is escaped so the
/// value is taken literally.
fn quote_env_value(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$");
    format!("\"{escaped}\"")
}

/// Double-quote the index URL for the shell, leaving only the secret
/// reference expandable.
fn quote_index_url(url: &str) -> String {
    let reference = secret_reference(INDEX_SECRET_NAME);
    let escaped: Vec<String> = url
        .split(reference.as_str())
        .map(|piece| {
            piece
                .replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('`', "\\`")
                .replace('$', "\\$")
        })
        .collect();
    format!("\"{}\"", escaped.join(&reference))
}

/// Single-quote `word` for the shell unless it only has unambiguous characters.
fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_.,/:=@%+-".contains(c));
    if plain {
        word.to_owned()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_quote_leaves_plain_words() {
        assert_eq!(shell_quote("requests==2.31.0"), "requests==2.31.0");
        assert_eq!(shell_quote("./pkg-1.0-py3-none-any.whl"), "./pkg-1.0-py3-none-any.whl");
    }

    #[test]
    fn shell_quote_wraps_specials() {
        assert_eq!(shell_quote("requests>=2"), "'requests>=2'");
        assert_eq!(shell_quote("uvicorn[standard]"), "'uvicorn[standard]'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn env_value_escapes_expansion() {
        assert_eq!(quote_env_value("$HOME/x"), r#""\$HOME/x""#);
        assert_eq!(quote_env_value(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(quote_env_value(""), r#""""#);
    }

    #[test]
    fn index_url_keeps_secret_reference_expandable() {
        let url = "https://u:$(cat /run/secrets/INDEX_PASSWORD)@host/$weird";
        assert_eq!(
            quote_index_url(url),
            r#""https://u:$(cat /run/secrets/INDEX_PASSWORD)@host/\$weird""#
        );
    }

    #[test]
    fn exec_forms() {
        assert_eq!(entrypoint_exec_form(&[]), r#"["/app/docker-entrypoint.sh"]"#);
        assert_eq!(
            entrypoint_exec_form(&["python".to_owned(), "-m".to_owned()]),
            r#"["/app/docker-entrypoint.sh","python","-m"]"#
        );
        assert_eq!(command_exec_form(&[]), None);
        assert_eq!(
            command_exec_form(&["serve".to_owned()]).as_deref(),
            Some(r#"["serve"]"#)
        );
    }
}
