//! Parsing of `NAME=value` environment mappings and list-valued options.

use std::sync::LazyLock;

use regex::Regex;

static ENV_MAPPING: LazyLock<Regex> = LazyLock::new(|| {
    // Name stops at the first `=`; the value is everything after it.
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)=(.*)$").expect("static regex is valid")
});

/// An environment variable baked into the final image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

impl EnvVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Parse `NAME=value` entries, preserving their order.
///
/// The value may be empty and may itself contain `=`. Entries without `=`,
/// with an empty name, or with a name outside `[A-Za-z_][A-Za-z0-9_]*` are
/// rejected with [`Error::InvalidEnvVar`](crate::Error::InvalidEnvVar).
/// Values spanning several lines are rejected too, since a recipe `ENV`
/// instruction cannot carry them.
///
/// # Examples
///
/// ```
/// use pydock_core::env::{parse_env_vars, EnvVar};
///
/// let vars = parse_env_vars(&["blub=bla=fizz"]).unwrap();
/// assert_eq!(vars, vec![EnvVar::new("blub", "bla=fizz")]);
/// assert!(parse_env_vars(&["=bla"]).is_err());
/// ```
pub fn parse_env_vars<S: AsRef<str>>(entries: &[S]) -> crate::Result<Vec<EnvVar>> {
    entries
        .iter()
        .map(|entry| {
            let entry = entry.as_ref();
            ENV_MAPPING
                .captures(entry)
                .map(|caps| EnvVar::new(&caps[1], &caps[2]))
                .ok_or_else(|| crate::Error::InvalidEnvVar {
                    entry: entry.to_owned(),
                })
        })
        .collect()
}

/// Split a list-valued option into its items.
///
/// Multi-line input is split on line breaks (so items may contain spaces),
/// single-line input on spaces. Items are trimmed and empty items dropped.
///
/// ```
/// use pydock_core::env::parse_list;
///
/// assert_eq!(parse_list("gcc  libpq-dev"), vec!["gcc", "libpq-dev"]);
/// assert_eq!(parse_list("uvicorn main:app\n--port 8000\n"), vec!["uvicorn main:app", "--port 8000"]);
/// ```
pub fn parse_list(raw: &str) -> Vec<String> {
    let items: Vec<&str> = if raw.contains('\n') {
        raw.lines().collect()
    } else {
        raw.split(' ').collect()
    };

    items
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}
