use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;

use secrecy::{ExposeSecret, SecretString};

/// Inherited variables the build engine needs to run for the invoking user.
pub const INHERITED_ENV: &[&str] = &["PATH", "USER", "HOME"];

/// Enables the build engine features the recipe relies on (secret and
/// cache mounts).
pub const BUILDKIT_ENV: (&str, &str) = ("DOCKER_BUILDKIT", "1");

/// Named secrets handed to a single build-engine invocation.
///
/// Values leave the registry only through
/// [`to_process_environment`](Self::to_process_environment), under a
/// variable named after the secret. Command-line arguments reference that
/// variable by name, so a value never shows up in argv or in a file.
///
/// Entries are kept ordered by name so the generated arguments are stable.
#[derive(Default)]
pub struct SecretRegistry {
    secrets: BTreeMap<String, SecretString>,
}

impl fmt::Debug for SecretRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretRegistry")
            .field("names", &self.secrets.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SecretRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a secret; a later value for the same name replaces the earlier one.
    pub fn register(&mut self, name: impl Into<String>, value: SecretString) {
        let name = name.into();
        tracing::debug!(name = %name, "registered build secret");
        self.secrets.insert(name, value);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.secrets.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.secrets.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    /// `--secret id=<name>,env=<name>` for every registered secret.
    ///
    /// ```
    /// use pydock_core::SecretRegistry;
    /// use secrecy::SecretString;
    ///
    /// let mut secrets = SecretRegistry::new();
    /// secrets.register("INDEX_PASSWORD", SecretString::from("hunter2"));
    /// assert_eq!(
    ///     secrets.to_build_engine_args(),
    ///     vec!["--secret", "id=INDEX_PASSWORD,env=INDEX_PASSWORD"],
    /// );
    /// ```
    pub fn to_build_engine_args(&self) -> Vec<String> {
        self.secrets
            .keys()
            .flat_map(|name| ["--secret".to_owned(), format!("id={name},env={name}")])
            .collect()
    }

    /// Environment for the build-engine child process, read from the
    /// current process for the inherited variables.
    pub fn to_process_environment(&self) -> Vec<(String, OsString)> {
        self.process_environment_with(|key| std::env::var_os(key))
    }

    /// Environment for the build-engine child process.
    ///
    /// Contains every secret under its own name, the [`INHERITED_ENV`]
    /// variables that `lookup` can resolve, and [`BUILDKIT_ENV`].
    pub fn process_environment_with<F>(&self, lookup: F) -> Vec<(String, OsString)>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let secrets = self
            .secrets
            .iter()
            .map(|(name, value)| (name.clone(), OsString::from(value.expose_secret())));

        let inherited = INHERITED_ENV
            .iter()
            .filter_map(|key| lookup(key).map(|value| ((*key).to_owned(), value)));

        let (flag, enabled) = BUILDKIT_ENV;

        secrets
            .chain(inherited)
            .chain(std::iter::once((flag.to_owned(), OsString::from(enabled))))
            .collect()
    }
}
