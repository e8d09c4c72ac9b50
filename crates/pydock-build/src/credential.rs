//! Package-index URL rendering without cleartext credentials.
//!
//! A password is never written into the URL. Its slot is filled with a
//! shell expression that reads the secret from the build engine's secret
//! mount while the install instruction runs:
//!
//! ```text
//! http://pypi.org + julian + supersecret
//!   → http://julian:$(cat /run/secrets/INDEX_PASSWORD)@pypi.org
//! ```

use rand::Rng;
use rand::distr::{Alphanumeric, SampleString};
use secrecy::{ExposeSecret, SecretString};
use url::{Position, Url};

/// Secret name under which the index password is registered and mounted.
pub const INDEX_SECRET_NAME: &str = "INDEX_PASSWORD";

/// Directory the build engine mounts secrets into.
pub const SECRET_MOUNT_DIR: &str = "/run/secrets";

const DEFAULT_PLACEHOLDER: &str = "PASSWORD";
const PLACEHOLDER_LEN: usize = 5;
const DEFAULT_SCHEME: &str = "https";

/// Path the secret `name` is mounted at during a build instruction.
pub fn secret_mount_path(name: &str) -> String {
    format!("{SECRET_MOUNT_DIR}/{name}")
}

/// Shell expression that expands to the value of secret `name` at build time.
pub fn secret_reference(name: &str) -> String {
    format!("$(cat {})", secret_mount_path(name))
}

/// Render the index URL with optional credentials, using the thread RNG
/// for placeholder generation.
///
/// See [`render_index_url_with_rng`].
pub fn render_index_url(
    url: Option<&str>,
    username: Option<&str>,
    password: Option<&SecretString>,
) -> Result<Option<String>, CredentialError> {
    render_index_url_with_rng(url, username, password, &mut rand::rng())
}

/// Render the index URL with optional credentials.
///
/// - No URL → `None`.
/// - A URL without `://` gets the `https` scheme.
/// - A non-empty `username` is set on the URL.
/// - Without a (non-empty) password the URL is returned as is.
/// - With a password, the password slot holds [`secret_reference`] for
///   [`INDEX_SECRET_NAME`]; the cleartext never appears in the result.
///
/// # Examples
///
/// ```
/// use pydock_build::credential::render_index_url;
/// use secrecy::SecretString;
///
/// let password = SecretString::from("supersecret".to_owned());
/// let url = render_index_url(Some("http://pypi.org"), Some("julian"), Some(&password)).unwrap();
/// assert_eq!(url.as_deref(), Some("http://julian:$(cat /run/secrets/INDEX_PASSWORD)@pypi.org"));
/// ```
pub fn render_index_url_with_rng<R: Rng + ?Sized>(
    url: Option<&str>,
    username: Option<&str>,
    password: Option<&SecretString>,
    rng: &mut R,
) -> Result<Option<String>, CredentialError> {
    let Some(raw) = url else {
        return Ok(None);
    };

    let with_scheme = if has_scheme(raw) {
        raw.to_owned()
    } else {
        format!("{DEFAULT_SCHEME}://{raw}")
    };
    let keep_root_slash = has_explicit_path(&with_scheme);

    let mut parsed =
        Url::parse(&with_scheme).map_err(|e| CredentialError::InvalidUrl { source: e })?;

    if let Some(user) = username.filter(|u| !u.is_empty()) {
        parsed
            .set_username(user)
            .map_err(|()| CredentialError::CannotHaveCredentials)?;
    }

    if password.is_none_or(|p| p.expose_secret().is_empty()) {
        return Ok(Some(serialize(&parsed, keep_root_slash)));
    }

    let placeholder = placeholder_for(&serialize(&parsed, keep_root_slash), rng);
    parsed
        .set_password(Some(&placeholder))
        .map_err(|()| CredentialError::CannotHaveCredentials)?;

    let rendered = serialize(&parsed, keep_root_slash)
        .replace(&placeholder, &secret_reference(INDEX_SECRET_NAME));
    tracing::debug!(secret = INDEX_SECRET_NAME, "index URL references build secret");

    Ok(Some(rendered))
}

/// A token that does not occur anywhere in `text`.
///
/// Starts from a fixed candidate and draws short alphanumeric strings from
/// `rng` until one is absent from `text`, so substituting the token later
/// cannot touch any other part of the text.
pub fn placeholder_for<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    let mut candidate = DEFAULT_PLACEHOLDER.to_owned();
    while text.contains(&candidate) {
        candidate = Alphanumeric.sample_string(rng, PLACEHOLDER_LEN);
    }
    candidate
}

/// Whether `url` starts with `scheme://`. A `://` after the first `/`, `?`
/// or `#` belongs to the path, query or fragment.
fn has_scheme(url: &str) -> bool {
    url.split_once("://")
        .is_some_and(|(scheme, _)| !scheme.is_empty() && !scheme.contains(['/', '?', '#']))
}

/// Whether the authority of `url` (which starts with a scheme) is followed by a path.
fn has_explicit_path(url: &str) -> bool {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.find(['/', '?', '#'])
        .is_some_and(|idx| rest[idx..].starts_with('/'))
}

/// Serialize without the root `/` the parser adds to authority-only URLs.
fn serialize(url: &Url, keep_root_slash: bool) -> String {
    if keep_root_slash || url.path() != "/" {
        return url.as_str().to_owned();
    }
    format!("{}{}", &url[..Position::BeforePath], &url[Position::AfterPath..])
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("invalid package index URL")]
    InvalidUrl { source: url::ParseError },
    #[error("package index URL cannot carry credentials (no host)")]
    CannotHaveCredentials,
}
