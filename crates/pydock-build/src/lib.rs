//! Dockerfile rendering and build context staging for pydock.
//!
//! # Build pipeline
//!
//! ```text
//! pydock build --artifact dist/app-1.0-py3-none-any.whl
//!   1. Configure ── pydock.toml + flags → BuildConfiguration (validated)
//!   2. Render    ── credential::render_index_url + RecipeGenerator::render()
//!   3. Stage     ── ContextBuilder::prepare() → build/docker/
//!   4. Build     ── docker build (pydock-engine), secrets via env only
//! ```
//!
//! # Recipe layout
//!
//! - **Builder** stage: base image + builder OS packages, every Python
//!   package installed into `/opt/venv`.
//! - **Final** stage: base image + final OS packages, `/opt/venv` copied
//!   from the builder, bootstrap entrypoint and init scripts.
//!
//! # Credentials
//!
//! An index password is never written into the context. The install
//! instruction mounts it as a build secret and reads it with
//! `$(cat /run/secrets/INDEX_PASSWORD)`; the value itself reaches the build
//! engine only through its process environment.

pub mod context;
pub mod credential;
pub mod recipe;

pub use context::{ContextBuilder, ContextError, RenderedContext};
pub use credential::{CredentialError, INDEX_SECRET_NAME, render_index_url};
pub use recipe::RecipeGenerator;
