pub mod builder;
pub mod engine;
pub mod executor;

pub use builder::{BuildError, BuildRequest, ImageBuilder, build_args};
pub use engine::EngineError;
pub use executor::{EngineExecutor, RealExecutor};
