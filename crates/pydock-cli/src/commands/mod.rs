mod build;
mod options;
mod prepare;

pub use build::build;
pub use options::BuildArgs;
pub use prepare::prepare;
