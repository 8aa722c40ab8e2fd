pub mod builder;
mod error;
pub mod runner;
pub mod spacing;
pub mod transform;
pub mod voxel_size;

pub use builder::TransformBuilder;
pub use error::TransformError;
pub use runner::Transformer;
