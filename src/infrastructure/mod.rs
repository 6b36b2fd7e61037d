// Infrastructure layer
pub mod emitter;
pub mod file_system;
pub mod loaders;
pub mod processors;

pub use emitter::*;
pub use file_system::*;
pub use loaders::{LoaderRegistry, LoaderRunner};
pub use processors::*;
