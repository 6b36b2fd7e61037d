// Core domain layer
pub mod compiler;
pub mod graph;
pub mod hooks;
pub mod interfaces;
pub mod models;
pub mod plugin;

pub use compiler::*;
pub use graph::*;
pub use hooks::*;
pub use interfaces::*;
pub use models::*;
pub use plugin::*;
