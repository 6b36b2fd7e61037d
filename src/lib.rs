//! tinypack: a small module bundler.
//!
//! Modules reachable from an entry file are piped through configurable
//! loader chains, parsed, have their `require` calls rewritten to keys of a
//! runtime module table, and are emitted into a single bundle. Plugins tap
//! a fixed set of lifecycle hooks.

pub mod cli;
pub mod core;
pub mod infrastructure;
pub mod plugins;
pub mod utils;

pub use crate::core::{BuildConfig, Compilation, Compiler, HookName, Hooks, Plugin};
pub use crate::utils::{Result, TinypackError};
