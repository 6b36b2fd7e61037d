//! Lifecycle hooks plugins tap into.
//!
//! The set of hooks is closed: `HookName` enumerates every extension point
//! and `Hooks` owns exactly one `SyncHook` per name. Callbacks run
//! synchronously, in registration order, and the first failure stops the
//! invocation.

use crate::core::models::Compilation;
use crate::utils::{Result, TinypackError};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Every hook the compiler exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookName {
    Compiler,
    AfterPlugins,
    BeforeRun,
    Run,
    Make,
    AfterCompiler,
    ShouldEmit,
    Emit,
    AfterEmit,
    Done,
}

impl HookName {
    pub const ALL: [HookName; 10] = [
        HookName::Compiler,
        HookName::AfterPlugins,
        HookName::BeforeRun,
        HookName::Run,
        HookName::Make,
        HookName::AfterCompiler,
        HookName::ShouldEmit,
        HookName::Emit,
        HookName::AfterEmit,
        HookName::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HookName::Compiler => "compiler",
            HookName::AfterPlugins => "afterPlugins",
            HookName::BeforeRun => "beforeRun",
            HookName::Run => "run",
            HookName::Make => "make",
            HookName::AfterCompiler => "afterCompiler",
            HookName::ShouldEmit => "shouldEmit",
            HookName::Emit => "emit",
            HookName::AfterEmit => "afterEmit",
            HookName::Done => "done",
        }
    }
}

impl fmt::Display for HookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookName {
    type Err = TinypackError;

    fn from_str(s: &str) -> Result<Self> {
        HookName::ALL
            .iter()
            .copied()
            .find(|hook| hook.as_str() == s)
            .ok_or_else(|| TinypackError::UnknownHook(s.to_string()))
    }
}

/// Type alias for hook callbacks to reduce complexity
pub type HookFn<A> = Box<dyn Fn(&A) -> anyhow::Result<()> + Send + Sync>;

struct Tap<A> {
    plugin: String,
    callback: HookFn<A>,
}

/// An ordered list of callbacks sharing one argument type
pub struct SyncHook<A = ()> {
    name: HookName,
    taps: Vec<Tap<A>>,
}

impl<A> SyncHook<A> {
    pub fn new(name: HookName) -> Self {
        Self {
            name,
            taps: Vec::new(),
        }
    }

    pub fn name(&self) -> HookName {
        self.name
    }

    /// Append a callback on behalf of `plugin`
    pub fn tap<F>(&mut self, plugin: impl Into<String>, callback: F)
    where
        F: Fn(&A) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.taps.push(Tap {
            plugin: plugin.into(),
            callback: Box::new(callback),
        });
    }

    /// Run every callback in registration order, stopping at the first error
    pub fn call(&self, arg: &A) -> Result<()> {
        debug!("🪝 {} ({} taps)", self.name, self.taps.len());
        for tap in &self.taps {
            (tap.callback)(arg).map_err(|source| TinypackError::HookInvocation {
                hook: self.name,
                plugin: tap.plugin.clone(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }
}

/// The hook registry owned by one compiler
pub struct Hooks {
    pub compiler: SyncHook,
    pub after_plugins: SyncHook,
    pub before_run: SyncHook,
    pub run: SyncHook,
    pub make: SyncHook,
    pub after_compiler: SyncHook,
    pub should_emit: SyncHook,
    pub emit: SyncHook,
    pub after_emit: SyncHook<Compilation>,
    pub done: SyncHook,
}

impl Hooks {
    pub fn new() -> Self {
        Self {
            compiler: SyncHook::new(HookName::Compiler),
            after_plugins: SyncHook::new(HookName::AfterPlugins),
            before_run: SyncHook::new(HookName::BeforeRun),
            run: SyncHook::new(HookName::Run),
            make: SyncHook::new(HookName::Make),
            after_compiler: SyncHook::new(HookName::AfterCompiler),
            should_emit: SyncHook::new(HookName::ShouldEmit),
            emit: SyncHook::new(HookName::Emit),
            after_emit: SyncHook::new(HookName::AfterEmit),
            done: SyncHook::new(HookName::Done),
        }
    }

    /// The argument-less hook for `name`; `None` for `afterEmit`
    pub fn unit_hook_mut(&mut self, name: HookName) -> Option<&mut SyncHook> {
        match name {
            HookName::Compiler => Some(&mut self.compiler),
            HookName::AfterPlugins => Some(&mut self.after_plugins),
            HookName::BeforeRun => Some(&mut self.before_run),
            HookName::Run => Some(&mut self.run),
            HookName::Make => Some(&mut self.make),
            HookName::AfterCompiler => Some(&mut self.after_compiler),
            HookName::ShouldEmit => Some(&mut self.should_emit),
            HookName::Emit => Some(&mut self.emit),
            HookName::AfterEmit => None,
            HookName::Done => Some(&mut self.done),
        }
    }

    /// Register a callback by hook name.
    ///
    /// Fails with `UnknownHook` when `name` is not one of the fixed hooks.
    /// On `afterEmit` the compilation argument is not passed to `callback`.
    pub fn register<F>(&mut self, name: &str, plugin: impl Into<String>, callback: F) -> Result<()>
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let hook: HookName = name.parse()?;
        match self.unit_hook_mut(hook) {
            Some(unit) => unit.tap(plugin, move |_: &()| callback()),
            None => self
                .after_emit
                .tap(plugin, move |_: &Compilation| callback()),
        }
        Ok(())
    }

    /// Number of callbacks registered on `name`
    pub fn tap_count(&self, name: HookName) -> usize {
        match name {
            HookName::Compiler => self.compiler.len(),
            HookName::AfterPlugins => self.after_plugins.len(),
            HookName::BeforeRun => self.before_run.len(),
            HookName::Run => self.run.len(),
            HookName::Make => self.make.len(),
            HookName::AfterCompiler => self.after_compiler.len(),
            HookName::ShouldEmit => self.should_emit.len(),
            HookName::Emit => self.emit.len(),
            HookName::AfterEmit => self.after_emit.len(),
            HookName::Done => self.done.len(),
        }
    }
}

impl Default for Hooks {
    fn default() -> Self {
        Self::new()
    }
}
