//! Build-tool plugin adapter.
//!
//! A bundler integration only needs two hooks: build start and build end.
//! [`BuildPlugin`] is that surface; [`ImageConstsPlugin`] implements it on top
//! of [`run_generator`].
//!
//! ```text
//! Idle ──build_start──▶ (generate) ──watch on──▶ Watching
//!   ▲                        └──────watch off──▶ Idle
//!   └──────────build_end / close_bundle─────────┘
//! ```
//!
//! Generation runs synchronously inside `build_start`, so the build does not
//! continue until the module is written (or found unchanged).

use crate::config::{ConfigError, Environment, Options, ResolvedOptions};
use crate::generate::{GenerateError, run_generator};
use crate::watch::WatchHandle;

/// Lifecycle hooks a build tool calls.
pub trait BuildPlugin {
    fn name(&self) -> &'static str;

    /// Called once when a build (or dev server) starts.
    fn build_start(&mut self) -> Result<(), GenerateError>;

    /// Called when the build finishes. Must be safe to call repeatedly.
    fn build_end(&mut self);

    /// Alternate end hook for tools that never call `build_end`.
    fn close_bundle(&mut self) {
        self.build_end();
    }
}

/// Where the plugin is in its lifecycle.
pub enum PluginState {
    Idle,
    Watching(WatchHandle),
}

impl PluginState {
    pub fn label(&self) -> &'static str {
        match self {
            PluginState::Idle => "idle",
            PluginState::Watching(_) => "watching",
        }
    }
}

pub struct ImageConstsPlugin {
    options: ResolvedOptions,
    state: PluginState,
}

impl ImageConstsPlugin {
    pub fn new(options: ResolvedOptions) -> Self {
        Self {
            options,
            state: PluginState::Idle,
        }
    }

    /// Resolve `options` against the current process environment.
    pub fn from_options(options: &Options) -> Result<Self, ConfigError> {
        let env = Environment::capture()?;
        Ok(Self::new(options.resolve(&env)?))
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    pub fn state(&self) -> &PluginState {
        &self.state
    }

    pub fn is_watching(&self) -> bool {
        matches!(self.state, PluginState::Watching(_))
    }

    fn stop_watching(&mut self) {
        if let PluginState::Watching(handle) = std::mem::replace(&mut self.state, PluginState::Idle)
        {
            tracing::debug!("closing watch session");
            handle.close();
        }
    }
}

impl BuildPlugin for ImageConstsPlugin {
    fn name(&self) -> &'static str {
        "image-consts"
    }

    fn build_start(&mut self) -> Result<(), GenerateError> {
        // No reentrancy guard: a second start replaces the running session.
        self.stop_watching();
        if let Some(handle) = run_generator(&self.options)? {
            self.state = PluginState::Watching(handle);
        }
        tracing::debug!(state = self.state.label(), "build start complete");
        Ok(())
    }

    fn build_end(&mut self) {
        self.stop_watching();
    }
}
