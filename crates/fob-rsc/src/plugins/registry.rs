//! Plugin registry with execution phases.
//!
//! Rolldown asks plugins in registration order and takes the first answer, so
//! ordering by phase makes the resolve rules an explicit first-match list:
//! reserved virtual specifiers are claimed before externalisation sees them.

use rolldown_plugin::{__inner::SharedPluginable, Plugin};
use std::sync::Arc;

/// Plugin execution phases (lower runs first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PluginPhase {
    /// Reserved virtual modules
    Virtual = 0,
    /// Externalisation and other resolution rules
    Resolve = 10,
    /// Source transforms (export stripping, boundary detection)
    Transform = 20,
}

/// A Rolldown plugin that knows its phase.
pub trait RscPlugin: Plugin {
    fn phase(&self) -> PluginPhase {
        PluginPhase::Transform
    }
}

/// Plugins kept in phase order.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<(PluginPhase, SharedPluginable)>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<P: RscPlugin + 'static>(&mut self, plugin: P) {
        let phase = plugin.phase();
        self.plugins.push((phase, Arc::new(plugin)));
    }

    /// Phase names in the order `into_rolldown_plugins` will return them.
    pub fn ordered_phases(&self) -> Vec<PluginPhase> {
        let mut phases: Vec<_> = self.plugins.iter().map(|(phase, _)| *phase).collect();
        phases.sort();
        phases
    }

    /// Plugins sorted by phase; equal phases keep insertion order.
    pub fn into_rolldown_plugins(mut self) -> Vec<SharedPluginable> {
        self.plugins.sort_by_key(|(phase, _)| *phase);
        self.plugins.into_iter().map(|(_, plugin)| plugin).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
