//! Three-phase build pipeline.

use tracing::{error, info};

use crate::collection::FileCollection;
use crate::error::{CoreError, CoreResult};
use crate::plugin::{BuildPlugin, Phase};

/// Runs plugins through gather, munge and prune.
///
/// Plugins run in registration order within each phase. The first failure
/// stops the build.
#[derive(Default)]
pub struct BuildPipeline {
    plugins: Vec<Box<dyn BuildPlugin>>,
}

impl BuildPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Append a plugin.
    pub fn register(&mut self, plugin: Box<dyn BuildPlugin>) {
        info!("Registering plugin: {}", plugin.name());
        self.plugins.push(plugin);
    }

    /// Names of the registered plugins, in order.
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Run every phase over the collection.
    pub fn run(&mut self, files: &mut dyn FileCollection) -> CoreResult<()> {
        for phase in Phase::ORDER {
            self.run_phase(phase, files)?;
        }
        info!("Build finished with {} files", files.len());
        Ok(())
    }

    /// Run a single phase for every plugin.
    pub fn run_phase(&mut self, phase: Phase, files: &mut dyn FileCollection) -> CoreResult<()> {
        info!("Running phase: {} ({} plugins)", phase, self.plugins.len());

        for plugin in &mut self.plugins {
            if let Err(source) = plugin.run_phase(phase, files) {
                error!("Plugin {} failed during {}: {:#}", plugin.name(), phase, source);
                return Err(CoreError::PhaseFailed {
                    plugin: plugin.name().to_string(),
                    phase,
                    source,
                });
            }
        }

        Ok(())
    }
}
