//! Build plugins.
//!
//! A plugin takes part in a build by implementing any of the three phases.
//! The pipeline calls every plugin's `gather`, then every plugin's `munge`,
//! then every plugin's `prune`; phases a plugin does not implement are no-ops.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::collection::FileCollection;

/// A build phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Add files to the build.
    Gather,
    /// Rewrite files already in the build.
    Munge,
    /// Drop files that must not ship.
    Prune,
}

impl Phase {
    /// All phases in execution order.
    pub const ORDER: [Phase; 3] = [Phase::Gather, Phase::Munge, Phase::Prune];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gather => "gather",
            Self::Munge => "munge",
            Self::Prune => "prune",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A participant in the build.
pub trait BuildPlugin {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    fn gather(&mut self, files: &mut dyn FileCollection) -> anyhow::Result<()> {
        let _ = files;
        Ok(())
    }

    fn munge(&mut self, files: &mut dyn FileCollection) -> anyhow::Result<()> {
        let _ = files;
        Ok(())
    }

    fn prune(&mut self, files: &mut dyn FileCollection) -> anyhow::Result<()> {
        let _ = files;
        Ok(())
    }

    /// Dispatch a phase to the matching method.
    fn run_phase(&mut self, phase: Phase, files: &mut dyn FileCollection) -> anyhow::Result<()> {
        match phase {
            Phase::Gather => self.gather(files),
            Phase::Munge => self.munge(files),
            Phase::Prune => self.prune(files),
        }
    }
}
