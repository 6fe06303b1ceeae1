//! Named file finders.
//!
//! A finder picks a subset of the build's files. Plugins refer to finders by
//! name, and the [`FinderRegistry`] resolves that name at the time the plugin
//! asks for files.

use std::collections::HashMap;
use std::sync::Arc;

use glob::Pattern;
use tracing::debug;

use crate::collection::FileCollection;
use crate::error::{CoreError, CoreResult};
use crate::file::BuildFile;

/// Name of the built-in finder that selects every file.
pub const ALL_FILES: &str = ":AllFiles";

/// Selects files out of a build.
pub trait FileFinder: Send + Sync {
    /// Return the matching files, preserving their order.
    fn find(&self, files: &[Arc<BuildFile>]) -> Vec<Arc<BuildFile>>;
}

/// Finder that matches file names against include and exclude globs.
///
/// A file is selected when it matches at least one include pattern and no
/// exclude pattern. An empty include list selects everything.
#[derive(Debug, Clone, Default)]
pub struct GlobFinder {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl GlobFinder {
    /// Build a finder from glob strings.
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> CoreResult<Self> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Finder that selects every file.
    pub fn all() -> Self {
        Self::default()
    }

    fn accepts(&self, name: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|p| p.matches(name));
        included && !self.exclude.iter().any(|p| p.matches(name))
    }
}

impl FileFinder for GlobFinder {
    fn find(&self, files: &[Arc<BuildFile>]) -> Vec<Arc<BuildFile>> {
        files
            .iter()
            .filter(|f| self.accepts(f.name()))
            .cloned()
            .collect()
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> CoreResult<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            let p = p.as_ref();
            Pattern::new(p).map_err(|e| CoreError::InvalidPattern {
                pattern: p.to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}

/// A registry of named finders.
pub struct FinderRegistry {
    finders: HashMap<String, Arc<dyn FileFinder>>,
}

impl Default for FinderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FinderRegistry {
    /// Create a registry holding only the built-in finders.
    pub fn new() -> Self {
        let mut registry = Self {
            finders: HashMap::new(),
        };
        registry.register(ALL_FILES, Arc::new(GlobFinder::all()));
        registry
    }

    /// Register a finder. An existing finder with the same name is replaced.
    pub fn register(&mut self, name: impl Into<String>, finder: Arc<dyn FileFinder>) {
        let name = name.into();
        debug!("Registering finder: {}", name);
        self.finders.insert(name, finder);
    }

    /// Get a finder by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn FileFinder>> {
        self.finders.get(name).cloned()
    }

    /// Check if a finder is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.finders.contains_key(name)
    }

    /// Get all registered finder names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.finders.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Run the named finder over the collection's current files.
    pub fn resolve(
        &self,
        name: &str,
        collection: &dyn FileCollection,
    ) -> CoreResult<Vec<Arc<BuildFile>>> {
        let finder = self
            .get(name)
            .ok_or_else(|| CoreError::FinderNotFound(name.to_string()))?;
        let found = finder.find(&collection.files());
        debug!("Finder {} selected {} files", name, found.len());
        Ok(found)
    }
}
