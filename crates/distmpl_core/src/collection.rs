//! File collections.
//!
//! A [`FileCollection`] is the set of files a build currently knows about.
//! Plugins add, remove and look up files through it; they never touch the
//! disk directly. [`InMemoryCollection`] is the implementation used by the
//! CLI and the tests, with helpers to load a source tree and write the result.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use glob::Pattern;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{CoreError, CoreResult};
use crate::file::BuildFile;

/// The set of files known to a build.
pub trait FileCollection {
    /// All files, in insertion order.
    fn files(&self) -> Vec<Arc<BuildFile>>;

    /// First file whose name equals `name` exactly.
    fn find_by_name(&self, name: &str) -> Option<Arc<BuildFile>> {
        self.files().into_iter().find(|f| f.name() == name)
    }

    /// Add a file to the collection.
    fn add(&mut self, file: Arc<BuildFile>);

    /// Remove a file by identity. Returns `false` if it was not present.
    fn remove(&mut self, file: &Arc<BuildFile>) -> bool;

    /// Number of files.
    fn len(&self) -> usize {
        self.files().len()
    }

    /// Whether the collection is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordered in-memory file collection.
#[derive(Debug, Default)]
pub struct InMemoryCollection {
    files: Vec<Arc<BuildFile>>,
}

impl InMemoryCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Add a file built from a name and content, returning its handle.
    pub fn add_new(
        &mut self,
        name: impl Into<String>,
        content: impl Into<String>,
        added_by: impl Into<String>,
    ) -> Arc<BuildFile> {
        let file = BuildFile::shared(name, content, added_by);
        self.files.push(Arc::clone(&file));
        file
    }

    /// All file names, in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name()).collect()
    }

    /// Load every UTF-8 file under `root`.
    ///
    /// File names are relative to `root` and always use `/` as separator.
    /// Paths matching one of the `exclude` globs are skipped, as are files
    /// whose content is not valid UTF-8.
    pub fn load_dir(root: impl AsRef<Path>, exclude: &[String]) -> CoreResult<Self> {
        let root = root.as_ref();
        let exclude = exclude
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| CoreError::InvalidPattern {
                    pattern: p.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        let mut collection = Self::new();

        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = match entry.path().strip_prefix(root) {
                Ok(relative) => relative,
                Err(_) => continue,
            };
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            if exclude.iter().any(|p| p.matches(&name)) {
                debug!("Excluded: {}", name);
                continue;
            }

            let bytes = fs::read(entry.path())?;
            match String::from_utf8(bytes) {
                Ok(content) => {
                    collection.add_new(name, content, "disk");
                }
                Err(_) => warn!("Skipping non UTF-8 file: {}", name),
            }
        }

        info!("Loaded {} files from {:?}", collection.len(), root);
        Ok(collection)
    }

    /// Write every file under `target`, creating directories as needed.
    pub fn write_to(&self, target: impl AsRef<Path>) -> CoreResult<()> {
        let target = target.as_ref();
        fs::create_dir_all(target)?;

        for file in &self.files {
            let path = target.join(file.name());
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, file.content())?;
            debug!("Wrote: {:?}", path);
        }

        info!("Wrote {} files to {:?}", self.files.len(), target);
        Ok(())
    }
}

impl FileCollection for InMemoryCollection {
    fn files(&self) -> Vec<Arc<BuildFile>> {
        self.files.clone()
    }

    fn find_by_name(&self, name: &str) -> Option<Arc<BuildFile>> {
        self.files.iter().find(|f| f.name() == name).cloned()
    }

    fn add(&mut self, file: Arc<BuildFile>) {
        debug!("Adding file: {}", file.name());
        self.files.push(file);
    }

    fn remove(&mut self, file: &Arc<BuildFile>) -> bool {
        match self.files.iter().position(|f| Arc::ptr_eq(f, file)) {
            Some(index) => {
                self.files.remove(index);
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.files.len()
    }
}
