//! Files known to a build.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// A single file in the build.
///
/// Files are shared as `Arc<BuildFile>` so that plugins can hold on to a file
/// between phases. The name is fixed; the content can be rewritten in place,
/// and every holder of the handle observes the change.
pub struct BuildFile {
    name: String,
    content: RwLock<String>,
    added_by: String,
}

impl BuildFile {
    /// Create a new file.
    pub fn new(
        name: impl Into<String>,
        content: impl Into<String>,
        added_by: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            content: RwLock::new(content.into()),
            added_by: added_by.into(),
        }
    }

    /// Create a new file wrapped in a shared handle.
    pub fn shared(
        name: impl Into<String>,
        content: impl Into<String>,
        added_by: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self::new(name, content, added_by))
    }

    /// Slash-separated path of the file relative to the distribution root.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the current content.
    pub fn content(&self) -> String {
        self.content.read().clone()
    }

    /// Replace the content in place.
    pub fn set_content(&self, content: impl Into<String>) {
        *self.content.write() = content.into();
    }

    /// Which component put the file into the build.
    pub fn added_by(&self) -> &str {
        &self.added_by
    }
}

impl fmt::Debug for BuildFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildFile")
            .field("name", &self.name)
            .field("added_by", &self.added_by)
            .field("len", &self.content.read().len())
            .finish()
    }
}
