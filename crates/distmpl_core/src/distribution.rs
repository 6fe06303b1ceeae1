//! Metadata about the distribution being built.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Distribution metadata exposed to templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    /// Distribution name (e.g., "Foo-Bar")
    pub name: String,
    /// Version string
    #[serde(default)]
    pub version: String,
    /// One-line description
    #[serde(default, rename = "abstract")]
    pub abstract_: String,
    /// Authors, usually "Name <email>"
    #[serde(default)]
    pub authors: Vec<String>,
    /// License identifier
    #[serde(default)]
    pub license: Option<String>,
    /// Main module or entry point
    #[serde(default)]
    pub main_module: Option<String>,
    /// Any other metadata, exposed alongside the fields above
    #[serde(default, flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Distribution {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn with_abstract(mut self, text: impl Into<String>) -> Self {
        self.abstract_ = text.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}
