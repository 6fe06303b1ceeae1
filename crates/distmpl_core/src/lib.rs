//! # distmpl_core
//!
//! Build-side collaborators for distmpl.
//!
//! This crate holds everything a build step needs besides the templates
//! themselves:
//!
//! - **Files**: shared, in-place mutable [`BuildFile`] handles
//! - **Collections**: the [`FileCollection`] seam plus an in-memory implementation
//!   that can be loaded from and written to disk
//! - **Finders**: named file selectors resolved through a [`FinderRegistry`]
//! - **Pipeline**: [`BuildPlugin`]s driven through gather, munge and prune
//!
//! # Example
//!
//! ```rust,ignore
//! use distmpl_core::{BuildPipeline, InMemoryCollection};
//!
//! let mut files = InMemoryCollection::load_dir("./dist", &[])?;
//! let mut pipeline = BuildPipeline::new();
//! pipeline.register(Box::new(my_plugin));
//! pipeline.run(&mut files)?;
//! files.write_to("./build")?;
//! ```

pub mod collection;
pub mod distribution;
pub mod error;
pub mod file;
pub mod finder;
pub mod pipeline;
pub mod plugin;

pub use collection::{FileCollection, InMemoryCollection};
pub use distribution::Distribution;
pub use error::{CoreError, CoreResult};
pub use file::BuildFile;
pub use finder::{FileFinder, FinderRegistry, GlobFinder, ALL_FILES};
pub use pipeline::BuildPipeline;
pub use plugin::{BuildPlugin, Phase};
