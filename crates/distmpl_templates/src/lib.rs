//! # distmpl_templates
//!
//! Template processing for distmpl builds.
//!
//! The [`TemplateProcessor`] finds template files (by default every `*.tt`
//! file), renders them against a small variable context that always exposes
//! the distribution metadata as `dzil`, and then either:
//!
//! - injects the result as a new file named after the template minus its suffix, or
//! - with `replace` enabled, rewrites an existing file of that name during munge.
//!
//! With `prune` enabled the templates themselves are dropped from the build.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use distmpl_core::{BuildPipeline, Distribution, FinderRegistry, InMemoryCollection};
//! use distmpl_templates::{ProcessorConfig, TemplateProcessor};
//!
//! let dist = Distribution::new("Foo-Bar", "1.0.0");
//! let config = ProcessorConfig::new().with_var("year=2024").prune(true);
//! let processor = TemplateProcessor::new(config, dist, Arc::new(FinderRegistry::new())).unwrap();
//!
//! let mut files = InMemoryCollection::load_dir("dist", &[]).unwrap();
//! let mut pipeline = BuildPipeline::new();
//! pipeline.register(Box::new(processor));
//! pipeline.run(&mut files).unwrap();
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod processor;
pub mod variables;

pub use config::{
    BuildManifest, CompiledRename, EngineOptions, FinderSpec, ProcessorConfig, RenameRule,
    DEFAULT_PLUGIN_NAME, DEFAULT_TEMPLATE_PATTERN,
};
pub use engine::{MiniJinjaEngine, RenderError, TemplateEngine};
pub use error::{TemplateError, TemplateResult};
pub use processor::{OutputAction, PlannedOutput, TemplateProcessor};
pub use variables::{parse_assignment, VariableContext, DIST_VARIABLE};
