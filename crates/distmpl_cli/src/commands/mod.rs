//! CLI command definitions.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use distmpl_core::InMemoryCollection;
use distmpl_templates::{BuildManifest, TemplateProcessor};

pub mod build;
pub mod plan;

/// distmpl - render templates into a distribution build
#[derive(Parser)]
#[command(name = "distmpl")]
#[command(version, about = "distmpl - render templates into a distribution build")]
#[command(long_about = r#"
distmpl loads a source tree, renders its template files against the
distribution metadata and writes the finished tree to an output directory.

COMMANDS:
  build  → Render templates and write the build
  plan   → Show which templates would be rendered where

EXIT CODES:
  0 - Success
  1 - General error
  2 - Configuration error
  4 - Template error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render templates and write the build
    Build(build::BuildArgs),

    /// Show planned outputs without rendering
    Plan(plan::PlanArgs),
}

/// Arguments shared by every command.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Build manifest (TOML, or YAML with a .yaml/.yml extension)
    #[arg(short, long, default_value = "distmpl.toml", env = "DISTMPL_MANIFEST")]
    pub manifest: PathBuf,

    /// Source directory
    #[arg(short, long, default_value = ".")]
    pub source: PathBuf,
}

/// Manifest, processors and loaded files for one invocation.
pub struct Workspace {
    pub manifest: BuildManifest,
    pub processors: Vec<TemplateProcessor>,
    pub files: InMemoryCollection,
}

impl Workspace {
    /// Load the manifest and source tree and build one processor per
    /// `[[template]]` entry.
    pub fn load(args: &SourceArgs) -> Result<Self> {
        let manifest = BuildManifest::load(&args.manifest)
            .with_context(|| format!("Failed to load manifest {:?}", args.manifest))?;

        let finders = Arc::new(
            manifest
                .finder_registry()
                .context("Failed to register finders")?,
        );

        let processors = manifest
            .templates
            .iter()
            .map(|config| {
                TemplateProcessor::new(
                    config.clone(),
                    manifest.distribution.clone(),
                    Arc::clone(&finders),
                )
                .with_context(|| format!("Invalid template section {}", config.plugin_name()))
            })
            .collect::<Result<Vec<_>>>()?;

        let files = load_sources(&args.source, &manifest.exclude)?;

        Ok(Self {
            manifest,
            processors,
            files,
        })
    }
}

fn load_sources(source: &Path, exclude: &[String]) -> Result<InMemoryCollection> {
    if !source.exists() {
        anyhow::bail!("Source directory not found: {:?}", source);
    }
    InMemoryCollection::load_dir(source, exclude)
        .with_context(|| format!("Failed to read source directory {:?}", source))
}
