//! Build command - render templates and write the result.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use distmpl_core::{BuildPipeline, FileCollection};

use super::{SourceArgs, Workspace};

#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output directory
    #[arg(short, long, default_value = "build")]
    pub output: PathBuf,
}

pub fn execute(args: BuildArgs) -> Result<()> {
    let Workspace {
        manifest,
        processors,
        mut files,
    } = Workspace::load(&args.source)?;

    info!(
        "Building {} {} with {} template section(s)",
        manifest.distribution.name,
        manifest.distribution.version,
        processors.len()
    );

    let mut pipeline = BuildPipeline::new();
    for processor in processors {
        pipeline.register(Box::new(processor));
    }

    pipeline.run(&mut files).context("Build failed")?;

    files
        .write_to(&args.output)
        .with_context(|| format!("Failed to write build to {:?}", args.output))?;

    println!(
        "Built {} file(s) into {}",
        files.len(),
        args.output.display()
    );
    Ok(())
}
