//! Plan command - show which templates would be rendered where.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use distmpl_core::BuildPlugin;
use distmpl_templates::PlannedOutput;

use super::{SourceArgs, Workspace};

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

/// Planned outputs of one processor.
#[derive(Debug, Serialize)]
struct PluginPlan {
    plugin: String,
    outputs: Vec<PlannedOutput>,
}

pub fn execute(args: PlanArgs) -> Result<()> {
    let workspace = Workspace::load(&args.source)?;
    let plans = collect_plans(&workspace)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plans)?);
        return Ok(());
    }

    for plan in &plans {
        println!("[{}]", plan.plugin);
        if plan.outputs.is_empty() {
            println!("  (no templates)");
        }
        for output in &plan.outputs {
            println!(
                "  {} -> {} ({})",
                output.template, output.output, output.action
            );
        }
    }

    Ok(())
}

fn collect_plans(workspace: &Workspace) -> Result<Vec<PluginPlan>> {
    let mut plans = Vec::new();
    for processor in &workspace.processors {
        plans.push(PluginPlan {
            plugin: processor.name().to_string(),
            outputs: processor.plan(&workspace.files)?,
        });
    }
    Ok(plans)
}
