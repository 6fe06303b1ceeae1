//! The template processor build plugin.
//!
//! # Phases
//!
//! 1. **gather**: select templates and work out each output name. Templates
//!    whose output already exists are queued for munge when `replace` is set;
//!    all others are rendered right away and added as new files. With
//!    `prune` set, every selected template is queued for removal.
//! 2. **munge**: render queued templates over their existing targets, then prune.
//! 3. **prune**: drop queued templates from the build.
//!
//! Any render failure aborts the phase. A new file is only created once its
//! content rendered successfully, so a failed build never holds a half-written
//! output.

use std::fmt;
use std::mem;
use std::sync::Arc;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use distmpl_core::{BuildFile, BuildPlugin, Distribution, FileCollection, FinderRegistry};

use crate::config::{ProcessorConfig, DEFAULT_TEMPLATE_PATTERN};
use crate::engine::{MiniJinjaEngine, TemplateEngine};
use crate::error::{TemplateError, TemplateResult};
use crate::variables::VariableContext;

/// What gather will do with a selected template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputAction {
    /// Render now and add a new file
    Inject,
    /// Render during munge over the existing file
    Replace,
}

impl OutputAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inject => "inject",
            Self::Replace => "replace",
        }
    }
}

impl fmt::Display for OutputAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of a dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedOutput {
    pub template: String,
    pub output: String,
    pub action: OutputAction,
}

/// Renders template files into the build.
pub struct TemplateProcessor<E: TemplateEngine = MiniJinjaEngine> {
    config: ProcessorConfig,
    engine: E,
    distribution: Distribution,
    finders: Arc<FinderRegistry>,
    variables: Option<VariableContext>,
    pending_munge: Vec<(Arc<BuildFile>, Arc<BuildFile>)>,
    pending_prune: Vec<Arc<BuildFile>>,
}

impl TemplateProcessor<MiniJinjaEngine> {
    /// Create a processor using the MiniJinja engine built from the
    /// configured engine options.
    pub fn new(
        config: ProcessorConfig,
        distribution: Distribution,
        finders: Arc<FinderRegistry>,
    ) -> TemplateResult<Self> {
        let engine = MiniJinjaEngine::new(&config.engine_options())?;
        Ok(Self::with_engine(config, engine, distribution, finders))
    }
}

impl<E: TemplateEngine> TemplateProcessor<E> {
    /// Create a processor with an explicit engine.
    pub fn with_engine(
        config: ProcessorConfig,
        engine: E,
        distribution: Distribution,
        finders: Arc<FinderRegistry>,
    ) -> Self {
        Self {
            config,
            engine,
            distribution,
            finders,
            variables: None,
            pending_munge: Vec::new(),
            pending_prune: Vec::new(),
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Number of templates waiting for munge.
    pub fn pending_munge(&self) -> usize {
        self.pending_munge.len()
    }

    /// Number of templates waiting for prune.
    pub fn pending_prune(&self) -> usize {
        self.pending_prune.len()
    }

    /// Select templates, then inject or queue each of them.
    ///
    /// On failure both queues are emptied, so nothing selected by a failed
    /// gather is munged or pruned later.
    pub fn gather_templates(&mut self, files: &mut dyn FileCollection) -> TemplateResult<()> {
        let result = self.queue_templates(files);
        if result.is_err() {
            self.pending_munge.clear();
            self.pending_prune.clear();
        }
        result
    }

    fn queue_templates(&mut self, files: &mut dyn FileCollection) -> TemplateResult<()> {
        let rename = self.config.rename.compile()?;
        let templates = self.select_templates(files)?;
        debug!(
            "{} selected {} templates",
            self.config.plugin_name(),
            templates.len()
        );

        for template in templates {
            let output = rename.apply(template.name());
            info!(
                "[{}] {} -> {}",
                self.config.plugin_name(),
                template.name(),
                output
            );

            match files.find_by_name(&output) {
                Some(target) if self.config.replace => {
                    debug!("Queued {} for munge over {}", template.name(), target.name());
                    self.pending_munge.push((Arc::clone(&template), target));
                }
                _ => {
                    let content = self.render(&template)?;
                    files.add(BuildFile::shared(
                        output,
                        content,
                        self.config.plugin_name(),
                    ));
                }
            }

            if self.config.prune {
                self.pending_prune.push(template);
            }
        }

        Ok(())
    }

    /// Render queued templates over their targets in queue order, then prune.
    ///
    /// Both queues are taken before the first render; a failure drops them.
    pub fn munge_templates(&mut self, files: &mut dyn FileCollection) -> TemplateResult<()> {
        let queued = mem::take(&mut self.pending_munge);
        let prunable = mem::take(&mut self.pending_prune);

        for (template, target) in queued {
            let content = self.render(&template)?;
            info!(
                "[{}] rendering {} over {}",
                self.config.plugin_name(),
                template.name(),
                target.name()
            );
            target.set_content(content);
        }

        self.pending_prune = prunable;
        self.prune_templates(files)
    }

    /// Remove queued templates from the build.
    pub fn prune_templates(&mut self, files: &mut dyn FileCollection) -> TemplateResult<()> {
        for template in mem::take(&mut self.pending_prune) {
            info!(
                "[{}] pruning {}",
                self.config.plugin_name(),
                template.name()
            );
            files.remove(&template);
        }
        Ok(())
    }

    /// Work out what gather would do, without rendering or changing anything.
    pub fn plan(&self, files: &dyn FileCollection) -> TemplateResult<Vec<PlannedOutput>> {
        let rename = self.config.rename.compile()?;

        Ok(self
            .select_templates(files)?
            .into_iter()
            .map(|template| {
                let output = rename.apply(template.name());
                let action = if self.config.replace && files.find_by_name(&output).is_some() {
                    OutputAction::Replace
                } else {
                    OutputAction::Inject
                };
                PlannedOutput {
                    template: template.name().to_string(),
                    output,
                    action,
                }
            })
            .collect())
    }

    fn select_templates(&self, files: &dyn FileCollection) -> TemplateResult<Vec<Arc<BuildFile>>> {
        match &self.config.finder {
            Some(name) => self.finders.resolve(name, files).map_err(|e| {
                TemplateError::configuration(format!(
                    "{} cannot select templates: {}",
                    self.config.plugin_name(),
                    e
                ))
            }),
            None => {
                let pattern = Regex::new(DEFAULT_TEMPLATE_PATTERN).map_err(|e| {
                    TemplateError::configuration(format!("invalid template pattern: {}", e))
                })?;
                Ok(files
                    .files()
                    .into_iter()
                    .filter(|f| pattern.is_match(f.name()))
                    .collect())
            }
        }
    }

    fn render(&mut self, template: &BuildFile) -> TemplateResult<String> {
        let content = template.content();
        let variables =
            memoized_context(&mut self.variables, &self.distribution, &self.config.var)?;
        self.engine
            .render(&content, variables)
            .map_err(|e| TemplateError::Render {
                template: template.name().to_string(),
                message: e.message,
            })
    }

    /// Variables shared by every render; built on first use.
    pub fn variable_context(&mut self) -> TemplateResult<&VariableContext> {
        memoized_context(&mut self.variables, &self.distribution, &self.config.var)
    }
}

fn memoized_context<'a>(
    slot: &'a mut Option<VariableContext>,
    distribution: &Distribution,
    assignments: &[String],
) -> TemplateResult<&'a VariableContext> {
    if slot.is_none() {
        let context = VariableContext::build(distribution, assignments)?;
        debug!("Built variable context with {} entries", context.len());
        *slot = Some(context);
    }
    let slot: &'a Option<VariableContext> = slot;
    slot.as_ref()
        .ok_or_else(|| TemplateError::configuration("variable context unavailable"))
}

impl<E: TemplateEngine> BuildPlugin for TemplateProcessor<E> {
    fn name(&self) -> &str {
        self.config.plugin_name()
    }

    fn gather(&mut self, files: &mut dyn FileCollection) -> anyhow::Result<()> {
        Ok(self.gather_templates(files)?)
    }

    fn munge(&mut self, files: &mut dyn FileCollection) -> anyhow::Result<()> {
        Ok(self.munge_templates(files)?)
    }

    fn prune(&mut self, files: &mut dyn FileCollection) -> anyhow::Result<()> {
        Ok(self.prune_templates(files)?)
    }
}
