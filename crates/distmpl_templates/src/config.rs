//! Processor configuration and build manifests.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use distmpl_core::{Distribution, FinderRegistry, GlobFinder};

use crate::error::{TemplateError, TemplateResult};

/// Names matching this pattern are templates when no finder is configured.
pub const DEFAULT_TEMPLATE_PATTERN: &str = r"\.tt$";

/// Plugin name used when the configuration does not give one.
pub const DEFAULT_PLUGIN_NAME: &str = "TemplateFiles";

/// Search/replace rule turning a template name into an output name.
///
/// The pattern is a regular expression; only its first match is replaced.
/// The replacement may refer to capture groups as `$1` or `${name}`, so a
/// literal `$` must be written `$$`. With `literal` set the replacement is
/// inserted as-is and `$` needs no escaping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenameRule {
    pub pattern: String,
    pub replacement: String,
    pub literal: bool,
}

impl Default for RenameRule {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_TEMPLATE_PATTERN.to_string(),
            replacement: String::new(),
            literal: false,
        }
    }
}

impl RenameRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            literal: false,
        }
    }

    /// Insert the replacement without expanding `$` references.
    pub fn literal(mut self, literal: bool) -> Self {
        self.literal = literal;
        self
    }

    /// Compile the pattern.
    pub fn compile(&self) -> TemplateResult<CompiledRename> {
        let regex = Regex::new(&self.pattern).map_err(|e| {
            TemplateError::configuration(format!(
                "invalid rename pattern '{}': {}",
                self.pattern, e
            ))
        })?;
        Ok(CompiledRename {
            regex,
            replacement: self.replacement.clone(),
            literal: self.literal,
        })
    }
}

/// A rename rule ready to apply.
#[derive(Debug, Clone)]
pub struct CompiledRename {
    regex: Regex,
    replacement: String,
    literal: bool,
}

impl CompiledRename {
    /// Apply the rule to a file name.
    pub fn apply(&self, name: &str) -> String {
        if self.literal {
            self.regex
                .replace(name, NoExpand(self.replacement.as_str()))
                .into_owned()
        } else {
            self.regex
                .replace(name, self.replacement.as_str())
                .into_owned()
        }
    }
}

/// Options handed to the template engine.
///
/// Written with upper-case keys in manifests (`TRIM`, `START_TAG`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
pub struct EngineOptions {
    /// Strip leading and trailing whitespace from rendered output
    pub trim: Option<bool>,
    /// Opening tag of an expression (default `[%`)
    pub start_tag: Option<String>,
    /// Closing tag of an expression (default `%]`)
    pub end_tag: Option<String>,
    /// Fail on undefined variables instead of rendering them empty
    pub strict: Option<bool>,
}

/// Configuration of one template processor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessorConfig {
    /// Plugin name used in logs
    pub name: Option<String>,
    /// Named finder selecting the templates; all `*.tt` files when unset
    pub finder: Option<String>,
    /// Output name rule
    pub rename: RenameRule,
    /// Extra variables as `name=value`
    pub var: Vec<String>,
    /// Render over an existing file of the output name instead of adding one
    pub replace: bool,
    /// Remove templates from the build afterwards
    pub prune: bool,
    /// Shorthand for the engine's `TRIM`; ignored when `engine.TRIM` is set
    pub trim: Option<bool>,
    /// Engine options
    pub engine: EngineOptions,
}

impl ProcessorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_finder(mut self, finder: impl Into<String>) -> Self {
        self.finder = Some(finder.into());
        self
    }

    pub fn with_rename(mut self, pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.rename = RenameRule::new(pattern, replacement);
        self
    }

    pub fn with_var(mut self, assignment: impl Into<String>) -> Self {
        self.var.push(assignment.into());
        self
    }

    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    pub fn prune(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = Some(trim);
        self
    }

    pub fn with_engine(mut self, engine: EngineOptions) -> Self {
        self.engine = engine;
        self
    }

    /// Plugin name, falling back to the default.
    pub fn plugin_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_PLUGIN_NAME)
    }

    /// Engine options with the `trim` shorthand folded in.
    pub fn engine_options(&self) -> EngineOptions {
        let mut options = self.engine.clone();
        if options.trim.is_none() {
            options.trim = self.trim;
        }
        options
    }
}

/// Include/exclude globs of a named finder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinderSpec {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// A complete build description: distribution, finders and processors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildManifest {
    pub distribution: Distribution,
    /// Globs of source paths never loaded into the build
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub finders: BTreeMap<String, FinderSpec>,
    #[serde(default, rename = "template")]
    pub templates: Vec<ProcessorConfig>,
}

impl BuildManifest {
    /// Load a manifest from disk. `.yaml`/`.yml` files are read as YAML,
    /// anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> TemplateResult<Self> {
        let path = path.as_ref();
        debug!("Loading manifest from {:?}", path);
        let content = fs::read_to_string(path)?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> TemplateResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_yaml_str(content: &str) -> TemplateResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Build a registry holding the built-in finders plus every declared one.
    pub fn finder_registry(&self) -> TemplateResult<FinderRegistry> {
        let mut registry = FinderRegistry::new();
        for (name, spec) in &self.finders {
            let finder = GlobFinder::new(&spec.include, &spec.exclude)?;
            registry.register(name.clone(), Arc::new(finder));
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rename_strips_suffix() {
        let rename = RenameRule::default().compile().unwrap();
        assert_eq!(rename.apply("greeting.tt"), "greeting");
        assert_eq!(rename.apply("lib/Foo.pm.tt"), "lib/Foo.pm");
        assert_eq!(rename.apply("notes.tt.bak"), "notes.tt.bak");
    }

    #[test]
    fn test_rename_with_captures() {
        let rename = RenameRule::new(r"^tmpl/(.+)\.tmpl$", "out/$1").compile().unwrap();
        assert_eq!(rename.apply("tmpl/a.txt.tmpl"), "out/a.txt");
    }

    #[test]
    fn test_rename_dollar_handling() {
        let expanded = RenameRule::new(r"\.tt$", "-$$1").compile().unwrap();
        assert_eq!(expanded.apply("price.tt"), "price-$1");

        let swallowed = RenameRule::new(r"\.tt$", "$x").compile().unwrap();
        assert_eq!(swallowed.apply("price.tt"), "price");

        let literal = RenameRule::new(r"^(\w+)\.tt$", "$1.$").literal(true).compile().unwrap();
        assert_eq!(literal.apply("price.tt"), "$1.$");
    }

    #[test]
    fn test_invalid_rename_pattern() {
        let err = RenameRule::new("(", "").compile().unwrap_err();
        assert!(matches!(err, TemplateError::Configuration(_)));
    }

    #[test]
    fn test_trim_alias_only_fills_missing_engine_value() {
        let config = ProcessorConfig::new().trim(true);
        assert_eq!(config.engine_options().trim, Some(true));

        let config = ProcessorConfig::new().trim(true).with_engine(EngineOptions {
            trim: Some(false),
            ..EngineOptions::default()
        });
        assert_eq!(config.engine_options().trim, Some(false));
    }

    #[test]
    fn test_processor_config_builder() {
        let config = ProcessorConfig::new()
            .named("Readme")
            .with_finder("docs")
            .with_var("a=1")
            .replace(true)
            .prune(true);

        assert_eq!(config.plugin_name(), "Readme");
        assert_eq!(config.finder.as_deref(), Some("docs"));
        assert_eq!(config.var, vec!["a=1"]);
        assert!(config.replace && config.prune);
        assert_eq!(ProcessorConfig::new().plugin_name(), DEFAULT_PLUGIN_NAME);
    }

    #[test]
    fn test_manifest_from_toml() {
        let manifest = BuildManifest::from_toml_str(
            r#"
exclude = [".git/**"]

[distribution]
name = "Foo-Bar"
version = "1.0.0"
abstract = "Does foo"
authors = ["A. Author <a@example.com>"]
homepage = "https://example.com"

[finders.docs]
include = ["docs/**/*.tt"]

[[template]]
finder = "docs"
rename = { pattern = '\.tt$', replacement = ".md" }
var = ["year = 2024"]
replace = true
engine = { TRIM = true, STRICT = true }

[[template]]
prune = true
"#,
        )
        .unwrap();

        assert_eq!(manifest.distribution.name, "Foo-Bar");
        assert_eq!(manifest.distribution.abstract_, "Does foo");
        assert_eq!(
            manifest.distribution.extra["homepage"],
            serde_json::json!("https://example.com")
        );
        assert_eq!(manifest.exclude, vec![".git/**"]);
        assert_eq!(manifest.templates.len(), 2);

        let first = &manifest.templates[0];
        assert_eq!(first.rename.replacement, ".md");
        assert_eq!(first.engine.trim, Some(true));
        assert_eq!(first.engine.strict, Some(true));
        assert!(first.replace);

        let second = &manifest.templates[1];
        assert_eq!(second.rename, RenameRule::default());
        assert!(second.prune);

        let registry = manifest.finder_registry().unwrap();
        assert!(registry.contains("docs"));
        assert!(registry.contains(distmpl_core::ALL_FILES));
    }

    #[test]
    fn test_manifest_rejects_lowercase_engine_keys() {
        let result = BuildManifest::from_toml_str(
            r#"
[distribution]
name = "Foo"

[[template]]
engine = { trim = true }
"#,
        );
        assert!(matches!(result, Err(TemplateError::Toml(_))));
    }

    #[test]
    fn test_manifest_rejects_misspelled_sections() {
        let plural = BuildManifest::from_toml_str(
            "[distribution]\nname = \"Foo\"\n\n[[templates]]\nprune = true\n",
        );
        assert!(matches!(plural, Err(TemplateError::Toml(_))));

        let singular = BuildManifest::from_toml_str(
            "[distribution]\nname = \"Foo\"\n\n[finder.docs]\ninclude = [\"docs/*\"]\n",
        );
        assert!(matches!(singular, Err(TemplateError::Toml(_))));

        let yaml = BuildManifest::from_yaml_str("distribution:\n  name: Foo\ntemplates: []\n");
        assert!(matches!(yaml, Err(TemplateError::Yaml(_))));
    }

    #[test]
    fn test_manifest_from_yaml() {
        let manifest = BuildManifest::from_yaml_str(
            r#"
distribution:
  name: Foo
  version: "0.1"
template:
  - var: ["x=1"]
    engine:
      START_TAG: "<%"
      END_TAG: "%>"
"#,
        )
        .unwrap();

        assert_eq!(manifest.distribution.version, "0.1");
        assert_eq!(manifest.templates[0].engine.start_tag.as_deref(), Some("<%"));
    }
}
