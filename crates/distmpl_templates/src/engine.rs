//! Template engines.
//!
//! The processor only needs one capability from an engine: turn template
//! text plus variables into output text. [`MiniJinjaEngine`] provides it with
//! `[% ... %]` expression tags, so `Hello [% dzil.name %]` renders the
//! distribution name. Statements use `{% ... %}` and comments `{# ... #}`.

use minijinja::syntax::SyntaxConfig;
use minijinja::{Environment, UndefinedBehavior};
use thiserror::Error;
use tracing::debug;

use crate::config::EngineOptions;
use crate::error::{TemplateError, TemplateResult};
use crate::variables::VariableContext;

const DEFAULT_START_TAG: &str = "[%";
const DEFAULT_END_TAG: &str = "%]";

/// Failure reported by a template engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RenderError {
    pub message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Renders template text.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateEngine {
    /// Render `template` against `variables`.
    fn render(&self, template: &str, variables: &VariableContext) -> Result<String, RenderError>;
}

/// MiniJinja-backed engine.
pub struct MiniJinjaEngine {
    env: Environment<'static>,
    trim: bool,
}

impl MiniJinjaEngine {
    /// Create an engine from options.
    pub fn new(options: &EngineOptions) -> TemplateResult<Self> {
        let start = options
            .start_tag
            .clone()
            .unwrap_or_else(|| DEFAULT_START_TAG.to_string());
        let end = options
            .end_tag
            .clone()
            .unwrap_or_else(|| DEFAULT_END_TAG.to_string());

        let syntax = SyntaxConfig::builder()
            .block_delimiters("{%", "%}")
            .variable_delimiters(start.clone(), end.clone())
            .comment_delimiters("{#", "#}")
            .build()
            .map_err(|e| {
                TemplateError::configuration(format!(
                    "invalid template tags '{}' / '{}': {}",
                    start, end, e
                ))
            })?;

        let mut env = Environment::new();
        env.set_syntax(syntax);
        env.set_keep_trailing_newline(true);
        if options.strict.unwrap_or(false) {
            env.set_undefined_behavior(UndefinedBehavior::Strict);
        }

        debug!("Created template engine with tags {} {}", start, end);

        Ok(Self {
            env,
            trim: options.trim.unwrap_or(false),
        })
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render(&self, template: &str, variables: &VariableContext) -> Result<String, RenderError> {
        let rendered = self
            .env
            .render_str(template, variables)
            .map_err(|e| RenderError::new(e.to_string()))?;

        if self.trim {
            Ok(rendered.trim().to_string())
        } else {
            Ok(rendered)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use distmpl_core::Distribution;
    use serde_json::Value;

    fn context() -> VariableContext {
        let dist = Distribution::new("Foo-Bar", "1.2.3").with_author("Ann <ann@example.com>");
        let mut context = VariableContext::build(&dist, &[]).unwrap();
        context.insert("year", Value::from("2024"));
        context
    }

    #[test]
    fn test_renders_bracket_expressions() {
        let engine = MiniJinjaEngine::new(&EngineOptions::default()).unwrap();
        let out = engine
            .render("Hello [% dzil.name %] v[% dzil.version %]\n", &context())
            .unwrap();
        assert_eq!(out, "Hello Foo-Bar v1.2.3\n");
    }

    #[test]
    fn test_statements_and_lists() {
        let engine = MiniJinjaEngine::new(&EngineOptions::default()).unwrap();
        let template = "{% for a in dzil.authors %}[% a %];{% endfor %} ([% year %])";
        let out = engine.render(template, &context()).unwrap();
        assert_eq!(out, "Ann <ann@example.com>; (2024)");
    }

    #[test]
    fn test_undefined_is_empty_unless_strict() {
        let lenient = MiniJinjaEngine::new(&EngineOptions::default()).unwrap();
        assert_eq!(lenient.render("<[% missing %]>", &context()).unwrap(), "<>");

        let strict = MiniJinjaEngine::new(&EngineOptions {
            strict: Some(true),
            ..EngineOptions::default()
        })
        .unwrap();
        assert!(strict.render("[% missing %]", &context()).is_err());
    }

    #[test]
    fn test_trim_option() {
        let engine = MiniJinjaEngine::new(&EngineOptions {
            trim: Some(true),
            ..EngineOptions::default()
        })
        .unwrap();
        assert_eq!(
            engine.render("\n  [% dzil.name %]  \n\n", &context()).unwrap(),
            "Foo-Bar"
        );
    }

    #[test]
    fn test_custom_tags() {
        let engine = MiniJinjaEngine::new(&EngineOptions {
            start_tag: Some("<%".to_string()),
            end_tag: Some("%>".to_string()),
            ..EngineOptions::default()
        })
        .unwrap();
        assert_eq!(
            engine.render("<% dzil.name %> [% x %]", &context()).unwrap(),
            "Foo-Bar [% x %]"
        );
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let engine = MiniJinjaEngine::new(&EngineOptions::default()).unwrap();
        let err = engine.render("[% dzil.name( %]", &context()).unwrap_err();
        assert!(!err.message.is_empty());
    }
}
