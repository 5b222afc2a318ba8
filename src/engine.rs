use std::borrow::Cow;
use std::collections::HashMap;

use crate::error::{TinyvelError, TinyvelResult};
use crate::interface::{TemplateEngine, ValuesProvider};
use crate::template::Template;

/// What to do with an `#else` or `#end` that does not close any open block.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum StrayDirectives {
    /// Drop the line and carry on.
    #[default]
    Skip,
    /// Fail the render with [`ParseErrorKind::StrayDirective`](crate::ParseErrorKind).
    Reject,
}

/// Rendering options shared by every template of an [`Engine`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngineConfig {
    pub stray_directives: StrayDirectives,
    /// Appended after every rendered line, whatever the input line endings.
    pub line_separator: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stray_directives: StrayDirectives::default(),
            line_separator: "\r\n".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn with_stray_directives(mut self, stray_directives: StrayDirectives) -> Self {
        self.stray_directives = stray_directives;
        self
    }

    pub fn with_line_separator<S: Into<String>>(mut self, line_separator: S) -> Self {
        self.line_separator = line_separator.into();
        self
    }
}

/// `Engine` is the primary implementation of the [`TemplateEngine`] trait.
///
/// It owns a collection of named templates and the configuration used to
/// render them. Rendering only borrows the engine, and every render builds
/// its own scopes and cursor, so one engine can serve many renders.
///
/// # Examples
///
/// ```
/// use tinyvel::{Engine, MapProvider, TemplateEngine};
///
/// let mut engine = Engine::new();
/// engine.add_template("greeting", "Hello, ${name}!").unwrap();
///
/// let provider = MapProvider::new().with("name", "World");
/// let output = engine.render("greeting", &provider).unwrap();
/// assert_eq!(output, "Hello, World!\r\n");
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
    templates: HashMap<String, Template>,
}

impl Engine {
    /// Creates a new engine with no templates and the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            templates: HashMap::new(),
        }
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn template<N: AsRef<str>>(&self, name: N) -> Option<&Template> {
        self.templates.get(name.as_ref())
    }

    /// Renders a template that is not registered with the engine.
    ///
    /// # Errors
    /// - Any error [`Template::render`] can return.
    pub fn render_str<'a, C: Into<Cow<'a, str>>, P: ValuesProvider>(
        &self,
        content: C,
        provider: &P,
    ) -> TinyvelResult<String> {
        Template::new(content).render(provider, &self.config)
    }
}

impl TemplateEngine for Engine {
    /// Adds a new template to the engine with the given name and content.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the template was successfully added
    /// * `Err(TinyvelError::TemplateExists)` if a template with the given name already exists
    fn add_template<'a, N: AsRef<str>, C: Into<Cow<'a, str>>>(
        &mut self,
        name: N,
        content: C,
    ) -> TinyvelResult<()> {
        let name = name.as_ref();

        if self.templates.contains_key(name) {
            return Err(TinyvelError::TemplateExists {
                template_name: name.to_string(),
            });
        }

        let mut template = Template::new(content);
        template.name = Some(name.to_string());
        tracing::debug!(
            template = name,
            lines = template.line_count(),
            "template added"
        );

        self.templates.insert(name.to_string(), template);

        Ok(())
    }

    /// Renders the template with the given name using the provided values.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` containing the rendered template content
    /// * `Err(TinyvelError::MissingTemplate)` if no template with the given name exists
    /// * Other errors may be returned from the rendering process (open blocks,
    ///   malformed headers, non-iterable loop targets)
    fn render<N: AsRef<str>, P: ValuesProvider>(
        &self,
        template_name: N,
        provider: &P,
    ) -> TinyvelResult<String> {
        let name = template_name.as_ref();
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| TinyvelError::MissingTemplate {
                template_name: name.to_string(),
            })?;

        template.render(provider, &self.config)
    }

    fn variables<N: AsRef<str>>(&self, template_name: N) -> Vec<&str> {
        self.templates
            .get(template_name.as_ref())
            .map(Template::variables)
            .unwrap_or_default()
    }
}
