use std::borrow::Cow;

use crate::value::Value;

/// `ValuesProvider` maps property names to values on behalf of the
/// interpreter. The interpreter never looks inside a container itself, so a
/// provider is free to back its data with maps, structs or anything else.
///
/// A provider must be side-effect free for the duration of a render: the same
/// path may be resolved more than once.
pub trait ValuesProvider {
    /// Returns property `name` of `container`, or the root-level property
    /// `name` when `container` is `None`.
    ///
    /// Returning `None` (or [`Value::Null`]) tells the interpreter that the
    /// property does not exist. This is never an error: missing values are
    /// left unsubstituted and evaluate to false.
    fn property(&self, container: Option<&Value>, name: &str) -> Option<Value>;

    /// Renders a value for interpolation. An absent value renders as `null`.
    fn display(&self, value: Option<&Value>) -> String {
        value.map_or_else(|| "null".to_string(), ToString::to_string)
    }
}

impl<F> ValuesProvider for F
where
    F: Fn(Option<&Value>, &str) -> Option<Value>,
{
    fn property(&self, container: Option<&Value>, name: &str) -> Option<Value> {
        self(container, name)
    }
}

/// `TemplateEngine` is the registry surface of the engine: templates are
/// added once under a name and rendered any number of times against
/// different providers.
pub trait TemplateEngine {
    /// `add_template` tries to make a new template available in the engine.
    ///
    /// # Errors
    /// - If the template name is a duplicate.
    fn add_template<'a, N: AsRef<str>, C: Into<Cow<'a, str>>>(
        &mut self,
        name: N,
        content: C,
    ) -> crate::TinyvelResult<()>;

    /// `render` renders a named template against `provider`.
    ///
    /// # Errors
    /// - If the template name is not found.
    /// - If a block is left open, a `#foreach` header is malformed or its
    ///   target is not iterable.
    fn render<N: AsRef<str>, P: ValuesProvider>(
        &self,
        template_name: N,
        provider: &P,
    ) -> crate::TinyvelResult<String>;

    /// `variables` lists every dotted path a template reads from its provider,
    /// without duplicates. Returns an empty list for unknown templates.
    fn variables<N: AsRef<str>>(&self, template_name: N) -> Vec<&str>;
}
