use std::borrow::Cow;

use crate::directive::{ForeachHeader, Token, parse_condition};
use crate::engine::EngineConfig;
use crate::error::TinyvelResult;
use crate::format::scan_variables;
use crate::interface::ValuesProvider;
use crate::interpreter::Interpreter;

/// One template line with its directive, if any, classified up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line {
    pub(crate) text: String,
    pub(crate) token: Option<Token>,
}

impl Line {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            token: Token::classify(text),
        }
    }
}

/// A Template is a template source split into lines, ready to be rendered
/// any number of times against different providers.
///
/// Both `\n` and `\r\n` separate lines. Rendered lines always end with the
/// configured separator, `\r\n` by default.
///
/// # Example
///
/// ```rust
/// use tinyvel::{EngineConfig, MapProvider, Template};
///
/// let template = Template::new("Hello, ${name}!");
/// let provider = MapProvider::new().with("name", "World");
///
/// let result = template.render(&provider, &EngineConfig::default()).unwrap();
/// assert_eq!(result, "Hello, World!\r\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    content: String,
    lines: Vec<Line>,
    pub(crate) name: Option<String>,
}

#[cfg(feature = "serde")]
impl serde::Serialize for Template {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Template", 2)?;
        state.serialize_field("content", &self.content)?;
        state.serialize_field("name", &self.name)?;
        state.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Template {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct TemplateHelper {
            content: String,
            #[serde(default)]
            name: Option<String>,
        }

        // Only the source is stored; the lines are rebuilt from it.
        let helper = TemplateHelper::deserialize(deserializer)?;
        let mut template = Template::new(helper.content);
        template.name = helper.name;
        Ok(template)
    }
}

impl Template {
    /// Splits `content` into classified lines. A trailing line break does not
    /// produce an extra empty line.
    pub fn new<'c, T: Into<Cow<'c, str>>>(content: T) -> Self {
        let content = content.into().into_owned();
        let lines = content.lines().map(Line::new).collect();
        Self {
            content,
            lines,
            name: None,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub(crate) fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Renders the template, resolving variables through `provider`.
    ///
    /// # Errors
    /// - [`ParseErrorKind::UnexpectedEof`](crate::ParseErrorKind) if an `#if`
    ///   or `#foreach` is never closed.
    /// - [`ParseErrorKind::MalformedForeach`](crate::ParseErrorKind) or
    ///   [`ParseErrorKind::MalformedCondition`](crate::ParseErrorKind) for a
    ///   directive header that cannot be read.
    /// - [`TinyvelError::NotIterable`](crate::TinyvelError) if a `#foreach`
    ///   target is neither a list nor an array.
    pub fn render<P: ValuesProvider>(
        &self,
        provider: &P,
        config: &EngineConfig,
    ) -> TinyvelResult<String> {
        tracing::debug!(
            template = self.name.as_deref().unwrap_or("<inline>"),
            lines = self.lines.len(),
            "rendering template"
        );
        let output = Interpreter::new(self.lines(), provider, config).run()?;
        tracing::debug!(bytes = output.len(), "rendered template");
        Ok(output)
    }

    /// Lists the dotted paths this template reads from its provider, line by
    /// line: `${...}` references (sorted within a line), `#if` conditions and
    /// `#foreach` targets.
    ///
    /// References rooted at an enclosing loop variable are skipped, since the
    /// loop provides them. Malformed directives contribute nothing.
    ///
    /// ```
    /// use tinyvel::Template;
    ///
    /// let template = Template::new("#foreach ($i in $items)\n${i} ${sep}\n#end");
    /// assert_eq!(template.variables(), vec!["items", "sep"]);
    /// ```
    pub fn variables(&self) -> Vec<&str> {
        let mut variables: Vec<&str> = Vec::new();
        // One entry per open block; `Some` for loops, naming their variable.
        let mut blocks: Vec<Option<&str>> = Vec::new();

        for line in &self.lines {
            match line.token {
                None => {
                    for name in scan_variables(&line.text) {
                        record(name, &blocks, &mut variables);
                    }
                }
                Some(Token::If) => {
                    if let Ok(path) = parse_condition(&line.text) {
                        record(path, &blocks, &mut variables);
                    }
                    blocks.push(None);
                }
                Some(Token::Foreach) => match ForeachHeader::parse(&line.text) {
                    Ok(header) => {
                        record(header.container, &blocks, &mut variables);
                        blocks.push(Some(header.variable));
                    }
                    Err(_) => blocks.push(None),
                },
                Some(Token::End) => {
                    blocks.pop();
                }
                Some(Token::Else) => {}
            }
        }

        variables
    }
}

/// Records `name` once, unless its head is bound by an enclosing loop.
fn record<'a>(name: &'a str, blocks: &[Option<&str>], out: &mut Vec<&'a str>) {
    let head = name.split('.').next().unwrap_or(name);
    let bound = blocks.iter().flatten().any(|variable| *variable == head);
    if !bound && !out.contains(&name) {
        out.push(name);
    }
}
