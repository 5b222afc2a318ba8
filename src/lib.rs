//! A tiny, line-oriented templating engine.
//!
//! Templates are plain text with `${path}` interpolations and a handful of
//! directive lines:
//!
//! ```text
//! #if ($user.active)
//! Welcome back, ${user.name}!
//! #foreach ($item in $user.items)
//!   - ${item}
//! #end
//! #else
//! Please sign in.
//! #end
//! ```
//!
//! Values are looked up through a [`ValuesProvider`], so the data can live in
//! maps, serialized structs or anything else that can answer "what is
//! property `name` of this value".

mod directive;
mod engine;
mod error;
mod format;
mod interface;
mod interpreter;
mod providers;
mod scope;
mod template;
mod value;

// Public exports.
pub use engine::{Engine, EngineConfig, StrayDirectives};
pub use error::{ParseError, ParseErrorKind, TinyvelError, TinyvelResult};
pub use interface::{TemplateEngine, ValuesProvider};
pub use providers::MapProvider;
pub use template::Template;
pub use value::{PrimitiveArray, Value, ValueKind};

/// Renders `template` against `provider` with the default configuration.
///
/// Every output line, including the last, ends with `\r\n`.
///
/// ```
/// use tinyvel::{MapProvider, render};
///
/// let provider = MapProvider::new().with("items", vec![1_i32, 2, 3]);
/// let output = render("#foreach ($i in $items)\n${i}\n#end", &provider).unwrap();
/// assert_eq!(output, "1\r\n2\r\n3\r\n");
/// ```
///
/// # Errors
/// - If an `#if` or `#foreach` block is never closed.
/// - If a `#foreach` header is malformed or its target is not iterable.
pub fn render<P: ValuesProvider>(template: &str, provider: &P) -> TinyvelResult<String> {
    Template::new(template).render(provider, &EngineConfig::default())
}
