use crate::value::ValueKind;

pub type TinyvelResult<T> = std::result::Result<T, TinyvelError>;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    UnexpectedEof {
        /// The terminator directives that were still open, e.g. "#else, #end"
        expected: String,
    },
    MalformedForeach {
        header: String,
    },
    MalformedCondition {
        header: String,
    },
    StrayDirective {
        token: String,
    },
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedEof { expected } => {
                write!(f, "expected token(s): {} but found EOF", expected)
            }
            Self::MalformedForeach { header } => {
                write!(
                    f,
                    "foreach syntax is wrong, expected '#foreach ($var in $items)': {}",
                    header
                )
            }
            Self::MalformedCondition { header } => {
                write!(f, "if syntax is wrong, expected '#if ($condition)': {}", header)
            }
            Self::StrayDirective { token } => {
                write!(f, "'{}' does not close any open block", token)
            }
        }
    }
}

impl std::error::Error for ParseErrorKind {}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParseError {
    /// 1-indexed template line the error was raised on.
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error at line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TinyvelError {
    TemplateExists {
        template_name: String,
    },
    MissingTemplate {
        template_name: String,
    },
    /// The target of a `#foreach` is neither a list nor a primitive array.
    NotIterable {
        /// 1-indexed line of the `#foreach` header.
        line: usize,
        path: String,
        /// `None` when the path did not resolve at all.
        found: Option<ValueKind>,
    },
    Serialization {
        message: String,
    },
    Parse(ParseError),
}

impl std::fmt::Display for TinyvelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TemplateExists { template_name } => {
                write!(f, "Template already exists: {}", template_name)
            }
            Self::MissingTemplate { template_name } => {
                write!(f, "Template not found: {}", template_name)
            }
            Self::NotIterable { line, path, found } => match found {
                Some(kind) => write!(
                    f,
                    "The container '{}' at line {} is not a collection or an array (found {})",
                    path, line, kind
                ),
                None => write!(
                    f,
                    "The container '{}' at line {} is not a collection or an array (not found)",
                    path, line
                ),
            },
            Self::Serialization { message } => {
                write!(f, "Serialization error: {}", message)
            }
            Self::Parse(parse_error) => {
                write!(f, "{}", parse_error)
            }
        }
    }
}

impl std::error::Error for TinyvelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(parse_error) => Some(parse_error),
            Self::TemplateExists { .. }
            | Self::MissingTemplate { .. }
            | Self::NotIterable { .. }
            | Self::Serialization { .. } => None,
        }
    }
}

impl From<ParseError> for TinyvelError {
    fn from(error: ParseError) -> Self {
        Self::Parse(error)
    }
}
