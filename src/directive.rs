use std::fmt;

use crate::error::ParseErrorKind;

/// The control directives a line can start with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Token {
    If,
    Else,
    Foreach,
    End,
}

impl Token {
    const ALL: [Self; 4] = [Self::If, Self::Else, Self::Foreach, Self::End];

    pub(crate) const fn keyword(self) -> &'static str {
        match self {
            Self::If => "#if",
            Self::Else => "#else",
            Self::Foreach => "#foreach",
            Self::End => "#end",
        }
    }

    /// Classifies a template line. Recognition is prefix based on the
    /// trimmed line, so `#endif` is an `#end` and `#iffy` is an `#if`.
    /// Anything else, including unknown `#` lines, is literal text.
    pub(crate) fn classify(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if !trimmed.starts_with('#') {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|token| trimmed.starts_with(token.keyword()))
    }

    /// `#if` and `#foreach` open a block that a later `#end` closes.
    pub(crate) const fn opens_block(self) -> bool {
        matches!(self, Self::If | Self::Foreach)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Formats a terminator set for error messages, e.g. `#else, #end`.
pub(crate) fn describe(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.keyword())
        .collect::<Vec<_>>()
        .join(", ")
}

fn strip_dollar(name: &str) -> &str {
    name.strip_prefix('$').unwrap_or(name)
}

/// Extracts the variable path from `#if ($path)`: everything between the
/// first `(` and the last `)`, trimmed, with a leading `$` removed.
pub(crate) fn parse_condition(line: &str) -> Result<&str, ParseErrorKind> {
    let malformed = || ParseErrorKind::MalformedCondition {
        header: line.trim().to_string(),
    };
    let open = line.find('(').ok_or_else(malformed)?;
    let close = line.rfind(')').ok_or_else(malformed)?;
    let inner = line
        .get(open.saturating_add(1)..close)
        .ok_or_else(malformed)?
        .trim();
    Ok(strip_dollar(inner))
}

/// The pieces of a `#foreach ($var in $items)` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ForeachHeader<'a> {
    pub(crate) variable: &'a str,
    pub(crate) container: &'a str,
}

impl<'a> ForeachHeader<'a> {
    /// Parses the whitespace separated tokens between the parentheses.
    /// Anything after the container path is ignored.
    pub(crate) fn parse(line: &'a str) -> Result<Self, ParseErrorKind> {
        let malformed = || ParseErrorKind::MalformedForeach {
            header: line.trim().to_string(),
        };
        let open = line.find('(').ok_or_else(malformed)?;
        let rest = line.get(open.saturating_add(1)..).ok_or_else(malformed)?;
        let close = rest.find(')').ok_or_else(malformed)?;
        let inner = rest.get(..close).ok_or_else(malformed)?;

        let mut tokens = inner.split_whitespace();
        match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(variable), Some("in"), Some(container)) => Ok(Self {
                variable: strip_dollar(variable),
                container: strip_dollar(container),
            }),
            _ => Err(malformed()),
        }
    }
}
