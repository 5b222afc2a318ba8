use crate::directive::{ForeachHeader, Token, describe, parse_condition};
use crate::engine::{EngineConfig, StrayDirectives};
use crate::error::{ParseError, ParseErrorKind, TinyvelError, TinyvelResult};
use crate::format::format_line;
use crate::interface::ValuesProvider;
use crate::scope::ScopeStack;
use crate::template::Line;
use crate::value::Value;

/// Nested blocks run until they meet one of their terminators, however far
/// away it is.
const UNBOUNDED: usize = usize::MAX;

/// The shared read position. Nested blocks advance the same cursor, so when
/// a block returns its caller resumes exactly where the block stopped.
#[derive(Debug, Default)]
pub(crate) struct Cursor {
    pos: usize,
}

impl Cursor {
    fn advance(&mut self) {
        self.pos = self.pos.saturating_add(1);
    }

    /// 1-indexed line number, for error reporting.
    const fn line(&self) -> usize {
        self.pos.saturating_add(1)
    }
}

/// Walks the lines of a template once, interpreting directives and
/// formatting everything else. One interpreter is built per render.
pub(crate) struct Interpreter<'t, 'p> {
    lines: &'t [Line],
    config: &'t EngineConfig,
    scopes: ScopeStack<'p>,
    output: String,
}

impl<'t, 'p> Interpreter<'t, 'p> {
    pub(crate) fn new(
        lines: &'t [Line],
        provider: &'p dyn ValuesProvider,
        config: &'t EngineConfig,
    ) -> Self {
        Self {
            lines,
            config,
            scopes: ScopeStack::new(provider),
            output: String::new(),
        }
    }

    pub(crate) fn run(mut self) -> TinyvelResult<String> {
        let mut cursor = Cursor::default();
        let until = self.lines.len();
        self.parse_block(&mut cursor, until, &[])?;
        Ok(self.output)
    }

    /// Interprets lines from the cursor until `until` is reached or a line
    /// holding one of `terminators` is found. The terminator line itself is
    /// left for the caller. Returns the number of lines visited.
    fn parse_block(
        &mut self,
        cursor: &mut Cursor,
        until: usize,
        terminators: &[Token],
    ) -> TinyvelResult<usize> {
        self.scopes.push();
        let result = self.parse_block_inner(cursor, until, terminators);
        self.scopes.pop();
        result
    }

    fn parse_block_inner(
        &mut self,
        cursor: &mut Cursor,
        until: usize,
        terminators: &[Token],
    ) -> TinyvelResult<usize> {
        let lines = self.lines;
        let mut visited = 0_usize;

        while cursor.pos < until {
            let Some(line) = lines.get(cursor.pos) else {
                return Err(self.unexpected_eof(terminators));
            };
            visited = visited.saturating_add(1);

            match line.token {
                None => {
                    self.emit(&line.text);
                    cursor.advance();
                }
                Some(token) if terminators.contains(&token) => return Ok(visited),
                Some(Token::If) => self.parse_if(cursor, &line.text)?,
                Some(Token::Foreach) => self.parse_foreach(cursor, &line.text)?,
                Some(token @ (Token::Else | Token::End)) => self.stray(cursor, token)?,
            }
        }

        Ok(visited)
    }

    fn parse_if(&mut self, cursor: &mut Cursor, header: &str) -> TinyvelResult<()> {
        let path = parse_condition(header).map_err(|kind| error_at(cursor, kind))?;
        let condition = self.scopes.lookup(path).is_some_and(|v| v.is_true());
        tracing::trace!(line = cursor.line(), path, condition, "#if");
        cursor.advance();

        if condition {
            self.parse_block(cursor, UNBOUNDED, &[Token::Else, Token::End])?;
            if self.token_at(cursor) == Some(Token::Else) {
                self.skip_to(cursor, &[Token::End])?;
            }
        } else {
            self.skip_to(cursor, &[Token::Else, Token::End])?;
            if self.token_at(cursor) == Some(Token::Else) {
                cursor.advance();
                self.parse_block(cursor, UNBOUNDED, &[Token::End])?;
            }
        }

        // Step over the closing #end.
        cursor.advance();
        Ok(())
    }

    fn parse_foreach(&mut self, cursor: &mut Cursor, header: &str) -> TinyvelResult<()> {
        let header = ForeachHeader::parse(header).map_err(|kind| error_at(cursor, kind))?;
        let container = self.scopes.lookup(header.container);
        let items = container
            .as_ref()
            .and_then(Value::iterate)
            .ok_or_else(|| TinyvelError::NotIterable {
                line: cursor.line(),
                path: header.container.to_string(),
                found: container.as_ref().map(Value::kind),
            })?;
        tracing::trace!(
            line = cursor.line(),
            variable = header.variable,
            container = header.container,
            len = items.len(),
            "#foreach"
        );
        cursor.advance();

        self.scopes.push();
        let result = self.iterate(cursor, header.variable, items);
        self.scopes.pop();
        result?;

        // Step over the closing #end.
        cursor.advance();
        Ok(())
    }

    /// Runs the loop body once per item, leaving the cursor on the `#end`.
    /// The loop scope is reused: each item overwrites the previous binding.
    fn iterate(
        &mut self,
        cursor: &mut Cursor,
        variable: &str,
        items: Vec<Value>,
    ) -> TinyvelResult<()> {
        if items.is_empty() {
            return self.skip_to(cursor, &[Token::End]);
        }

        let body = cursor.pos;
        for item in items {
            let item = if item.is_null() {
                Value::from("null")
            } else {
                item
            };
            self.scopes.bind(variable, item);
            cursor.pos = body;
            self.parse_block(cursor, UNBOUNDED, &[Token::End])?;
        }
        Ok(())
    }

    /// Moves the cursor forward, without rendering, to the first of
    /// `terminators` that belongs to the current nesting level.
    fn skip_to(&self, cursor: &mut Cursor, terminators: &[Token]) -> TinyvelResult<()> {
        let mut depth = 0_usize;
        loop {
            let Some(line) = self.lines.get(cursor.pos) else {
                return Err(self.unexpected_eof(terminators));
            };
            match line.token {
                Some(token) if depth == 0 && terminators.contains(&token) => return Ok(()),
                Some(token) if token.opens_block() => depth = depth.saturating_add(1),
                Some(Token::End) => depth = depth.saturating_sub(1),
                Some(Token::If | Token::Else | Token::Foreach) | None => {}
            }
            cursor.advance();
        }
    }

    /// An `#else` or `#end` that no enclosing block asked for.
    fn stray(&self, cursor: &mut Cursor, token: Token) -> TinyvelResult<()> {
        match self.config.stray_directives {
            StrayDirectives::Skip => {
                tracing::warn!(line = cursor.line(), token = %token, "skipping stray directive");
                cursor.advance();
                Ok(())
            }
            StrayDirectives::Reject => Err(error_at(
                cursor,
                ParseErrorKind::StrayDirective {
                    token: token.keyword().to_string(),
                },
            )),
        }
    }

    fn token_at(&self, cursor: &Cursor) -> Option<Token> {
        self.lines.get(cursor.pos).and_then(|line| line.token)
    }

    fn emit(&mut self, text: &str) {
        let rendered = format_line(text, &self.scopes);
        self.output.push_str(&rendered);
        self.output.push_str(&self.config.line_separator);
    }

    fn unexpected_eof(&self, terminators: &[Token]) -> TinyvelError {
        TinyvelError::Parse(ParseError {
            line: self.lines.len(),
            kind: ParseErrorKind::UnexpectedEof {
                expected: describe(terminators),
            },
        })
    }
}

fn error_at(cursor: &Cursor, kind: ParseErrorKind) -> TinyvelError {
    TinyvelError::Parse(ParseError {
        line: cursor.line(),
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Template;
    use crate::MapProvider;

    fn run(template: &str, provider: &MapProvider) -> TinyvelResult<String> {
        let template = Template::new(template);
        Interpreter::new(template.lines(), provider, &EngineConfig::default()).run()
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_literal_lines_are_crlf_terminated() {
        let provider = MapProvider::new();
        assert_eq!(run("a\nb\r\nc", &provider).unwrap(), "a\r\nb\r\nc\r\n");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_skip_to_honors_nesting() {
        let provider = MapProvider::new().with("flag", false).with("inner", true);
        let template = "#if ($flag)\n#if ($inner)\nA\n#else\nB\n#end\n#else\nC\n#end";
        assert_eq!(run(template, &provider).unwrap(), "C\r\n");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_true_branch_skips_nested_else() {
        let provider = MapProvider::new()
            .with("flag", true)
            .with("items", vec![1_i32]);
        let template = "#if ($flag)\nA\n#else\n#foreach ($i in $items)\nB\n#end\n#end\nZ";
        assert_eq!(run(template, &provider).unwrap(), "A\r\nZ\r\n");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_scopes_unwind_after_loop() {
        let provider = MapProvider::new()
            .with("items", vec!["x", "y"])
            .with("item", "outer");
        let template = "#foreach ($item in $items)\n${item}\n#end\n${item}";
        assert_eq!(run(template, &provider).unwrap(), "x\r\ny\r\nouter\r\n");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_null_items_render_as_null() {
        let provider = MapProvider::new().with("items", vec![Value::Null, Value::Int(2)]);
        let template = "#foreach ($v in $items)\n[${v}]\n#end";
        assert_eq!(run(template, &provider).unwrap(), "[null]\r\n[2]\r\n");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_unterminated_if_reports_terminators() {
        let provider = MapProvider::new().with("flag", true);
        let err = run("#if ($flag)\nA", &provider).unwrap_err();
        assert_eq!(
            err,
            TinyvelError::Parse(ParseError {
                line: 2,
                kind: ParseErrorKind::UnexpectedEof {
                    expected: "#else, #end".to_string(),
                },
            })
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_unterminated_false_if_reports_terminators() {
        let provider = MapProvider::new();
        let err = run("#if ($flag)\nA", &provider).unwrap_err();
        assert!(matches!(
            err,
            TinyvelError::Parse(ParseError {
                kind: ParseErrorKind::UnexpectedEof { ref expected },
                ..
            }) if expected == "#else, #end"
        ));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_stray_directives_are_skipped() {
        let provider = MapProvider::new();
        assert_eq!(run("A\n#end\n#else\nB", &provider).unwrap(), "A\r\nB\r\n");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_stray_directives_can_be_rejected() {
        let provider = MapProvider::new();
        let template = Template::new("A\n#end");
        let config = EngineConfig::default().with_stray_directives(StrayDirectives::Reject);
        let err = Interpreter::new(template.lines(), &provider, &config)
            .run()
            .unwrap_err();
        assert_eq!(
            err,
            TinyvelError::Parse(ParseError {
                line: 2,
                kind: ParseErrorKind::StrayDirective {
                    token: "#end".to_string(),
                },
            })
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_block_count_and_cursor_position() {
        let provider = MapProvider::new();
        let template = Template::new("a\nb\n#end\nc");
        let config = EngineConfig::default();
        let mut interpreter = Interpreter::new(template.lines(), &provider, &config);
        let mut cursor = Cursor::default();
        let visited = interpreter
            .parse_block(&mut cursor, UNBOUNDED, &[Token::End])
            .unwrap();
        assert_eq!(visited, 3);
        assert_eq!(cursor.pos, 2);
        assert_eq!(interpreter.scopes.depth(), 1);
        assert_eq!(interpreter.output, "a\r\nb\r\n");
    }
}
