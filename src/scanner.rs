//! Tag-body state machine.
//!
//! Finds the true end of a `{{ ... }}` tag and the top-level `|>`
//! separators inside it. Braces, brackets and parentheses nest; quotes,
//! template literals and comments hide everything up to their close,
//! so a `}}` inside any of them never ends the tag.

use crate::lexer::{ScanError, ScanErrorKind};

/// Operator separating pipeline stages inside a tag.
pub const FILTER_OPERATOR: &str = "|>";

/// Opening tag delimiter.
pub const TAG_OPEN: &str = "{{";

/// Closing tag delimiter.
pub const TAG_CLOSE: &str = "}}";

/// Split a complete tag (`{{ ... }}`, delimiters included) at its
/// top-level pipeline separators.
///
/// The first boundary sits just past `{{`, each following one just
/// past a `|>`, and the last one just past the closing `}}`. The
/// primary expression is `tag_text[b[0]..b[1]]` and every later slice
/// is one filter stage, each still ending with its separator or closer.
/// Trailing text after the closing `}}` is ignored.
///
/// # Errors
///
/// Returns `ScanError` when the closing `}}` is never reached at
/// nesting level zero. Positions in the error are relative to
/// `tag_text`.
pub fn split_pipeline(tag_text: &str) -> Result<Vec<usize>, ScanError> {
    TagScanner::new(tag_text).scan()
}

/// Lexical context of the scanner. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    SingleQuote,
    DoubleQuote,
    Template,
    LineComment,
    BlockComment,
}

/// Open nesting construct, innermost last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nest {
    Brace,
    Bracket,
    Paren,
    /// `${` inside a template literal that opened at the given offset.
    Interpolation(usize),
}

pub(crate) struct TagScanner<'a> {
    input: &'a [u8],
    pos: usize,
    mode: Mode,
    /// Offset where the current quote or template literal opened.
    quote_start: usize,
    stack: Vec<Nest>,
    boundaries: Vec<usize>,
}

impl<'a> TagScanner<'a> {
    pub(crate) fn new(tag_text: &'a str) -> Self {
        let input = tag_text.as_bytes();
        let start = if input.starts_with(TAG_OPEN.as_bytes()) {
            TAG_OPEN.len()
        } else {
            0
        };
        Self {
            input,
            pos: start,
            mode: Mode::Code,
            quote_start: 0,
            stack: Vec::new(),
            boundaries: vec![start],
        }
    }

    pub(crate) fn scan(mut self) -> Result<Vec<usize>, ScanError> {
        while let Some(b) = self.bump() {
            match self.mode {
                Mode::Code => {
                    if self.code(b) {
                        return Ok(self.boundaries);
                    }
                }
                Mode::SingleQuote => self.quoted(b, b'\''),
                Mode::DoubleQuote => self.quoted(b, b'"'),
                Mode::Template => self.template(b),
                Mode::LineComment => {
                    if b == b'\n' {
                        self.mode = Mode::Code;
                    }
                }
                Mode::BlockComment => {
                    if b == b'*' && self.peek() == Some(b'/') {
                        self.pos += 1;
                        self.mode = Mode::Code;
                    }
                }
            }
        }

        Err(self.unterminated())
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn enter_quote(&mut self, mode: Mode) {
        self.quote_start = self.pos - 1;
        self.mode = mode;
    }

    /// Handles one byte of expression code. Returns `true` once the
    /// closing `}}` has been consumed.
    fn code(&mut self, b: u8) -> bool {
        match b {
            b'{' => self.stack.push(Nest::Brace),
            b'[' => self.stack.push(Nest::Bracket),
            b'(' => self.stack.push(Nest::Paren),
            b']' => self.pop_if(Nest::Bracket),
            b')' => self.pop_if(Nest::Paren),
            b'}' => match self.stack.last().copied() {
                Some(Nest::Brace) => {
                    self.stack.pop();
                }
                Some(Nest::Interpolation(start)) => {
                    self.stack.pop();
                    self.quote_start = start;
                    self.mode = Mode::Template;
                }
                None if self.peek() == Some(b'}') => {
                    self.pos += 1;
                    self.boundaries.push(self.pos);
                    return true;
                }
                // mismatched or stray closer
                _ => {}
            },
            b'\'' => self.enter_quote(Mode::SingleQuote),
            b'"' => self.enter_quote(Mode::DoubleQuote),
            b'`' => self.enter_quote(Mode::Template),
            b'/' => match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    self.mode = Mode::BlockComment;
                }
                Some(b'/') => {
                    self.pos += 1;
                    self.mode = Mode::LineComment;
                }
                _ => {}
            },
            b'|' if self.stack.is_empty() && self.peek() == Some(b'>') => {
                self.pos += 1;
                self.boundaries.push(self.pos);
            }
            _ => {}
        }
        false
    }

    fn pop_if(&mut self, expected: Nest) {
        if self.stack.last() == Some(&expected) {
            self.stack.pop();
        }
    }

    fn quoted(&mut self, b: u8, quote: u8) {
        if b == b'\\' {
            self.pos += 1;
        } else if b == quote {
            self.mode = Mode::Code;
        }
    }

    fn template(&mut self, b: u8) {
        match b {
            b'\\' => self.pos += 1,
            b'`' => self.mode = Mode::Code,
            b'$' if self.peek() == Some(b'{') => {
                self.pos += 1;
                self.stack.push(Nest::Interpolation(self.quote_start));
                self.mode = Mode::Code;
            }
            _ => {}
        }
    }

    /// Error for input that ended before the tag closed.
    fn unterminated(&self) -> ScanError {
        let quote = match self.mode {
            Mode::SingleQuote => Some(('\'', self.quote_start)),
            Mode::DoubleQuote => Some(('"', self.quote_start)),
            Mode::Template => Some(('`', self.quote_start)),
            Mode::Code | Mode::LineComment | Mode::BlockComment => {
                self.stack.iter().find_map(|nest| match nest {
                    Nest::Interpolation(start) => Some(('`', *start)),
                    _ => None,
                })
            }
        };

        match quote {
            Some((quote, position)) => ScanError {
                kind: ScanErrorKind::UnterminatedQuote { quote },
                position,
            },
            None => ScanError {
                kind: ScanErrorKind::UnterminatedTag,
                position: 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stages(tag: &str) -> Vec<&str> {
        let b = split_pipeline(tag).expect("should scan");
        b.windows(2).map(|w| &tag[w[0]..w[1]]).collect()
    }

    #[test]
    fn pipeline_boundaries() {
        let code = "{{ tag |> filter1 |> filter2 }}";
        assert_eq!(split_pipeline(code).unwrap(), vec![2, 9, 20, 31]);
        assert_eq!(stages(code), vec![" tag |>", " filter1 |>", " filter2 }}"]);
    }

    #[test]
    fn no_filters() {
        assert_eq!(split_pipeline("{{ x }}").unwrap(), vec![2, 7]);
    }

    #[test]
    fn empty_tag() {
        assert_eq!(split_pipeline("{{}}").unwrap(), vec![2, 4]);
    }

    #[test]
    fn stops_at_first_close() {
        assert_eq!(split_pipeline("{{ a }} tail }}").unwrap(), vec![2, 7]);
    }

    #[test]
    fn separator_inside_string_is_ignored() {
        assert_eq!(stages("{{ \"a |> b\" |> f }}"), vec![" \"a |> b\" |>", " f }}"]);
    }

    #[test]
    fn separator_inside_call_is_ignored() {
        assert_eq!(stages("{{ f(a |> b) |> g }}"), vec![" f(a |> b) |>", " g }}"]);
    }

    #[test]
    fn nested_object_braces() {
        let code = "{{ fn({a: {}}) }}";
        assert_eq!(split_pipeline(code).unwrap(), vec![2, code.len()]);
    }

    #[test]
    fn escaped_quote() {
        let code = r#"{{ "a \" }}" }}"#;
        assert_eq!(split_pipeline(code).unwrap(), vec![2, code.len()]);
    }

    #[test]
    fn template_interpolation() {
        let code = "{{ `a ${ {b: `}}`} } }}` }}";
        assert_eq!(split_pipeline(code).unwrap(), vec![2, code.len()]);
    }

    #[test]
    fn block_comment_hides_close() {
        let code = "{{ a /* }} |> */ }}";
        assert_eq!(split_pipeline(code).unwrap(), vec![2, code.len()]);
    }

    #[test]
    fn line_comment_ends_at_newline() {
        let code = "{{ a // }}\n}}";
        assert_eq!(split_pipeline(code).unwrap(), vec![2, code.len()]);
    }

    #[test]
    fn unterminated_tag() {
        let err = split_pipeline("{{ a ").unwrap_err();
        assert_eq!(err.kind, ScanErrorKind::UnterminatedTag);
        assert_eq!(err.position, 0);
    }

    #[test]
    fn unclosed_bracket_is_unterminated_tag() {
        let err = split_pipeline("{{ a[ }}").unwrap_err();
        assert_eq!(err.kind, ScanErrorKind::UnterminatedTag);
    }

    #[test]
    fn unterminated_quote_points_at_quote() {
        let err = split_pipeline("{{ x + 'abc }}").unwrap_err();
        assert_eq!(err.kind, ScanErrorKind::UnterminatedQuote { quote: '\'' });
        assert_eq!(err.position, 7);
    }

    #[test]
    fn unterminated_template_inside_interpolation() {
        let err = split_pipeline("{{ `a ${ b }}").unwrap_err();
        assert_eq!(err.kind, ScanErrorKind::UnterminatedQuote { quote: '`' });
        assert_eq!(err.position, 3);
    }
}
