use std::fmt;

use tracing::{debug, trace};

use crate::error::TemplateError;
use crate::scanner::{FILTER_OPERATOR, TAG_CLOSE, TAG_OPEN, TagScanner};
use crate::token::{Token, TrimConfig, TrimMode};

const COMMENT_OPEN: &str = "{{#";
const COMMENT_CLOSE: &str = "#}}";

/// Classifies a scanner error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanErrorKind {
    /// `{{` never reached a `}}` at nesting level zero.
    UnterminatedTag,
    /// `{{#` never reached a `#}}`.
    UnterminatedComment,
    /// A quote or template literal inside a tag was never closed.
    UnterminatedQuote { quote: char },
}

impl ScanErrorKind {
    /// Short name used when the error is reported as a cause.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::UnterminatedTag => "UnterminatedTag",
            Self::UnterminatedComment => "UnterminatedComment",
            Self::UnterminatedQuote { .. } => "UnterminatedQuote",
        }
    }
}

impl fmt::Display for ScanErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedTag => write!(f, "unclosed tag"),
            Self::UnterminatedComment => write!(f, "unclosed comment"),
            Self::UnterminatedQuote { quote } => {
                write!(f, "unclosed {quote} literal inside tag")
            }
        }
    }
}

/// Error produced while tokenizing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at offset {position}")]
pub struct ScanError {
    pub kind: ScanErrorKind,
    /// Byte offset of the opening marker or quote.
    pub position: usize,
}

impl ScanError {
    /// Anchor this error to the template it came from.
    #[must_use]
    pub fn into_template_error(self, path: &str, source: &str) -> TemplateError {
        TemplateError::new(path, source, self.position, Some(self.into()))
    }

    const fn shifted(mut self, by: usize) -> Self {
        self.position += by;
        self
    }
}

/// Tokenize template source with no automatic trimming.
///
/// # Errors
///
/// Returns `ScanError` on an unclosed tag, comment, or quote.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ScanError> {
    tokenize_with(source, TrimConfig::default())
}

/// Tokenize template source with the given trim configuration.
///
/// # Errors
///
/// Returns `ScanError` on an unclosed tag, comment, or quote.
pub fn tokenize_with(source: &str, config: TrimConfig) -> Result<Vec<Token>, ScanError> {
    debug!(len = source.len(), ?config, "tokenizing template");
    let result = Lexer::new(source, config).tokenize();
    match &result {
        Ok(tokens) => debug!(count = tokens.len(), "tokenized template"),
        Err(err) => debug!(%err, "tokenizing failed"),
    }
    result
}

/// Trim markers found just inside a pair of delimiters.
#[derive(Debug, Clone, Copy, Default)]
struct Markers {
    left: Option<u8>,
    right: Option<u8>,
}

impl Markers {
    fn len_left(self) -> usize {
        usize::from(self.left.is_some())
    }

    fn len_right(self) -> usize {
        usize::from(self.right.is_some())
    }

    const fn trims_left(self, mode: TrimMode) -> bool {
        effective(self.left, mode)
    }

    const fn trims_right(self, mode: TrimMode) -> bool {
        effective(self.right, mode)
    }
}

/// `-` forces a trim, `+` forbids it, otherwise the mode decides.
const fn effective(marker: Option<u8>, mode: TrimMode) -> bool {
    match marker {
        Some(b'-') => true,
        Some(b'+') => false,
        _ => matches!(mode, TrimMode::Auto),
    }
}

const fn is_marker(b: u8) -> bool {
    matches!(b, b'-' | b'+')
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    config: TrimConfig,
    tokens: Vec<Token>,
    trim_next: bool,
}

impl<'a> Lexer<'a> {
    const fn new(source: &'a str, config: TrimConfig) -> Self {
        Self {
            source,
            pos: 0,
            config,
            tokens: Vec::new(),
            trim_next: false,
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, ScanError> {
        let source = self.source;
        loop {
            let rest = &source[self.pos..];
            let Some(index) = rest.find(TAG_OPEN) else {
                if !rest.is_empty() || self.tokens.is_empty() {
                    self.push_literal(rest, self.pos);
                }
                break;
            };

            self.push_literal(&rest[..index], self.pos);
            self.pos += index;

            if source[self.pos..].starts_with(COMMENT_OPEN) {
                self.read_comment()?;
            } else {
                self.read_tag()?;
            }
        }

        Ok(self.tokens)
    }

    fn push_literal(&mut self, text: &str, position: usize) {
        let text = if std::mem::take(&mut self.trim_next) {
            text.trim_start()
        } else {
            text
        };
        self.tokens.push(Token::Literal {
            text: text.to_string(),
            position,
        });
    }

    /// Apply the trim markers of a tag or comment to its neighbours.
    fn apply_trim(&mut self, markers: Markers) {
        if markers.trims_left(self.config.left) {
            if let Some(Token::Literal { text, .. }) = self.tokens.last_mut() {
                text.truncate(text.trim_end().len());
            }
        }
        self.trim_next = markers.trims_right(self.config.right);
    }

    fn read_comment(&mut self) -> Result<(), ScanError> {
        let source = self.source;
        let start = self.pos;
        let bytes = source.as_bytes();
        let mut markers = Markers::default();

        let mut body_start = start + COMMENT_OPEN.len();
        if bytes.get(body_start).copied().is_some_and(is_marker) {
            markers.left = Some(bytes[body_start]);
            body_start += 1;
        }

        let Some(close) = source[body_start..]
            .find(COMMENT_CLOSE)
            .map(|i| body_start + i)
        else {
            return Err(ScanError {
                kind: ScanErrorKind::UnterminatedComment,
                position: start,
            });
        };

        let mut body_end = close;
        if body_end > body_start && is_marker(bytes[body_end - 1]) {
            markers.right = Some(bytes[body_end - 1]);
            body_end -= 1;
        }

        let body = &source[body_start..body_end];
        trace!(position = start, len = body.len(), "comment");

        self.apply_trim(markers);
        self.tokens.push(Token::Comment {
            body: body.to_string(),
            position: start,
        });
        self.pos = close + COMMENT_CLOSE.len();
        Ok(())
    }

    fn read_tag(&mut self) -> Result<(), ScanError> {
        let source = self.source;
        let start = self.pos;
        let boundaries = TagScanner::new(&source[start..])
            .scan()
            .map_err(|err| err.shifted(start))?;

        let end = boundaries[boundaries.len() - 1];
        let tag = &source[start..start + end];
        let bytes = tag.as_bytes();
        let close = end - TAG_CLOSE.len();

        let mut markers = Markers::default();
        let open = TAG_OPEN.len();
        if close > open && is_marker(bytes[open]) {
            markers.left = Some(bytes[open]);
        }
        let body_start = open + markers.len_left();
        if close > body_start && is_marker(bytes[close - 1]) {
            markers.right = Some(bytes[close - 1]);
        }
        let body_end = close - markers.len_right();

        self.apply_trim(markers);

        let last = boundaries.len() - 2;
        for (i, pair) in boundaries.windows(2).enumerate() {
            let from = if i == 0 { body_start } else { pair[0] };
            // drop the `|>` or the closer, plus the right marker on the last stage
            let to = if i == last {
                body_end
            } else {
                pair[1] - FILTER_OPERATOR.len()
            };
            let body = tag[from..to.max(from)].trim().to_string();

            if i == 0 {
                trace!(position = start, %body, "tag");
                self.tokens.push(Token::Tag {
                    body,
                    position: start,
                });
            } else {
                trace!(%body, "filter");
                self.tokens.push(Token::Filter { body });
            }
        }

        self.pos = start + end;
        Ok(())
    }
}
