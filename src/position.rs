//! Offset to line/column resolution for error reporting.
//!
//! A line boundary is `\n`, or `\r\n` counted once. A lone `\r` is an
//! ordinary character.

/// Human-facing location of a source offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
    /// Full text of the line, split on `\n` (a trailing `\r` is kept).
    pub text: String,
}

/// Resolve a byte offset into `source` to its line, column and line text.
///
/// Offsets past the end of `source` resolve to the end of the last line.
#[must_use]
pub fn locate(source: &str, offset: usize) -> Location {
    let mut line = 1;
    let mut column = 1;
    let mut chars = source.char_indices().peekable();

    while let Some((index, ch)) = chars.next() {
        if index >= offset {
            break;
        }
        match ch {
            '\n' => {
                line += 1;
                column = 1;
            }
            '\r' if chars.peek().is_some_and(|&(_, next)| next == '\n') => {
                chars.next();
                line += 1;
                column = 1;
            }
            _ => column += 1,
        }
    }

    Location {
        line,
        column,
        text: line_text(source, line),
    }
}

fn line_text(source: &str, line: usize) -> String {
    source
        .split('\n')
        .nth(line - 1)
        .unwrap_or_default()
        .to_string()
}

/// Line starts of a source, computed once.
///
/// Answers the same queries as [`locate`] without rescanning the
/// source for every lookup.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    source: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { source, starts }
    }

    /// Number of lines in the source.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    #[must_use]
    pub fn locate(&self, offset: usize) -> Location {
        let offset = offset.min(self.source.len());
        let line = self.starts.partition_point(|&start| start <= offset);
        let start = self.starts[line - 1];

        let mut column = 1;
        let mut chars = self.source[start..].char_indices().peekable();
        while let Some((index, ch)) = chars.next() {
            if start + index >= offset {
                break;
            }
            // A `\r\n` straddling the offset still counts as one boundary.
            if ch == '\r' && chars.peek().is_some_and(|&(_, next)| next == '\n') {
                return Location {
                    line: line + 1,
                    column: 1,
                    text: line_text(self.source, line + 1),
                };
            }
            column += 1;
        }

        Location {
            line,
            column,
            text: line_text(self.source, line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_zero() {
        let loc = locate("hello\nworld", 0);
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 1);
        assert_eq!(loc.text, "hello");
    }

    #[test]
    fn after_newline() {
        let loc = locate("hello\nworld", 6);
        assert_eq!((loc.line, loc.column), (2, 1));
        assert_eq!(loc.text, "world");
    }

    #[test]
    fn crlf_is_one_boundary() {
        let source = "ab\r\ncd";
        let loc = locate(source, 5);
        assert_eq!((loc.line, loc.column), (2, 2));
        assert_eq!(loc.text, "cd");
        assert_eq!(locate(source, 0).text, "ab\r");
    }

    #[test]
    fn lone_cr_is_not_a_boundary() {
        let loc = locate("ab\rcd", 4);
        assert_eq!((loc.line, loc.column), (1, 5));
    }

    #[test]
    fn columns_count_characters() {
        let source = "héllo {{ x }}";
        let offset = source.find("{{").unwrap();
        assert_eq!(locate(source, offset).column, 7);
    }

    #[test]
    fn past_the_end() {
        let loc = locate("a\nb", 100);
        assert_eq!((loc.line, loc.column), (2, 2));
    }

    #[test]
    fn line_index_matches_locate() {
        let source = "one\r\ntwo\nthree\rfour\n\nlast";
        let index = LineIndex::new(source);
        for offset in 0..=source.len() {
            assert_eq!(index.locate(offset), locate(source, offset), "offset {offset}");
        }
    }
}
