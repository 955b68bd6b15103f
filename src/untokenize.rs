//! Untokenizer: the inverse of [`crate::tokenizer::Tokenizer`].
//!
//! Two forms, mirroring the originating grammar's `Untokenizer` class:
//!
//! - **Full form** ([`Untokenizer::untokenize`]) consumes five-field tokens
//!   (kind, text, start, end, line) and pads with spaces to reach each
//!   token's recorded start column, reproducing the original source
//!   exactly for any token stream the core actually produced.
//! - **Compat form** ([`untokenize_compat`]) consumes only `(kind, text)`
//!   pairs — no position information — and replays the INDENT/DEDENT stack
//!   to approximate layout instead. This is a lossy reconstruction: it is
//!   meant for token streams that have been filtered or rewritten and no
//!   longer carry trustworthy positions.
use crate::error::{LexError, LexResult};
use crate::token::{Kind, Pos, Token};

#[derive(Debug, Default)]
pub struct Untokenizer {
    tokens: Vec<String>,
    prev_row: u32,
    prev_col: u32,
}

impl Untokenizer {
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            prev_row: 1,
            prev_col: 0,
        }
    }

    /// Pad with spaces up to `start`'s column.
    ///
    /// The originating source asserts `row <= self.prev_row` here, which
    /// reads backwards: token rows only ever move forward as the stream is
    /// replayed, so the invariant actually being protected is that a token
    /// never starts *before* the row the previous token ended on.
    fn add_whitespace(&mut self, start: Pos) -> LexResult<()> {
        if start.row < self.prev_row {
            return Err(LexError::token(
                format!("token row {} precedes previous row {}", start.row, self.prev_row),
                start,
            ));
        }
        if start.row == self.prev_row {
            let col_offset = start.col.saturating_sub(self.prev_col);
            if col_offset > 0 {
                self.tokens.push(" ".repeat(col_offset as usize));
            }
        }
        Ok(())
    }

    /// Replay a full five-field token stream back into source text.
    pub fn untokenize(mut self, stream: &[Token]) -> LexResult<String> {
        for token in stream {
            self.add_whitespace(token.start)?;
            self.tokens.push(token.text.clone());
            self.prev_row = token.end.row;
            self.prev_col = token.end.col;
            if matches!(token.kind, Kind::Newline | Kind::Nl) {
                self.prev_row += 1;
                self.prev_col = 0;
            }
        }
        Ok(self.tokens.concat())
    }
}

/// Replay a degenerate `(kind, text)` stream, using only INDENT/DEDENT and
/// NEWLINE/NL to approximate layout — no column information survives.
pub fn untokenize_compat(stream: &[(Kind, String)]) -> String {
    let mut out = String::new();
    let mut indents: Vec<String> = Vec::new();
    let mut startline = false;

    for (kind, text) in stream {
        let mut text = text.clone();
        if matches!(kind, Kind::Name | Kind::Number | Kind::Async | Kind::Await) {
            text.push(' ');
        }
        match kind {
            Kind::Indent => {
                indents.push(text);
                continue;
            }
            Kind::Dedent => {
                indents.pop();
                continue;
            }
            Kind::Newline | Kind::Nl => {
                startline = true;
            }
            _ => {
                if startline {
                    if let Some(top) = indents.last() {
                        out.push_str(top);
                    }
                    startline = false;
                }
            }
        }
        out.push_str(&text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenizerConfig;
    use crate::tokenizer::Tokenizer;

    fn roundtrip(src: &str) -> String {
        let tokens = Tokenizer::tokenize(src, TokenizerConfig::default()).unwrap();
        Untokenizer::new().untokenize(&tokens).unwrap()
    }

    #[test]
    fn simple_assignment_roundtrips() {
        assert_eq!(roundtrip("x = 1\n"), "x = 1\n");
    }

    #[test]
    fn indentation_is_preserved() {
        let src = "if x:\n    y\nz\n";
        assert_eq!(roundtrip(src), src);
    }

    #[test]
    fn comment_and_blank_line_preserved() {
        let src = "\n# hi\nx = 1\n";
        assert_eq!(roundtrip(src), src);
    }

    #[test]
    fn fstring_roundtrips() {
        let src = "f\"a{b}c\"\n";
        assert_eq!(roundtrip(src), src);
    }

    #[test]
    fn row_regression_is_rejected() {
        let early = Token::new(Kind::Name, "a", Pos::new(2, 0), Pos::new(2, 1), "a");
        let later = Token::new(Kind::Name, "b", Pos::new(1, 0), Pos::new(1, 1), "b");
        let err = Untokenizer::new().untokenize(&[early, later]).unwrap_err();
        assert!(matches!(err, LexError::Token { .. }));
    }

    #[test]
    fn compat_replays_indent_stack() {
        let stream = vec![
            (Kind::Name, "if".to_string()),
            (Kind::Name, "x".to_string()),
            (Kind::Op, ":".to_string()),
            (Kind::Newline, "\n".to_string()),
            (Kind::Indent, "    ".to_string()),
            (Kind::Name, "y".to_string()),
            (Kind::Newline, "\n".to_string()),
            (Kind::Dedent, String::new()),
        ];
        let out = untokenize_compat(&stream);
        assert!(out.contains("    y"));
    }
}
