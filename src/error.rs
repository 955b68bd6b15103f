//! Structural error kinds for the tokenizer and encoding detector.
//!
//! Malformed-but-non-structural input (a stray character matching no
//! pattern) never reaches this type — it becomes an `ERRORTOKEN` and the
//! scan continues. These variants are reserved for failures that halt the
//! pass.

use crate::token::Pos;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum LexError {
    /// EOF reached while a multi-line string or multi-line statement was
    /// still open.
    #[error("{message} at {pos}")]
    Token { message: String, pos: Pos },

    /// A dedent landed on a column not present in the indentation stack.
    #[error("{filename}:{row}:{col}: {message} ({line:?})")]
    Indentation {
        message: String,
        filename: String,
        row: u32,
        col: u32,
        line: String,
    },

    /// An encoding declaration named an unknown codec, or disagreed with a
    /// detected byte-order mark.
    #[error("unknown or conflicting encoding: {encoding}")]
    Encoding { encoding: String },
}

impl LexError {
    pub fn token(message: impl Into<String>, pos: Pos) -> Self {
        LexError::Token {
            message: message.into(),
            pos,
        }
    }

    pub fn indentation(message: impl Into<String>, row: u32, col: u32, line: impl Into<String>) -> Self {
        LexError::Indentation {
            message: message.into(),
            filename: "<tokenize>".to_string(),
            row,
            col,
            line: line.into(),
        }
    }

    pub fn encoding(encoding: impl Into<String>) -> Self {
        LexError::Encoding {
            encoding: encoding.into(),
        }
    }
}

pub type LexResult<T> = Result<T, LexError>;
