//! `pylex`: a line-driven tokenizer for significant-indentation,
//! expression-rich source.
//!
//! The pipeline is: [`encoding`] sniffs the byte-level encoding of a raw
//! file, decoded text is fed to [`tokenizer::Tokenizer`] (which leans on
//! [`patterns`], [`indent`], [`fstring`], and [`keyword`] for its
//! sub-decisions) to produce a [`token::Token`] stream, and [`untokenize`]
//! provides the inverse.

pub mod config;
pub mod encoding;
pub mod error;
pub mod fstring;
pub mod indent;
pub mod keyword;
pub mod patterns;
pub mod token;
pub mod tokenizer;
pub mod untokenize;

pub use config::TokenizerConfig;
pub use error::{LexError, LexResult};
pub use token::{Kind, Pos, Token};
pub use tokenizer::Tokenizer;
pub use untokenize::{untokenize_compat, Untokenizer};
