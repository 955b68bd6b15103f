//! Contextual keyword resolver for `async`/`await`.
//!
//! When `async_keywords` is enabled (the default — matching the modern
//! grammar where both are fully reserved) every `async`/`await` spelling is
//! promoted to `ASYNC`/`AWAIT` unconditionally. When disabled, they're soft
//! keywords: plain `NAME` tokens everywhere except where `async` is
//! immediately followed by `def` or `for`, which is the one place a single
//! token of lookahead is needed. A bare `async` NAME is held back in a
//! one-slot stash until the tokenizer core knows what follows it; every
//! other token kind must flush that stash (via [`KeywordResolver::take_stash`])
//! before it is itself emitted, since the stash may resolve to a plain NAME
//! that belongs strictly earlier in the stream.

use crate::token::{Kind, Token};

pub enum NameOutcome {
    /// Emit this token now.
    Emit(Token),
    /// Flush the stash, then emit this token — both belong in the stream.
    EmitTwo(Token, Token),
    /// Swallowed into the stash; nothing to emit yet.
    Stashed,
}

#[derive(Debug, Default)]
pub struct KeywordResolver {
    stash: Option<Token>,
    /// True from the `def` that opens an `async def` up to the matching
    /// DEDENT of its suite.
    async_def: bool,
    /// Column width of the `async def` header line's own indentation.
    async_def_indent: u32,
    /// True once the NEWLINE ending the `async def` header has been seen.
    async_def_nl: bool,
}

impl KeywordResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_async_def(&self) -> bool {
        self.async_def
    }

    pub fn note_header_newline(&mut self) {
        if self.async_def {
            self.async_def_nl = true;
        }
    }

    /// Call once per logical line after the indentation column for that
    /// line has been resolved (`top` is the current top of the indent
    /// stack). Clears the `async def` context once the suite's indentation
    /// has been dedented past.
    pub fn note_line_indent(&mut self, top: u32) {
        if self.async_def && self.async_def_nl && self.async_def_indent >= top {
            self.async_def = false;
            self.async_def_nl = false;
            self.async_def_indent = 0;
        }
    }

    /// Take whatever is in the stash, if anything — callers must flush this
    /// before emitting any token other than the one that created the stash.
    pub fn take_stash(&mut self) -> Option<Token> {
        self.stash.take()
    }

    /// Classify a freshly-lexed `NAME` token.
    pub fn classify_name(&mut self, token: Token, async_keywords_cfg: bool, indent_top: u32) -> NameOutcome {
        let text = token.text.as_str();

        if (text == "async" || text == "await") && (async_keywords_cfg || self.async_def) {
            let kind = if text == "async" { Kind::Async } else { Kind::Await };
            return NameOutcome::Emit(Token { kind, ..token });
        }

        if text == "async" && self.stash.is_none() {
            self.stash = Some(token);
            return NameOutcome::Stashed;
        }

        if (text == "def" || text == "for") && self.stash.is_some() {
            let stashed = self.stash.take().unwrap();
            if stashed.text == "async" {
                if text == "def" {
                    self.async_def = true;
                    self.async_def_indent = indent_top;
                    self.async_def_nl = false;
                }
                let promoted = Token {
                    kind: Kind::Async,
                    ..stashed
                };
                return NameOutcome::EmitTwo(promoted, token);
            }
            return NameOutcome::EmitTwo(stashed, token);
        }

        match self.stash.take() {
            Some(stashed) => NameOutcome::EmitTwo(stashed, token),
            None => NameOutcome::Emit(token),
        }
    }
}
