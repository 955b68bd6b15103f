//! Interpolated-string ("f-string") stack.
//!
//! The originating grammar tracks a single global `inside_fstring_braces`
//! boolean shared by every open f-string context, which §9 of the spec
//! flags as wrong: a string literal nested inside a brace-expression inside
//! another f-string (`f"{f'{x}'}"`) loses track of the outer context once
//! the inner one closes. Here each frame owns its own `in_braces` flag, so
//! popping an inner frame restores the enclosing frame's brace state
//! instead of clobbering a single shared flag.

use crate::patterns::Terminator;

#[derive(Debug, Clone, Copy)]
struct Frame {
    term: Terminator,
    in_braces: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FstringStack {
    frames: Vec<Frame>,
}

impl FstringStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn push(&mut self, term: Terminator) {
        self.frames.push(Frame {
            term,
            in_braces: false,
        });
    }

    /// Pop the innermost frame (its FSTRING_END has just been emitted).
    pub fn pop(&mut self) -> Option<Terminator> {
        self.frames.pop().map(|f| f.term)
    }

    pub fn innermost_term(&self) -> Option<Terminator> {
        self.frames.last().map(|f| f.term)
    }

    /// True while the scanner is lexing the brace-expression region of the
    /// innermost still-open f-string frame.
    pub fn in_braces(&self) -> bool {
        self.frames.last().is_some_and(|f| f.in_braces)
    }

    /// Enter the brace-expression region of the innermost frame (a literal
    /// `{` was found).
    pub fn enter_braces(&mut self) {
        if let Some(f) = self.frames.last_mut() {
            f.in_braces = true;
        }
    }

    /// Leave the brace-expression region of the innermost frame (a literal
    /// `}` closed it at paren-depth zero) — the frame stays open, resuming
    /// literal-text scanning for more FSTRING_MIDDLE/FSTRING_END.
    pub fn leave_braces(&mut self) {
        if let Some(f) = self.frames.last_mut() {
            f.in_braces = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::Terminator;

    fn term(is_fstring: bool) -> Terminator {
        Terminator {
            quote: b'"',
            triple: false,
            is_fstring,
        }
    }

    #[test]
    fn nested_frame_restores_outer_brace_state() {
        let mut s = FstringStack::new();
        s.push(term(true)); // outer f-string opens
        s.enter_braces(); // outer: f"{
        assert!(s.in_braces());

        s.push(term(true)); // inner f-string opens as an expression token
        assert!(!s.in_braces()); // inner frame starts in literal mode
        s.enter_braces(); // inner: f'{
        assert!(s.in_braces());
        s.leave_braces(); // inner: }
        assert!(!s.in_braces());
        s.pop(); // inner FSTRING_END

        // Back to the outer frame — its brace state must still be true,
        // not reset by the inner frame's lifecycle.
        assert!(s.in_braces());
    }

    #[test]
    fn empty_stack_is_not_in_braces() {
        let s = FstringStack::new();
        assert!(!s.in_braces());
        assert_eq!(s.depth(), 0);
    }
}
