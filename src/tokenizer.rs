//! Tokenizer Core: the line-driven state machine that ties the pattern
//! library, indentation tracker, f-string stack, and keyword resolver
//! together into a single pass over decoded source text.
//!
//! Unlike the originating generator, this drives to completion in one call
//! and returns the full token vector (or the first structural error) rather
//! than yielding lazily — the pack's own CLI tools (e.g. the teacher's
//! `analyze_files`) consume a file's full result set at once anyway, and a
//! `Vec<Token>` is simpler to hand across the `rayon` fan-out in the
//! ambient CLI layer than a borrowed generator would be.

use tracing::trace;

use crate::config::TokenizerConfig;
use crate::error::{LexError, LexResult};
use crate::fstring::FstringStack;
use crate::indent::{measure_leading_whitespace, IndentChange, IndentTracker};
use crate::keyword::{KeywordResolver, NameOutcome};
use crate::patterns::{self, ScanResult, Terminator, BRACKET, COMMENT, NAME, NUMBER, OPERATOR, STRING_OPEN, WHITESPACE};
use crate::token::{Kind, Pos, Token};

/// Split `source` into physical lines, each keeping its own line terminator
/// (`\n` or `\r\n`), mirroring a `readline()`-style source. The returned
/// list never includes a trailing empty string; running past the end is
/// how the tokenizer recognizes EOF, matching `readline` returning `""`.
fn split_lines_keepends(source: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        if c == '\n' {
            lines.push(std::mem::take(&mut current));
        } else if c == '\r' {
            if chars.peek() == Some(&'\n') {
                current.push(chars.next().unwrap());
            }
            lines.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn col_of(line: &str, byte_idx: usize) -> u32 {
    line[..byte_idx.min(line.len())].chars().count() as u32
}

struct OpenString {
    text: String,
    start: Pos,
    term: Terminator,
}

pub struct Tokenizer {
    config: TokenizerConfig,
    indents: IndentTracker,
    fstrings: FstringStack,
    keywords: KeywordResolver,
    paren_level: i64,
    continued: bool,
    open_string: Option<OpenString>,
    out: Vec<Token>,
}

impl Tokenizer {
    pub fn new(config: TokenizerConfig) -> Self {
        Self {
            config,
            indents: IndentTracker::new(),
            fstrings: FstringStack::new(),
            keywords: KeywordResolver::new(),
            paren_level: 0,
            continued: false,
            open_string: None,
            out: Vec::new(),
        }
    }

    pub fn tokenize(source: &str, config: TokenizerConfig) -> LexResult<Vec<Token>> {
        let mut t = Self::new(config);
        t.run(source)?;
        Ok(t.out)
    }

    fn emit(&mut self, token: Token) {
        self.out.push(token);
    }

    fn flush_stash(&mut self) {
        if let Some(t) = self.keywords.take_stash() {
            self.out.push(t);
        }
    }

    fn run(&mut self, source: &str) -> LexResult<()> {
        let lines = split_lines_keepends(source);
        let mut lnum: u32 = 0;
        let mut idx = 0usize;
        let mut last_line = String::new();

        loop {
            let line: &str = match lines.get(idx) {
                Some(l) => l.as_str(),
                None => "",
            };
            idx += 1;
            lnum += 1;
            let mut pos: usize = 0;
            let max = line.len();
            if !line.is_empty() {
                last_line = line.to_string();
            }

            // ── resume a string left open across physical lines ──────────
            if self.open_string.is_some() && !self.fstrings.in_braces() {
                if line.is_empty() {
                    let start = self.open_string.as_ref().unwrap().start;
                    return Err(LexError::token("EOF in multi-line string", start));
                }
                match self.continue_open_string(line, lnum)? {
                    ContinueOutcome::Closed(end_in_line) => {
                        // The string closed partway through this line — fall
                        // through to scan whatever tokens follow it on the
                        // same physical line, rather than skipping to the
                        // next readline the way a "needs more" outcome does.
                        pos = end_in_line;
                    }
                    ContinueOutcome::NeedsMore | ContinueOutcome::Errored => {
                        continue;
                    }
                }
            } else if self.paren_level == 0 && !self.continued && !self.fstrings.in_braces() {
                // ── new logical line: measure indentation ────────────────
                if line.is_empty() {
                    break;
                }
                let (column, ws_len) = measure_leading_whitespace(line);
                pos = ws_len;
                if pos == max {
                    break;
                }

                self.flush_stash();

                let first = line[pos..].chars().next().unwrap();
                if first == '\r' || first == '\n' {
                    self.emit(Token::new(Kind::Nl, &line[pos..], Pos::new(lnum, col_of(line, pos)), Pos::new(lnum, col_of(line, max)), line));
                    continue;
                }
                if first == '#' {
                    let rest = &line[pos..];
                    let comment_len = rest.trim_end_matches(['\r', '\n']).len();
                    let nl_pos = pos + comment_len;
                    self.emit(Token::new(
                        Kind::Comment,
                        &line[pos..nl_pos],
                        Pos::new(lnum, col_of(line, pos)),
                        Pos::new(lnum, col_of(line, nl_pos)),
                        line,
                    ));
                    self.emit(Token::new(
                        Kind::Nl,
                        &line[nl_pos..],
                        Pos::new(lnum, col_of(line, nl_pos)),
                        Pos::new(lnum, col_of(line, max)),
                        line,
                    ));
                    continue;
                }

                match self.indents.measure(column) {
                    Ok(IndentChange::Indent) => {
                        self.emit(Token::new(Kind::Indent, &line[..pos], Pos::new(lnum, 0), Pos::new(lnum, col_of(line, pos)), line));
                    }
                    Ok(IndentChange::Dedent { count }) => {
                        for _ in 0..count {
                            self.emit(Token::synthetic(Kind::Dedent, Pos::new(lnum, col_of(line, pos)), line));
                        }
                    }
                    Ok(IndentChange::None) => {}
                    Err(()) => {
                        return Err(LexError::indentation(
                            "unindent does not match any outer indentation level",
                            lnum,
                            col_of(line, pos),
                            line,
                        ));
                    }
                }
                self.keywords.note_line_indent(self.indents.top());
            } else {
                // continued statement (open parens, backslash continuation,
                // or inside an f-string brace-expression)
                if line.is_empty() {
                    return Err(LexError::token("EOF in multi-line statement", Pos::new(lnum, 0)));
                }
                self.continued = false;
            }

            // ── scan tokens within the rest of this physical line ────────
            'within_line: while pos < max {
                if !self.fstrings.is_empty() && !self.fstrings.in_braces() {
                    let term = self.fstrings.innermost_term().unwrap();
                    match patterns::scan_terminator(line, pos, term) {
                        ScanResult::Closed { end, opened_brace } => {
                            self.flush_stash();
                            let middle = &line[pos..end - if opened_brace { 1 } else { term_len(term) }];
                            self.emit(Token::new(
                                Kind::FstringMiddle,
                                middle,
                                Pos::new(lnum, col_of(line, pos)),
                                Pos::new(lnum, col_of(line, end - if opened_brace { 1 } else { term_len(term) })),
                                line,
                            ));
                            if opened_brace {
                                self.emit(Token::new(
                                    Kind::LBrace,
                                    "{",
                                    Pos::new(lnum, col_of(line, end - 1)),
                                    Pos::new(lnum, col_of(line, end)),
                                    line,
                                ));
                                self.fstrings.enter_braces();
                            } else {
                                self.emit(Token::new(
                                    Kind::FstringEnd,
                                    &line[end - term_len(term)..end],
                                    Pos::new(lnum, col_of(line, end - term_len(term))),
                                    Pos::new(lnum, col_of(line, end)),
                                    line,
                                ));
                                self.fstrings.pop();
                            }
                            pos = end;
                            continue 'within_line;
                        }
                        ScanResult::NeedsMore => {
                            self.open_string = Some(OpenString {
                                text: line[pos..].to_string(),
                                start: Pos::new(lnum, col_of(line, pos)),
                                term,
                            });
                            break 'within_line;
                        }
                        ScanResult::Unterminated => {
                            // the f-string body broke down mid-expression
                            // (a bare newline with no closing quote) with
                            // no rescuable continuation; the remainder of
                            // this physical line becomes one error token
                            // and the frame is abandoned.
                            self.flush_stash();
                            self.emit(Token::new(Kind::Errortoken, &line[pos..max], Pos::new(lnum, col_of(line, pos)), Pos::new(lnum, col_of(line, max)), line));
                            self.fstrings.pop();
                            pos = max;
                            continue 'within_line;
                        }
                    }
                }

                // skip inter-token whitespace (the originating grammar folds
                // this into its pseudo-token regex's own ignore-prefix)
                if let Some(m) = WHITESPACE.find(&line[pos..]) {
                    pos += m.end();
                }
                if pos >= max {
                    break 'within_line;
                }

                let rest = &line[pos..];
                let first = rest.chars().next().unwrap();

                // 1. numbers (must precede the broad NAME class)
                if let Some(m) = NUMBER.find(rest) {
                    if m.start() == 0 {
                        let end = pos + m.end();
                        self.flush_stash();
                        self.emit(Token::new(Kind::Number, &line[pos..end], Pos::new(lnum, col_of(line, pos)), Pos::new(lnum, col_of(line, end)), line));
                        pos = end;
                        continue 'within_line;
                    }
                }

                // 2. newline
                if first == '\r' || first == '\n' {
                    let end = max;
                    let kind = if self.paren_level > 0 || self.fstrings.in_braces() {
                        Kind::Nl
                    } else {
                        self.keywords.note_header_newline();
                        Kind::Newline
                    };
                    self.flush_stash();
                    self.emit(Token::new(kind, &line[pos..end], Pos::new(lnum, col_of(line, pos)), Pos::new(lnum, col_of(line, end)), line));
                    pos = end;
                    continue 'within_line;
                }

                // 3. comment
                if first == '#' {
                    if let Some(m) = COMMENT.find(rest) {
                        let end = pos + m.end();
                        self.flush_stash();
                        self.emit(Token::new(Kind::Comment, &line[pos..end], Pos::new(lnum, col_of(line, pos)), Pos::new(lnum, col_of(line, end)), line));
                        pos = end;
                        continue 'within_line;
                    }
                }

                // 4. string opener (plain or f-string, single or triple quoted)
                if let Some(m) = STRING_OPEN.find(rest) {
                    if m.start() == 0 {
                        let opener = m.as_str();
                        if let Some(term) = patterns::terminator_for(opener) {
                            let body_start = pos + opener.len();
                            let spos = Pos::new(lnum, col_of(line, pos));

                            // Decide whether this opener can close (or
                            // legitimately continue) before committing to
                            // any of its tokens — a same-line match failure
                            // must never push an f-string frame or open a
                            // continuation state (see `ScanResult::Unterminated`).
                            match patterns::scan_terminator(line, body_start, term) {
                                ScanResult::Unterminated => {
                                    self.flush_stash();
                                    // the quote is always the last byte of
                                    // the opener; any prefix letters before
                                    // it (r/b/u/f and combinations) are an
                                    // ordinary name, matched separately.
                                    let quote_pos = pos + opener.len() - 1;
                                    if quote_pos > pos {
                                        self.emit(Token::new(
                                            Kind::Name,
                                            &line[pos..quote_pos],
                                            Pos::new(lnum, col_of(line, pos)),
                                            Pos::new(lnum, col_of(line, quote_pos)),
                                            line,
                                        ));
                                    }
                                    self.emit(Token::new(
                                        Kind::Errortoken,
                                        &line[quote_pos..quote_pos + 1],
                                        Pos::new(lnum, col_of(line, quote_pos)),
                                        Pos::new(lnum, col_of(line, quote_pos + 1)),
                                        line,
                                    ));
                                    pos = quote_pos + 1;
                                }
                                ScanResult::Closed { end, opened_brace } => {
                                    self.flush_stash();
                                    if term.is_fstring {
                                        self.emit(Token::new(Kind::FstringStart, opener, spos, Pos::new(lnum, col_of(line, body_start)), line));
                                        self.fstrings.push(term);
                                        let mid_end = end - if opened_brace { 1 } else { term_len(term) };
                                        self.emit(Token::new(Kind::FstringMiddle, &line[body_start..mid_end], Pos::new(lnum, col_of(line, body_start)), Pos::new(lnum, col_of(line, mid_end)), line));
                                        if opened_brace {
                                            self.emit(Token::new(Kind::LBrace, "{", Pos::new(lnum, col_of(line, mid_end)), Pos::new(lnum, col_of(line, end)), line));
                                            self.fstrings.enter_braces();
                                        } else {
                                            self.emit(Token::new(Kind::FstringEnd, &line[mid_end..end], Pos::new(lnum, col_of(line, mid_end)), Pos::new(lnum, col_of(line, end)), line));
                                            self.fstrings.pop();
                                        }
                                    } else {
                                        self.emit(Token::new(Kind::String, &line[pos..end], spos, Pos::new(lnum, col_of(line, end)), line));
                                    }
                                    pos = end;
                                }
                                ScanResult::NeedsMore => {
                                    self.flush_stash();
                                    if term.is_fstring {
                                        self.emit(Token::new(Kind::FstringStart, opener, spos, Pos::new(lnum, col_of(line, body_start)), line));
                                        self.fstrings.push(term);
                                        self.open_string = Some(OpenString {
                                            text: line[body_start..].to_string(),
                                            start: spos,
                                            term,
                                        });
                                    } else {
                                        self.open_string = Some(OpenString {
                                            text: line[pos..].to_string(),
                                            start: spos,
                                            term,
                                        });
                                    }
                                    break 'within_line;
                                }
                            }
                            continue 'within_line;
                        }
                    }
                }

                // 5. identifiers / keywords
                if let Some(m) = NAME.find(rest) {
                    if m.start() == 0 {
                        let end = pos + m.end();
                        let text = &line[pos..end];
                        let token = Token::new(Kind::Name, text, Pos::new(lnum, col_of(line, pos)), Pos::new(lnum, col_of(line, end)), line);
                        match self.keywords.classify_name(token, self.config.async_keywords, self.indents.top()) {
                            NameOutcome::Emit(t) => self.emit(t),
                            NameOutcome::EmitTwo(a, b) => {
                                self.emit(a);
                                self.emit(b);
                            }
                            NameOutcome::Stashed => {}
                        }
                        pos = end;
                        continue 'within_line;
                    }
                }

                // 6. backslash line continuation
                if first == '\\' {
                    let rest_after = &line[pos + 1..];
                    if rest_after == "\n" || rest_after == "\r\n" {
                        self.flush_stash();
                        self.emit(Token::new(Kind::Nl, &line[pos..], Pos::new(lnum, col_of(line, pos)), Pos::new(lnum, col_of(line, max)), line));
                        self.continued = true;
                        pos = max;
                        continue 'within_line;
                    }
                }

                // 7. closing brace of an f-string expression region
                if first == '}' && self.paren_level == 0 && self.fstrings.in_braces() {
                    self.emit(Token::new(Kind::RBrace, "}", Pos::new(lnum, col_of(line, pos)), Pos::new(lnum, col_of(line, pos + 1)), line));
                    self.fstrings.leave_braces();
                    pos += 1;
                    continue 'within_line;
                }

                // 8. generic operator / bracket / special punctuation
                if let Some(m) = OPERATOR.find(rest).filter(|m| m.start() == 0) {
                    let end = pos + m.end();
                    self.bump_paren(first);
                    self.flush_stash();
                    self.emit(Token::new(Kind::Op, &line[pos..end], Pos::new(lnum, col_of(line, pos)), Pos::new(lnum, col_of(line, end)), line));
                    pos = end;
                    continue 'within_line;
                }
                if let Some(m) = BRACKET.find(rest).filter(|m| m.start() == 0) {
                    let end = pos + m.end();
                    self.bump_paren(first);
                    self.flush_stash();
                    self.emit(Token::new(Kind::Op, &line[pos..end], Pos::new(lnum, col_of(line, pos)), Pos::new(lnum, col_of(line, end)), line));
                    pos = end;
                    continue 'within_line;
                }
                if let Some(m) = patterns::SPECIAL.find(rest).filter(|m| m.start() == 0) {
                    let end = pos + m.end();
                    self.flush_stash();
                    self.emit(Token::new(Kind::Op, &line[pos..end], Pos::new(lnum, col_of(line, pos)), Pos::new(lnum, col_of(line, end)), line));
                    pos = end;
                    continue 'within_line;
                }

                // 9. nothing matched: a single-character error token
                let end = pos + first.len_utf8();
                self.emit(Token::new(Kind::Errortoken, &line[pos..end], Pos::new(lnum, col_of(line, pos)), Pos::new(lnum, col_of(line, end)), line));
                pos = end;
            }
        }

        self.flush_stash();
        let final_line = last_line.clone();
        let remaining = self.indents.remaining_levels();
        for _ in 0..remaining {
            self.emit(Token::synthetic(Kind::Dedent, Pos::new(lnum, 0), ""));
        }
        self.emit(Token::synthetic(Kind::Endmarker, Pos::new(lnum, 0), ""));
        trace!(tokens = self.out.len(), last_line = %final_line, "tokenize complete");
        Ok(())
    }

    fn bump_paren(&mut self, initial: char) {
        match initial {
            '(' | '[' | '{' => self.paren_level += 1,
            ')' | ']' | '}' => self.paren_level -= 1,
            _ => {}
        }
    }

    /// Continue accumulating / close a string that spans multiple physical
    /// lines. A [`ContinueOutcome::Closed`] carries the byte offset within
    /// `line` (not within the accumulated text) where the scan of the
    /// current physical line should resume — the originating grammar falls
    /// through to keep scanning the rest of that line for more tokens
    /// rather than treating the whole line as consumed.
    fn continue_open_string(&mut self, line: &str, lnum: u32) -> LexResult<ContinueOutcome> {
        let open = self.open_string.as_ref().unwrap();
        let term = open.term;
        let accumulated_len = open.text.len();
        let mut joined = open.text.clone();
        joined.push_str(line);

        match patterns::scan_terminator(&joined, accumulated_len, term) {
            ScanResult::Closed { end, opened_brace } => {
                let start = self.open_string.as_ref().unwrap().start;
                self.open_string = None;
                let end_in_line = end - accumulated_len;
                let end_col = col_of(line, end_in_line);
                if term.is_fstring {
                    let mid_end = end - if opened_brace { 1 } else { term_len(term) };
                    let mid_end_in_line = mid_end - accumulated_len;
                    self.emit(Token::new(Kind::FstringMiddle, &joined[..mid_end], start, Pos::new(lnum, col_of(line, mid_end_in_line)), &joined));
                    if opened_brace {
                        self.emit(Token::new(Kind::LBrace, "{", Pos::new(lnum, col_of(line, mid_end_in_line)), Pos::new(lnum, end_col), &joined));
                        self.fstrings.enter_braces();
                    } else {
                        self.emit(Token::new(Kind::FstringEnd, &joined[mid_end..end], Pos::new(lnum, col_of(line, mid_end_in_line)), Pos::new(lnum, end_col), &joined));
                        self.fstrings.pop();
                    }
                } else {
                    self.emit(Token::new(Kind::String, &joined[..end], start, Pos::new(lnum, end_col), &joined));
                }
                Ok(ContinueOutcome::Closed(end_in_line))
            }
            ScanResult::NeedsMore => {
                self.open_string.as_mut().unwrap().text = joined;
                Ok(ContinueOutcome::NeedsMore)
            }
            ScanResult::Unterminated => {
                // The continuation broke down: this physical line ends the
                // body in a bare newline with no closing quote and no
                // further backslash-continuation. Not rescuable — the
                // whole accumulated (garbled) body becomes one error token
                // and the open frame is abandoned.
                let start = self.open_string.as_ref().unwrap().start;
                self.emit(Token::new(Kind::Errortoken, joined.clone(), start, Pos::new(lnum, col_of(line, line.len())), &joined));
                self.open_string = None;
                Ok(ContinueOutcome::Errored)
            }
        }
    }
}

enum ContinueOutcome {
    Closed(usize),
    NeedsMore,
    Errored,
}

fn term_len(term: Terminator) -> usize {
    if term.triple {
        3
    } else {
        1
    }
}
