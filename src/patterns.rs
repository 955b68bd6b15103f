//! Pattern Library: compiled-once longest-match recognizers.
//!
//! The simple token classes (whitespace, comments, numbers, operators,
//! brackets/special characters, and the broad "Name" class) are expressed as
//! `regex` patterns, compiled once behind `once_cell::sync::Lazy` and shared
//! read-only across tokenizer passes, exactly as the design calls for.
//!
//! The string-body terminators are *not* expressed as `regex` patterns: the
//! originating grammar relies on negative lookahead (`(?!{)`, `'(?!'')`) to
//! tell an escaped `{{` apart from a brace that opens an expression region,
//! and to tell an escaped quote apart from the closing delimiter of a triple
//! string. Rust's `regex` crate has no lookaround support, so these are hand
//! written scanners instead — still longest-match, still escape-opaque, just
//! expressed as a small state walk rather than a compiled automaton. This
//! mirrors how the teacher's own lexer (`fast_parser/lexer.rs`) scans string
//! bodies byte-by-byte rather than through a regex.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

// ── Simple recognizers ────────────────────────────────────────────────────────

pub static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t\x0c]*").unwrap());

pub static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[^\r\n]*").unwrap());

pub static LINE_CONT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\\\r?\n").unwrap());

/// Binary / hex / octal / decimal / point-float / exponent-float / imaginary,
/// underscores-in-digit-groups and an optional trailing long-int suffix.
pub static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:",
        r"\d+(?:_\d+)*[jJ]",                                         // imaginary int-like
        r"|(?:\d+(?:_\d+)*\.(?:\d+(?:_\d+)*)?|\.\d+(?:_\d+)*)(?:[eE][-+]?\d+(?:_\d+)*)?[jJ]?", // float / imaginary float
        r"|\d+(?:_\d+)*[eE][-+]?\d+(?:_\d+)*[jJ]?",                   // exponent float
        r"|0[bB]_?[01]+(?:_[01]+)*",                                  // binary
        r"|0[xX]_?[\da-fA-F]+(?:_[\da-fA-F]+)*[lL]?",                 // hex
        r"|0[oO]?_?[0-7]+(?:_[0-7]+)*[lL]?",                          // octal
        r"|[1-9]\d*(?:_\d+)*[lL]?",                                   // decimal
        r"|0[lL]?",                                                   // zero
        r")"
    ))
    .unwrap()
});

/// Longest-operators-first so `**=` beats `**`, `==` beats `=`, etc.
pub static OPERATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:",
        r"\*\*=?",
        r"|>>=?",
        r"|<<=?",
        r"|<>",
        r"|!=",
        r"|//=?",
        r"|->",
        r"|[+\-*/%&@|^=<>:]=?",
        r"|~",
        r")"
    ))
    .unwrap()
});

pub static BRACKET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[][(){}]").unwrap());

pub static SPECIAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\r?\n|[:;.,`@])").unwrap());

/// Broader-than-ASCII-identifier "Name": one or more characters that are
/// neither whitespace nor reserved punctuation. Keyword-ness is orthogonal.
pub static NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r##"^[^\s#()\[\]{}+\-*/!@$%^&=|;:'",.<>/?`~\\]+"##).unwrap());

/// Prefix + opening delimiter of a string literal: 0-2 prefix letters
/// (case-insensitive combinations of r/b/u/f) followed by a quote (triple or
/// single). Used only to recognize *that* a string is opening and to
/// classify it; body scanning is done by [`scan_terminator`].
pub static STRING_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(?i:r|b|u|f|rb|br|rf|fr|ur)?('''|"""|'|")"#).unwrap());

// ── Dispatch table: (prefix, quote) → terminator kind ─────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Terminator {
    pub quote: u8,
    pub triple: bool,
    pub is_fstring: bool,
}

fn combinations(letters: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    for &a in letters {
        out.push(a.to_string());
        for &b in letters {
            if a.eq_ignore_ascii_case(b) {
                continue;
            }
            out.push(format!("{a}{b}"));
        }
    }
    out
}

/// Built once: maps every valid `(prefix, quote)` spelling (e.g. `"rb'"`,
/// `"F\"\"\""`) to the terminator recognizer that should close it — the
/// `endprogs` table of the originating tokenizer, generalized over prefix
/// case combinations.
pub static ENDPROGS: Lazy<HashMap<String, Terminator>> = Lazy::new(|| {
    let mut map = HashMap::new();
    let str_prefixes: Vec<String> = {
        let mut v = combinations(&["r", "R", "b", "B"]);
        v.extend(["u", "U", "ur", "uR", "Ur", "UR"].iter().map(|s| s.to_string()));
        v.push(String::new());
        v
    };
    let fstring_prefixes: Vec<String> = combinations(&["r", "R", "f", "F"])
        .into_iter()
        .chain(["f", "F"].iter().map(|s| s.to_string()))
        .filter(|p| p.to_lowercase().contains('f'))
        .collect();

    for prefix in &str_prefixes {
        for (q, quote) in [(b'\'', "'"), (b'"', "\"")] {
            map.insert(
                format!("{prefix}{quote}"),
                Terminator {
                    quote: q,
                    triple: false,
                    is_fstring: false,
                },
            );
            map.insert(
                format!("{prefix}{quote}{quote}{quote}"),
                Terminator {
                    quote: q,
                    triple: true,
                    is_fstring: false,
                },
            );
        }
    }
    for prefix in &fstring_prefixes {
        for (q, quote) in [(b'\'', "'"), (b'"', "\"")] {
            map.insert(
                format!("{prefix}{quote}"),
                Terminator {
                    quote: q,
                    triple: false,
                    is_fstring: true,
                },
            );
            map.insert(
                format!("{prefix}{quote}{quote}{quote}"),
                Terminator {
                    quote: q,
                    triple: true,
                    is_fstring: true,
                },
            );
        }
    }
    map
});

pub fn terminator_for(prefix_and_quote: &str) -> Option<Terminator> {
    ENDPROGS.get(prefix_and_quote).copied()
}

// ── Terminator scanning ───────────────────────────────────────────────────────

/// Outcome of trying to close an open string/f-string body starting at
/// `pos` in `text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanResult {
    /// The body closed within `text`; `end` is the exclusive end offset
    /// (one past the closing delimiter, or one past the `{` that opened a
    /// brace-expression region).
    Closed { end: usize, opened_brace: bool },
    /// No close found in `text` — caller should accumulate and try again
    /// with more input appended. Only reachable for a triple-quoted body, or
    /// a non-triple body whose last byte is an escaping backslash (a
    /// genuine backslash-newline continuation candidate).
    NeedsMore,
    /// A non-triple body hit a bare, unescaped newline before any closing
    /// quote — the originating grammar never lets a single-quoted string
    /// span a literal line break, so this can never be rescued by more
    /// input. The caller must fail the match outright (single-character
    /// `ERRORTOKEN` for the opening quote) rather than wait for a
    /// continuation.
    Unterminated,
}

/// Scan from `pos` in `text` for the end of a string body governed by
/// `term`. Backslash-escapes are opaque (the escaped character is always
/// skipped whole). For f-strings, `{{` is a literal escaped brace and a
/// lone `{` (not itself followed by another `{`) ends the body in
/// brace-expression mode.
///
/// This performs exactly the longest-match, lookahead-sensitive scan the
/// originating grammar expresses with `(?!{)` / `'(?!'')`-style regex
/// assertions, without needing a lookaround-capable regex engine.
pub fn scan_terminator(text: &str, pos: usize, term: Terminator) -> ScanResult {
    let bytes = text.as_bytes();
    let mut i = pos;
    let n = bytes.len();
    let close_len = if term.triple { 3 } else { 1 };

    while i < n {
        let b = bytes[i];

        if b == b'\\' {
            // Escaped char is opaque; if it's the last byte (line ends in a
            // lone backslash) the body may still close on a following line.
            if i + 1 >= n {
                return ScanResult::NeedsMore;
            }
            i += 2;
            continue;
        }

        if !term.triple && b == b'\n' {
            // A bare newline here is always unescaped (an escaped one would
            // have been consumed two bytes at a time by the backslash branch
            // above) so this body can never close — not a continuation
            // candidate.
            return ScanResult::Unterminated;
        }

        if term.is_fstring && b == b'{' {
            if i + 1 < n && bytes[i + 1] == b'{' {
                i += 2;
                continue;
            }
            if i + 1 >= n {
                // Can't yet tell whether this is `{{` split across a
                // boundary — need more input before deciding.
                return ScanResult::NeedsMore;
            }
            return ScanResult::Closed {
                end: i + 1,
                opened_brace: true,
            };
        }

        if b == term.quote {
            if term.triple {
                if i + 2 < n && bytes[i + 1] == term.quote && bytes[i + 2] == term.quote {
                    return ScanResult::Closed {
                        end: i + close_len,
                        opened_brace: false,
                    };
                }
                // A lone or doubled quote inside a triple string is just
                // body text; keep scanning.
                i += 1;
                continue;
            } else {
                return ScanResult::Closed {
                    end: i + close_len,
                    opened_brace: false,
                };
            }
        }

        i += 1;
    }

    ScanResult::NeedsMore
}
