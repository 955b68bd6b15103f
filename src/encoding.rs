//! Encoding detection: BOM sniffing plus the PEP 263 `# coding: ...` cookie,
//! checked on at most the first two physical lines.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::LexError;

const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];

static COOKIE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u)^[ \t\x0c]*#.*?coding[:=][ \t]*([-\w.]+)").unwrap());
static BLANK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?-u)^[ \t\x0c]*(?:[#\r\n]|$)").unwrap());

/// Imitates `get_normal_name` in CPython's `tokenizer.c`: collapse the
/// handful of spellings that alias a handful of canonical codec names, and
/// otherwise leave the declared name alone.
fn normal_name(orig: &str) -> String {
    let head: String = orig.chars().take(12).collect();
    let enc = head.to_lowercase().replace('_', "-");
    if enc == "utf-8" || enc.starts_with("utf-8-") {
        return "utf-8".to_string();
    }
    if matches!(enc.as_str(), "latin-1" | "iso-8859-1" | "iso-latin-1")
        || enc.starts_with("latin-1-")
        || enc.starts_with("iso-8859-1-")
        || enc.starts_with("iso-latin-1-")
    {
        return "iso-8859-1".to_string();
    }
    orig.to_string()
}

/// A minimal allow-list standing in for Python's full codec registry:
/// enough aliases to validate realistic source-file cookies without
/// depending on an external charset database.
fn codec_known(name: &str) -> bool {
    matches!(
        name.to_lowercase().replace('_', "-").as_str(),
        "utf-8"
            | "utf8"
            | "ascii"
            | "us-ascii"
            | "iso-8859-1"
            | "latin-1"
            | "latin1"
            | "utf-16"
            | "utf-32"
            | "cp1252"
            | "windows-1252"
    )
}

fn find_cookie(line: &[u8], bom_found: bool) -> Result<Option<String>, LexError> {
    let Ok(line_str) = std::str::from_utf8(line) else {
        return Ok(None);
    };
    if !line_str.is_ascii() {
        return Ok(None);
    }
    let Some(caps) = COOKIE_RE.captures(line_str) else {
        return Ok(None);
    };
    let raw = caps.get(1).unwrap().as_str();
    let mut encoding = normal_name(raw);
    if !codec_known(&encoding) {
        return Err(LexError::encoding(encoding));
    }
    if bom_found {
        if encoding != "utf-8" {
            return Err(LexError::encoding("utf-8 (conflicts with byte-order mark)".to_string()));
        }
        encoding.push_str("-sig");
    }
    Ok(Some(encoding))
}

/// Result of `detect_encoding`: the resolved codec name, plus any raw lines
/// it had to consume while sniffing (so the caller doesn't re-read them).
pub struct Detected {
    pub encoding: String,
    pub consumed: Vec<Vec<u8>>,
}

/// Detect the source encoding from up to the first two physical lines,
/// supplied as raw byte slices (pre-decoding). `lines` should yield `None`
/// once exhausted, matching a `readline`-style source that returns empty at
/// EOF.
pub fn detect_encoding<'a>(mut lines: impl Iterator<Item = &'a [u8]>) -> Result<Detected, LexError> {
    let default = "utf-8".to_string();
    let mut bom_found = false;

    let mut first = lines.next().unwrap_or(b"").to_vec();
    if first.starts_with(BOM_UTF8) {
        bom_found = true;
        first.drain(0..3);
    }
    let first_default = if bom_found { "utf-8-sig".to_string() } else { default.clone() };

    if first.is_empty() {
        return Ok(Detected {
            encoding: first_default,
            consumed: vec![],
        });
    }

    if let Some(enc) = find_cookie(&first, bom_found)? {
        return Ok(Detected {
            encoding: enc,
            consumed: vec![first],
        });
    }

    let looks_blank = std::str::from_utf8(&first)
        .map(|s| BLANK_RE.is_match(s))
        .unwrap_or(false);
    if !looks_blank {
        return Ok(Detected {
            encoding: first_default,
            consumed: vec![first],
        });
    }

    let second = lines.next().unwrap_or(b"").to_vec();
    if second.is_empty() {
        return Ok(Detected {
            encoding: first_default,
            consumed: vec![first],
        });
    }

    if let Some(enc) = find_cookie(&second, bom_found)? {
        return Ok(Detected {
            encoding: enc,
            consumed: vec![first, second],
        });
    }

    Ok(Detected {
        encoding: first_default,
        consumed: vec![first, second],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_cookie_defaults_to_utf8() {
        let lines: Vec<&[u8]> = vec![b"print('hi')\n"];
        let d = detect_encoding(lines.into_iter()).unwrap();
        assert_eq!(d.encoding, "utf-8");
    }

    #[test]
    fn cookie_on_first_line() {
        let lines: Vec<&[u8]> = vec![b"# -*- coding: utf-8 -*-\n"];
        let d = detect_encoding(lines.into_iter()).unwrap();
        assert_eq!(d.encoding, "utf-8");
        assert_eq!(d.consumed.len(), 1);
    }

    #[test]
    fn cookie_on_second_line_after_blank_first() {
        let lines: Vec<&[u8]> = vec![b"#!/usr/bin/env python\n", b"# coding: latin-1\n"];
        let d = detect_encoding(lines.into_iter()).unwrap();
        assert_eq!(d.encoding, "iso-8859-1");
        assert_eq!(d.consumed.len(), 2);
    }

    #[test]
    fn cookie_past_second_line_is_ignored() {
        let lines: Vec<&[u8]> = vec![b"x = 1\n", b"# coding: latin-1\n"];
        let d = detect_encoding(lines.into_iter()).unwrap();
        assert_eq!(d.encoding, "utf-8");
    }

    #[test]
    fn bom_sets_utf8_sig() {
        let mut with_bom = BOM_UTF8.to_vec();
        with_bom.extend_from_slice(b"x = 1\n");
        let lines: Vec<&[u8]> = vec![&with_bom];
        let d = detect_encoding(lines.into_iter()).unwrap();
        assert_eq!(d.encoding, "utf-8-sig");
    }

    #[test]
    fn bom_conflicting_with_cookie_errors() {
        let mut with_bom = BOM_UTF8.to_vec();
        with_bom.extend_from_slice(b"# coding: latin-1\n");
        let lines: Vec<&[u8]> = vec![&with_bom];
        assert!(detect_encoding(lines.into_iter()).is_err());
    }

    #[test]
    fn unknown_codec_errors() {
        let lines: Vec<&[u8]> = vec![b"# coding: bogus-codec-9000\n"];
        assert!(detect_encoding(lines.into_iter()).is_err());
    }
}
