mod banner;
mod discovery;

use clap::Parser;
use colored::Colorize;
use pylex::{LexError, Token, Tokenizer, TokenizerConfig};
use rayon::prelude::*;
use serde_json::json;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pylex",
    about = "Tokenizer for significant-indentation, expression-rich source",
    version,
    long_about = "pylex tokenizes Python-like source into NAME/NUMBER/STRING/OP/\
                  INDENT/DEDENT/NEWLINE/f-string sub-tokens, tracking indentation, \
                  interpolated-string nesting, and contextual async/await keywords.\n\n\
                  Run `pylex` with no arguments to see an overview of usage."
)]
struct Cli {
    /// Paths to tokenize (files or directories). Omit to see the welcome
    /// screen; pass `.` to scan the current directory.
    #[arg()]
    paths: Vec<PathBuf>,

    /// Only print tokens of the given comma-separated kinds (e.g. --select NAME,STRING).
    #[arg(long, value_delimiter = ',')]
    select: Option<Vec<String>>,

    /// Exclude directories or files whose path contains any of the given
    /// comma-separated names (e.g. --exclude tests,migrations,vendor).
    /// Hidden directories (.git, .venv, __pycache__, etc.) are always excluded
    /// regardless of this flag.
    #[arg(long, value_delimiter = ',')]
    exclude: Option<Vec<String>>,

    /// Emit results as JSON instead of the default text format.
    #[arg(long)]
    json: bool,

    /// Exit with code 0 even when a file fails to tokenize (useful in CI with --json).
    #[arg(long)]
    no_exit_code: bool,

    /// Disable async/await as contextual keywords (legacy grammars predating
    /// the soft-keyword era).
    #[arg(long)]
    no_async_keywords: bool,
}

struct FileResult {
    file: String,
    tokens: Vec<Token>,
    error: Option<LexError>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    if cli.paths.is_empty() {
        banner::show_welcome();
        return;
    }

    let exclude: Vec<String> = cli.exclude.unwrap_or_default();
    let config = TokenizerConfig {
        async_keywords: !cli.no_async_keywords,
        ..TokenizerConfig::default()
    };

    let mut files = Vec::new();
    for path in &cli.paths {
        if path.is_file() {
            files.push(path.clone());
        } else {
            match discovery::discover_python_files(path, &exclude) {
                Ok(found) => files.extend(found),
                Err(e) => {
                    eprintln!("{}: {e}", "error".red().bold());
                    process::exit(2);
                }
            }
        }
    }

    let mut results: Vec<FileResult> = files
        .par_iter()
        .map(|path| tokenize_file(path, &config))
        .collect();

    results.sort_by(|a, b| a.file.cmp(&b.file));

    let select: Option<Vec<String>> = cli.select.map(|v| v.into_iter().map(|s| s.to_uppercase()).collect());
    if let Some(ref kinds) = select {
        for r in &mut results {
            r.tokens.retain(|t| kinds.contains(&t.kind.to_string()));
        }
    }

    let had_errors = results.iter().any(|r| r.error.is_some());

    if cli.json {
        print_json(&results);
    } else {
        for r in &results {
            println!("{}", r.file.bold());
            for t in &r.tokens {
                println!("  {t}");
            }
            if let Some(e) = &r.error {
                println!("  {}: {e}", "error".red().bold());
            }
        }
        let total: usize = results.iter().map(|r| r.tokens.len()).sum();
        if had_errors {
            println!("{}", format!("{total} token(s) emitted, with errors").yellow().bold());
        } else {
            println!("{}", format!("{total} token(s) emitted").green());
        }
    }

    if !cli.no_exit_code && had_errors {
        process::exit(1);
    }
}

fn tokenize_file(path: &PathBuf, config: &TokenizerConfig) -> FileResult {
    let file = path.display().to_string();
    let raw = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            return FileResult {
                file,
                tokens: Vec::new(),
                error: Some(LexError::token(format!("could not read file: {e}"), pylex::Pos::new(0, 0))),
            };
        }
    };

    let source = match decode(&raw) {
        Ok(s) => s,
        Err(e) => {
            return FileResult {
                file,
                tokens: Vec::new(),
                error: Some(e),
            };
        }
    };

    match Tokenizer::tokenize(&source, config.clone()) {
        Ok(tokens) => FileResult { file, tokens, error: None },
        Err(e) => FileResult {
            file,
            tokens: Vec::new(),
            error: Some(e),
        },
    }
}

/// Decode `raw` according to the encoding [`pylex::encoding::detect_encoding`]
/// reports, so a `# coding: ...` cookie actually changes how the bytes are
/// read rather than only being validated. `utf-8`/`utf-8-sig`/`ascii` are
/// subsets of UTF-8 and decode with the standard library directly;
/// `iso-8859-1`/`latin-1` map every byte 0..=255 onto the identical Unicode
/// code point, so no external codec table is needed. Any other codec
/// `codec_known` accepts (`utf-16`, `utf-32`, `cp1252`) has no such
/// byte-cheap mapping and falls back to lossy UTF-8, same as an unrecognized
/// declaration would under the original tokenizer's encoding-agnostic reader.
fn decode(raw: &[u8]) -> Result<String, LexError> {
    let lines: Vec<&[u8]> = raw.split_inclusive(|&b| b == b'\n').collect();
    let detected = pylex::encoding::detect_encoding(lines.into_iter())?;
    match detected.encoding.to_lowercase().as_str() {
        "utf-8" | "utf-8-sig" | "ascii" | "us-ascii" => {
            let bytes = raw.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(raw);
            match std::str::from_utf8(bytes) {
                Ok(s) => Ok(s.to_string()),
                Err(e) => Err(LexError::encoding(format!("invalid {}: {e}", detected.encoding))),
            }
        }
        "iso-8859-1" | "latin-1" | "latin1" => Ok(raw.iter().map(|&b| b as char).collect()),
        _ => Ok(String::from_utf8_lossy(raw).into_owned()),
    }
}

fn print_json(results: &[FileResult]) {
    let items: Vec<serde_json::Value> = results
        .iter()
        .map(|r| {
            let tokens: Vec<serde_json::Value> = r
                .tokens
                .iter()
                .map(|t| {
                    json!({
                        "kind": t.kind.to_string(),
                        "text": t.text,
                        "start": [t.start.row, t.start.col],
                        "end": [t.end.row, t.end.col],
                    })
                })
                .collect();
            json!({
                "file": r.file,
                "tokens": tokens,
                "error": r.error.as_ref().map(|e| e.to_string()),
            })
        })
        .collect();

    let output = json!({
        "files": items,
        "count": results.len(),
    });

    println!(
        "{}",
        serde_json::to_string_pretty(&output).expect("serde_json::Value is always serialisable")
    );
}
