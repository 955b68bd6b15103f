use std::path::PathBuf;
use std::process::Command;

// ── helpers ──────────────────────────────────────────────────────────────────

fn pylex_bin() -> PathBuf {
    // CARGO_BIN_EXE_pylex is set by cargo test for integration tests
    PathBuf::from(env!("CARGO_BIN_EXE_pylex"))
}

struct TempPy {
    dir: tempfile::TempDir,
    files: Vec<PathBuf>,
}

impl TempPy {
    fn new() -> Self {
        Self {
            dir: tempfile::TempDir::new().unwrap(),
            files: Vec::new(),
        }
    }

    fn file(&mut self, name: &str, content: &str) -> &mut Self {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        self.files.push(path);
        self
    }

    /// Run pylex with the given extra args. Returns (stdout, stderr, exit_code).
    fn run(&self, extra: &[&str]) -> (String, String, i32) {
        let mut cmd = Command::new(pylex_bin());
        for f in &self.files {
            cmd.arg(f);
        }
        for a in extra {
            cmd.arg(a);
        }
        let out = cmd.output().expect("failed to run pylex");
        (
            String::from_utf8_lossy(&out.stdout).into_owned(),
            String::from_utf8_lossy(&out.stderr).into_owned(),
            out.status.code().unwrap_or(-1),
        )
    }

    /// Convenience: run with --no-exit-code so exit code is always 0.
    fn run_no_exit(&self, extra: &[&str]) -> String {
        let mut args = vec!["--no-exit-code"];
        args.extend_from_slice(extra);
        let (stdout, _, _) = self.run(&args);
        stdout
    }
}

// ── basic output ─────────────────────────────────────────────────────────────

#[test]
fn test_clean_file_emits_tokens() {
    let mut t = TempPy::new();
    t.file("clean.py", "x = 1\nprint(x)\n");
    let out = t.run_no_exit(&[]);
    assert!(out.contains("NAME"));
    assert!(out.contains("token(s) emitted"));
}

#[test]
fn test_exit_code_0_when_clean() {
    let mut t = TempPy::new();
    t.file("clean.py", "x = 1\nprint(x)\n");
    let (_, _, code) = t.run(&[]);
    assert_eq!(code, 0);
}

#[test]
fn test_exit_code_1_on_unterminated_triple_string() {
    let mut t = TempPy::new();
    t.file("bad.py", "x = '''no close\n");
    let (_, _, code) = t.run(&[]);
    assert_eq!(code, 1);
}

#[test]
fn test_no_exit_code_flag_suppresses_failure() {
    let mut t = TempPy::new();
    t.file("bad.py", "x = '''no close\n");
    let (_, _, code) = t.run(&["--no-exit-code"]);
    assert_eq!(code, 0);
}

#[test]
fn test_error_is_reported_in_text_output() {
    let mut t = TempPy::new();
    t.file("bad.py", "x = '''no close\n");
    let out = t.run_no_exit(&[]);
    assert!(out.contains("error"));
    assert!(out.contains("with errors"));
}

#[test]
fn test_same_line_unclosed_string_is_not_fatal() {
    // No trailing backslash-continuation: the opener fails to match, an
    // ERRORTOKEN is emitted for the quote, and the rest of the file still
    // tokenizes normally — this is a clean run, not a tokenizer failure.
    let mut t = TempPy::new();
    t.file("bad.py", "x = 'no close\ny = 1\n");
    let (stdout, _, code) = t.run(&[]);
    assert_eq!(code, 0);
    assert!(stdout.contains("ERRORTOKEN"));
    assert!(stdout.contains("y"));
    assert!(stdout.contains("token(s) emitted"));
    assert!(!stdout.contains("with errors"));
}

// ── --select filter ───────────────────────────────────────────────────────────

#[test]
fn test_select_filters_token_kinds() {
    let mut t = TempPy::new();
    t.file("clean.py", "x = 1\n");
    let out = t.run_no_exit(&["--select", "NAME"]);
    assert!(out.contains("NAME"));
    assert!(!out.contains("NUMBER"));
}

#[test]
fn test_select_multiple_kinds() {
    let mut t = TempPy::new();
    t.file("clean.py", "x = 1\n");
    let out = t.run_no_exit(&["--select", "NAME,NUMBER"]);
    assert!(out.contains("NAME"));
    assert!(out.contains("NUMBER"));
}

// ── --json output ─────────────────────────────────────────────────────────────

#[test]
fn test_json_output_is_well_formed() {
    let mut t = TempPy::new();
    t.file("clean.py", "x = 1\n");
    let out = t.run_no_exit(&["--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).expect("stdout must be valid JSON");
    assert!(parsed["files"].is_array());
    assert_eq!(parsed["count"], 1);
}

#[test]
fn test_json_error_field_present_on_failure() {
    let mut t = TempPy::new();
    t.file("bad.py", "x = '''no close\n");
    let out = t.run_no_exit(&["--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert!(!parsed["files"][0]["error"].is_null());
}

// ── encoding cookie actually drives decoding ──────────────────────────────────

#[test]
fn test_coding_cookie_decodes_declared_encoding() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut raw = b"# coding: iso-8859-1\n".to_vec();
    raw.extend_from_slice(b"x = 'caf\xe9'\n"); // \xe9 is Latin-1 'e' with acute accent
    std::fs::write(dir.path().join("latin1.py"), &raw).unwrap();

    let out = Command::new(pylex_bin())
        .arg(dir.path().join("latin1.py"))
        .arg("--no-exit-code")
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains('\u{e9}'), "expected a correctly decoded \u{e9}, got: {stdout}");
    assert!(!stdout.contains('\u{fffd}'), "declared encoding should avoid lossy replacement, got: {stdout}");
}

// ── directory scanning / exclusion ────────────────────────────────────────────

#[test]
fn test_scan_directory_finds_all_py_files() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();
    std::fs::write(dir.path().join("b.py"), "y = 2\n").unwrap();
    std::fs::write(dir.path().join("readme.txt"), "not python\n").unwrap();

    let out = Command::new(pylex_bin())
        .arg(dir.path())
        .arg("--no-exit-code")
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("a.py"));
    assert!(stdout.contains("b.py"));
    assert!(!stdout.contains("readme.txt"));
}

#[test]
fn test_exclude_skips_directory() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("vendor")).unwrap();
    std::fs::write(dir.path().join("vendor/skip.py"), "x = 1\n").unwrap();
    std::fs::write(dir.path().join("main.py"), "x = 1\n").unwrap();

    let out = Command::new(pylex_bin())
        .arg(dir.path())
        .arg("--exclude")
        .arg("vendor")
        .arg("--no-exit-code")
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("main.py"));
    assert!(!stdout.contains("vendor"));
}

#[test]
fn test_multiple_files_all_reported() {
    let mut t = TempPy::new();
    t.file("a.py", "x = 1\n");
    t.file("b.py", "y = 2\n");
    let out = t.run_no_exit(&[]);
    assert!(out.contains("a.py"));
    assert!(out.contains("b.py"));
}

// ── no-args welcome screen ────────────────────────────────────────────────────

#[test]
fn test_no_args_shows_welcome_and_exits_zero() {
    let out = Command::new(pylex_bin()).output().unwrap();
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.to_lowercase().contains("pylex") || stdout.contains("Usage"));
}

// ── async/await contextual keywords ───────────────────────────────────────────

#[test]
fn test_async_def_promotes_await_by_default() {
    let mut t = TempPy::new();
    t.file("f.py", "async def f():\n    await g()\n");
    let out = t.run_no_exit(&[]);
    assert!(out.contains("ASYNC"));
    assert!(out.contains("AWAIT"));
}

#[test]
fn test_no_async_keywords_flag_treats_as_plain_name() {
    let mut t = TempPy::new();
    t.file("f.py", "x = 1\n");
    let out = t.run_no_exit(&["--no-async-keywords"]);
    assert!(out.contains("token(s) emitted"));
}
