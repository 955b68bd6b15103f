//! Tokenizer configuration, optionally loaded from a `pylex.toml` file next
//! to the scanned sources — mirrors the `serde` + `toml` config layer the
//! wider example pack reaches for (e.g. `faxt`'s own config file support),
//! since the originating grammar hardcodes these as module-level constants.

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Recognize `async`/`await` as contextual keywords inside `async def`
    /// suites. Disabling this degrades to treating both as plain names,
    /// matching grammars that predate the `async`/`await` soft-keyword era.
    pub async_keywords: bool,
    /// Column width a tab advances to the next multiple of, during
    /// indentation measurement.
    pub tab_size: u32,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            async_keywords: true,
            tab_size: 8,
        }
    }
}

impl TokenizerConfig {
    /// Load `pylex.toml` from `dir` if present; falls back to defaults when
    /// the file is absent.
    pub fn load_from_dir(dir: &Path) -> anyhow::Result<Self> {
        let candidate = dir.join("pylex.toml");
        if !candidate.is_file() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&candidate)?;
        let config: Self = toml::from_str(&raw)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_async_keywords() {
        let c = TokenizerConfig::default();
        assert!(c.async_keywords);
        assert_eq!(c.tab_size, 8);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let c = TokenizerConfig::load_from_dir(dir.path()).unwrap();
        assert!(c.async_keywords);
    }

    #[test]
    fn parses_overrides_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("pylex.toml"), "async_keywords = false\ntab_size = 4\n").unwrap();
        let c = TokenizerConfig::load_from_dir(dir.path()).unwrap();
        assert!(!c.async_keywords);
        assert_eq!(c.tab_size, 4);
    }
}
