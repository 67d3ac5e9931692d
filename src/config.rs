use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub index: IndexConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoaderConfig {
    /// Per-source fetch timeout. `0` disables the timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_bypass_cache")]
    pub bypass_cache: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            bypass_cache: default_bypass_cache(),
        }
    }
}

impl LoaderConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_bypass_cache() -> bool {
    true
}

/// Record fields the fuzzy matcher searches.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchKey {
    Name,
    Set,
    Number,
    Rarity,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_min_match_chars")]
    pub min_match_chars: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_keys")]
    pub keys: Vec<SearchKey>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            min_match_chars: default_min_match_chars(),
            limit: default_limit(),
            keys: default_keys(),
        }
    }
}

fn default_threshold() -> f64 {
    0.35
}
fn default_min_match_chars() -> usize {
    2
}
fn default_limit() -> usize {
    50
}
fn default_keys() -> Vec<SearchKey> {
    vec![
        SearchKey::Name,
        SearchKey::Set,
        SearchKey::Number,
        SearchKey::Rarity,
    ]
}

/// Read and validate a TOML config file.
///
/// Matcher parameters (`threshold`, `min_match_chars`, `keys`) are checked
/// when an index is built, not here, so a bad value is reported per build.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.index.limit < 1 {
        anyhow::bail!("index.limit must be >= 1");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("search.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn empty_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&write(&tmp, "")).unwrap();
        assert_eq!(config.loader.timeout_secs, 30);
        assert!(config.loader.bypass_cache);
        assert_eq!(config.index.threshold, 0.35);
        assert_eq!(config.index.min_match_chars, 2);
        assert_eq!(config.index.limit, 50);
        assert_eq!(config.index.keys.len(), 4);
    }

    #[test]
    fn overrides_are_read() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            r#"
[loader]
timeout_secs = 0

[index]
threshold = 0.2
keys = ["name"]
"#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.loader.timeout(), None);
        assert_eq!(config.index.threshold, 0.2);
        assert_eq!(config.index.keys, vec![SearchKey::Name]);
        assert_eq!(config.index.limit, 50);
    }

    #[test]
    fn zero_limit_rejected() {
        let tmp = TempDir::new().unwrap();
        let err = load_config(&write(&tmp, "[index]\nlimit = 0\n")).unwrap_err();
        assert!(err.to_string().contains("index.limit"));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        assert!(load_config(&write(&tmp, "[index]\nkeys = [\"price\"]\n")).is_err());
    }

    #[test]
    fn example_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/search.example.toml");
        let config = load_config(&path).unwrap();
        assert_eq!(config.index.threshold, 0.35);
        assert_eq!(config.loader.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn missing_file_has_context() {
        let err = load_config(Path::new("/nonexistent/search.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
