use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Zhuyin/Bopomofo-specific configuration that extends the base `Config` from core.
///
/// This configuration includes:
/// - All generic options from `zhuyin_core::Config` (flattened via serde)
/// - Location of the redb dictionary
/// - An optional JSON dictionary to bulk-load at startup
///
/// # Example
///
/// ```rust
/// use libzhuyin::ZhuyinConfig;
///
/// let text = "parallel_lookup = true\ndatabase = \"zhuyin.redb\"";
/// let config = ZhuyinConfig::from_toml_str(text).unwrap();
/// assert!(config.base().parallel_lookup);
/// assert_eq!(config.database, std::path::PathBuf::from("zhuyin.redb"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ZhuyinConfig {
    /// Base configuration fields (lookup strategy, fallback tail)
    #[serde(flatten)]
    pub base: zhuyin_core::Config,

    /// Path of the redb dictionary
    pub database: PathBuf,

    /// JSON dictionary to bulk-load into `database` before use
    pub dictionary: Option<PathBuf>,
}

impl Default for ZhuyinConfig {
    fn default() -> Self {
        Self {
            base: zhuyin_core::Config::default(),
            database: default_database_path(),
            dictionary: None,
        }
    }
}

impl ZhuyinConfig {
    /// Convert this zhuyin config into the base config for the segmentation engine
    pub fn into_base(self) -> zhuyin_core::Config {
        self.base
    }

    /// Get a reference to the base config
    pub fn base(&self) -> &zhuyin_core::Config {
        &self.base
    }

    /// Get a mutable reference to the base config
    pub fn base_mut(&mut self) -> &mut zhuyin_core::Config {
        &mut self.base
    }

    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// `~/.zhuyin/zhuyin.redb`, or the working directory when no home is set.
fn default_database_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".zhuyin").join("zhuyin.redb")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let cfg = ZhuyinConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, ZhuyinConfig::default());
        assert!(cfg.database.ends_with("zhuyin.redb"));
    }

    #[test]
    fn test_flattened_base_fields() {
        let cfg = ZhuyinConfig::from_toml_str(
            "resolve_unmatched_tail = true\ndictionary = \"data/phrases.json\"",
        )
        .unwrap();
        assert!(cfg.base().resolve_unmatched_tail);
        assert!(!cfg.base().parallel_lookup);
        assert_eq!(cfg.dictionary, Some(PathBuf::from("data/phrases.json")));
    }
}
