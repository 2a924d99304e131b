#![forbid(unsafe_code)]

//! Cache configuration.
//!
//! [`CacheConfig`] names the cache root and the registry file, and carries
//! the stack and line-break policy. It can be loaded from TOML and then
//! overridden from the environment.
//!
//! ```toml
//! # squircle-cache.toml
//! cache_dir = "/data/squircle/cache"
//! registry_path = "/data/squircle/documents.json"
//! max_stack_depth = 0
//! line_break = "lf"
//! ```
//!
//! # Environment
//!
//! - `SQUIRCLE_CACHE_DIR`: overrides `cache_dir`.
//! - `SQUIRCLE_REGISTRY`: overrides `registry_path`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filesystem::{FileParams, LineBreak};
use crate::stack::StackConfig;

pub const CACHE_DIR_ENV: &str = "SQUIRCLE_CACHE_DIR";
pub const REGISTRY_ENV: &str = "SQUIRCLE_REGISTRY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding every `.cache` blob.
    pub cache_dir: PathBuf,
    /// JSON file backing the document registry.
    pub registry_path: PathBuf,
    /// Depth limit for restored stacks (0 = unlimited).
    pub max_stack_depth: usize,
    /// Line separator written to content blobs.
    pub line_break: LineBreak,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
            registry_path: PathBuf::from("documents.json"),
            max_stack_depth: 0,
            line_break: LineBreak::Lf,
        }
    }
}

impl CacheConfig {
    /// Configuration rooted at `cache_dir`, registry alongside it.
    #[must_use]
    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        let cache_dir = cache_dir.into();
        let registry_path = cache_dir
            .parent()
            .map(|p| p.join("documents.json"))
            .unwrap_or_else(|| PathBuf::from("documents.json"));
        Self {
            cache_dir,
            registry_path,
            ..Self::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Apply `SQUIRCLE_CACHE_DIR` / `SQUIRCLE_REGISTRY` if set and non-empty.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(CACHE_DIR_ENV).filter(|v| !v.is_empty()) {
            self.cache_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup(REGISTRY_ENV).filter(|v| !v.is_empty()) {
            self.registry_path = PathBuf::from(path);
        }
        self
    }

    /// Problems with this configuration. Empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.cache_dir.as_os_str().is_empty() {
            errors.push("cache_dir must not be empty".into());
        }
        if self.registry_path.as_os_str().is_empty() {
            errors.push("registry_path must not be empty".into());
        }
        if !self.registry_path.as_os_str().is_empty()
            && !self.cache_dir.as_os_str().is_empty()
            && self.registry_path.starts_with(&self.cache_dir)
        {
            errors.push(format!(
                "registry_path {} must not live inside cache_dir (clearing caches would delete it)",
                self.registry_path.display()
            ));
        }
        errors
    }

    /// Validate, returning the config on success.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    #[must_use]
    pub fn stack_config(&self) -> StackConfig {
        StackConfig::new(self.max_stack_depth)
    }

    #[must_use]
    pub fn file_params(&self) -> FileParams {
        FileParams::default().with_line_break(self.line_break)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(CacheConfig::default().validate().is_empty());
        assert_eq!(CacheConfig::default().stack_config(), StackConfig::unlimited());
    }

    #[test]
    fn parses_partial_toml() {
        let config = CacheConfig::from_toml_str(
            r#"
            cache_dir = "/data/cache"
            line_break = "crlf"
            "#,
        )
        .unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("/data/cache"));
        assert_eq!(config.line_break, LineBreak::Crlf);
        assert_eq!(config.registry_path, PathBuf::from("documents.json"));
        assert_eq!(config.max_stack_depth, 0);
    }

    #[test]
    fn rejects_unknown_line_break() {
        assert!(matches!(
            CacheConfig::from_toml_str(r#"line_break = "nel""#),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn from_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            CacheConfig::from_toml_file(dir.path().join("nope.toml")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn overrides_replace_paths() {
        let config = CacheConfig::default().with_overrides(|key| match key {
            CACHE_DIR_ENV => Some("/override/cache".into()),
            REGISTRY_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.cache_dir, PathBuf::from("/override/cache"));
        assert_eq!(config.registry_path, PathBuf::from("documents.json"));
    }

    #[test]
    fn registry_inside_cache_dir_is_invalid() {
        let config = CacheConfig {
            cache_dir: PathBuf::from("/data/cache"),
            registry_path: PathBuf::from("/data/cache/documents.json"),
            ..CacheConfig::default()
        };
        assert_eq!(config.validate().len(), 1);
        assert!(matches!(config.validated(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn registry_nested_under_cache_dir_is_invalid() {
        let config = CacheConfig {
            cache_dir: PathBuf::from("/data/cache"),
            registry_path: PathBuf::from("/data/cache/sub/documents.json"),
            ..CacheConfig::default()
        };
        assert_eq!(config.validate().len(), 1);

        let sibling = CacheConfig {
            cache_dir: PathBuf::from("/data/cache"),
            registry_path: PathBuf::from("/data/cache-meta/documents.json"),
            ..CacheConfig::default()
        };
        assert!(sibling.validate().is_empty());
    }

    #[test]
    fn with_cache_dir_places_registry_beside_it() {
        let config = CacheConfig::with_cache_dir("/data/squircle/cache");
        assert_eq!(
            config.registry_path,
            PathBuf::from("/data/squircle/documents.json")
        );
        assert!(config.validate().is_empty());
    }
}
