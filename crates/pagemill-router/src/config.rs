// File: src/config.rs
// Purpose: Configuration parsing from pagemill.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::manifest::ManifestBuilder;
use crate::route::TrailingSlash;
use crate::source::PageSource;

/// Project configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub build: BuildConfig,
}

/// Routing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutingConfig {
    /// Directory containing page files (default: "src/pages")
    #[serde(default = "default_pages_dir")]
    pub pages_dir: String,

    /// Trailing slash policy for patterns and generated paths (default: ignore)
    #[serde(default)]
    pub trailing_slash: TrailingSlash,

    /// File extensions that produce endpoints instead of pages
    #[serde(default = "default_endpoint_extensions")]
    pub endpoint_extensions: Vec<String>,
}

/// Build configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BuildConfig {
    /// Fail the build when two routes prerender the same pathname
    #[serde(default)]
    pub strict_route_conflicts: bool,
}

// Default values
fn default_pages_dir() -> String {
    "src/pages".to_string()
}

fn default_endpoint_extensions() -> Vec<String> {
    vec!["js".to_string(), "ts".to_string()]
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            pages_dir: default_pages_dir(),
            trailing_slash: TrailingSlash::default(),
            endpoint_extensions: default_endpoint_extensions(),
        }
    }
}

impl RoutingConfig {
    /// A manifest builder for `source` carrying these settings
    pub fn manifest_builder<S: PageSource>(&self, source: S) -> ManifestBuilder<S> {
        ManifestBuilder::new(source, &self.pages_dir)
            .trailing_slash(self.trailing_slash)
            .endpoint_extensions(self.endpoint_extensions.iter().cloned())
    }
}

impl Config {
    /// Load configuration from pagemill.toml
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist or is empty, return default config
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load configuration from default path (./pagemill.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("pagemill.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.routing.pages_dir, "src/pages");
        assert_eq!(config.routing.trailing_slash, TrailingSlash::Ignore);
        assert_eq!(config.routing.endpoint_extensions, vec!["js", "ts"]);
        assert!(!config.build.strict_route_conflicts);
    }

    #[test]
    fn test_empty_config() {
        let config = toml::from_str::<Config>("").unwrap_or_default();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_custom_routing() {
        let toml = r#"
            [routing]
            pages_dir = "site/pages"
            trailing_slash = "always"

            [build]
            strict_route_conflicts = true
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.routing.pages_dir, "site/pages");
        assert_eq!(config.routing.trailing_slash, TrailingSlash::Always);
        assert_eq!(config.routing.endpoint_extensions, vec!["js", "ts"]);
        assert!(config.build.strict_route_conflicts);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let toml = r#"
            [routing]
            trailing_slash = "sometimes"
        "#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn test_load_missing_and_blank_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = Config::load(dir.path().join("pagemill.toml")).unwrap();
        assert_eq!(missing, Config::default());

        let blank = dir.path().join("blank.toml");
        std::fs::write(&blank, "   \n").unwrap();
        assert_eq!(Config::load(&blank).unwrap(), Config::default());
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[routing\npages_dir = 1").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config file"));
    }
}
