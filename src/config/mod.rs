//! Project configuration (`tplinc.toml`).
//!
//! The configuration file is optional. When no explicit path is given it is
//! discovered by walking up from the starting directory; when none is found
//! every setting takes its default.
//!
//! # File Format
//!
//! ```toml
//! [resolve]
//! # Extra roots searched for plain references, relative to this file
//! paths = ["partials", "shared"]
//! # Tried in order when the exact reference does not exist
//! extensions = [".tpl", ".html"]
//!
//! [output]
//! # commonjs | esm | function | body
//! format = "commonjs"
//! # Name of the options parameter in the emitted function
//! options-ident = "options"
//! ```
//!
//! Unknown keys are rejected so typos surface instead of being ignored.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::{CONFIG_FILE_NAME, DEFAULT_OPTIONS_IDENT};
use crate::core::{FileOps, TplincError};
use crate::host::FsHost;
use crate::output::{OutputFormat, is_valid_identifier};

/// Settings for the filesystem resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolveConfig {
    /// Fallback roots for plain references
    #[serde(default)]
    pub paths: Vec<PathBuf>,

    /// Extensions tried after the exact reference
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// Settings for the emitted artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default = "default_options_ident")]
    pub options_ident: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            options_ident: default_options_ident(),
        }
    }
}

fn default_options_ident() -> String {
    DEFAULT_OPTIONS_IDENT.to_string()
}

/// Contents of a `tplinc.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default)]
    pub resolve: ResolveConfig,

    #[serde(default)]
    pub output: OutputConfig,

    /// Directory relative search paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl ProjectConfig {
    /// Parse configuration text. `file` is used in error messages only.
    pub fn from_toml_str(content: &str, file: &Path) -> Result<Self, TplincError> {
        let mut config: Self =
            toml::from_str(content).map_err(|e| TplincError::ConfigParseError {
                file: file.display().to_string(),
                reason: e.to_string(),
            })?;

        config.base_dir = file.parent().map(Path::to_path_buf).unwrap_or_default();
        config.validate(file)?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = FileOps::read_with_context(path, "loading configuration").await?;
        let config = Self::from_toml_str(&content, path)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the configuration for a run.
    ///
    /// An explicit path must exist. Otherwise the nearest `tplinc.toml` at or
    /// above `start` is used, falling back to defaults rooted at `start`.
    pub async fn discover(explicit: Option<&Path>, start: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(TplincError::ConfigNotFound {
                    path: path.display().to_string(),
                }
                .into());
            }
            return Self::load(path).await;
        }

        match find_config_from(start) {
            Some(path) => Self::load(&path)
                .await
                .with_context(|| format!("Failed to load configuration from {}", path.display())),
            None => {
                tracing::debug!("No {} found above {}, using defaults", CONFIG_FILE_NAME, start.display());
                Ok(Self {
                    base_dir: start.to_path_buf(),
                    ..Self::default()
                })
            }
        }
    }

    fn validate(&self, file: &Path) -> Result<(), TplincError> {
        let invalid = |reason: String| TplincError::InvalidConfig {
            file: file.display().to_string(),
            reason,
        };

        if !is_valid_identifier(&self.output.options_ident) {
            return Err(invalid(format!(
                "options-ident '{}' is not a valid identifier",
                self.output.options_ident
            )));
        }

        if let Some(ext) = self.resolve.extensions.iter().find(|e| e.trim_start_matches('.').is_empty()) {
            return Err(invalid(format!("extension '{ext}' is empty")));
        }

        Ok(())
    }

    /// Search paths made absolute against the configuration's directory.
    pub fn search_paths(&self) -> Vec<PathBuf> {
        self.resolve
            .paths
            .iter()
            .map(|p| if p.is_absolute() { p.clone() } else { self.base_dir.join(p) })
            .collect()
    }

    /// A filesystem host configured with these resolve settings.
    pub fn build_host(&self) -> FsHost {
        let search_paths = self.search_paths();
        for path in search_paths.iter().filter(|p| !p.is_dir()) {
            tracing::warn!("Search path {} does not exist", path.display());
        }

        FsHost::new()
            .with_search_paths(search_paths)
            .with_extensions(&self.resolve.extensions)
    }
}

/// Walk up from `start` looking for a configuration file.
pub fn find_config_from(start: &Path) -> Option<PathBuf> {
    start.ancestors().map(|dir| dir.join(CONFIG_FILE_NAME)).find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ProjectConfig::from_toml_str("", Path::new("/p/tplinc.toml")).unwrap();
        assert_eq!(config.output.format, OutputFormat::CommonJs);
        assert_eq!(config.output.options_ident, "options");
        assert!(config.resolve.paths.is_empty());
        assert_eq!(config.base_dir, PathBuf::from("/p"));
    }

    #[test]
    fn test_full_config() {
        let content = r#"
            [resolve]
            paths = ["partials", "/abs/shared"]
            extensions = [".tpl", "html"]

            [output]
            format = "esm"
            options-ident = "opts"
        "#;
        let config = ProjectConfig::from_toml_str(content, Path::new("/p/tplinc.toml")).unwrap();

        assert_eq!(config.output.format, OutputFormat::EsModule);
        assert_eq!(config.output.options_ident, "opts");
        assert_eq!(
            config.search_paths(),
            vec![PathBuf::from("/p/partials"), PathBuf::from("/abs/shared")]
        );
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = ProjectConfig::from_toml_str("[resolve]\npath = []\n", Path::new("tplinc.toml"))
            .unwrap_err();
        assert!(matches!(err, TplincError::ConfigParseError { .. }));
        assert!(err.to_string().contains("path"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = ProjectConfig::from_toml_str(
            "[output]\noptions-ident = \"my-opts\"\n",
            Path::new("tplinc.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, TplincError::InvalidConfig { .. }));

        let err = ProjectConfig::from_toml_str("[resolve]\nextensions = [\".\"]\n", Path::new("tplinc.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("extension '.' is empty"));

        let err = ProjectConfig::from_toml_str("[output]\nformat = \"amd\"\n", Path::new("tplinc.toml"))
            .unwrap_err();
        assert!(matches!(err, TplincError::ConfigParseError { .. }));
    }

    #[tokio::test]
    async fn test_discover_walks_up() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(CONFIG_FILE_NAME), "[output]\nformat = \"body\"\n").unwrap();
        let nested = temp.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config_from(&nested), Some(temp.path().join(CONFIG_FILE_NAME)));

        let config = ProjectConfig::discover(None, &nested).await.unwrap();
        assert_eq!(config.output.format, OutputFormat::Body);
        assert_eq!(config.base_dir, temp.path());
    }

    #[tokio::test]
    async fn test_discover_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let config = ProjectConfig::discover(None, temp.path()).await.unwrap();
        assert_eq!(config.output, OutputConfig::default());
        assert_eq!(config.base_dir, temp.path());
    }

    #[tokio::test]
    async fn test_discover_explicit_must_exist() {
        let temp = TempDir::new().unwrap();
        let err = ProjectConfig::discover(Some(&temp.path().join("nope.toml")), temp.path())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TplincError>(),
            Some(TplincError::ConfigNotFound { .. })
        ));
    }
}
