//! Reconciliation settings
//!
//! Settings come from an optional YAML file and are overridden by command line flags.
//!
//! ```yaml
//! project_root: ../UnityProject
//! line_ending: crlf
//! options_file_suffix: csc.rsp
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Suffix of the `Include` path that marks the compiler options file
pub const DEFAULT_OPTIONS_FILE_SUFFIX: &str = "csc.rsp";

/// Line separator written after the XML declaration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// Follow the input document; `\r\n` on Windows and `\n` elsewhere when it has no line breaks
    #[default]
    Platform,
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Platform if cfg!(windows) => "\r\n",
            LineEnding::Platform => "\n",
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
        }
    }

    /// The separator to write for a document read from `input`
    pub fn for_input(self, input: &str) -> &'static str {
        match (self, input.find('\n')) {
            (LineEnding::Platform, Some(i)) if input[..i].ends_with('\r') => "\r\n",
            (LineEnding::Platform, Some(_)) => "\n",
            _ => self.as_str(),
        }
    }
}

/// Settings for reconciling project files
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Directory `Include` paths are resolved against; defaults to the project file's directory
    pub project_root: Option<PathBuf>,
    pub line_ending: LineEnding,
    pub options_file_suffix: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            project_root: None,
            line_ending: LineEnding::default(),
            options_file_suffix: DEFAULT_OPTIONS_FILE_SUFFIX.to_string(),
        }
    }
}

/// Errors loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SyncConfig {
    /// Parse settings from YAML text; an empty document yields the defaults
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load settings from a YAML file
    ///
    /// A relative `project_root` is taken relative to the directory of the file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&text)?;

        config.project_root = config.project_root.map(|root| match path.parent() {
            Some(dir) if root.is_relative() => dir.join(root),
            _ => root,
        });

        tracing::debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// The directory `Include` paths of `project_file` resolve against
    pub fn project_root_for(&self, project_file: &Path) -> PathBuf {
        match &self.project_root {
            Some(root) => root.clone(),
            None => project_file
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.options_file_suffix, "csc.rsp");
        assert_eq!(config.line_ending, LineEnding::Platform);
        assert_eq!(config.project_root, None);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(SyncConfig::from_yaml_str("").unwrap(), SyncConfig::default());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = SyncConfig::from_yaml_str("line_ending: crlf\n").unwrap();
        assert_eq!(config.line_ending, LineEnding::Crlf);
        assert_eq!(config.options_file_suffix, "csc.rsp");
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(SyncConfig::from_yaml_str("lang_version: 10\n").is_err());
    }

    #[test]
    fn test_invalid_line_ending_is_rejected() {
        assert!(SyncConfig::from_yaml_str("line_ending: cr\n").is_err());
    }

    #[test]
    fn test_line_ending_strings() {
        assert_eq!(LineEnding::Lf.as_str(), "\n");
        assert_eq!(LineEnding::Crlf.as_str(), "\r\n");
        if cfg!(windows) {
            assert_eq!(LineEnding::Platform.as_str(), "\r\n");
        } else {
            assert_eq!(LineEnding::Platform.as_str(), "\n");
        }
    }

    #[test]
    fn test_platform_follows_input_line_breaks() {
        assert_eq!(LineEnding::Platform.for_input("<a>\r\n</a>\n"), "\r\n");
        assert_eq!(LineEnding::Platform.for_input("<a>\n</a>\r\n"), "\n");
        assert_eq!(LineEnding::Platform.for_input("<a/>"), LineEnding::Platform.as_str());
        assert_eq!(LineEnding::Lf.for_input("<a>\r\n</a>"), "\n");
        assert_eq!(LineEnding::Crlf.for_input("<a>\n</a>"), "\r\n");
    }

    #[test]
    fn test_load_resolves_relative_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("langversion.yaml");
        fs::write(&path, "project_root: unity\noptions_file_suffix: build.rsp\n").unwrap();

        let config = SyncConfig::load(&path).unwrap();
        assert_eq!(config.project_root, Some(dir.path().join("unity")));
        assert_eq!(config.options_file_suffix, "build.rsp");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SyncConfig::load(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_project_root_defaults_to_project_dir() {
        let config = SyncConfig::default();
        assert_eq!(
            config.project_root_for(Path::new("/work/game/Assembly-CSharp.csproj")),
            PathBuf::from("/work/game")
        );
        assert_eq!(
            config.project_root_for(Path::new("Assembly-CSharp.csproj")),
            PathBuf::from(".")
        );
    }
}
