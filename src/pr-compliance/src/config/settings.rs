//! Settings deserialization and validation.

use super::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Largest page size the GitHub REST API honors.
const MAX_PER_PAGE: u8 = 100;

/// What to do when the aggregation output already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputPolicy {
    /// Abort the aggregation run.
    #[default]
    Fail,
    /// Replace the existing file.
    Overwrite,
    /// Leave the existing file untouched and report the skip.
    Skip,
}

impl OutputPolicy {
    /// Returns the policy as it is spelled in settings files.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Overwrite => "overwrite",
            Self::Skip => "skip",
        }
    }
}

/// Settings for a crawl or aggregation run.
///
/// Parsed from TOML with kebab-case keys, e.g.
///
/// ```toml
/// api-base-url = "https://api.github.com"
/// safety-margin-seconds = 10
/// compliance-owner-substring = "scytale"
/// data-dir = "data"
/// on-output-exists = "fail"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
    /// Root of the GitHub REST API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Seconds added on top of every rate-limit wait.
    #[serde(default = "default_safety_margin_seconds")]
    pub safety_margin_seconds: u64,

    /// Owner substring (case-insensitive) a compliant repository must carry.
    #[serde(default = "default_compliance_owner_substring")]
    pub compliance_owner_substring: String,

    /// Directory holding the per-PR record files and the aggregation output.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Page size requested from list endpoints.
    #[serde(default = "default_per_page")]
    pub per_page: u8,

    /// Aggregation output file name, relative to `data_dir`.
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// Behavior when the aggregation output already exists.
    #[serde(default)]
    pub on_output_exists: OutputPolicy,
}

/// Default API root.
pub fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

/// Default safety margin added to rate-limit waits.
pub fn default_safety_margin_seconds() -> u64 {
    10
}

/// Default trust marker for compliant repository owners.
pub fn default_compliance_owner_substring() -> String {
    "scytale".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_per_page() -> u8 {
    MAX_PER_PAGE
}

fn default_output_file() -> String {
    "transformation.parquet".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            safety_margin_seconds: default_safety_margin_seconds(),
            compliance_owner_substring: default_compliance_owner_substring(),
            data_dir: default_data_dir(),
            per_page: default_per_page(),
            output_file: default_output_file(),
            on_output_exists: OutputPolicy::default(),
        }
    }
}

impl Settings {
    /// Loads settings from a TOML file and validates them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file is missing or unreadable, and
    /// the errors of [`Settings::parse`] otherwise.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!(path = %path.display(), "Loading settings");

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::parse(&content, path)
    }

    /// Loads settings from `path` when given, otherwise returns validated defaults.
    ///
    /// # Errors
    ///
    /// See [`Settings::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                debug!("No settings file given, using defaults");
                let settings = Self::default();
                settings.validate(Path::new("<defaults>"))?;
                Ok(settings)
            }
        }
    }

    /// Parses and validates settings from TOML text.
    ///
    /// `origin` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn parse(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.display().to_string(),
            source: e,
        })?;
        settings.validate(origin)?;
        Ok(settings)
    }

    fn validate(&self, origin: &Path) -> Result<(), ConfigError> {
        let path_str = origin.display().to_string();

        match Url::parse(&self.api_base_url) {
            Ok(url) if !url.cannot_be_a_base() => {}
            _ => {
                return Err(ConfigError::Invalid {
                    path: path_str,
                    key: "api-base-url",
                    message: format!("'{}' is not an absolute URL", self.api_base_url),
                });
            }
        }

        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            return Err(ConfigError::Invalid {
                path: path_str,
                key: "per-page",
                message: format!("must be between 1 and {MAX_PER_PAGE}"),
            });
        }

        if self.output_file.trim().is_empty() {
            return Err(ConfigError::Invalid {
                path: path_str,
                key: "output-file",
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Returns the safety margin as a [`Duration`].
    #[must_use]
    pub fn safety_margin(&self) -> Duration {
        Duration::from_secs(self.safety_margin_seconds)
    }

    /// Returns the full path of the aggregation output.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.data_dir.join(&self.output_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();

        assert_eq!(settings.api_base_url, "https://api.github.com");
        assert_eq!(settings.safety_margin_seconds, 10);
        assert_eq!(settings.compliance_owner_substring, "scytale");
        assert_eq!(settings.on_output_exists, OutputPolicy::Fail);
        assert_eq!(settings.output_path(), PathBuf::from("data/transformation.parquet"));
    }

    #[test]
    fn parses_partial_file_with_defaults() {
        let settings = Settings::parse(
            r#"
safety-margin-seconds = 0
compliance-owner-substring = "acme"
on-output-exists = "overwrite"
"#,
            Path::new("settings.toml"),
        )
        .unwrap();

        assert_eq!(settings.safety_margin(), Duration::ZERO);
        assert_eq!(settings.compliance_owner_substring, "acme");
        assert_eq!(settings.on_output_exists, OutputPolicy::Overwrite);
        assert_eq!(settings.api_base_url, "https://api.github.com");
        assert_eq!(settings.per_page, 100);
    }

    #[test]
    fn rejects_invalid_base_url() {
        let result = Settings::parse(r#"api-base-url = "not a url""#, Path::new("s.toml"));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { key: "api-base-url", .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_page_size() {
        let result = Settings::parse("per-page = 0", Path::new("s.toml"));
        assert!(matches!(result, Err(ConfigError::Invalid { key: "per-page", .. })));
    }

    #[test]
    fn rejects_blank_output_file() {
        let result = Settings::parse(r#"output-file = "  ""#, Path::new("s.toml"));
        assert!(matches!(result, Err(ConfigError::Invalid { key: "output-file", .. })));
    }

    #[test]
    fn rejects_unknown_keys() {
        let result = Settings::parse("github-token = \"abc\"", Path::new("s.toml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn load_reports_missing_file() {
        let result = Settings::load(Path::new("/definitely/not/here.toml"));
        assert!(matches!(
            result,
            Err(ConfigError::Read { ref source, .. }) if source.kind() == std::io::ErrorKind::NotFound
        ));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "data-dir = \"crawl-output\"\non-output-exists = \"skip\"\n").unwrap();

        let settings = Settings::load(&path).unwrap();

        assert_eq!(settings.data_dir, PathBuf::from("crawl-output"));
        assert_eq!(settings.on_output_exists, OutputPolicy::Skip);
    }
}
