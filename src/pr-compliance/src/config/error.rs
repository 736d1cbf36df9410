//! Settings error types.

use thiserror::Error;

/// Why settings could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read, including when it does not exist.
    #[error("Cannot read settings file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or names an unknown key.
    #[error("Settings file '{path}' is malformed: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// A key parsed but holds an unusable value.
    #[error("Invalid '{key}' in '{path}': {message}")]
    Invalid {
        path: String,
        key: &'static str,
        message: String,
    },
}
