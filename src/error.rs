//! Error types for mssh.
//!
//! All errors in mssh are represented by [`MsshError`], which covers
//! configuration loading, filter patterns, launch policy, and process failures.

use std::path::PathBuf;
use thiserror::Error;

/// All possible errors that can occur in mssh.
#[derive(Error, Debug)]
pub enum MsshError {
    /// Could not determine the user's home directory.
    #[error("Could not determine home directory")]
    NoHomeDir,

    /// Config file (or an include) does not exist at the expected path.
    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// Failed to read a config file from disk.
    #[error("Failed to read config {path}: {source}")]
    ReadConfig {
        /// The file that could not be read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// TOML parsing failed.
    #[error("Failed to parse config {path}: {source}")]
    TomlParse {
        /// The file that failed to parse.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// YAML parsing failed.
    #[error("Failed to parse config {path}: {source}")]
    YamlParse {
        /// The file that failed to parse.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },

    /// A config file includes itself, directly or through other includes.
    #[error("Circular include detected: {0}")]
    CircularInclude(PathBuf),

    /// A config file declares a host with an empty name.
    #[error("Empty host name in config: {0}")]
    InvalidHostName(PathBuf),

    /// A filter is not a valid regular expression.
    #[error("Invalid filter pattern '{pattern}': {source}")]
    Pattern {
        /// The pattern as given on the command line.
        pattern: String,
        /// Underlying regex compile error.
        source: regex::Error,
    },

    /// Requested host does not exist in config.
    #[error("Host not found: {0}")]
    HostNotFound(String),

    /// Several targets resolved but tmux mode was not requested.
    #[error("Can't open {0} hosts without tmux. Please use tmux mode (-t)")]
    TooManyTargets(usize),

    /// The user declined the confirmation prompt.
    #[error("Interrupted")]
    ConfirmationAborted,

    /// A tmux command failed to start.
    #[error("Tmux error: {0}")]
    Tmux(String),

    /// A direct SSH session failed to start or exited unsuccessfully.
    #[error("Launch error: {0}")]
    Launch(String),

    /// Terminal I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MsshError {
    /// Whether this error came from loading or parsing configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            MsshError::NoHomeDir
                | MsshError::ConfigNotFound(_)
                | MsshError::ReadConfig { .. }
                | MsshError::TomlParse { .. }
                | MsshError::YamlParse { .. }
                | MsshError::CircularInclude(_)
                | MsshError::InvalidHostName(_)
        )
    }
}

/// Convenient Result type alias for mssh operations.
pub type Result<T> = std::result::Result<T, MsshError>;
