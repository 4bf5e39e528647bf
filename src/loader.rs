//! Config file loading.
//!
//! Reads a config document, then recursively loads every file it lists under
//! `include` and folds them into one [`Config`]. Precedence is first write
//! wins in declaration order:
//!
//! 1. hosts declared in the document itself
//! 2. hosts from the first include (and, recursively, its includes)
//! 3. hosts from the second include, and so on
//!
//! Paths starting with `~/` are expanded to the user's home directory.

use crate::config::{Config, ConfigDocument, ConfigFormat};
use crate::error::{MsshError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config path used when none is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "~/.mssh";

/// Expand a leading `~/` to the user's home directory.
///
/// Any other path is returned unchanged; relative paths stay relative to the
/// working directory.
///
/// # Errors
///
/// Returns [`MsshError::NoHomeDir`] if the path starts with `~/` and the home
/// directory cannot be determined.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    if path.starts_with("~/") {
        let home = dirs::home_dir().ok_or(MsshError::NoHomeDir)?;
        Ok(expand_home_in(path, &home))
    } else {
        Ok(PathBuf::from(path))
    }
}

fn expand_home_in(path: &str, home: &Path) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// Load a config file and everything it includes.
///
/// Every call reads from disk; nothing is cached.
///
/// # Errors
///
/// - [`MsshError::ConfigNotFound`] if the file or any include doesn't exist
/// - [`MsshError::ReadConfig`] if reading fails
/// - [`MsshError::TomlParse`] / [`MsshError::YamlParse`] if parsing fails
/// - [`MsshError::CircularInclude`] if a file includes itself
pub fn load_config(path: &str) -> Result<Config> {
    let mut stack = Vec::new();
    load_inner(path, &mut stack)
}

fn load_inner(path: &str, stack: &mut Vec<PathBuf>) -> Result<Config> {
    let path = expand_home(path)?;
    if !path.exists() {
        return Err(MsshError::ConfigNotFound(path));
    }

    let key = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
    if stack.contains(&key) {
        return Err(MsshError::CircularInclude(path));
    }

    let contents = std::fs::read_to_string(&path).map_err(|source| MsshError::ReadConfig {
        path: path.clone(),
        source,
    })?;
    let doc = ConfigDocument::parse(&contents, ConfigFormat::from_path(&path), &path)?;
    debug!(
        path = %path.display(),
        hosts = doc.hosts.len(),
        includes = doc.includes.len(),
        "loaded config document"
    );

    stack.push(key);
    let mut config = Config::from(doc.hosts);
    for include in &doc.includes {
        let included = load_inner(include, stack)?;
        config = config.merge(included);
    }
    stack.pop();

    Ok(config)
}
