//! Configuration types for mssh.
//!
//! This module defines the data structures that map to the host configuration
//! file. A config document has two reserved top-level keys:
//!
//! - `hosts`: host name -> host record
//! - `include`: other config documents to merge in, in order
//!
//! # Config Format
//!
//! The legacy dotfile (`~/.mssh`) is YAML:
//!
//! ```yaml
//! include:
//!   - ~/.mssh.d/prod.yaml
//! hosts:
//!   bastion: {}
//!   web1:
//!     Hostname: 10.0.0.11
//!   db1:
//!     Via: bastion
//!     GatewayCommand: ssh -t
//!   _template: {}
//! ```
//!
//! Files ending in `.toml` use the same keys:
//!
//! ```toml
//! include = ["~/.mssh.d/prod.yaml"]
//!
//! [hosts.web1]
//! Hostname = "10.0.0.11"
//!
//! [hosts.db1]
//! Via = "bastion"
//! GatewayCommand = "ssh -t"
//! ```

use crate::error::{MsshError, Result};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Deserialize a YAML `null` (e.g. `web1:` with no body) as the type's default.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_hosts<'de, D>(
    deserializer: D,
) -> std::result::Result<HashMap<String, HostRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HashMap<String, Option<HostRecord>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, record)| (name, record.unwrap_or_default()))
        .collect())
}

/// A single configured host.
///
/// Every field is optional; an empty string means "not set".
///
/// # Example
///
/// ```yaml
/// db1:
///   Via: bastion
///   Hostname: 10.0.0.21
///   GatewayCommand: sshpass -f ~/.pw ssh
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HostRecord {
    /// Name of the gateway host to connect through. Empty means direct.
    #[serde(rename = "Via", default, deserialize_with = "nullable")]
    pub via: String,
    /// Connection address override. Empty means use the host's key name.
    #[serde(rename = "Hostname", default, deserialize_with = "nullable")]
    pub hostname: String,
    /// Client invocation for direct connections, or the remote command run
    /// on the gateway when `via` is set.
    #[serde(rename = "GatewayCommand", default, deserialize_with = "nullable")]
    pub gateway_command: String,
}

impl HostRecord {
    /// Whether this host is reached through a gateway.
    pub fn has_gateway(&self) -> bool {
        !self.via.is_empty()
    }

    /// Whether a usable `GatewayCommand` is set. Whitespace-only counts as unset.
    pub fn has_gateway_command(&self) -> bool {
        !self.gateway_command.trim().is_empty()
    }
}

/// Supported on-disk formats for config documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML, the format of the legacy `~/.mssh` dotfile.
    Yaml,
    /// TOML.
    Toml,
}

impl ConfigFormat {
    /// Pick the format from a file's extension.
    ///
    /// `.toml` files are TOML; everything else, including extension-less
    /// dotfiles, is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// One parsed config file, before its includes are resolved.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigDocument {
    /// Hosts declared directly in this document.
    #[serde(default, deserialize_with = "nullable_hosts")]
    pub hosts: HashMap<String, HostRecord>,
    /// Paths of further documents to merge in, in precedence order.
    #[serde(rename = "include", default, deserialize_with = "nullable")]
    pub includes: Vec<String>,
}

impl ConfigDocument {
    /// Parse a document from its contents.
    ///
    /// `path` is only used for error reporting.
    ///
    /// # Errors
    ///
    /// - [`MsshError::TomlParse`] / [`MsshError::YamlParse`] if the contents
    ///   are malformed or don't match the expected structure
    /// - [`MsshError::InvalidHostName`] if a host has an empty name
    pub fn parse(contents: &str, format: ConfigFormat, path: &Path) -> Result<Self> {
        let doc: ConfigDocument = match format {
            ConfigFormat::Toml => toml::from_str(contents).map_err(|source| MsshError::TomlParse {
                path: path.to_path_buf(),
                source,
            })?,
            // serde_yaml rejects a stream with no document in it
            ConfigFormat::Yaml if is_blank_yaml(contents) => ConfigDocument::default(),
            ConfigFormat::Yaml => {
                serde_yaml::from_str(contents).map_err(|source| MsshError::YamlParse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
        };

        if doc.hosts.keys().any(|name| name.is_empty()) {
            return Err(MsshError::InvalidHostName(path.to_path_buf()));
        }

        Ok(doc)
    }
}

fn is_blank_yaml(contents: &str) -> bool {
    contents.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}

/// The flattened host table after all includes have been merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Host name -> host record.
    pub hosts: HashMap<String, HostRecord>,
}

impl Config {
    /// Fold `incoming` into `self`, keeping existing definitions.
    ///
    /// Hosts already present in `self` win; each shadowed incoming host is
    /// logged and dropped.
    pub fn merge(mut self, incoming: Config) -> Config {
        for (name, record) in incoming.hosts {
            if self.hosts.contains_key(&name) {
                info!("{} is ignored", name);
            } else {
                self.hosts.insert(name, record);
            }
        }
        self
    }

    /// Look up a host by name.
    pub fn get_host(&self, name: &str) -> Option<&HostRecord> {
        self.hosts.get(name)
    }

    /// List all host names, sorted alphabetically.
    pub fn host_names(&self) -> Vec<String> {
        let mut result: Vec<_> = self.hosts.keys().cloned().collect();
        result.sort();
        result
    }

    /// Number of configured hosts.
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Whether no hosts are configured.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

impl From<HashMap<String, HostRecord>> for Config {
    fn from(hosts: HashMap<String, HostRecord>) -> Self {
        Config { hosts }
    }
}

impl FromIterator<(String, HostRecord)> for Config {
    fn from_iter<I: IntoIterator<Item = (String, HostRecord)>>(iter: I) -> Self {
        Config {
            hosts: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(via: &str, hostname: &str, gateway_command: &str) -> HostRecord {
        HostRecord {
            via: via.to_string(),
            hostname: hostname.to_string(),
            gateway_command: gateway_command.to_string(),
        }
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
include:
  - ~/other.yaml
  - /etc/mssh/shared.toml
hosts:
  web1: {}
  web2:
  db1:
    Via: bastion
    Hostname: 10.0.0.21
    GatewayCommand: sshpass -f x ssh
"#;
        let doc = ConfigDocument::parse(yaml, ConfigFormat::Yaml, Path::new("test")).unwrap();
        assert_eq!(doc.includes, vec!["~/other.yaml", "/etc/mssh/shared.toml"]);
        assert_eq!(doc.hosts.len(), 3);
        assert_eq!(doc.hosts["web1"], HostRecord::default());
        assert_eq!(doc.hosts["web2"], HostRecord::default());
        assert_eq!(
            doc.hosts["db1"],
            record("bastion", "10.0.0.21", "sshpass -f x ssh")
        );
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
include = ["a.toml"]

[hosts.web1]

[hosts.db1]
Via = "bastion"
GatewayCommand = "ssh -t"
"#;
        let doc = ConfigDocument::parse(toml, ConfigFormat::Toml, Path::new("test.toml")).unwrap();
        assert_eq!(doc.includes, vec!["a.toml"]);
        assert_eq!(doc.hosts["web1"], HostRecord::default());
        assert_eq!(doc.hosts["db1"], record("bastion", "", "ssh -t"));
    }

    #[test]
    fn test_parse_empty_documents() {
        for contents in ["", "\n# only a comment\n", "---\n"] {
            let doc = ConfigDocument::parse(contents, ConfigFormat::Yaml, Path::new("x")).unwrap();
            assert!(doc.hosts.is_empty());
            assert!(doc.includes.is_empty());
        }
        let doc = ConfigDocument::parse("", ConfigFormat::Toml, Path::new("x.toml")).unwrap();
        assert!(doc.hosts.is_empty());
    }

    #[test]
    fn test_parse_null_sections() {
        let doc =
            ConfigDocument::parse("hosts:\ninclude:\n", ConfigFormat::Yaml, Path::new("x")).unwrap();
        assert!(doc.hosts.is_empty());
        assert!(doc.includes.is_empty());
    }

    #[test]
    fn test_parse_malformed() {
        let err = ConfigDocument::parse("hosts: [", ConfigFormat::Yaml, Path::new("x")).unwrap_err();
        assert!(matches!(err, MsshError::YamlParse { .. }));

        let err =
            ConfigDocument::parse("hosts = 3", ConfigFormat::Toml, Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, MsshError::TomlParse { .. }));
    }

    #[test]
    fn test_parse_rejects_empty_host_name() {
        let err =
            ConfigDocument::parse("hosts:\n  \"\": {}\n", ConfigFormat::Yaml, Path::new("x"))
                .unwrap_err();
        assert!(matches!(err, MsshError::InvalidHostName(_)));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("/home/u/.mssh")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("hosts.yml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("hosts.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("HOSTS.TOML")), ConfigFormat::Toml);
    }

    #[test]
    fn test_merge_keeps_existing() {
        let base: Config = [("web1".to_string(), record("", "1.1.1.1", ""))]
            .into_iter()
            .collect();
        let incoming: Config = [
            ("web1".to_string(), record("", "2.2.2.2", "")),
            ("web2".to_string(), record("", "3.3.3.3", "")),
        ]
        .into_iter()
        .collect();

        let merged = base.merge(incoming);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get_host("web1").unwrap().hostname, "1.1.1.1");
        assert_eq!(merged.get_host("web2").unwrap().hostname, "3.3.3.3");
    }

    #[test]
    fn test_blank_gateway_command_is_unset() {
        assert!(!record("bastion", "", "").has_gateway_command());
        assert!(!record("bastion", "", " \t ").has_gateway_command());
        assert!(record("bastion", "", "ssh").has_gateway_command());
        assert!(record("bastion", "", "").has_gateway());
        assert!(!HostRecord::default().has_gateway());
    }

    #[test]
    fn test_host_names_sorted() {
        let config: Config = ["zeta", "alpha", "mid"]
            .into_iter()
            .map(|n| (n.to_string(), HostRecord::default()))
            .collect();
        assert_eq!(config.host_names(), vec!["alpha", "mid", "zeta"]);
        assert!(!config.is_empty());
        assert!(Config::default().is_empty());
    }
}
