//! Saved server profiles (`hosts.yaml`).
//!
//! The file holds one top-level `hosts` mapping keyed by profile name, in the
//! order the profiles are shown:
//!
//! ```yaml
//! hosts:
//!   local:
//!     type: postgresql
//!     host: localhost
//!     port: 5432
//!     user: postgres
//!     password: ""
//!   shop:
//!     type: mysql
//!     host: 10.0.0.7
//! ```

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tempfile::NamedTempFile;

use super::hosts_path;
use crate::ui::ListItem;

const DEFAULT_HOST: &str = "localhost";

/// Server flavour of a profile, which picks the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DbType {
    #[default]
    #[serde(rename = "postgresql", alias = "postgres")]
    Postgres,
    #[serde(rename = "mysql", alias = "mariadb")]
    Mysql,
}

impl DbType {
    pub fn label(self) -> &'static str {
        match self {
            DbType::Postgres => "postgresql",
            DbType::Mysql => "mysql",
        }
    }

    /// Port used when a profile of this type has none. PostgreSQL follows
    /// the configured default.
    pub fn default_port(self, postgres_port: u16) -> u16 {
        match self {
            DbType::Postgres => postgres_port,
            DbType::Mysql => 3306,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            DbType::Postgres => DbType::Mysql,
            DbType::Mysql => DbType::Postgres,
        }
    }
}

/// A named server profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub name: String,
    pub db_type: DbType,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Database opened on connect. The server default is used when unset.
    pub database: Option<String>,
}

impl Host {
    /// The profile offered when no hosts file exists yet.
    pub fn local(default_port: u16) -> Self {
        Self {
            name: DEFAULT_HOST.to_string(),
            db_type: DbType::Postgres,
            host: DEFAULT_HOST.to_string(),
            port: default_port,
            user: String::new(),
            password: String::new(),
            database: None,
        }
    }

    /// `user@host:port`, or `host:port` without a user.
    pub fn address(&self) -> String {
        if self.user.is_empty() {
            format!("{}:{}", self.host, self.port)
        } else {
            format!("{}@{}:{}", self.user, self.host, self.port)
        }
    }
}

impl ListItem for Host {
    fn display(&self) -> String {
        self.name.clone()
    }

    fn same_item(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// On-disk shape of one profile; the name is the mapping key.
#[derive(Debug, Default, Serialize, Deserialize)]
struct HostEntry {
    #[serde(default, rename = "type")]
    db_type: DbType,
    #[serde(default)]
    host: String,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    user: String,
    #[serde(default)]
    password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database: Option<String>,
}

/// Checks a port typed by the user.
pub fn validate_port(input: &str) -> Result<u16> {
    let trimmed = input.trim();
    let port: u32 = trimmed
        .parse()
        .map_err(|_| anyhow!("Invalid port: {trimmed:?}"))?;
    match u16::try_from(port) {
        Ok(port) if port > 0 => Ok(port),
        _ => bail!("Port must be between 1 and 65535, got {port}"),
    }
}

/// Load hosts from the default path.
pub fn load_hosts(default_port: u16) -> Result<Vec<Host>> {
    let path = hosts_path().ok_or_else(|| anyhow!("Could not determine config directory"))?;
    load_hosts_from(&path, default_port)
}

/// Load hosts from a specific path. A missing file yields the local profile.
pub fn load_hosts_from(path: &Path, default_port: u16) -> Result<Vec<Host>> {
    if !path.exists() {
        return Ok(vec![Host::local(default_port)]);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read hosts file: {}", path.display()))?;
    parse_hosts(&content, default_port)
        .with_context(|| format!("Failed to parse hosts file: {}", path.display()))
}

fn parse_hosts(content: &str, default_port: u16) -> Result<Vec<Host>> {
    let root: Value = serde_yaml::from_str(content)?;
    let hosts = root
        .get("hosts")
        .ok_or_else(|| anyhow!("No top level `hosts` key"))?
        .as_mapping()
        .ok_or_else(|| anyhow!("`hosts` should be a mapping"))?;

    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(hosts.len());
    for (key, value) in hosts {
        let name = match key {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            other => bail!("Host names should be strings, got {other:?}"),
        };
        if !value.is_mapping() && !value.is_null() {
            bail!("Host `{name}` should be a mapping");
        }
        if !seen.insert(name.clone()) {
            bail!("Duplicate host name `{name}`");
        }
        let entry: HostEntry = if value.is_null() {
            HostEntry::default()
        } else {
            serde_yaml::from_value(value.clone())
                .with_context(|| format!("Invalid settings for host `{name}`"))?
        };
        result.push(Host {
            name,
            db_type: entry.db_type,
            host: if entry.host.trim().is_empty() {
                DEFAULT_HOST.to_string()
            } else {
                entry.host
            },
            port: entry
                .port
                .filter(|p| *p > 0)
                .unwrap_or_else(|| entry.db_type.default_port(default_port)),
            user: entry.user,
            password: entry.password,
            database: entry.database.filter(|d| !d.is_empty()),
        });
    }
    Ok(result)
}

fn render_hosts(hosts: &[Host]) -> Result<String> {
    let mut seen = HashSet::new();
    let mut mapping = Mapping::new();
    for host in hosts {
        let name = host.name.trim();
        if name.is_empty() {
            bail!("Host name must not be empty");
        }
        if !seen.insert(name.to_string()) {
            bail!("Duplicate host name `{name}`");
        }
        let entry = HostEntry {
            db_type: host.db_type,
            host: host.host.clone(),
            port: Some(host.port),
            user: host.user.clone(),
            password: host.password.clone(),
            database: host.database.clone(),
        };
        mapping.insert(
            Value::String(name.to_string()),
            serde_yaml::to_value(entry).context("Failed to serialize host")?,
        );
    }

    let mut root = Mapping::new();
    root.insert(Value::String("hosts".to_string()), Value::Mapping(mapping));
    serde_yaml::to_string(&root).context("Failed to serialize hosts")
}

/// Save hosts to a specific path, replacing the file atomically.
pub fn save_hosts_to(path: &Path, hosts: &[Host]) -> Result<()> {
    let content = render_hosts(hosts)?;

    let parent = path.parent().context("Hosts path has no parent directory")?;
    std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;

    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp hosts file in: {}", parent.display()))?;
    tmp.write_all(content.as_bytes())
        .context("Failed to write temp hosts file")?;
    tmp.flush().context("Failed to flush temp hosts file")?;
    tmp.persist(path)
        .map_err(|e| anyhow!("Failed to persist hosts file: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn host(name: &str) -> Host {
        Host {
            name: name.to_string(),
            db_type: DbType::Postgres,
            host: "db.internal".to_string(),
            port: 6543,
            user: "app".to_string(),
            password: "secret".to_string(),
            database: None,
        }
    }

    #[test]
    fn test_missing_file_yields_local_profile() {
        let dir = tempdir().unwrap();
        let hosts = load_hosts_from(&dir.path().join("hosts.yaml"), 5432).unwrap();
        assert_eq!(hosts, vec![Host::local(5432)]);
    }

    #[test]
    fn test_parse_keeps_file_order() {
        let yaml = "hosts:\n  zeta:\n    host: z\n  alpha:\n    host: a\n    port: 5433\n";
        let hosts = parse_hosts(yaml, 5432).unwrap();
        let names: Vec<_> = hosts.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha"]);
        assert_eq!(hosts[0].port, 5432);
        assert_eq!(hosts[1].port, 5433);
    }

    #[test]
    fn test_empty_host_becomes_localhost() {
        let hosts = parse_hosts("hosts:\n  dev:\n    user: me\n", 5432).unwrap();
        assert_eq!(hosts[0].host, "localhost");
        assert_eq!(hosts[0].user, "me");
    }

    #[test]
    fn test_type_selects_driver_and_default_port() {
        let yaml = "hosts:\n  pg:\n    host: a\n  shop:\n    type: mysql\n  old:\n    type: postgres\n    port: 6000\n";
        let hosts = parse_hosts(yaml, 5433).unwrap();
        assert_eq!(hosts[0].db_type, DbType::Postgres);
        assert_eq!(hosts[0].port, 5433);
        assert_eq!(hosts[1].db_type, DbType::Mysql);
        assert_eq!(hosts[1].port, 3306);
        assert_eq!(hosts[2].db_type, DbType::Postgres);
        assert_eq!(hosts[2].port, 6000);
    }

    #[test]
    fn test_unknown_type_is_error() {
        let err = parse_hosts("hosts:\n  a:\n    type: oracle\n", 5432).unwrap_err();
        assert!(format!("{err:#}").contains("`a`"));
    }

    #[test]
    fn test_missing_hosts_key_is_error() {
        let err = parse_hosts("servers:\n  a: {}\n", 5432).unwrap_err();
        assert!(err.to_string().contains("hosts"));
    }

    #[test]
    fn test_non_mapping_host_is_error() {
        assert!(parse_hosts("hosts:\n  a: 12\n", 5432).is_err());
        assert!(parse_hosts("hosts: [a, b]\n", 5432).is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("hosts.yaml");
        let mut second = host("second");
        second.database = Some("analytics".to_string());
        second.db_type = DbType::Mysql;
        let hosts = vec![host("first"), second];

        save_hosts_to(&path, &hosts).unwrap();
        let loaded = load_hosts_from(&path, 5432).unwrap();
        assert_eq!(loaded, hosts);
    }

    #[test]
    fn test_save_rejects_bad_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hosts.yaml");
        assert!(save_hosts_to(&path, &[host("a"), host("a")]).is_err());
        assert!(save_hosts_to(&path, &[host("  ")]).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_validate_port() {
        assert_eq!(validate_port("5432").unwrap(), 5432);
        assert_eq!(validate_port(" 1 ").unwrap(), 1);
        assert!(validate_port("0").is_err());
        assert!(validate_port("65536").is_err());
        assert!(validate_port("abc").is_err());
        assert!(validate_port("").is_err());
    }

    #[test]
    fn test_address() {
        assert_eq!(host("x").address(), "app@db.internal:6543");
        assert_eq!(Host::local(5432).address(), "localhost:5432");
    }
}
