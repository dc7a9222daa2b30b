//! `migratectl.toml` loading and validation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MigrateError, Result};
use crate::graph::{DependencyGraph, DependencyOrder, ForeignKey};
use crate::merge::{DEFAULT_FILE_SUFFIX, DEFAULT_MERGED_FILE};

pub const DEFAULT_CONFIG_FILE: &str = "migratectl.toml";

/// Pool size bounds.
pub const MIN_CONNECTIONS: u32 = 1;
pub const MAX_CONNECTIONS: u32 = 10;

/// `migratectl.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MigrateConfig {
    #[serde(default)]
    pub database: DatabaseSection,

    #[serde(default)]
    pub merge: MergeSection,

    #[serde(default)]
    pub schema: SchemaSection,

    #[serde(default)]
    pub patch: PatchSection,
}

/// Connection parameters. Environment variables take precedence; see
/// `migratectl_db::DatabaseSettings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSection {
    /// Full connection URL; wins over the individual fields
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub dbname: Option<String>,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: None,
            host: None,
            port: None,
            user: None,
            password: None,
            dbname: None,
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeSection {
    #[serde(default)]
    pub order: DependencyOrder,

    #[serde(default = "default_merged_file")]
    pub output: PathBuf,

    #[serde(default = "default_file_suffix")]
    pub file_suffix: String,
}

impl Default for MergeSection {
    fn default() -> Self {
        Self {
            order: DependencyOrder::default(),
            output: default_merged_file(),
            file_suffix: default_file_suffix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SchemaSection {
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchSection {
    #[serde(default = "default_patch_column")]
    pub column: String,

    #[serde(default)]
    pub join_key: Option<String>,
}

impl Default for PatchSection {
    fn default() -> Self {
        Self {
            column: default_patch_column(),
            join_key: None,
        }
    }
}

// Default value functions for serde
fn default_min_connections() -> u32 {
    MIN_CONNECTIONS
}

fn default_max_connections() -> u32 {
    MAX_CONNECTIONS
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

fn default_merged_file() -> PathBuf {
    PathBuf::from(DEFAULT_MERGED_FILE)
}

fn default_file_suffix() -> String {
    DEFAULT_FILE_SUFFIX.to_string()
}

fn default_patch_column() -> String {
    "medication_code".to_string()
}

impl MigrateConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `./migratectl.toml` is used
    /// when present, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !local.exists() {
                    debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                local
            }
        };

        let contents = std::fs::read_to_string(&path).map_err(|err| MigrateError::io(&path, err))?;
        let config = Self::from_toml(&contents)
            .map_err(|err| MigrateError::config(format!("{}: {}", path.display(), err)))?;
        debug!("loaded config from {}", path.display());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn validate(&self) -> Result<()> {
        let db = &self.database;
        if db.min_connections < MIN_CONNECTIONS
            || db.min_connections > db.max_connections
            || db.max_connections > MAX_CONNECTIONS
        {
            return Err(MigrateError::config(format!(
                "database pool bounds must satisfy {} <= min ({}) <= max ({}) <= {}",
                MIN_CONNECTIONS, db.min_connections, db.max_connections, MAX_CONNECTIONS
            )));
        }
        if self.merge.file_suffix.is_empty() {
            return Err(MigrateError::config("merge.file_suffix must not be empty"));
        }
        Ok(())
    }

    /// The merge order: derived from `schema.foreign_keys` when any are
    /// declared, else `merge.order` as written.
    pub fn resolved_order(&self) -> Result<DependencyOrder> {
        if self.schema.foreign_keys.is_empty() {
            return Ok(self.merge.order.clone());
        }
        DependencyGraph::from_edges(self.merge.order.iter(), &self.schema.foreign_keys)
            .topological_order()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MigrateConfig::from_toml("").unwrap();
        assert_eq!(config.database.min_connections, 1);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.merge.output, PathBuf::from("all_inserts_ordered.sql"));
        assert_eq!(config.merge.order, DependencyOrder::default());
        assert_eq!(config.patch.column, "medication_code");
    }

    #[test]
    fn test_parse_sections() {
        let config = MigrateConfig::from_toml(
            r#"
            [database]
            host = "db.local"
            port = 5433
            dbname = "hospital"

            [merge]
            order = ["patient", "address"]

            [[schema.foreign_keys]]
            table = "patient"
            references = "address"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.host.as_deref(), Some("db.local"));
        assert_eq!(config.database.port, Some(5433));
        assert_eq!(config.merge.order.tables(), &["patient", "address"]);
        assert_eq!(config.resolved_order().unwrap().tables(), &["address", "patient"]);
    }

    #[test]
    fn test_shipped_template_parses() {
        let config = MigrateConfig::from_toml(include_str!("../../migratectl.template.toml")).unwrap();
        config.validate().unwrap();
        assert_eq!(config.merge.order, DependencyOrder::default());
    }

    #[test]
    fn test_rejects_bad_pool_bounds() {
        let config = MigrateConfig::from_toml("[database]\nmin_connections = 5\nmax_connections = 2\n").unwrap();
        assert!(matches!(config.validate(), Err(MigrateError::Config { .. })));

        let config = MigrateConfig::from_toml("[database]\nmax_connections = 50\n").unwrap();
        assert!(matches!(config.validate(), Err(MigrateError::Config { .. })));

        let config = MigrateConfig::from_toml("[database]\nmin_connections = 0\n").unwrap();
        assert!(matches!(config.validate(), Err(MigrateError::Config { .. })));

        let config = MigrateConfig::from_toml("[database]\nmin_connections = 10\nmax_connections = 10\n").unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let err = MigrateConfig::load(Some(Path::new("/nonexistent/migratectl.toml"))).unwrap_err();
        assert!(matches!(err, MigrateError::Io { .. }));
    }
}
