//! Configuration for binding a catalog.
//!
//! ```toml
//! [catalog]
//! mode = "remote"
//! address = "127.0.0.1:7878"
//! timeout_ms = 500
//! ```
//!
//! Without a configuration file, the reference data shipped with the crate
//! is used.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::{AnyCatalog, LocalCatalog, RemoteCatalog, DEFAULT_TIMEOUT};
use crate::error::{Error, Result};

/// Root configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogSource,
}

impl Config {
    /// Load a configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|source| Error::ConfigRead { path: path.to_path_buf(), source })?;
        Config::from_toml(&contents)
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Config> {
        Ok(toml::from_str(text)?)
    }
}

/// Where classification data comes from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CatalogSource {
    /// JSON files loaded once at startup. Either file left unset means the
    /// shipped reference data is used instead.
    Local {
        #[serde(default)]
        forte_map: Option<PathBuf>,
        #[serde(default)]
        z_relations: Option<PathBuf>,
    },

    /// A catalog service queried for every lookup.
    Remote {
        address: String,
        #[serde(default = "default_timeout_ms")]
        timeout_ms: u64,
    },
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

impl Default for CatalogSource {
    fn default() -> Self {
        CatalogSource::Local { forte_map: None, z_relations: None }
    }
}

impl CatalogSource {
    /// Build the catalog this source describes.
    ///
    /// Local data is read and parsed here, so any problem with it surfaces
    /// before the first analysis.
    pub async fn open(&self) -> Result<AnyCatalog> {
        match *self {
            CatalogSource::Local { forte_map: Some(ref forte_map), z_relations: Some(ref z_relations) } => {
                LocalCatalog::load(forte_map, z_relations).await.map(AnyCatalog::Local)
            }

            CatalogSource::Local { .. } => {
                let catalog = LocalCatalog::standard()?;
                info!(entries = catalog.len(), "using standard catalog");
                Ok(AnyCatalog::Local(catalog))
            }

            CatalogSource::Remote { ref address, timeout_ms } => {
                info!(%address, timeout_ms, "using remote catalog");
                let catalog = RemoteCatalog::new(address.clone())
                    .with_timeout(Duration::from_millis(timeout_ms));
                Ok(AnyCatalog::Remote(catalog))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_standard_catalog() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn parse_local_config() {
        let config = Config::from_toml(
            r#"
            [catalog]
            mode = "local"
            forte_map = "data/forte_map.json"
            z_relations = "data/z_relations.json"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.catalog,
            CatalogSource::Local {
                forte_map: Some(PathBuf::from("data/forte_map.json")),
                z_relations: Some(PathBuf::from("data/z_relations.json")),
            }
        );
    }

    #[test]
    fn parse_remote_config() {
        let config = Config::from_toml(
            r#"
            [catalog]
            mode = "remote"
            address = "127.0.0.1:7878"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.catalog,
            CatalogSource::Remote { address: "127.0.0.1:7878".to_string(), timeout_ms: 2000 }
        );
    }

    #[test]
    fn reject_unknown_mode() {
        let result = Config::from_toml("[catalog]\nmode = \"carrier-pigeon\"\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            b"[catalog]\nmode = \"remote\"\naddress = \"localhost:9000\"\ntimeout_ms = 50\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(
            config.catalog,
            CatalogSource::Remote { address: "localhost:9000".to_string(), timeout_ms: 50 }
        );
    }

    #[test]
    fn load_missing_file() {
        assert!(matches!(
            Config::load("/nonexistent/pcset.toml"),
            Err(Error::ConfigRead { .. })
        ));
    }

    #[tokio::test]
    async fn open_default_source() {
        match CatalogSource::default().open().await.unwrap() {
            AnyCatalog::Local(catalog) => assert!(!catalog.is_empty()),
            other => panic!("unexpected catalog: {:?}", other),
        }
    }
}
