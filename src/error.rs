//! Errors raised while parsing, classifying or configuring an analysis.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A token was neither an integer nor a known note name.
    #[error("unrecognized token `{token}`")]
    Parse { token: String },

    /// The catalog could not answer a lookup.
    #[error("catalog lookup for [{key}] failed")]
    Lookup {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read catalog data from {}", path.display())]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed catalog data")]
    CatalogFormat(#[from] serde_json::Error),

    #[error("failed to read configuration from {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration")]
    Config(#[from] toml::de::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
