//! Classification of prime forms against a reference catalog.
//!
//! A catalog maps a prime form to its Forte number and, where one exists,
//! the Forte number of its Z-related mate. Two bindings are provided:
//!
//! * `LocalCatalog` holds the reference data in memory. It is loaded once,
//!   never mutated afterwards, and can be shared freely between analyses.
//! * `RemoteCatalog` asks a catalog service over TCP for every lookup. It
//!   knows nothing about Z-relations.
//!
//! Both implement `Catalog`, and `AnyCatalog` lets the choice be made at
//! runtime.

use std::collections::HashMap;
use std::fmt;
use std::future::{self, Future};
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::forms::PrimeForm;
use crate::pitch::PITCH_CLASS_COUNT;

/// Printed in place of a code for prime forms absent from the catalog.
pub const UNCLASSIFIED: &str = "unclassified";

/// Timeout applied to each remote lookup unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

const STANDARD_FORTE_MAP: &str = include_str!("../data/forte_map.json");
const STANDARD_Z_RELATIONS: &str = include_str!("../data/z_relations.json");

/// A catalog classification code, conventionally `cardinality-ordinal`
/// such as `3-11` or `4-Z15`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForteCode(String);

impl ForteCode {
    pub fn new<S: Into<String>>(code: S) -> ForteCode {
        ForteCode(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn split_prefix(&self) -> Option<(usize, &str)> {
        let (prefix, ordinal) = self.0.split_once('-')?;
        if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some((prefix.parse().ok()?, ordinal))
    }

    /// Returns the cardinality named by the code's numeric prefix.
    pub fn cardinality(&self) -> Option<usize> {
        self.split_prefix().map(|(cardinality, _)| cardinality)
    }

    /// Derive the code of the complementary set class by replacing the
    /// cardinality prefix `n` with `12 - n` and keeping the ordinal.
    ///
    /// This follows the catalog's naming convention and is not a lookup, so
    /// it is only as reliable as that convention. Returns `None` if the code
    /// has no usable prefix.
    pub fn complement_code(&self) -> Option<ForteCode> {
        let (cardinality, ordinal) = self.split_prefix()?;
        let complement = (PITCH_CLASS_COUNT as usize).checked_sub(cardinality)?;
        Some(ForteCode(format!("{}-{}", complement, ordinal)))
    }
}

impl fmt::Display for ForteCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A classified prime form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub code: ForteCode,
    pub z_mate: Option<ForteCode>,
}

/// The result of a catalog lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    Classified(CatalogEntry),

    /// The prime form is valid but absent from the catalog.
    Unclassified,
}

impl Classification {
    pub fn entry(&self) -> Option<&CatalogEntry> {
        match *self {
            Classification::Classified(ref entry) => Some(entry),
            Classification::Unclassified => None,
        }
    }

    pub fn code(&self) -> Option<&ForteCode> {
        self.entry().map(|entry| &entry.code)
    }

    pub fn z_mate(&self) -> Option<&ForteCode> {
        self.entry().and_then(|entry| entry.z_mate.as_ref())
    }

    /// Returns the code, or `unclassified`.
    pub fn code_str(&self) -> &str {
        self.code().map_or(UNCLASSIFIED, ForteCode::as_str)
    }

    pub fn is_classified(&self) -> bool {
        self.entry().is_some()
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code_str())?;
        if let Some(mate) = self.z_mate() {
            write!(f, " (Z ↔ {})", mate)?;
        }
        Ok(())
    }
}

/// Resolves prime forms to classifications.
pub trait Catalog {
    /// Look up `prime`, returning `Classification::Unclassified` if the
    /// catalog has no entry for it.
    ///
    /// Fails only if the catalog itself cannot be consulted.
    fn resolve<'a>(
        &'a self,
        prime: &'a PrimeForm,
    ) -> impl Future<Output = Result<Classification>> + Send + 'a;
}

/// A read-only, in-memory catalog.
#[derive(Clone, Debug, Default)]
pub struct LocalCatalog {
    /// Comma-joined prime form to code
    codes: HashMap<String, ForteCode>,

    /// Code to the code of its Z-related mate
    z_mates: HashMap<ForteCode, ForteCode>,
}

impl LocalCatalog {
    /// Construct a catalog from prebuilt maps.
    ///
    /// Z-relations are symmetric, so each pair is recorded in both
    /// directions even if only one was supplied.
    pub fn from_maps(
        codes: HashMap<String, ForteCode>,
        mut z_mates: HashMap<ForteCode, ForteCode>,
    ) -> LocalCatalog {
        let reversed: Vec<(ForteCode, ForteCode)> = z_mates
            .iter()
            .map(|(code, mate)| (mate.clone(), code.clone()))
            .collect();

        for (code, mate) in reversed {
            z_mates.entry(code).or_insert(mate);
        }

        LocalCatalog { codes, z_mates }
    }

    /// Construct a catalog from the JSON text of a prime-form map
    /// (`{"0,3,7": "3-11"}`) and a Z-relation map (`{"4-Z15": "4-Z29"}`).
    pub fn from_json(forte_map: &str, z_relations: &str) -> Result<LocalCatalog> {
        let codes = serde_json::from_str(forte_map)?;
        let z_mates = serde_json::from_str(z_relations)?;
        Ok(LocalCatalog::from_maps(codes, z_mates))
    }

    /// Returns the reference data shipped with this crate.
    ///
    /// Covers every dyad, trichord and tetrachord class and their
    /// complements.
    pub fn standard() -> Result<LocalCatalog> {
        LocalCatalog::from_json(STANDARD_FORTE_MAP, STANDARD_Z_RELATIONS)
    }

    /// Load a catalog from a prime-form map file and a Z-relation file.
    pub async fn load<P, Q>(forte_map: P, z_relations: Q) -> Result<LocalCatalog>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let (forte_map, z_relations) = tokio::try_join!(
            read_catalog_file(forte_map.as_ref()),
            read_catalog_file(z_relations.as_ref()),
        )?;

        let catalog = LocalCatalog::from_json(&forte_map, &z_relations)?;
        info!(
            entries = catalog.len(),
            z_relations = catalog.z_mates.len(),
            "loaded local catalog"
        );
        Ok(catalog)
    }

    /// Returns the number of classified prime forms.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Look up `prime` synchronously.
    pub fn lookup(&self, prime: &PrimeForm) -> Classification {
        match self.codes.get(&prime.key()) {
            Some(code) => {
                debug!(%prime, %code, "catalog hit");
                Classification::Classified(CatalogEntry {
                    code: code.clone(),
                    z_mate: self.z_mates.get(code).cloned(),
                })
            }
            None => Classification::Unclassified,
        }
    }
}

async fn read_catalog_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::CatalogRead { path: path.to_path_buf(), source })
}

impl Catalog for LocalCatalog {
    fn resolve<'a>(
        &'a self,
        prime: &'a PrimeForm,
    ) -> impl Future<Output = Result<Classification>> + Send + 'a {
        future::ready(Ok(self.lookup(prime)))
    }
}

/// A catalog service reached over TCP.
///
/// Each lookup opens a connection, writes the comma-joined prime form and a
/// newline, then reads a single line back:
///
/// ```text
/// Reply : Code            classified
///       | 'unclassified'  not in the catalog (any case)
///       | ''              not in the catalog
///       | 'ERR' Message   the service failed
///       ;
/// ```
#[derive(Clone, Debug)]
pub struct RemoteCatalog {
    address: String,
    timeout: Duration,
}

impl RemoteCatalog {
    pub fn new<S: Into<String>>(address: S) -> RemoteCatalog {
        RemoteCatalog { address: address.into(), timeout: DEFAULT_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> RemoteCatalog {
        self.timeout = timeout;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    async fn query(&self, key: &str) -> io::Result<String> {
        let stream = TcpStream::connect(&self.address).await?;
        let (reader, mut writer) = stream.into_split();

        writer.write_all(format!("{}\n", key).as_bytes()).await?;
        writer.flush().await?;

        let mut reply = String::new();
        if BufReader::new(reader).read_line(&mut reply).await? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed without a reply",
            ));
        }

        Ok(reply.trim().to_string())
    }
}

fn interpret_reply(reply: &str) -> io::Result<Classification> {
    if reply.is_empty() || reply.eq_ignore_ascii_case(UNCLASSIFIED) {
        return Ok(Classification::Unclassified);
    }

    if let Some(message) = reply.strip_prefix("ERR") {
        return Err(io::Error::new(io::ErrorKind::Other, message.trim().to_string()));
    }

    Ok(Classification::Classified(CatalogEntry {
        code: ForteCode::new(reply),
        z_mate: None,
    }))
}

impl Catalog for RemoteCatalog {
    fn resolve<'a>(
        &'a self,
        prime: &'a PrimeForm,
    ) -> impl Future<Output = Result<Classification>> + Send + 'a {
        async move {
            let key = prime.key();

            let reply = match tokio::time::timeout(self.timeout, self.query(&key)).await {
                Ok(reply) => reply,
                Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "no reply before timeout")),
            };

            reply
                .and_then(|reply| interpret_reply(&reply))
                .map_err(|source| {
                    warn!(address = %self.address, %key, error = %source, "remote lookup failed");
                    Error::Lookup { key, source }
                })
        }
    }
}

/// Either catalog binding, chosen at runtime.
#[derive(Clone, Debug)]
pub enum AnyCatalog {
    Local(LocalCatalog),
    Remote(RemoteCatalog),
}

impl Catalog for AnyCatalog {
    fn resolve<'a>(
        &'a self,
        prime: &'a PrimeForm,
    ) -> impl Future<Output = Result<Classification>> + Send + 'a {
        async move {
            match *self {
                AnyCatalog::Local(ref catalog) => catalog.resolve(prime).await,
                AnyCatalog::Remote(ref catalog) => catalog.resolve(prime).await,
            }
        }
    }
}
