//! Declarative keyword sources.
//!
//! The engine only needs two things from wherever keyword records live: the
//! records themselves, and a cheap marker that changes whenever the records
//! might have. `RegistryCache` compares markers to decide when to rebuild.

use crate::error::{KeywordError, Result};
use crate::loader::{KeywordRecord, records_from_yaml};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Location used by the CLI when neither `--registry` nor `KWRES_REGISTRY` is given.
pub const DEFAULT_REGISTRY_PATH: &str = "config/keywords.yml";

/// Change token for a source. Two equal markers mean "nothing to rebuild".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceMarker {
    /// File modification time plus length.
    Modified { at: SystemTime, len: u64 },
    /// Explicit version for in-memory sources.
    Version(u64),
}

pub trait KeywordSource: Send + Sync {
    /// Human-readable location, for logs and reports.
    fn describe(&self) -> String;

    /// Current change marker. Must be cheap; it is read on every cache access.
    fn marker(&self) -> Result<SourceMarker>;

    /// Read every record, in declaration order.
    fn load(&self) -> Result<Vec<KeywordRecord>>;
}

/// YAML (or JSON) file on disk holding a sequence of keyword records.
#[derive(Debug, Clone)]
pub struct YamlFileSource {
    path: PathBuf,
}

impl YamlFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> KeywordError {
        KeywordError::Source { path: self.path.clone(), source }
    }
}

impl KeywordSource for YamlFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn marker(&self) -> Result<SourceMarker> {
        let meta = std::fs::metadata(&self.path).map_err(|e| self.io_error(e))?;
        let at = meta.modified().map_err(|e| self.io_error(e))?;
        Ok(SourceMarker::Modified { at, len: meta.len() })
    }

    fn load(&self) -> Result<Vec<KeywordRecord>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        records_from_yaml(&content).map_err(|err| match err {
            KeywordError::Syntax { source, .. } => KeywordError::Syntax { path: self.path.clone(), source },
            other => other,
        })
    }
}

/// Records embedded in the program; never changes after construction.
#[derive(Clone, Default)]
pub struct StaticSource {
    records: Vec<KeywordRecord>,
    version: u64,
}

impl StaticSource {
    pub fn new(records: Vec<KeywordRecord>) -> Self {
        Self { records, version: 0 }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(Self::new(records_from_yaml(content)?))
    }

    /// Set the version reported as this source's marker.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }
}

impl fmt::Debug for StaticSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticSource")
            .field("records", &self.records.len())
            .field("version", &self.version)
            .finish()
    }
}

impl KeywordSource for StaticSource {
    fn describe(&self) -> String {
        format!("<static: {} records, v{}>", self.records.len(), self.version)
    }

    fn marker(&self) -> Result<SourceMarker> {
        Ok(SourceMarker::Version(self.version))
    }

    fn load(&self) -> Result<Vec<KeywordRecord>> {
        Ok(self.records.clone())
    }
}
