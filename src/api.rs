use crate::engine::{KeywordRegistry, MatchDetails, RegistryCache};
use crate::error::{KeywordError, Result};
use crate::source::{KeywordSource, YamlFileSource};
use crate::{Resolution, TierSet};
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::sync::Arc;

/// Entry point for resolving queries against a cached keyword registry.
///
/// The registry is loaded on first use and reused until its source marker
/// changes or [`reload`](Self::reload) is called. All methods take `&self`
/// and are safe to call from many threads.
///
/// # Example
/// ```
/// use kwres::{Resolver, StaticSource, Tier};
///
/// let source = StaticSource::from_yaml(
///     "- id: password_reset\n  terms: password reset\n  synonyms: credential reset\n",
/// )
/// .unwrap();
/// let resolver = Resolver::new(source);
///
/// let hit = resolver.resolve("Credential Reset").unwrap().unwrap();
/// assert_eq!(hit.canonical_id, "password_reset");
/// assert_eq!(hit.tier, Tier::Synonym);
/// ```
#[derive(Debug)]
pub struct Resolver {
    cache: RegistryCache,
    tiers: TierSet,
}

/// Result from [`Resolver::resolve_verbose`].
#[derive(Debug, Clone)]
pub struct ResolveVerbose {
    pub resolution: Option<Resolution>,
    pub details: MatchDetails,
    /// When the registry that answered was built.
    pub loaded_at: Option<DateTime<Local>>,
}

impl Resolver {
    pub fn new(source: impl KeywordSource + 'static) -> Self {
        Self { cache: RegistryCache::new(source), tiers: TierSet::all() }
    }

    /// Resolver over a YAML file on disk.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(YamlFileSource::new(path))
    }

    /// Only consult `tiers` when matching.
    pub fn with_tiers(mut self, tiers: TierSet) -> Self {
        self.tiers = tiers;
        self
    }

    pub fn tiers(&self) -> TierSet {
        self.tiers
    }

    pub fn source(&self) -> &dyn KeywordSource {
        self.cache.source()
    }

    /// Current registry, rebuilt first if the source changed.
    pub fn registry(&self) -> Result<Arc<KeywordRegistry>> {
        self.cache.get_or_rebuild()
    }

    /// Force a rebuild from the source.
    pub fn reload(&self) -> Result<Arc<KeywordRegistry>> {
        self.cache.force_reload()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Local>> {
        self.cache.loaded_at()
    }

    /// Resolve `query` to a canonical keyword, or `None` if nothing matches.
    ///
    /// Fails with `InvalidInput` for an empty query, or with a configuration
    /// error if the registry cannot be built.
    pub fn resolve(&self, query: &str) -> Result<Option<Resolution>> {
        let registry = self.registry()?;
        let found = registry.match_query_with(query, self.tiers)?;
        Ok(found.map(|hit| hit.to_resolution()))
    }

    /// Resolve and return the match trace as well.
    pub fn resolve_verbose(&self, query: &str) -> Result<ResolveVerbose> {
        let registry = self.registry()?;
        let (found, details) = registry.match_verbose(query, self.tiers)?;
        Ok(ResolveVerbose {
            resolution: found.map(|hit| hit.to_resolution()),
            details,
            loaded_at: self.loaded_at(),
        })
    }

    /// Resolve, treating "no match" as `UnapprovedKeyword` unless `lenient`.
    pub fn validate_only(&self, query: &str, lenient: bool) -> Result<Option<Resolution>> {
        match self.resolve(query)? {
            Some(resolution) => Ok(Some(resolution)),
            None if lenient => Ok(None),
            None => Err(KeywordError::UnapprovedKeyword(query.to_string())),
        }
    }
}
