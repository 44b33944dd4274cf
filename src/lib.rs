#[macro_use]
mod macros;
mod api;
mod engine;
pub mod error;
mod loader;
mod query;
mod source;

pub use api::{ResolveVerbose, Resolver};
pub use engine::{KeywordRegistry, Match, MatchDetails, MatchPhase, RegistryCache, normalize_phrase};
pub use error::{KeywordError, Result};
pub use loader::{KeywordRecord, OneOrMany, Scalar, build_entries, build_entry, load_registry, records_from_yaml};
pub use query::{ParsedQuery, Policy, QueryParser};
pub use source::{DEFAULT_REGISTRY_PATH, KeywordSource, SourceMarker, StaticSource, YamlFileSource};

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Opaque, order-preserving policy metadata (`filters`, `boosts`, `rerank`).
///
/// The engine never looks inside these values; they are carried from the
/// declarative source to the [`ParsedQuery`] untouched.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

// --- Tiers ------------------------------------------------------------------

/// Priority-ordered phrase category. Declaration order is match order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Exact,
    Synonym,
    Typo,
}

impl Tier {
    /// All tiers, highest priority first.
    pub const ALL: [Tier; 3] = [Tier::Exact, Tier::Synonym, Tier::Typo];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Exact => "exact",
            Tier::Synonym => "synonym",
            Tier::Typo => "typo",
        }
    }

    pub(crate) fn slot(self) -> usize {
        self as usize
    }

    pub(crate) fn flag(self) -> TierSet {
        match self {
            Tier::Exact => TierSet::EXACT,
            Tier::Synonym => TierSet::SYNONYM,
            Tier::Typo => TierSet::TYPO,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Tier::Exact),
            "synonym" => Ok(Tier::Synonym),
            "typo" => Ok(Tier::Typo),
            other => Err(format!("unknown tier '{other}' (expected exact, synonym or typo)")),
        }
    }
}

bitflags::bitflags! {
    /// Set of tiers a match is allowed to consult.
    ///
    /// Restricting the set never changes the relative priority of the tiers
    /// that remain.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TierSet: u8 {
        const EXACT   = 1 << 0;
        const SYNONYM = 1 << 1;
        const TYPO    = 1 << 2;
    }
}

impl TierSet {
    pub fn includes(self, tier: Tier) -> bool {
        self.contains(tier.flag())
    }

    /// Enabled tiers in priority order.
    pub fn tiers(self) -> impl Iterator<Item = Tier> {
        Tier::ALL.into_iter().filter(move |t| self.includes(*t))
    }
}

impl Default for TierSet {
    fn default() -> Self {
        TierSet::all()
    }
}

impl From<Tier> for TierSet {
    fn from(tier: Tier) -> Self {
        tier.flag()
    }
}

// --- Entries and results ----------------------------------------------------

/// One administrator-approved keyword concept.
///
/// Built once by the loader (or directly, for embedded registries) and never
/// mutated once handed to a [`KeywordRegistry`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeywordEntry {
    pub canonical_id: String,
    pub terms: Vec<String>,
    pub synonyms: Vec<String>,
    pub typos: Vec<String>,
    /// Advisory only: surfaced to consumers, never enforced by matching.
    pub negative_terms: Vec<String>,
    pub filters: Metadata,
    pub boosts: Metadata,
    pub rerank: Metadata,
}

impl KeywordEntry {
    pub fn new(canonical_id: impl Into<String>, terms: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            canonical_id: canonical_id.into(),
            terms: terms.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_synonyms(mut self, synonyms: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_typos(mut self, typos: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.typos = typos.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_negative_terms(mut self, negative_terms: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.negative_terms = negative_terms.into_iter().map(Into::into).collect();
        self
    }

    /// Phrases registered under `tier`, in declaration order.
    pub fn phrases(&self, tier: Tier) -> &[String] {
        match tier {
            Tier::Exact => &self.terms,
            Tier::Synonym => &self.synonyms,
            Tier::Typo => &self.typos,
        }
    }

    /// Terms, then synonyms, then typos.
    pub fn all_phrases(&self) -> impl Iterator<Item = &str> {
        Tier::ALL.into_iter().flat_map(move |tier| self.phrases(tier).iter().map(String::as_str))
    }
}

/// Outcome of resolving a query to a canonical keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub canonical_id: String,
    /// The phrase as declared in the source (not normalized).
    pub matched_term: String,
    pub tier: Tier,
}
