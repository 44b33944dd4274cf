//! Two-phase, tier-ordered matching.
//!
//! ```text
//! query ──▶ normalize_phrase ──▶ (1) direct lookup   exact → synonym → typo
//!                                     │ first hit wins
//!                                     └─ miss ──▶ (2) containment scan
//!                                                    exact → synonym → typo
//!                                                    registration order within a tier
//!                                                    word-bounded (see boundary.rs)
//! ```
//!
//! Phase 1 is a hash probe per tier. Phase 2 is linear in the number of
//! registered phrases and only runs when phase 1 misses, which recovers
//! phrases embedded in longer free text ("i need a password reset link").
//!
//! Empty queries are rejected with `InvalidInput` before either phase runs.

use super::boundary::PhrasePattern;
use super::index::KeywordRegistry;
use super::normalize::normalize_phrase;
use crate::error::Result;
use crate::{KeywordEntry, Resolution, Tier, TierSet};
use std::time::{Duration, Instant};
use tracing::debug;

/// Which phase of the algorithm produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    DirectLookup,
    ContainmentScan,
}

/// A successful match, borrowing from the registry that produced it.
#[derive(Debug, Clone, Copy)]
pub struct Match<'r> {
    pub entry: &'r KeywordEntry,
    /// Phrase as declared in the source.
    pub phrase: &'r str,
    pub tier: Tier,
    pub phase: MatchPhase,
    pub(crate) pattern: &'r PhrasePattern,
}

impl Match<'_> {
    pub fn canonical_id(&self) -> &str {
        &self.entry.canonical_id
    }

    /// The matched phrase after normalization.
    pub fn normalized_phrase(&self) -> &str {
        self.pattern.normalized()
    }

    pub fn to_resolution(&self) -> Resolution {
        Resolution {
            canonical_id: self.entry.canonical_id.clone(),
            matched_term: self.phrase.to_string(),
            tier: self.tier,
        }
    }
}

/// Trace of a single match call.
#[derive(Debug, Clone)]
pub struct MatchDetails {
    pub normalized_query: String,
    /// Tiers that were consulted, in order.
    pub tiers: Vec<Tier>,
    pub phase: Option<MatchPhase>,
    /// Map probes in phase 1 plus phrases tested in phase 2.
    pub probes: usize,
    pub elapsed: Duration,
}

impl KeywordRegistry {
    /// Resolve `query` to the best match across all tiers.
    pub fn match_query(&self, query: &str) -> Result<Option<Match<'_>>> {
        self.match_query_with(query, TierSet::all())
    }

    /// Like [`match_query`](Self::match_query), restricted to `tiers`.
    pub fn match_query_with(&self, query: &str, tiers: TierSet) -> Result<Option<Match<'_>>> {
        self.match_verbose(query, tiers).map(|(found, _)| found)
    }

    /// Match and return the trace alongside the result.
    pub fn match_verbose(&self, query: &str, tiers: TierSet) -> Result<(Option<Match<'_>>, MatchDetails)> {
        let start = Instant::now();
        let normalized = normalize_phrase(query)?;
        let mut probes = 0;

        let mut found = self.direct_lookup(&normalized, tiers, &mut probes);
        if found.is_none() {
            found = self.containment_scan(&normalized, tiers, &mut probes);
        }

        match &found {
            Some(hit) => debug!(
                query = %normalized,
                canonical_id = %hit.entry.canonical_id,
                phrase = hit.phrase,
                tier = %hit.tier,
                phase = ?hit.phase,
                probes,
                "query resolved"
            ),
            None => debug!(query = %normalized, probes, "query did not resolve"),
        }

        let details = MatchDetails {
            normalized_query: normalized,
            tiers: tiers.tiers().collect(),
            phase: found.as_ref().map(|hit| hit.phase),
            probes,
            elapsed: start.elapsed(),
        };
        Ok((found, details))
    }

    /// Convenience wrapper returning an owned [`Resolution`].
    pub fn resolve(&self, query: &str) -> Result<Option<Resolution>> {
        Ok(self.match_query(query)?.map(|hit| hit.to_resolution()))
    }

    fn direct_lookup(&self, normalized: &str, tiers: TierSet, probes: &mut usize) -> Option<Match<'_>> {
        for tier in tiers.tiers() {
            *probes += 1;
            let index = self.tier(tier);
            if let Some(&slot) = index.lookup.get(normalized) {
                return Some(self.hit(tier, slot, MatchPhase::DirectLookup));
            }
        }
        None
    }

    fn containment_scan(&self, normalized: &str, tiers: TierSet, probes: &mut usize) -> Option<Match<'_>> {
        for tier in tiers.tiers() {
            for (slot, phrase) in self.tier(tier).slots.iter().enumerate() {
                *probes += 1;
                if phrase.pattern.is_contained_in(normalized) {
                    return Some(self.hit(tier, slot, MatchPhase::ContainmentScan));
                }
            }
        }
        None
    }

    fn hit(&self, tier: Tier, slot: usize, phase: MatchPhase) -> Match<'_> {
        let phrase = &self.tier(tier).slots[slot];
        Match { entry: self.entry_at(phrase.entry), phrase: &phrase.phrase, tier, phase, pattern: &phrase.pattern }
    }
}
