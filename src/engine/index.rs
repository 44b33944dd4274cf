//! Registry construction and indexing.
//!
//! `KeywordRegistry::new` turns validated `KeywordEntry` values into three
//! priority-ordered lookup tables, one per [`Tier`]. Construction is the only
//! place the registry is written; afterwards it is shared read-only.
//!
//! ## Invariants
//!
//! - Canonical ids are unique and non-blank; every entry has at least one term.
//! - Within one tier, no two phrases normalize to the same string, whether
//!   they come from the same entry or from different ones.
//! - The same normalized phrase *may* appear in two different tiers. That is
//!   legal but almost always a mistake in the source, so it is logged.
//! - `TierIndex::slots` is in registration order and `TierIndex::lookup`
//!   indexes into it. Every slot's `entry` indexes into `entries`.
//! - Any failure discards the partially built registry.

use super::boundary::PhrasePattern;
use super::normalize::normalize_phrase;
use crate::error::{KeywordError, Result};
use crate::{KeywordEntry, Tier};
use std::collections::HashMap;
use tracing::{info, warn};

/// One registered phrase.
#[derive(Debug, Clone)]
pub(crate) struct PhraseSlot {
    /// Index into `KeywordRegistry::entries`.
    pub(crate) entry: usize,
    /// Phrase as written in the source.
    pub(crate) phrase: String,
    pub(crate) pattern: PhrasePattern,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct TierIndex {
    pub(crate) lookup: HashMap<String, usize>,
    pub(crate) slots: Vec<PhraseSlot>,
}

/// Immutable three-tier phrase index over a set of keyword entries.
#[derive(Debug, Clone)]
pub struct KeywordRegistry {
    entries: Vec<KeywordEntry>,
    by_id: HashMap<String, usize>,
    tiers: [TierIndex; 3],
}

impl KeywordRegistry {
    /// Build a registry from entries, in the order given.
    ///
    /// Fails with `DuplicateId`, `DuplicatePhrase`, `InvalidEntry` (blank id or
    /// no terms) or `InvalidInput` (a phrase that normalizes to nothing).
    pub fn new(entries: impl IntoIterator<Item = KeywordEntry>) -> Result<Self> {
        let mut registry =
            KeywordRegistry { entries: Vec::new(), by_id: HashMap::new(), tiers: Default::default() };

        for (index, entry) in entries.into_iter().enumerate() {
            registry.register(index, entry)?;
        }

        info!(
            entries = registry.entries.len(),
            exact = registry.phrase_count(Tier::Exact),
            synonym = registry.phrase_count(Tier::Synonym),
            typo = registry.phrase_count(Tier::Typo),
            "keyword registry built"
        );

        Ok(registry)
    }

    fn register(&mut self, index: usize, entry: KeywordEntry) -> Result<()> {
        if entry.canonical_id.trim().is_empty() {
            return Err(KeywordError::InvalidEntry { index, reason: "'id' may not be blank".to_string() });
        }
        if entry.terms.is_empty() {
            return Err(KeywordError::InvalidEntry {
                index,
                reason: format!("keyword '{}' requires at least one term", entry.canonical_id),
            });
        }
        if self.by_id.contains_key(&entry.canonical_id) {
            return Err(KeywordError::DuplicateId(entry.canonical_id));
        }

        let slot = self.entries.len();
        for tier in Tier::ALL {
            for phrase in entry.phrases(tier) {
                self.register_phrase(slot, &entry.canonical_id, tier, phrase)?;
            }
        }

        self.by_id.insert(entry.canonical_id.clone(), slot);
        self.entries.push(entry);
        Ok(())
    }

    fn register_phrase(&mut self, entry: usize, canonical_id: &str, tier: Tier, phrase: &str) -> Result<()> {
        let normalized = normalize_phrase(phrase)?;

        if let Some(&existing) = self.tiers[tier.slot()].lookup.get(&normalized) {
            let existing = &self.tiers[tier.slot()].slots[existing];
            let existing_id = self.canonical_id_of(existing.entry, canonical_id);
            return Err(KeywordError::DuplicatePhrase {
                canonical_id: canonical_id.to_string(),
                phrase: phrase.to_string(),
                tier,
                existing_id,
                existing_phrase: existing.phrase.clone(),
            });
        }

        for other in Tier::ALL.into_iter().filter(|t| *t != tier) {
            if let Some(&existing) = self.tiers[other.slot()].lookup.get(&normalized) {
                let existing = &self.tiers[other.slot()].slots[existing];
                warn!(
                    phrase,
                    canonical_id,
                    %tier,
                    existing_id = %self.canonical_id_of(existing.entry, canonical_id),
                    existing_tier = %other,
                    "phrase registered in more than one tier; the higher tier wins"
                );
            }
        }

        let pattern = PhrasePattern::new(&normalized)?;
        let index = &mut self.tiers[tier.slot()];
        index.lookup.insert(normalized, index.slots.len());
        index.slots.push(PhraseSlot { entry, phrase: phrase.to_string(), pattern });
        Ok(())
    }

    // The entry currently being registered is not in `entries` yet.
    fn canonical_id_of(&self, entry: usize, pending: &str) -> String {
        self.entries.get(entry).map_or_else(|| pending.to_string(), |e| e.canonical_id.clone())
    }

    /// Look up an entry by canonical id.
    pub fn get(&self, canonical_id: &str) -> Option<&KeywordEntry> {
        self.by_id.get(canonical_id).map(|&idx| &self.entries[idx])
    }

    /// Entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &KeywordEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of phrases registered under `tier`.
    pub fn phrase_count(&self, tier: Tier) -> usize {
        self.tiers[tier.slot()].slots.len()
    }

    pub(crate) fn tier(&self, tier: Tier) -> &TierIndex {
        &self.tiers[tier.slot()]
    }

    pub(crate) fn entry_at(&self, idx: usize) -> &KeywordEntry {
        &self.entries[idx]
    }
}
