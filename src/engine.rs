//! Keyword registry and matching engine.
//!
//! This module is the core of the crate: it owns the normalized phrase
//! indices, the two-phase matching algorithm and the cached, swappable
//! registry instance. The public facade in `api.rs` and the query
//! decomposition in `query.rs` sit on top of it.
//!
//! ## How the parts work together
//!
//! ```text
//! KeywordEntry (validated) ──┐
//!                            │  KeywordRegistry::new        (index.rs)
//!                            └──────────────┬────────────
//!                                           │  normalize_phrase (normalize.rs)
//!                                           │  PhrasePattern    (boundary.rs)
//!                                           v
//!                         exact / synonym / typo tier maps
//!                                           │
//! query ── normalize_phrase ────────────────┼─ match_query    (matcher.rs)
//!                                           │   1. direct lookup, tier order
//!                                           │   2. word-bounded containment scan
//!                                           v
//!                                 Option<Match>
//! ```
//!
//! `RegistryCache` (cache.rs) publishes one immutable `KeywordRegistry` behind
//! an `Arc` and rebuilds it when the source marker changes. Readers never lock
//! a published registry; the mutex only guards "check marker, rebuild, publish".
//!
//! ## Responsibilities by module
//!
//! - `normalize.rs`: the single normalization path shared by load time and
//!   query time.
//! - `boundary.rs`: per-phrase compiled patterns used for containment and for
//!   stripping the matched phrase out of a query.
//! - `index.rs`: registry construction and its invariants (unique ids, unique
//!   phrases per tier, all-or-nothing).
//! - `matcher.rs`: the tier-ordered lookup and scan, plus `MatchDetails`.
//! - `cache.rs`: lazily built, marker-invalidated registry instance.
//!
//! ## Debugging
//!
//! Build and match decisions are emitted as `tracing` events; run the CLI with
//! `RUST_LOG=kwres=debug` to see them.

#[path = "engine/boundary.rs"]
mod boundary;
#[path = "engine/cache.rs"]
mod cache;
#[path = "engine/index.rs"]
mod index;
#[path = "engine/matcher.rs"]
mod matcher;
#[path = "engine/normalize.rs"]
mod normalize;

#[cfg(test)]
#[path = "engine/scenarios.rs"]
mod scenarios;

pub use cache::RegistryCache;
pub use index::KeywordRegistry;
pub use matcher::{Match, MatchDetails, MatchPhase};
pub use normalize::normalize_phrase;
