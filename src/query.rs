//! Query decomposition.
//!
//! `QueryParser::parse` resolves a query, strips the matched phrase out of it
//! and classifies whatever is left according to a [`Policy`]:
//!
//! ```text
//! Start ─▶ validate (non-empty) ─▶ resolve ─┬─ no match ─┬─ LENIENT ─▶ Ok(None)
//!                                           │            └─ STRICT  ─▶ Err(UnapprovedKeyword)
//!                                           └─ match ─▶ tokenize remainder ─▶ classify ─▶ ParsedQuery
//! ```
//!
//! Remainder tokens are never split between the two buckets: under `STRICT`
//! they all become `must_not`, under `LENIENT` they are all `ignored`.

use crate::api::Resolver;
use crate::engine::{KeywordRegistry, Match};
use crate::error::{KeywordError, Result};
use crate::{Metadata, Tier, TierSet};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// How unmatched context in a query is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Policy {
    /// Non-resolution is an error; leftover tokens are forbidden context.
    #[default]
    Strict,
    /// Non-resolution is `None`; leftover tokens are noise.
    Lenient,
}

impl Policy {
    pub fn as_str(self) -> &'static str {
        match self {
            Policy::Strict => "STRICT",
            Policy::Lenient => "LENIENT",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Policy {
    type Err = KeywordError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STRICT" => Ok(Policy::Strict),
            "LENIENT" => Ok(Policy::Lenient),
            _ => Err(KeywordError::UnsupportedPolicy(s.to_string())),
        }
    }
}

/// Structured result of [`QueryParser::parse`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedQuery {
    pub canonical_id: String,
    pub matched_term: String,
    pub tier: Tier,
    pub filters: Metadata,
    pub boosts: Metadata,
    pub rerank: Metadata,
    pub negative_terms: Vec<String>,
    /// Remainder tokens under `STRICT`; empty under `LENIENT`.
    pub must_not: Vec<String>,
    /// Remainder tokens under `LENIENT`; empty under `STRICT`.
    pub ignored: Vec<String>,
    /// The query exactly as supplied.
    pub raw_query: String,
}

/// Parses queries against the registry published by a [`Resolver`].
#[derive(Debug, Clone, Copy)]
pub struct QueryParser<'r> {
    resolver: &'r Resolver,
}

impl<'r> QueryParser<'r> {
    pub fn new(resolver: &'r Resolver) -> Self {
        Self { resolver }
    }

    /// Parse `query` under `policy`.
    ///
    /// Returns `Ok(None)` only for an unresolved query under `LENIENT`.
    pub fn parse(&self, query: &str, policy: Policy) -> Result<Option<ParsedQuery>> {
        if query.trim().is_empty() {
            return Err(KeywordError::InvalidInput("query must be a non-empty string".to_string()));
        }
        let registry = self.resolver.registry()?;
        parse_with_registry(&registry, query, policy, self.resolver.tiers())
    }

    /// Like [`parse`](Self::parse), with the policy given as text
    /// (`"strict"`, `"LENIENT"`, ...).
    pub fn parse_str(&self, query: &str, policy: &str) -> Result<Option<ParsedQuery>> {
        self.parse(query, policy.parse()?)
    }
}

fn parse_with_registry(
    registry: &KeywordRegistry,
    query: &str,
    policy: Policy,
    tiers: TierSet,
) -> Result<Option<ParsedQuery>> {
    let Some(hit) = registry.match_query_with(query, tiers)? else {
        return match policy {
            Policy::Lenient => Ok(None),
            Policy::Strict => Err(KeywordError::UnapprovedKeyword(query.to_string())),
        };
    };

    let remainder = remainder_tokens(query, &hit);
    let (must_not, ignored) = match policy {
        Policy::Strict => (remainder, Vec::new()),
        Policy::Lenient => (Vec::new(), remainder),
    };

    let entry = hit.entry;
    Ok(Some(ParsedQuery {
        canonical_id: entry.canonical_id.clone(),
        matched_term: hit.phrase.to_string(),
        tier: hit.tier,
        filters: entry.filters.clone(),
        boosts: entry.boosts.clone(),
        rerank: entry.rerank.clone(),
        negative_terms: entry.negative_terms.clone(),
        must_not,
        ignored,
        raw_query: query.to_string(),
    }))
}

/// Lowercase `query`, drop the first occurrence of the matched phrase and
/// collect the remaining `[a-z0-9@._-]` runs, deduplicated in first-seen order.
fn remainder_tokens(query: &str, hit: &Match<'_>) -> Vec<String> {
    let lowered = query.to_lowercase();
    let remainder = hit.pattern.remove_first(&lowered);

    let mut seen = HashSet::new();
    regex!(r"[a-z0-9@._-]+")
        .find_iter(&remainder)
        .map(|m| m.as_str())
        .filter(|token| seen.insert(*token))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticSource;
    use serde_json::json;

    const REGISTRY: &str = r#"
- id: password_reset
  terms: password reset
  synonyms: [credential reset]
  typos: passwrod reset
  negative_terms: [promo, newsletter]
  filters: {has_attachment: false}
  boosts: {subject: 4.0}
- id: invoice
  terms: [invoice]
"#;

    fn resolver() -> Resolver {
        Resolver::new(StaticSource::from_yaml(REGISTRY).unwrap())
    }

    #[test]
    fn policy_parsing_is_case_insensitive() {
        assert_eq!("strict".parse::<Policy>().unwrap(), Policy::Strict);
        assert_eq!(" Lenient ".parse::<Policy>().unwrap(), Policy::Lenient);
        assert_eq!(Policy::default(), Policy::Strict);
        assert!(matches!("loose".parse::<Policy>(), Err(KeywordError::UnsupportedPolicy(ref p)) if p == "loose"));
        assert!(matches!("".parse::<Policy>(), Err(KeywordError::UnsupportedPolicy(_))));
    }

    #[test]
    fn strict_policy_collects_must_not_tokens() {
        let resolver = resolver();
        let parsed = QueryParser::new(&resolver).parse("urgent password reset please", Policy::Strict).unwrap().unwrap();
        assert_eq!(parsed.canonical_id, "password_reset");
        assert_eq!(parsed.matched_term, "password reset");
        assert_eq!(parsed.tier, Tier::Exact);
        assert_eq!(parsed.must_not, vec!["urgent", "please"]);
        assert!(parsed.ignored.is_empty());
        assert_eq!(parsed.raw_query, "urgent password reset please");
    }

    #[test]
    fn lenient_policy_collects_ignored_tokens() {
        let resolver = resolver();
        let parsed = QueryParser::new(&resolver).parse("urgent password reset please", Policy::Lenient).unwrap().unwrap();
        assert!(parsed.must_not.is_empty());
        assert_eq!(parsed.ignored, vec!["urgent", "please"]);
    }

    #[test]
    fn metadata_is_carried_through() {
        let resolver = resolver();
        let parsed = QueryParser::new(&resolver).parse("credential reset", Policy::Strict).unwrap().unwrap();
        assert_eq!(parsed.tier, Tier::Synonym);
        assert_eq!(parsed.negative_terms, vec!["promo", "newsletter"]);
        assert_eq!(parsed.filters["has_attachment"], json!(false));
        assert_eq!(parsed.boosts["subject"], json!(4.0));
        assert!(parsed.rerank.is_empty());
        assert!(parsed.must_not.is_empty() && parsed.ignored.is_empty());
    }

    #[test]
    fn unresolved_query_depends_on_policy() {
        let resolver = resolver();
        let parser = QueryParser::new(&resolver);
        assert_eq!(parser.parse("system outage", Policy::Lenient).unwrap(), None);
        assert!(matches!(parser.parse("system outage", Policy::Strict), Err(KeywordError::UnapprovedKeyword(_))));
    }

    #[test]
    fn empty_query_is_rejected_under_both_policies() {
        let resolver = resolver();
        let parser = QueryParser::new(&resolver);
        for policy in [Policy::Strict, Policy::Lenient] {
            assert!(matches!(parser.parse("   ", policy), Err(KeywordError::InvalidInput(_))));
        }
    }

    #[test]
    fn remainder_tokens_are_deduplicated_and_keep_symbols() {
        let resolver = resolver();
        let parsed = QueryParser::new(&resolver)
            .parse("Invoice from billing@example.com, re: invoice_2024 from Billing", Policy::Lenient)
            .unwrap()
            .unwrap();
        assert_eq!(parsed.ignored, vec!["from", "billing@example.com", "re", "invoice_2024", "billing"]);
    }

    #[test]
    fn only_first_occurrence_of_phrase_is_stripped() {
        let resolver = resolver();
        let parsed = QueryParser::new(&resolver).parse("invoice for invoice", Policy::Strict).unwrap().unwrap();
        assert_eq!(parsed.must_not, vec!["for", "invoice"]);
    }

    #[test]
    fn irregular_spacing_still_strips_phrase() {
        let resolver = resolver();
        let parsed = QueryParser::new(&resolver).parse("  Password    RESET   now ", Policy::Strict).unwrap().unwrap();
        assert_eq!(parsed.must_not, vec!["now"]);
    }

    #[test]
    fn parse_str_rejects_unknown_policy() {
        let resolver = resolver();
        let parser = QueryParser::new(&resolver);
        assert!(matches!(parser.parse_str("invoice", "fuzzy"), Err(KeywordError::UnsupportedPolicy(_))));
        assert!(parser.parse_str("invoice", "lenient").unwrap().is_some());
    }

    #[test]
    fn parsed_query_serializes_with_lowercase_tier() {
        let resolver = resolver();
        let parsed = QueryParser::new(&resolver).parse("invoice", Policy::Strict).unwrap().unwrap();
        let value = serde_json::to_value(&parsed).unwrap();
        assert_eq!(value["tier"], json!("exact"));
        assert_eq!(value["must_not"], json!([]));
        assert_eq!(value["raw_query"], json!("invoice"));
    }
}
