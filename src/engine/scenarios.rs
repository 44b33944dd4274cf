use crate::{
    KeywordEntry, KeywordError, KeywordRegistry, Policy, QueryParser, Resolution, Resolver, StaticSource, Tier,
    build_entries, records_from_yaml,
};
use serde_json::json;

const SAMPLE_REGISTRY: &str = include_str!("../../config/keywords.yml");

fn sample_registry() -> KeywordRegistry {
    KeywordRegistry::new(build_entries(records_from_yaml(SAMPLE_REGISTRY).unwrap()).unwrap()).unwrap()
}

fn sample_resolver() -> Resolver {
    Resolver::new(StaticSource::from_yaml(SAMPLE_REGISTRY).unwrap())
}

fn resolution(id: &str, term: &str, tier: Tier) -> Option<Resolution> {
    Some(Resolution { canonical_id: id.to_string(), matched_term: term.to_string(), tier })
}

#[test]
fn literal_resolution_examples() {
    let resolver = sample_resolver();
    let cases = vec![
        ("password reset", resolution("password_reset", "password reset", Tier::Exact)),
        ("credential reset", resolution("password_reset", "credential reset", Tier::Synonym)),
        ("passwrod reset", resolution("password_reset", "passwrod reset", Tier::Typo)),
        ("unauthorized recovery", None),
        ("I need a password reset link", resolution("password_reset", "password reset", Tier::Exact)),
        ("Your INVOICE is ready", resolution("invoice", "invoice", Tier::Exact)),
        ("invoices are ready", None),
        ("new sign-in from Chrome", resolution("login_alert", "new sign-in", Tier::Exact)),
    ];
    for (query, expected) in cases {
        assert_eq!(resolver.resolve(query).unwrap(), expected, "query: {query:?}");
    }
}

#[test]
fn validate_only_strict_and_lenient() {
    let resolver = sample_resolver();
    assert!(matches!(resolver.validate_only("suspicious activity", false), Err(KeywordError::UnapprovedKeyword(_))));
    assert_eq!(resolver.validate_only("suspicious activity", true).unwrap(), None);
}

#[test]
fn parse_without_keyword_depends_on_policy() {
    let resolver = sample_resolver();
    let parser = QueryParser::new(&resolver);
    assert_eq!(parser.parse("system outage", Policy::Lenient).unwrap(), None);
    assert!(matches!(parser.parse("system outage", Policy::Strict), Err(KeywordError::UnapprovedKeyword(_))));
}

#[test]
fn duplicate_term_across_entries_fails_construction() {
    let err = KeywordRegistry::new([KeywordEntry::new("first", ["reset"]), KeywordEntry::new("second", ["reset"])])
        .unwrap_err();
    assert!(matches!(err, KeywordError::DuplicatePhrase { .. }));
}

#[test]
fn strict_and_lenient_partition_the_remainder() {
    let resolver = sample_resolver();
    let parser = QueryParser::new(&resolver);

    let strict = parser.parse("urgent password reset please", Policy::Strict).unwrap().unwrap();
    assert_eq!(strict.canonical_id, "password_reset");
    assert_eq!(strict.must_not, vec!["urgent", "please"]);
    assert!(strict.ignored.is_empty());

    let lenient = parser.parse("urgent password reset please", Policy::Lenient).unwrap().unwrap();
    assert!(lenient.must_not.is_empty());
    assert_eq!(lenient.ignored, vec!["urgent", "please"]);
}

#[test]
fn sample_metadata_is_preserved() {
    let registry = sample_registry();
    let entry = registry.get("password_reset").unwrap();
    assert_eq!(entry.negative_terms, vec!["promo", "newsletter"]);
    assert_eq!(entry.filters["has_attachment"], json!(false));
    assert_eq!(entry.boosts["subject"], json!(4.0));
    assert_eq!(entry.boosts["from_suffix"], json!(["@security.", "@no-reply."]));
    assert_eq!(entry.rerank["recency_decay"]["scale"], json!("7d"));

    let login = registry.get("login_alert").unwrap();
    assert_eq!(login.negative_terms, vec!["marketing"]);
}

#[test]
fn every_registered_phrase_resolves_to_its_entry_and_tier() {
    let registry = sample_registry();
    for entry in registry.entries() {
        for tier in Tier::ALL {
            for phrase in entry.phrases(tier) {
                let hit = registry.resolve(phrase).unwrap().unwrap();
                assert_eq!(hit.canonical_id, entry.canonical_id, "phrase: {phrase:?}");
                assert_eq!(hit.tier, tier, "phrase: {phrase:?}");
                assert_eq!(&hit.matched_term, phrase);
            }
        }
    }
}

#[test]
fn matched_term_always_belongs_to_the_resolved_entry() {
    let registry = sample_registry();
    let queries = [
        "urgent password reset please",
        "account recovery for bob",
        "Pasword Reset!!",
        "receipt attached",
        "sign-in attempt blocked",
        "monthly billing statement",
        "invocie 2024",
    ];
    for query in queries {
        let hit = registry.resolve(query).unwrap().unwrap_or_else(|| panic!("no match for {query:?}"));
        let entry = registry.get(&hit.canonical_id).unwrap();
        assert!(entry.all_phrases().any(|p| p == hit.matched_term), "query: {query:?}");
    }
}

#[test]
fn rebuilding_the_same_source_is_deterministic() {
    let first = sample_registry();
    let second = sample_registry();
    let queries = [
        "password reset",
        "please send the receipt",
        "login alert and invoice",
        "nothing relevant here",
        "new sign-in, reset password",
    ];
    for query in queries {
        assert_eq!(first.resolve(query).unwrap(), second.resolve(query).unwrap(), "query: {query:?}");
    }
}

#[test]
fn higher_tier_wins_over_contained_lower_tier_phrase() {
    let registry = KeywordRegistry::new([
        KeywordEntry::new("link_request", ["access request"]).with_synonyms(["reset link request"]),
        KeywordEntry::new("reset_link", ["reset url"]).with_typos(["reset link"]),
    ])
    .unwrap();
    let hit = registry.resolve("reset link request").unwrap().unwrap();
    assert_eq!(hit.canonical_id, "link_request");
    assert_eq!(hit.tier, Tier::Synonym);
}

#[test]
fn phrase_inside_a_longer_word_does_not_match() {
    let registry = KeywordRegistry::new([KeywordEntry::new("sting", ["sting"])]).unwrap();
    assert_eq!(registry.resolve("something odd").unwrap(), None);
    assert_eq!(registry.resolve("stinger").unwrap(), None);
    assert!(registry.resolve("the sting").unwrap().is_some());
}
