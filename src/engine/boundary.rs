//! Word-bounded phrase patterns.
//!
//! A registered phrase is considered *contained* in a query only when it is
//! delimited by word boundaries: "sting" must not hit inside "something".
//! Each phrase is compiled once at registry build time and reused for:
//!
//! - the containment scan (phase 2 of matching, over a normalized query), and
//! - stripping one occurrence of the matched phrase out of a lowercased raw
//!   query before its remainder is tokenized.
//!
//! Words inside the pattern are joined by `\s+`, so a raw query with irregular
//! spacing still has its phrase removed. Against a normalized query (single
//! spaces) this is the same as a literal match.

use crate::error::{KeywordError, Result};
use regex::Regex;
use std::borrow::Cow;

#[derive(Debug, Clone)]
pub(crate) struct PhrasePattern {
    normalized: String,
    regex: Regex,
}

impl PhrasePattern {
    /// Compile a pattern for an already normalized phrase.
    pub(crate) fn new(normalized: &str) -> Result<Self> {
        let body = normalized.split(' ').map(regex::escape).collect::<Vec<_>>().join(r"\s+");
        let regex = Regex::new(&format!(r"\b{body}\b"))
            .map_err(|err| KeywordError::InvalidInput(format!("cannot compile phrase '{normalized}': {err}")))?;
        Ok(Self { normalized: normalized.to_string(), regex })
    }

    pub(crate) fn normalized(&self) -> &str {
        &self.normalized
    }

    /// True if the phrase equals `text` or occurs in it between word boundaries.
    pub(crate) fn is_contained_in(&self, text: &str) -> bool {
        self.normalized == text || self.regex.is_match(text)
    }

    /// Replace the first word-bounded occurrence in `text` with a single space.
    ///
    /// Only one occurrence is removed; repeats stay in the remainder.
    pub(crate) fn remove_first<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let stripped = self.regex.replacen(text, 1, " ");
        if matches!(stripped, Cow::Owned(_)) {
            return stripped;
        }
        // A phrase that starts or ends with punctuation has no boundary at the
        // edges of the query, but a whole-query match still counts.
        if text.split_whitespace().collect::<Vec<_>>().join(" ") == self.normalized {
            return Cow::Borrowed(" ");
        }
        stripped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(phrase: &str) -> PhrasePattern {
        PhrasePattern::new(phrase).unwrap()
    }

    #[test]
    fn containment_requires_word_boundaries() {
        let sting = pattern("sting");
        assert!(!sting.is_contained_in("something"));
        assert!(!sting.is_contained_in("stingray alert"));
        assert!(sting.is_contained_in("a sting operation"));
        assert!(sting.is_contained_in("sting"));
        assert!(sting.is_contained_in("bee sting."));
    }

    #[test]
    fn multi_word_phrase_is_contained() {
        let reset = pattern("password reset");
        assert!(reset.is_contained_in("i need a password reset link"));
        assert!(!reset.is_contained_in("password resetting"));
    }

    #[test]
    fn whole_query_counts_even_without_edge_boundaries() {
        let cpp = pattern("c++");
        assert!(cpp.is_contained_in("c++"));
        assert_eq!(cpp.remove_first("c++"), " ");
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let dotted = pattern("v1.2");
        assert!(dotted.is_contained_in("upgrade to v1.2 now"));
        assert!(!dotted.is_contained_in("upgrade to v1x2 now"));
    }

    #[test]
    fn remove_first_strips_a_single_occurrence() {
        let reset = pattern("reset");
        assert_eq!(reset.remove_first("reset the reset"), "  the reset");
    }

    #[test]
    fn remove_first_tolerates_irregular_spacing() {
        let reset = pattern("password reset");
        assert_eq!(reset.remove_first("urgent password   reset please"), "urgent   please");
    }

    #[test]
    fn remove_first_leaves_text_without_the_phrase() {
        let reset = pattern("password reset");
        assert_eq!(reset.remove_first("passwords reset"), "passwords reset");
    }
}
