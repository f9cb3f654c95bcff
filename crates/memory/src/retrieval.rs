/// Relevance scoring for recall queries.
///
/// Scoring model (weights sum to 1.0):
/// ```text
/// score = coverage(0.4) + key_similarity(0.4) + value_similarity(0.2)
/// ```
/// * `coverage`          – share of distinct query tokens found as substrings
///   of `"{key} {value}"` (case-insensitive)
/// * `key_similarity`    – gestalt ratio between the lower-cased query and key
/// * `value_similarity`  – gestalt ratio between the lower-cased query and the
///   first 200 characters of the lower-cased value
///
/// The weights and the 200-character window are fixed; changing either
/// changes ranking behaviour for every stored fact.
use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::schema::truncate_str;
use crate::scorer::similarity_ratio;

pub const COVERAGE_WEIGHT: f64 = 0.4;
pub const KEY_WEIGHT: f64 = 0.4;
pub const VALUE_WEIGHT: f64 = 0.2;

/// Only this many leading characters of a value take part in fuzzy matching.
pub const VALUE_SCAN_CHARS: usize = 200;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid word regex"));

/// Query text pre-processed once per search.
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    lowered: String,
    tokens: BTreeSet<String>,
}

impl PreparedQuery {
    pub fn new(query: &str) -> Self {
        let lowered = query.to_lowercase();
        let tokens = tokenize(&lowered);
        Self { lowered, tokens }
    }

    pub fn tokens(&self) -> &BTreeSet<String> {
        &self.tokens
    }
}

/// Per-signal breakdown of one triple's score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevanceScore {
    pub coverage: f64,
    pub key_similarity: f64,
    pub value_similarity: f64,
    pub total: f64,
}

impl RelevanceScore {
    pub fn rationale(&self) -> String {
        format!(
            "coverage={:.3}; key={:.3}; value={:.3}",
            self.coverage, self.key_similarity, self.value_similarity
        )
    }
}

/// Distinct lower-cased word tokens (`\w+` runs, underscore included).
pub fn tokenize(text: &str) -> BTreeSet<String> {
    WORD_RE
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Fraction of `tokens` occurring anywhere in `"{key} {value}"`.  An empty
/// token set covers nothing.
pub fn keyword_coverage(tokens: &BTreeSet<String>, key: &str, value: &str) -> f64 {
    let haystack = format!("{key} {value}").to_lowercase();
    let hits = tokens.iter().filter(|t| haystack.contains(t.as_str())).count();
    hits as f64 / tokens.len().max(1) as f64
}

pub fn score_triple(query: &PreparedQuery, key: &str, value: &str) -> RelevanceScore {
    let coverage = keyword_coverage(&query.tokens, key, value);
    let key_similarity = similarity_ratio(&query.lowered, &key.to_lowercase());
    let value_window = truncate_str(value, VALUE_SCAN_CHARS).to_lowercase();
    let value_similarity = similarity_ratio(&query.lowered, &value_window);

    RelevanceScore {
        coverage,
        key_similarity,
        value_similarity,
        total: COVERAGE_WEIGHT * coverage + KEY_WEIGHT * key_similarity + VALUE_WEIGHT * value_similarity,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test]
    fn tokenize_splits_on_non_word_characters() {
        let terms = tokenize("API key, stored in .env!");
        let expected: BTreeSet<String> = ["api", "key", "stored", "in", "env"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(terms, expected);
    }

    #[test]
    fn tokenize_keeps_underscored_identifiers_whole() {
        let terms = tokenize("database_host");
        assert!(terms.contains("database_host"));
        assert_eq!(terms.len(), 1);
    }

    #[test]
    fn coverage_counts_distinct_tokens_once() {
        let tokens = tokenize("blue blue sky");
        assert!(approx(keyword_coverage(&tokens, "color", "Blue"), 0.5));
    }

    #[test]
    fn coverage_matches_substrings_across_key_and_value() {
        let tokens = tokenize("data host 5432");
        assert!(approx(keyword_coverage(&tokens, "database_host", "localhost:5432"), 1.0));
    }

    #[test]
    fn empty_query_scores_by_fuzzy_terms_only() {
        let score = score_triple(&PreparedQuery::new(""), "key", "value");
        assert!(approx(score.coverage, 0.0));
        assert!(approx(score.key_similarity, 0.0));
        assert!(approx(score.total, 0.0));
    }

    #[test]
    fn exact_key_and_value_match_scores_one() {
        let score = score_triple(&PreparedQuery::new("Color"), "color", "COLOR");
        assert!(approx(score.total, 1.0));
    }

    #[test]
    fn weights_blend_the_three_signals() {
        let query = PreparedQuery::new("database");
        let score = score_triple(&query, "database_host", "localhost:5432");
        let expected = 0.4 * score.coverage + 0.4 * score.key_similarity + 0.2 * score.value_similarity;
        assert!(approx(score.total, expected));
        assert!(approx(score.coverage, 1.0));
        assert!(approx(score.key_similarity, 16.0 / 21.0));
    }

    #[test]
    fn value_similarity_only_sees_the_leading_window() {
        let query = PreparedQuery::new("tail");
        let long_value = format!("{}tail", "x".repeat(VALUE_SCAN_CHARS));
        let score = score_triple(&query, "k", &long_value);
        // the window is all 'x', so the fuzzy value signal finds nothing
        assert!(approx(score.value_similarity, 0.0));
        // coverage still scans the full value
        assert!(approx(score.coverage, 1.0));
    }

    #[test]
    fn adding_a_present_token_never_lowers_coverage() {
        let key = "favourite_color";
        let value = "blue";
        let base = keyword_coverage(&tokenize("favorite"), key, value);
        let extended = keyword_coverage(&tokenize("favorite blue"), key, value);
        assert!(extended >= base);
    }
}
