/// In-memory relevance index over every `(category, key, value)` triple.
///
/// The index is a derived, query-only copy of the manager's
/// [`CategoryMap`].  It is rebuilt wholesale by [`RelevanceIndex::load`]
/// after every successful save and never patched incrementally, so it always
/// equals the flattening of the map as of the last synchronisation point.
///
/// Search cost is linear in the number of triples; there is no external
/// model, network call or persistence behind it.
use tracing::{debug, trace};

use crate::error::{MemoryError, Result};
use crate::retrieval::{PreparedQuery, score_triple};
use crate::schema::{CategoryMap, RecallHit};

pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_THRESHOLD: f64 = 0.4;

/// Ranking parameters for [`RelevanceIndex::search`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecallOptions {
    /// Maximum number of hits; `0` yields no hits.
    pub limit: usize,
    /// Minimum score, inclusive.  Must be finite and within `[0, 1]`.
    pub threshold: f64,
}

impl Default for RecallOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl RecallOptions {
    pub fn new(limit: usize, threshold: f64) -> Self {
        Self { limit, threshold }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(MemoryError::invalid(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

impl From<&memkit_config::RecallConfig> for RecallOptions {
    fn from(config: &memkit_config::RecallConfig) -> Self {
        Self::new(config.limit, config.threshold)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedTriple {
    pub category: String,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct RelevanceIndex {
    triples: Vec<IndexedTriple>,
}

impl RelevanceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole triple set with the flattening of `data`.
    pub fn load(&mut self, data: &CategoryMap) {
        self.triples = data
            .triples()
            .map(|(category, entry)| IndexedTriple {
                category: category.to_string(),
                key: entry.key.clone(),
                value: entry.value.clone(),
            })
            .collect();
        debug!(triples = self.triples.len(), "relevance index rebuilt");
    }

    pub fn clear(&mut self) {
        self.triples.clear();
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn triples(&self) -> &[IndexedTriple] {
        &self.triples
    }

    /// Hits scoring at least `options.threshold`, best first, at most
    /// `options.limit` of them.  Equal scores keep index order (category
    /// first-seen order, then entry order).
    pub fn search(&self, query: &str, options: RecallOptions) -> Result<Vec<RecallHit>> {
        options.validate()?;
        if options.limit == 0 || self.triples.is_empty() {
            return Ok(Vec::new());
        }

        let prepared = PreparedQuery::new(query);
        let mut ranked: Vec<(&IndexedTriple, f64)> = self
            .triples
            .iter()
            .filter_map(|triple| {
                let score = score_triple(&prepared, &triple.key, &triple.value);
                trace!(
                    category = %triple.category,
                    key = %triple.key,
                    score = score.total,
                    rationale = %score.rationale(),
                    "scored triple"
                );
                (score.total >= options.threshold).then_some((triple, score.total))
            })
            .collect();

        // stable: ties stay in index order
        ranked.sort_by(|(_, ls), (_, rs)| rs.total_cmp(ls));

        debug!(
            tokens = prepared.tokens().len(),
            qualifying = ranked.len(),
            limit = options.limit,
            "recall search"
        );

        Ok(ranked
            .into_iter()
            .take(options.limit)
            .map(|(triple, score)| RecallHit {
                category: triple.category.clone(),
                key: triple.key.clone(),
                value: triple.value.clone(),
                score,
            })
            .collect())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
