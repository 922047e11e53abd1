//! Query classification, staged matching, and ranking.
//!
//! One query takes one of two paths: digit queries filter on dial codes;
//! everything else runs strict substring, short-key abbreviation, and fuzzy
//! similarity stages over normalized keys, merged through an ISO-deduplicating
//! appender. For a fixed record list the same query always returns the same
//! ordered result.

use std::collections::HashSet;

use crate::normalize::{build_search_key, remove_spaces};
use crate::record::CountryRecord;
use crate::scan::{CompiledPattern, ScanAlgorithm};
use crate::similarity::{Algorithm, SimilarityEngine, DEFAULT_NGRAM_SIZE};

/// Result-list fill level at which the fuzzy stage is skipped.
const FUZZY_SKIP_FILL: usize = 8;
/// Queries at or below this many chars never reach the fuzzy stage.
const FUZZY_SKIP_QUERY_LEN: usize = 2;

/// Longest spaceless query the short-key stage accepts.
const SHORT_KEY_MAX_LEN: usize = 3;
/// Short-key threshold for 1-2 char queries: exact matches only.
const SHORT_KEY_EXACT: f64 = 1.0;
/// Short-key Jaro-Winkler floor for 3-char queries against 2-char keys.
const SHORT_KEY_FUZZY: f64 = 0.85;

/// Fuzzy acceptance threshold for 1-2 char queries (effectively disables
/// the stage; kept total for callers that bypass the early exit).
const FUZZY_THRESHOLD_TINY: f64 = 0.999;
/// Fuzzy acceptance threshold for multi-token (cosine) queries.
const FUZZY_THRESHOLD_COSINE: f64 = 0.55;
/// Fuzzy acceptance threshold for queries of 3-4 chars.
const FUZZY_THRESHOLD_SHORT: f64 = 0.75;
/// Fuzzy acceptance threshold for queries of 5-7 chars.
const FUZZY_THRESHOLD_MEDIUM: f64 = 0.65;
/// Fuzzy acceptance threshold for longer queries.
const FUZZY_THRESHOLD_LONG: f64 = 0.55;

/// Query lengths bounding the threshold tiers above.
const TINY_QUERY_MAX: usize = 2;
const SHORT_QUERY_MAX: usize = 4;
const MEDIUM_QUERY_MAX: usize = 7;

/// Single-token queries up to this many chars use Jaro-Winkler; longer ones
/// switch to n-grams, which degrade more gracefully on long strings.
const JARO_WINKLER_QUERY_MAX: usize = 7;

/// Finder construction options.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FinderConfig {
    /// Upper bound on returned list length.
    pub max_results: usize,
    /// Substring-scan backend for the strict stage.
    pub strict_algorithm: ScanAlgorithm,
    /// Window width for n-gram similarity.
    pub ngram_size: usize,
    /// Entries retained by the similarity cache; 0 disables caching.
    pub similarity_cache_capacity: usize,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            max_results: 50,
            strict_algorithm: ScanAlgorithm::BoyerMoore,
            ngram_size: DEFAULT_NGRAM_SIZE,
            similarity_cache_capacity: 1024,
        }
    }
}

/// A strict (substring) hit with its ranking signals.
struct StrictHit<'a> {
    record: &'a CountryRecord,
    best_index: usize,
    is_prefix: bool,
    key_chars: usize,
}

/// A similarity-scored hit.
struct ScoredHit<'a> {
    record: &'a CountryRecord,
    score: f64,
}

/// Insertion-ordered result accumulator that rejects duplicate ISO codes.
struct ResultSet<'a> {
    out: Vec<&'a CountryRecord>,
    seen: HashSet<&'a str>,
}

impl<'a> ResultSet<'a> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            out: Vec::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    fn push(&mut self, record: &'a CountryRecord) {
        if self.seen.insert(record.iso_code.as_str()) {
            self.out.push(record);
        }
    }

    fn contains(&self, iso_code: &str) -> bool {
        self.seen.contains(iso_code)
    }

    fn len(&self) -> usize {
        self.out.len()
    }

    fn into_vec(self) -> Vec<&'a CountryRecord> {
        self.out
    }
}

/// The country search dispatcher.
///
/// Immutable after construction apart from the similarity cache, which is
/// internally synchronized; concurrent [`Finder::where_text`] calls on a
/// shared instance return the same results as sequential execution.
#[derive(Debug)]
pub struct Finder {
    config: FinderConfig,
    engine: SimilarityEngine,
}

impl Default for Finder {
    fn default() -> Self {
        Self::new(FinderConfig::default())
    }
}

impl Finder {
    pub fn new(config: FinderConfig) -> Self {
        let engine = SimilarityEngine::new(config.ngram_size, config.similarity_cache_capacity);
        Self { config, engine }
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Rank `records` against a raw user query.
    ///
    /// An empty (or all-punctuation) query returns the full list unchanged;
    /// pagination is the caller's concern. Digit queries (an optional
    /// leading `+` is ignored) filter on dial codes; everything else goes
    /// through the name stages.
    pub fn where_text<'a>(
        &self,
        raw_query: &str,
        records: &'a [CountryRecord],
    ) -> Vec<&'a CountryRecord> {
        let stripped = raw_query.strip_prefix('+').unwrap_or(raw_query);
        let trimmed = stripped.trim();
        if trimmed.is_empty() {
            return records.iter().collect();
        }
        if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return self.by_dial_code(trimmed, records);
        }
        self.by_name(raw_query, records)
    }

    /// First hit for `raw_query` among `favorites`, falling back to the full
    /// record list.
    pub fn first_match<'a>(
        &self,
        raw_query: &str,
        favorites: &'a [CountryRecord],
        records: &'a [CountryRecord],
    ) -> Option<&'a CountryRecord> {
        self.where_text(raw_query, favorites)
            .into_iter()
            .next()
            .or_else(|| self.where_text(raw_query, records).into_iter().next())
    }

    /// Dial-code path: substring filter, prefix matches ranked first.
    /// Relative input order is preserved within each band.
    fn by_dial_code<'a>(
        &self,
        digits: &str,
        records: &'a [CountryRecord],
    ) -> Vec<&'a CountryRecord> {
        let mut hits = Vec::new();
        let mut inner_hits = Vec::new();
        for record in records {
            if record.dial_code.starts_with(digits) {
                hits.push(record);
            } else if record.dial_code.contains(digits) {
                inner_hits.push(record);
            }
        }
        hits.extend(inner_hits);
        hits.truncate(self.config.max_results);
        hits
    }

    /// Name path: strict substring, then short keys, then fuzzy fill.
    fn by_name<'a>(&self, raw_query: &str, records: &'a [CountryRecord]) -> Vec<&'a CountryRecord> {
        let query = build_search_key(raw_query);
        if query.is_empty() {
            return records.iter().collect();
        }
        let query_no_spaces = remove_spaces(&query);
        let query_len = query.chars().count();
        let compact_len = query_no_spaces.chars().count();

        let strict_hits = self.strict_hits(&query, &query_no_spaces, records);
        let short_hits = if (1..=SHORT_KEY_MAX_LEN).contains(&compact_len) {
            self.short_key_hits(&query_no_spaces, compact_len, records)
        } else {
            Vec::new()
        };

        // Abbreviations beat substrings only while the query is shorter than
        // a full ISO-style token.
        let mut merged = ResultSet::with_capacity(records.len());
        if compact_len < SHORT_KEY_MAX_LEN {
            for hit in &short_hits {
                merged.push(hit.record);
            }
            for hit in &strict_hits {
                merged.push(hit.record);
            }
        } else {
            for hit in &strict_hits {
                merged.push(hit.record);
            }
            for hit in &short_hits {
                merged.push(hit.record);
            }
        }

        if merged.len() < FUZZY_SKIP_FILL && query_len > FUZZY_SKIP_QUERY_LEN {
            let fuzzy_hits = self.fuzzy_hits(&query, &query_no_spaces, query_len, records, &merged);
            for hit in &fuzzy_hits {
                merged.push(hit.record);
            }
        }

        let mut out = merged.into_vec();
        out.truncate(self.config.max_results);
        out
    }

    fn strict_hits<'a>(
        &self,
        query: &str,
        query_no_spaces: &str,
        records: &'a [CountryRecord],
    ) -> Vec<StrictHit<'a>> {
        let spaced = CompiledPattern::compile(query, self.config.strict_algorithm);
        // Reuse the compiled pattern when removing spaces changed nothing.
        let compact = (query_no_spaces != query)
            .then(|| CompiledPattern::compile(query_no_spaces, self.config.strict_algorithm));

        let mut hits = Vec::new();
        for record in records {
            let spaced_index = spaced.first_index_in(&record.search_key);
            let compact_index = compact
                .as_ref()
                .unwrap_or(&spaced)
                .first_index_in(&record.search_key_no_spaces);
            let best_index = match (spaced_index, compact_index) {
                (Some(i), Some(j)) => Some(i.min(j)),
                (i, j) => i.or(j),
            };
            if let Some(best_index) = best_index {
                hits.push(StrictHit {
                    record,
                    best_index,
                    is_prefix: best_index == 0,
                    key_chars: record.search_key.chars().count(),
                });
            }
        }
        hits.sort_by(|a, b| {
            b.is_prefix
                .cmp(&a.is_prefix)
                .then(a.best_index.cmp(&b.best_index))
                .then(a.key_chars.cmp(&b.key_chars))
        });
        hits
    }

    /// Abbreviation stage for 1-3 char queries. Only 2-char short keys are
    /// ever compared fuzzily, and only by 3-char queries, so a near-miss
    /// like "egb" can reach "eg" without every 3-char query matching every
    /// record.
    fn short_key_hits<'a>(
        &self,
        query_no_spaces: &str,
        compact_len: usize,
        records: &'a [CountryRecord],
    ) -> Vec<ScoredHit<'a>> {
        let threshold = if compact_len < SHORT_KEY_MAX_LEN {
            SHORT_KEY_EXACT
        } else {
            SHORT_KEY_FUZZY
        };
        let mut hits = Vec::new();
        for record in records {
            let mut best = 0.0f64;
            for key in &record.short_keys {
                let score = if key == query_no_spaces {
                    1.0
                } else if compact_len == SHORT_KEY_MAX_LEN && key.chars().count() == 2 {
                    self.engine
                        .compare(query_no_spaces, key, Algorithm::JaroWinkler)
                } else {
                    continue;
                };
                best = best.max(score);
            }
            if best >= threshold {
                hits.push(ScoredHit {
                    record,
                    score: best,
                });
            }
        }
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits
    }

    fn fuzzy_hits<'a>(
        &self,
        query: &str,
        query_no_spaces: &str,
        query_len: usize,
        records: &'a [CountryRecord],
        already_matched: &ResultSet<'a>,
    ) -> Vec<ScoredHit<'a>> {
        let algorithm = pick_fuzzy_algorithm(query, query_len);
        let threshold = fuzzy_threshold(query_len, algorithm);
        let mut hits = Vec::new();
        for record in records {
            if already_matched.contains(&record.iso_code) {
                continue;
            }
            let spaced = self.engine.compare(query, &record.search_key, algorithm);
            let compact = if query_no_spaces.is_empty() {
                0.0
            } else {
                self.engine
                    .compare(query_no_spaces, &record.search_key_no_spaces, algorithm)
            };
            let score = spaced.max(compact);
            if score >= threshold {
                hits.push(ScoredHit { record, score });
            }
        }
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits
    }
}

/// Multi-token queries care about token overlap, not order: cosine. Short
/// single tokens are typo-corrected best by Jaro-Winkler; long ones by
/// n-gram overlap.
fn pick_fuzzy_algorithm(query: &str, query_len: usize) -> Algorithm {
    if query.contains(' ') {
        Algorithm::TokenCosine
    } else if query_len <= JARO_WINKLER_QUERY_MAX {
        Algorithm::JaroWinkler
    } else {
        Algorithm::Ngram
    }
}

/// Acceptance threshold per query shape. Short queries produce many spurious
/// fuzzy hits, so their thresholds are tightened.
fn fuzzy_threshold(query_len: usize, algorithm: Algorithm) -> f64 {
    if query_len <= TINY_QUERY_MAX {
        FUZZY_THRESHOLD_TINY
    } else if algorithm == Algorithm::TokenCosine {
        FUZZY_THRESHOLD_COSINE
    } else if query_len <= SHORT_QUERY_MAX {
        FUZZY_THRESHOLD_SHORT
    } else if query_len <= MEDIUM_QUERY_MAX {
        FUZZY_THRESHOLD_MEDIUM
    } else {
        FUZZY_THRESHOLD_LONG
    }
}
