//! String similarity metrics and the scoring engine.
//!
//! Scope: the metrics the finder's fuzzy stages rank with, plus a bounded
//! score cache. Keep policy (thresholds, algorithm selection) in the finder.
//!
//! Notes:
//! - Similarities are computed on **Unicode scalar values** (`char`), not bytes.
//! - All metrics are symmetric, total, and return scores in \([0, 1]\).
//! - Inputs are assumed to be normalized search keys; no normalization
//!   happens here.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use crate::ngram::padded_ngram_counts;

/// Winkler prefix bonus scale.
pub const JARO_WINKLER_PREFIX_SCALE: f64 = 0.1;
/// Longest common prefix the Winkler bonus rewards.
pub const JARO_WINKLER_MAX_PREFIX: usize = 4;
/// Default window width for [`ngram_dice`].
pub const DEFAULT_NGRAM_SIZE: usize = 3;

/// Similarity metric selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Algorithm {
    /// Jaro with a common-prefix bonus. Best for short single-token typos.
    JaroWinkler,
    /// Sørensen–Dice over padded character n-gram multisets.
    Ngram,
    /// Cosine over whitespace-token frequency vectors. Order-insensitive.
    TokenCosine,
}

/// Classical Jaro similarity.
///
/// Matches are counted within a window of
/// `max(|a|, |b|) / 2 - 1` positions; transpositions are halved per the
/// original definition. Empty operands score 0.0.
pub fn jaro(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let window = (a.len().max(b.len()) / 2).saturating_sub(1);
    let mut b_taken = vec![false; b.len()];
    let mut a_matched: Vec<char> = Vec::new();

    for (i, &ca) in a.iter().enumerate() {
        let lo = i.saturating_sub(window);
        let hi = (i + window + 1).min(b.len());
        for j in lo..hi {
            if !b_taken[j] && b[j] == ca {
                b_taken[j] = true;
                a_matched.push(ca);
                break;
            }
        }
    }

    let m = a_matched.len();
    if m == 0 {
        return 0.0;
    }

    let b_matched = b_taken
        .iter()
        .zip(&b)
        .filter_map(|(&taken, &cb)| taken.then_some(cb));
    let transpositions = a_matched
        .iter()
        .zip(b_matched)
        .filter(|&(&ca, cb)| ca != cb)
        .count() as f64
        / 2.0;

    let m = m as f64;
    (m / a.len() as f64 + m / b.len() as f64 + (m - transpositions) / m) / 3.0
}

/// Jaro-Winkler similarity: [`jaro`] with a bonus for a shared prefix of up
/// to [`JARO_WINKLER_MAX_PREFIX`] characters, scaled by
/// [`JARO_WINKLER_PREFIX_SCALE`].
pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    let j = jaro(a, b);
    let prefix = a
        .chars()
        .zip(b.chars())
        .take(JARO_WINKLER_MAX_PREFIX)
        .take_while(|(x, y)| x == y)
        .count();
    (j + prefix as f64 * JARO_WINKLER_PREFIX_SCALE * (1.0 - j)).min(1.0)
}

/// Sørensen–Dice coefficient over padded character n-gram multisets.
///
/// Grams are produced by [`padded_ngram_counts`], so both ends of each
/// operand are padded with `n - 1` spaces. The coefficient is
/// `2 * |shared grams| / (|grams(a)| + |grams(b)|)` with multiset
/// (minimum-count) intersection. `n == 0` or an empty operand scores 0.0.
pub fn ngram_dice(a: &str, b: &str, n: usize) -> f64 {
    if n == 0 || a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    let counts_a = padded_ngram_counts(a, n);
    let counts_b = padded_ngram_counts(b, n);
    let total_a: usize = counts_a.values().sum();
    let total_b: usize = counts_b.values().sum();
    if total_a == 0 || total_b == 0 {
        return 0.0;
    }
    let shared: usize = counts_a
        .iter()
        .map(|(gram, &na)| na.min(counts_b.get(gram).copied().unwrap_or(0)))
        .sum();
    2.0 * shared as f64 / (total_a + total_b) as f64
}

fn token_counts(text: &str) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for token in text.split_whitespace() {
        *counts.entry(token).or_insert(0usize) += 1;
    }
    counts
}

/// Cosine similarity of whitespace-token frequency vectors.
///
/// Token order is ignored; repeated tokens weigh quadratically through the
/// frequency product. Either side empty scores 0.0.
pub fn token_cosine(a: &str, b: &str) -> f64 {
    let counts_a = token_counts(a);
    let counts_b = token_counts(b);
    if counts_a.is_empty() || counts_b.is_empty() {
        return 0.0;
    }
    let dot: f64 = counts_a
        .iter()
        .filter_map(|(token, &fa)| counts_b.get(token).map(|&fb| (fa * fb) as f64))
        .sum();
    let norm = |counts: &HashMap<&str, usize>| {
        counts
            .values()
            .map(|&f| (f * f) as f64)
            .sum::<f64>()
            .sqrt()
    };
    let denom = norm(&counts_a) * norm(&counts_b);
    if denom == 0.0 {
        0.0
    } else {
        (dot / denom).min(1.0)
    }
}

type CacheKey = (Algorithm, String, String);

/// Bounded LRU score cache. Keys hold owned strings, so cached scores never
/// extend the lifetime of the records they were computed for.
#[derive(Debug)]
struct ScoreCache {
    capacity: usize,
    entries: HashMap<CacheKey, (f64, u64)>,
    order: BTreeMap<u64, CacheKey>,
    clock: u64,
}

impl ScoreCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity.min(1024)),
            order: BTreeMap::new(),
            clock: 0,
        }
    }

    fn get(&mut self, key: &CacheKey) -> Option<f64> {
        self.clock += 1;
        let clock = self.clock;
        let entry = self.entries.get_mut(key)?;
        let old_stamp = entry.1;
        entry.1 = clock;
        let score = entry.0;
        self.order.remove(&old_stamp);
        self.order.insert(clock, key.clone());
        Some(score)
    }

    fn insert(&mut self, key: CacheKey, score: f64) {
        self.clock += 1;
        let clock = self.clock;
        if let Some((_, old_stamp)) = self.entries.insert(key.clone(), (score, clock)) {
            self.order.remove(&old_stamp);
        } else if self.entries.len() > self.capacity {
            if let Some((_, oldest)) = self.order.pop_first() {
                self.entries.remove(&oldest);
            }
        }
        self.order.insert(clock, key);
    }
}

/// Similarity scorer with a fixed n-gram width and an optional bounded cache.
///
/// The cache sits behind a mutex so concurrent lookups on a shared finder
/// stay safe and agree with sequential execution; scores are computed
/// outside the lock. Cache keys sort the operand pair, so symmetry is
/// cache-transparent.
#[derive(Debug)]
pub struct SimilarityEngine {
    ngram_size: usize,
    cache: Option<Mutex<ScoreCache>>,
}

impl SimilarityEngine {
    /// `cache_capacity == 0` disables caching entirely.
    pub fn new(ngram_size: usize, cache_capacity: usize) -> Self {
        Self {
            ngram_size,
            cache: (cache_capacity > 0).then(|| Mutex::new(ScoreCache::new(cache_capacity))),
        }
    }

    fn score(&self, a: &str, b: &str, algorithm: Algorithm) -> f64 {
        match algorithm {
            Algorithm::JaroWinkler => jaro_winkler(a, b),
            Algorithm::Ngram => ngram_dice(a, b, self.ngram_size),
            Algorithm::TokenCosine => token_cosine(a, b),
        }
    }

    /// Compare two normalized keys under the given metric.
    pub fn compare(&self, a: &str, b: &str, algorithm: Algorithm) -> f64 {
        let Some(cache) = &self.cache else {
            return self.score(a, b, algorithm);
        };

        let (x, y) = if a <= b { (a, b) } else { (b, a) };
        let key = (algorithm, x.to_string(), y.to_string());

        if let Some(score) = cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return score;
        }

        let score = self.score(a, b, algorithm);
        cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, score);
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jaro_known_values() {
        assert!((jaro("martha", "marhta") - 0.944_444).abs() < 1e-5);
        assert!((jaro("dixon", "dicksonx") - 0.766_666).abs() < 1e-5);
        assert_eq!(jaro("same", "same"), 1.0);
        assert_eq!(jaro("", "abc"), 0.0);
        assert_eq!(jaro("abc", ""), 0.0);
        assert_eq!(jaro("abc", "xyz"), 0.0);
    }

    #[test]
    fn jaro_winkler_prefers_shared_prefix() {
        let with_prefix = jaro_winkler("germany", "germny");
        let without = jaro("germany", "germny");
        assert!(with_prefix > without);
        assert!(with_prefix > 0.9);
        assert!((0.0..=1.0).contains(&with_prefix));
    }

    #[test]
    fn jaro_winkler_prefix_is_capped() {
        // Identical except the tail: bonus must use at most 4 prefix chars.
        let j = jaro("abcdefgh", "abcdefgx");
        let jw = jaro_winkler("abcdefgh", "abcdefgx");
        let expected = j + 4.0 * JARO_WINKLER_PREFIX_SCALE * (1.0 - j);
        assert!((jw - expected).abs() < 1e-12);
    }

    #[test]
    fn ngram_dice_bounds_and_identity() {
        assert_eq!(ngram_dice("oman", "oman", 3), 1.0);
        assert_eq!(ngram_dice("", "oman", 3), 0.0);
        assert_eq!(ngram_dice("oman", "", 3), 0.0);
        assert_eq!(ngram_dice("oman", "iraq", 0), 0.0);
        let v = ngram_dice("portugal", "portugual", 3);
        assert!((0.0..=1.0).contains(&v));
    }

    #[test]
    fn ngram_dice_monotone_for_typos() {
        // A one-letter typo scores above an unrelated name.
        let typo = ngram_dice("lithuania", "lithuainia", 3);
        let unrelated = ngram_dice("lithuania", "venezuela", 3);
        assert!(typo > unrelated);
        assert!(typo > 0.5);
    }

    #[test]
    fn token_cosine_order_insensitive() {
        assert!((token_cosine("united states", "states united") - 1.0).abs() < 1e-12);
        assert_eq!(token_cosine("", "united states"), 0.0);
        let partial = token_cosine("united states", "united kingdom");
        assert!(partial > 0.0 && partial < 1.0);
    }

    #[test]
    fn metrics_are_symmetric() {
        let pairs = [("spain", "spina"), ("united states", "united kingdom")];
        for (a, b) in pairs {
            assert!((jaro_winkler(a, b) - jaro_winkler(b, a)).abs() < 1e-12);
            assert!((ngram_dice(a, b, 3) - ngram_dice(b, a, 3)).abs() < 1e-12);
            assert!((token_cosine(a, b) - token_cosine(b, a)).abs() < 1e-12);
        }
    }

    #[test]
    fn engine_cache_hits_match_uncached() {
        let cached = SimilarityEngine::new(3, 16);
        let uncached = SimilarityEngine::new(3, 0);
        for _ in 0..3 {
            for alg in [Algorithm::JaroWinkler, Algorithm::Ngram, Algorithm::TokenCosine] {
                assert_eq!(
                    cached.compare("germany", "germny", alg),
                    uncached.compare("germany", "germny", alg),
                );
                // Symmetric probe goes through the same cache slot.
                assert_eq!(
                    cached.compare("germny", "germany", alg),
                    uncached.compare("germany", "germny", alg),
                );
            }
        }
    }

    #[test]
    fn engine_cache_evicts_at_capacity() {
        let engine = SimilarityEngine::new(3, 2);
        // Fill past capacity; correctness must not depend on what got evicted.
        for pair in [("a", "b"), ("c", "d"), ("e", "f"), ("a", "b")] {
            let score = engine.compare(pair.0, pair.1, Algorithm::JaroWinkler);
            assert_eq!(score, jaro_winkler(pair.0, pair.1));
        }
    }
}
