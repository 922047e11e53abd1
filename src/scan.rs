//! Compiled substring scanning.
//!
//! A query pattern is compiled once and then applied to every record key, so
//! the backends trade setup cost for fast repeated scans. Indices are
//! reported in **characters**, not bytes, because ranking compares positions
//! across keys of mixed scripts.

use aho_corasick::{AhoCorasick, MatchKind};
use std::collections::HashMap;

/// Substring-scan backend for the strict match stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScanAlgorithm {
    /// Boyer-Moore-Horspool: bad-character shift table over scalar values.
    #[default]
    BoyerMoore,
    /// Single-pattern Aho-Corasick automaton.
    AhoCorasick,
}

#[derive(Debug)]
enum Backend {
    Empty,
    Horspool {
        pattern: Vec<char>,
        shift: HashMap<char, usize>,
    },
    Automaton(AhoCorasick),
}

/// A pattern compiled for repeated scans.
#[derive(Debug)]
pub struct CompiledPattern {
    backend: Backend,
}

impl CompiledPattern {
    /// Compile `pattern` for the chosen backend. An empty pattern compiles
    /// to a scanner that never matches.
    pub fn compile(pattern: &str, algorithm: ScanAlgorithm) -> Self {
        if pattern.is_empty() {
            return Self {
                backend: Backend::Empty,
            };
        }
        let backend = match algorithm {
            ScanAlgorithm::BoyerMoore => {
                let chars: Vec<char> = pattern.chars().collect();
                let m = chars.len();
                let mut shift = HashMap::with_capacity(m);
                for (i, &c) in chars[..m - 1].iter().enumerate() {
                    shift.insert(c, m - 1 - i);
                }
                Backend::Horspool {
                    pattern: chars,
                    shift,
                }
            }
            ScanAlgorithm::AhoCorasick => {
                let automaton = AhoCorasick::builder()
                    .match_kind(MatchKind::LeftmostFirst)
                    .build([pattern])
                    .expect("failed to build Aho-Corasick matcher");
                Backend::Automaton(automaton)
            }
        };
        Self { backend }
    }

    /// Char index of the leftmost occurrence of the pattern in `haystack`,
    /// or `None` when absent (also for the empty pattern).
    pub fn first_index_in(&self, haystack: &str) -> Option<usize> {
        match &self.backend {
            Backend::Empty => None,
            Backend::Horspool { pattern, shift } => {
                let hay: Vec<char> = haystack.chars().collect();
                horspool(&hay, pattern, shift)
            }
            Backend::Automaton(automaton) => automaton
                .find(haystack)
                .map(|m| haystack[..m.start()].chars().count()),
        }
    }
}

fn horspool(hay: &[char], pattern: &[char], shift: &HashMap<char, usize>) -> Option<usize> {
    let m = pattern.len();
    if m == 0 || hay.len() < m {
        return None;
    }
    let mut i = 0usize;
    while i + m <= hay.len() {
        let mut j = m;
        while j > 0 && hay[i + j - 1] == pattern[j - 1] {
            j -= 1;
        }
        if j == 0 {
            return Some(i);
        }
        let last = hay[i + m - 1];
        i += shift.get(&last).copied().unwrap_or(m);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(haystack: &str, pattern: &str) -> Option<usize> {
        let hay: Vec<char> = haystack.chars().collect();
        let pat: Vec<char> = pattern.chars().collect();
        if pat.is_empty() || hay.len() < pat.len() {
            return None;
        }
        (0..=hay.len() - pat.len()).find(|&i| hay[i..i + pat.len()] == pat[..])
    }

    const CASES: &[(&str, &str)] = &[
        ("united states", "state"),
        ("united states", "united"),
        ("united states", "s"),
        ("united states", "tes"),
        ("united states", "xyz"),
        ("united states", "united states of america"),
        ("aaaaab", "aab"),
        ("ababab", "bab"),
        ("مصر", "صر"),
        ("الامارات العربيه المتحده", "عرب"),
        ("cote d ivoire", "d i"),
    ];

    #[test]
    fn backends_agree_with_naive_scan() {
        for &(haystack, pattern) in CASES {
            let expected = naive(haystack, pattern);
            for algorithm in [ScanAlgorithm::BoyerMoore, ScanAlgorithm::AhoCorasick] {
                let compiled = CompiledPattern::compile(pattern, algorithm);
                assert_eq!(
                    compiled.first_index_in(haystack),
                    expected,
                    "{algorithm:?}: {pattern:?} in {haystack:?}",
                );
            }
        }
    }

    #[test]
    fn match_is_leftmost() {
        for algorithm in [ScanAlgorithm::BoyerMoore, ScanAlgorithm::AhoCorasick] {
            let compiled = CompiledPattern::compile("an", algorithm);
            assert_eq!(compiled.first_index_in("banana"), Some(1));
        }
    }

    #[test]
    fn indices_are_chars_not_bytes() {
        // Multibyte prefix shifts byte offsets but not char offsets.
        for algorithm in [ScanAlgorithm::BoyerMoore, ScanAlgorithm::AhoCorasick] {
            let compiled = CompiledPattern::compile("مان", algorithm);
            assert_eq!(compiled.first_index_in("عمان"), Some(1));
        }
    }

    #[test]
    fn empty_pattern_never_matches() {
        for algorithm in [ScanAlgorithm::BoyerMoore, ScanAlgorithm::AhoCorasick] {
            let compiled = CompiledPattern::compile("", algorithm);
            assert_eq!(compiled.first_index_in("anything"), None);
            assert_eq!(compiled.first_index_in(""), None);
        }
    }

    #[test]
    fn reused_compiled_pattern_is_consistent() {
        let compiled = CompiledPattern::compile("lia", ScanAlgorithm::BoyerMoore);
        assert_eq!(compiled.first_index_in("austria"), None);
        assert_eq!(compiled.first_index_in("australia"), Some(6));
        assert_eq!(compiled.first_index_in("italia"), Some(3));
        assert_eq!(compiled.first_index_in("austria"), None);
    }
}
