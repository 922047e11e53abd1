//! Searchable country records.
//!
//! A [`CountryRecord`] is built once per (locale, country list) snapshot and
//! never mutated afterwards; the finder borrows records and owns nothing.

use std::collections::HashMap;

use unicode_segmentation::UnicodeSegmentation;

use crate::normalize::{build_search_key, remove_spaces};

/// Curated short-key aliases by ISO code. Process-wide constant data;
/// adding a mapping is a source change.
///
/// Initialisms derived from the name ("uae", "cdi") need no entry here; the
/// table only carries aliases the name itself cannot produce.
const SHORT_KEY_EXTRAS: &[(&str, &[&str])] = &[
    ("US", &["usa"]),
    ("SA", &["ksa"]),
    ("GB", &["uk"]),
];

/// One country, with the derived keys the finder matches against.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CountryRecord {
    /// ISO-3166 alpha-2 code; treated as an opaque uniqueness token.
    pub iso_code: String,
    /// Country calling code, decimal digits without a leading `+`.
    pub dial_code: String,
    /// Localized human-readable name, as handed in by the host.
    pub display_name: String,
    /// Normalized form of `display_name`.
    pub search_key: String,
    /// `search_key` with all spaces removed.
    pub search_key_no_spaces: String,
    /// Abbreviation tokens: lowercased ISO code, name initials, curated
    /// aliases. Insertion-ordered, deduplicated, no empty strings.
    pub short_keys: Vec<String>,
}

impl CountryRecord {
    pub fn new(
        iso_code: impl Into<String>,
        dial_code: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        let iso_code = iso_code.into();
        let dial_code = dial_code.into();
        let display_name = display_name.into();
        let search_key = build_search_key(&display_name);
        let search_key_no_spaces = remove_spaces(&search_key);
        let short_keys = build_short_keys(&iso_code, &search_key);
        Self {
            iso_code,
            dial_code,
            display_name,
            search_key,
            search_key_no_spaces,
            short_keys,
        }
    }
}

fn push_unique(keys: &mut Vec<String>, key: String) {
    if !key.is_empty() && !keys.contains(&key) {
        keys.push(key);
    }
}

fn build_short_keys(iso_code: &str, search_key: &str) -> Vec<String> {
    let mut keys = Vec::new();

    push_unique(&mut keys, iso_code.to_lowercase());

    let tokens: Vec<&str> = search_key.unicode_words().collect();
    if tokens.len() >= 2 {
        let initials: String = tokens.iter().filter_map(|t| t.chars().next()).collect();
        if initials.chars().count() >= 2 {
            push_unique(&mut keys, initials);
        }
    }

    if let Some((_, extras)) = SHORT_KEY_EXTRAS
        .iter()
        .find(|(iso, _)| iso.eq_ignore_ascii_case(iso_code))
    {
        for extra in *extras {
            push_unique(&mut keys, (*extra).to_string());
        }
    }

    keys
}

/// A resolved (display name, dial code) pair for one ISO code.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedCountry {
    pub display_name: String,
    pub dial_code: String,
}

/// Seam to the host's localization tables: ISO code in, localized display
/// name and dial string out.
pub trait CountryResolver {
    fn resolve(&self, iso_code: &str) -> Option<ResolvedCountry>;
}

impl CountryResolver for HashMap<String, ResolvedCountry> {
    fn resolve(&self, iso_code: &str) -> Option<ResolvedCountry> {
        self.get(iso_code).cloned()
    }
}

impl<R: CountryResolver> CountryResolver for &R {
    fn resolve(&self, iso_code: &str) -> Option<ResolvedCountry> {
        (**self).resolve(iso_code)
    }
}

/// Build the record snapshot for a set of ISO codes.
///
/// Codes the resolver cannot resolve are skipped. The result is sorted by
/// `display_name` in plain code-point order for a deterministic initial
/// presentation independent of any locale collation.
pub fn build_records<R, I, S>(resolver: R, iso_codes: I) -> Vec<CountryRecord>
where
    R: CountryResolver,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut records: Vec<CountryRecord> = iso_codes
        .into_iter()
        .filter_map(|iso| {
            let iso = iso.as_ref();
            resolver
                .resolve(iso)
                .map(|resolved| CountryRecord::new(iso, resolved.dial_code, resolved.display_name))
        })
        .collect();
    records.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    records
}
