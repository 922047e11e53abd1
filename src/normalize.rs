//! Search-key normalization.
//!
//! Turns display names and queries into canonical search keys: diacritics
//! stripped, case folded, Arabic letter variants collapsed, punctuation
//! replaced by spaces, whitespace collapsed. The whole pipeline is pure and
//! total; empty input yields empty output.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Strip diacritics by NFD decomposition followed by combining-mark removal.
///
/// Letters without a canonical decomposition are folded through a small
/// compiled-in table instead (`ø→o`, `ł→l`, `đ→d`, `ß→ss`, `æ→ae`, `œ→oe`),
/// so the common Latin repertoire comes out ASCII. Anything not covered by
/// either path passes through unchanged.
pub fn strip_diacritics(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfd() {
        if is_combining_mark(c) {
            continue;
        }
        match c {
            'ø' => out.push('o'),
            'Ø' => out.push('O'),
            'ł' => out.push('l'),
            'Ł' => out.push('L'),
            'đ' => out.push('d'),
            'Đ' => out.push('D'),
            'ß' => out.push_str("ss"),
            '\u{1E9E}' => out.push_str("SS"),
            'æ' => out.push_str("ae"),
            'Æ' => out.push_str("Ae"),
            'œ' => out.push_str("oe"),
            'Œ' => out.push_str("Oe"),
            _ => out.push(c),
        }
    }
    out
}

/// Arabic diacritics (tashkeel), Quranic annotation marks, and the tatweel.
fn is_arabic_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0610}'..='\u{061A}'
            | '\u{064B}'..='\u{065F}'
            | '\u{0670}'
            | '\u{06D6}'..='\u{06ED}'
            | '\u{0640}'
    )
}

/// Collapse Arabic letter variants that users type interchangeably.
///
/// Alef variants (madda, hamza above/below, wasla) become bare alef,
/// alef maksura becomes yaa, taa marbuta becomes haa, and hamza carriers
/// collapse to their base letter. Intentionally lossy: recall over
/// distinguishing near-homographs.
fn fold_arabic_char(c: char) -> char {
    match c {
        '\u{0622}' | '\u{0623}' | '\u{0625}' | '\u{0671}' => '\u{0627}',
        '\u{0649}' | '\u{0626}' => '\u{064A}',
        '\u{0629}' => '\u{0647}',
        '\u{0624}' => '\u{0648}',
        _ => c,
    }
}

/// Normalize Arabic text: strip tashkeel/tatweel and collapse letter variants.
///
/// A no-op on code points outside the Arabic block, so it is applied
/// unconditionally instead of behind script detection.
pub fn fold_arabic(text: &str) -> String {
    let mut out = String::new();
    fold_arabic_into(text, &mut out);
    out
}

/// Like [`fold_arabic`], but writes into an existing `String`.
pub fn fold_arabic_into(text: &str, out: &mut String) {
    out.clear();
    out.reserve(text.len());
    out.extend(
        text.chars()
            .filter(|c| !is_arabic_mark(*c))
            .map(fold_arabic_char),
    );
}

/// Replace every non-alphanumeric, non-whitespace code point with a space,
/// then collapse whitespace runs to single ASCII spaces and trim.
///
/// Single pass: a punctuation char simply extends the current whitespace run.
pub fn scrub_symbols(text: &str) -> String {
    let mut out = String::new();
    scrub_symbols_into(text, &mut out);
    out
}

/// Like [`scrub_symbols`], but writes into an existing `String`.
pub fn scrub_symbols_into(text: &str, out: &mut String) {
    out.clear();
    out.reserve(text.len());
    let mut in_ws = true; // treat start as whitespace to avoid leading space
    for c in text.chars() {
        if c.is_whitespace() || !c.is_alphanumeric() {
            in_ws = true;
            continue;
        }
        if in_ws && !out.is_empty() {
            out.push(' ');
        }
        in_ws = false;
        out.push(c);
    }
}

/// Build the canonical search key for a display name or query.
///
/// Pipeline order matters: diacritics are stripped before lowercasing (so
/// decomposed uppercase letters like `İ` fold cleanly), the Arabic pass runs
/// on the folded text, and symbol scrubbing runs last because earlier steps
/// can introduce spaces.
///
/// The output contains only letters, digits, and single interior spaces, and
/// the function is idempotent.
pub fn build_search_key(input: &str) -> String {
    let mut s = strip_diacritics(input).to_lowercase();
    let mut buf = String::new();
    fold_arabic_into(&s, &mut buf);
    std::mem::swap(&mut s, &mut buf);
    scrub_symbols_into(&s, &mut buf);
    buf
}

/// The spaceless variant of a search key.
pub fn remove_spaces(key: &str) -> String {
    key.chars().filter(|c| *c != ' ').collect()
}
