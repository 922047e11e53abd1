#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let key = countryfind::build_search_key(&s);

    // Basic invariants (should always hold, even for weird inputs).
    if !key.is_empty() {
        debug_assert!(!key.starts_with(' '));
        debug_assert!(!key.ends_with(' '));
        debug_assert!(!key.contains("  "));
    }
    debug_assert!(key.chars().all(|c| c == ' ' || c.is_alphanumeric()));

    // Idempotence.
    debug_assert_eq!(countryfind::build_search_key(&key), key);

    // The spaceless variant is a pure deletion of spaces.
    let compact = countryfind::remove_spaces(&key);
    debug_assert!(!compact.contains(' '));
    debug_assert_eq!(
        compact.chars().count(),
        key.chars().filter(|c| *c != ' ').count()
    );
});
