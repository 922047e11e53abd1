#![no_main]

use libfuzzer_sys::fuzz_target;

use countryfind::similarity::{jaro_winkler, ngram_dice, token_cosine};

fuzz_target!(|data: &[u8]| {
    // Split fuzz input into two strings.
    let mid = data.len() / 2;
    let a = String::from_utf8_lossy(&data[..mid]);
    let b = String::from_utf8_lossy(&data[mid..]);

    let jw = jaro_winkler(&a, &b);
    debug_assert!((0.0..=1.0).contains(&jw));
    debug_assert!((jw - jaro_winkler(&b, &a)).abs() < 1e-12);

    for n in 1..=4 {
        let d = ngram_dice(&a, &b, n);
        debug_assert!((0.0..=1.0).contains(&d));
        debug_assert!((d - ngram_dice(&b, &a, n)).abs() < 1e-12);
    }

    let c = token_cosine(&a, &b);
    debug_assert!((0.0..=1.0).contains(&c));
    debug_assert!((c - token_cosine(&b, &a)).abs() < 1e-12);
});
