#![no_main]

use libfuzzer_sys::fuzz_target;

use countryfind::{CountryRecord, Finder, FinderConfig};

fuzz_target!(|data: &[u8]| {
    let query = String::from_utf8_lossy(data);

    let records = vec![
        CountryRecord::new("AT", "43", "Austria"),
        CountryRecord::new("AU", "61", "Australia"),
        CountryRecord::new("EG", "20", "مصر"),
        CountryRecord::new("ES", "34", "Spain"),
        CountryRecord::new("US", "1", "United States"),
    ];
    let finder = Finder::new(FinderConfig {
        max_results: 3,
        ..FinderConfig::default()
    });

    let hits = finder.where_text(&query, &records);

    // Results are a subset of the input with unique ISO codes.
    let mut seen = std::collections::HashSet::new();
    for record in &hits {
        debug_assert!(records.iter().any(|r| std::ptr::eq(r, *record)));
        debug_assert!(seen.insert(record.iso_code.as_str()));
    }

    // Either the return-everything identity, or the cap binds.
    debug_assert!(hits.len() == records.len() || hits.len() <= 3);

    // Same query, same result.
    let again = finder.where_text(&query, &records);
    debug_assert_eq!(
        hits.iter().map(|r| &r.iso_code).collect::<Vec<_>>(),
        again.iter().map(|r| &r.iso_code).collect::<Vec<_>>()
    );
});
