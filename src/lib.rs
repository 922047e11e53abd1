//! # countryfind
//!
//! Country search core for interactive pickers.
//!
//! Given a user-typed query and a list of country records, returns a ranked
//! subset matching by name, dial code, ISO code, or common abbreviation,
//! with typo tolerance across scripts (Latin with diacritics and Arabic at
//! minimum). Designed for keystroke-by-keystroke re-querying over ~250
//! entries; a query completes in well under a millisecond.
//!
//! The intent is to make the matching pipeline explicit: normalization into
//! search keys, a per-query choice of dial-code / abbreviation / strict /
//! fuzzy stages, and a deterministic ranking policy with named thresholds.
//!
//! ```
//! use countryfind::{CountryRecord, Finder};
//!
//! let records = vec![
//!     CountryRecord::new("ES", "34", "Spain"),
//!     CountryRecord::new("SE", "46", "Sweden"),
//! ];
//! let finder = Finder::default();
//!
//! let hits = finder.where_text("spa", &records);
//! assert_eq!(hits[0].iso_code, "ES");
//!
//! let hits = finder.where_text("+46", &records);
//! assert_eq!(hits[0].iso_code, "SE");
//! ```

pub mod finder;
pub mod ngram;
pub mod normalize;
pub mod record;
pub mod scan;
pub mod similarity;

pub use finder::{Finder, FinderConfig};
pub use normalize::{build_search_key, remove_spaces};
pub use record::{build_records, CountryRecord, CountryResolver, ResolvedCountry};
pub use scan::{CompiledPattern, ScanAlgorithm};
pub use similarity::{Algorithm, SimilarityEngine};
