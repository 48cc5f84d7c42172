pub mod config;
pub mod context;
pub mod probe;
pub mod starter;
pub mod target;

use std::collections::HashMap;

/// Numeric value of a single collected sample.
pub type SampleValue = f64;

/// Result of one successful collection, mapping sample keys to values.
///
/// Produced fresh on every collection. A collection either yields a
/// complete map or nothing at all - failures never surface a
/// partially-filled map mixed with stale data.
pub type SampleMap<K> = HashMap<K, SampleValue>;
