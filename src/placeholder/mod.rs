//! Placeholder resolution
//!
//! This module parses and resolves the `[i:..]`, `[p:..]` and `[o:..]`
//! placeholders embedded in command templates and output path expressions.

pub mod modifier;
pub mod resolve;
pub mod syntax;

// Re-export main types
pub use modifier::*;
pub use resolve::*;
pub use syntax::*;

use std::collections::BTreeMap;

/// Mapping from port name to path (or, for params, to a plain value)
pub type PathMap = BTreeMap<String, String>;

/// Suffix appended to output paths while a task is still writing them
pub const TEMP_SUFFIX: &str = ".tmp";

/// Build a `PathMap` from string pairs
///
/// ```
/// let inputs = sciflow::paths([("gz", "data/chrmt.fa.gz")]);
/// assert_eq!(inputs["gz"], "data/chrmt.fa.gz");
/// ```
pub fn paths<const N: usize>(pairs: [(&str, &str); N]) -> PathMap {
    pairs
        .into_iter()
        .map(|(name, path)| (name.to_string(), path.to_string()))
        .collect()
}
