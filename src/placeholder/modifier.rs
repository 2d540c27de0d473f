//! Path modifiers
//!
//! Modifiers are applied left to right to the value a placeholder looks up,
//! each one consuming the output of the previous one.

use std::path;

/// A single text transformation in a modifier chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modifier {
    /// `%<suffix>` - strip a literal trailing suffix, if present
    StripSuffix(String),

    /// `basename` - keep only the final path segment
    Basename,

    /// `s/<search>/<replace>/` - literal substitution of every occurrence
    Replace { search: String, replace: String },
}

impl Modifier {
    /// Apply this modifier to a value
    pub fn apply(&self, value: &str) -> String {
        match self {
            Modifier::StripSuffix(suffix) => value
                .strip_suffix(suffix.as_str())
                .unwrap_or(value)
                .to_string(),
            Modifier::Basename => match value.rfind(path::is_separator) {
                Some(idx) => value[idx + 1..].to_string(),
                None => value.to_string(),
            },
            Modifier::Replace { search, replace } => {
                if search.is_empty() {
                    value.to_string()
                } else {
                    value.replace(search.as_str(), replace)
                }
            }
        }
    }
}

/// Apply a modifier chain in order
pub fn apply_modifiers(modifiers: &[Modifier], value: &str) -> String {
    modifiers
        .iter()
        .fold(value.to_string(), |acc, modifier| modifier.apply(&acc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(s: &str) -> Modifier {
        Modifier::StripSuffix(s.to_string())
    }

    fn replace(search: &str, replace: &str) -> Modifier {
        Modifier::Replace {
            search: search.to_string(),
            replace: replace.to_string(),
        }
    }

    #[test]
    fn test_strip_suffix() {
        assert_eq!(strip(".gz").apply("a/b/file.txt.gz"), "a/b/file.txt");
    }

    #[test]
    fn test_strip_suffix_absent_is_noop() {
        assert_eq!(strip(".bz2").apply("a/b/file.txt.gz"), "a/b/file.txt.gz");
        assert_eq!(strip("").apply("file.txt"), "file.txt");
    }

    #[test]
    fn test_basename() {
        assert_eq!(Modifier::Basename.apply("a/b/file.txt.gz"), "file.txt.gz");
        assert_eq!(Modifier::Basename.apply("file.txt"), "file.txt");
        assert_eq!(Modifier::Basename.apply("dir/"), "");
    }

    #[test]
    fn test_replace_all_occurrences() {
        assert_eq!(replace(" ", "_").apply("my file name"), "my_file_name");
        assert_eq!(replace("hej", "hi").apply("/tmp/hej"), "/tmp/hi");
    }

    #[test]
    fn test_replace_empty_search_is_noop() {
        assert_eq!(replace("", "x").apply("abc"), "abc");
    }

    #[test]
    fn test_chain_order_matters() {
        let chain = vec![Modifier::Basename, strip(".gz")];
        assert_eq!(apply_modifiers(&chain, "data/chrmt.fa.gz"), "chrmt.fa");

        let chain = vec![strip(".fa"), strip(".gz")];
        assert_eq!(apply_modifiers(&chain, "chrmt.fa.gz"), "chrmt.fa");
    }
}
