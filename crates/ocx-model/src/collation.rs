//! Display-name ordering close to what a user-facing locale collation produces.

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Compare two names the way a spreadsheet user expects them listed.
///
/// Accents and case are ignored first; among names that only differ in those, the
/// lowercase form comes first and the raw string settles any remaining tie.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| case_key(a).cmp(&case_key(b)))
        .then_with(|| a.cmp(b))
}

fn primary_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn case_key(name: &str) -> Vec<bool> {
    name.chars().map(char::is_uppercase).collect()
}
