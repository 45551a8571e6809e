//! Column/field name ordering.
//!
//! Reconciliation walks the sorted field list and the sorted column list in
//! lockstep. Both sorts and the merge comparison must use this one ordering,
//! otherwise the walk misaligns and columns are silently dropped or duplicated.

use std::cmp::Ordering;

/// Ordinal, case-insensitive comparison of two names.
///
/// Each character is mapped to its simple uppercase form and the resulting
/// code points are compared in order. A character whose uppercase expands to
/// several characters (`ß`) is kept as is, so names never change length.
/// Culture-specific collation is never used.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.chars().map(simple_uppercase).cmp(b.chars().map(simple_uppercase))
}

fn simple_uppercase(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Whether two names are equal under [`compare_names`].
pub fn names_equal(a: &str, b: &str) -> bool {
    compare_names(a, b) == Ordering::Equal
}

/// Sorts items by the name `key` returns, using [`compare_names`].
pub fn sort_by_name<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by(|a, b| compare_names(key(a), key(b)));
}
