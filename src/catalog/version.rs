//! Dotted numeric version ordering
//!
//! Catalog version identifiers look like "1.21.4" or "1.9"; a missing patch
//! component counts as zero. Comparison is numeric per component, so "1.10"
//! sorts above "1.9" (unlike a lexicographic sort).

use std::cmp::Ordering;

/// Compare two dotted version identifiers numerically
///
/// Components that fail to parse as numbers rank lowest, which pushes
/// oddly-named catalog entries (snapshots, pre-releases) below plain releases.
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_parts = components(a);
    let b_parts = components(b);
    let len = a_parts.len().max(b_parts.len());

    for i in 0..len {
        let a_part = a_parts.get(i).copied().unwrap_or(Some(0));
        let b_part = b_parts.get(i).copied().unwrap_or(Some(0));
        let ordering = match (a_part, b_part) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}

/// Pick the newest version from a catalog listing
///
/// Ties are broken by position in the source catalog: a later entry wins, on
/// the assumption that catalogs append newer releases.
#[must_use]
pub fn latest(versions: &[String]) -> Option<&str> {
    versions
        .iter()
        .enumerate()
        .max_by(|(a_idx, a), (b_idx, b)| {
            compare_versions(a, b).then(a_idx.cmp(b_idx))
        })
        .map(|(_, version)| version.as_str())
}

fn components(version: &str) -> Vec<Option<u64>> {
    version
        .split('.')
        .map(|part| part.parse::<u64>().ok())
        .collect()
}
