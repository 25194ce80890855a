//! Prefix-based sample selection
//!
//! Group membership is encoded in the leading characters of each sample id
//! ("AC01" belongs to group "AC"). Matching is case-sensitive and exact.

use crate::error::MantelError;
use crate::table::SampleTable;
use rustc_hash::FxHashSet;

/// Sample ids of `table` starting with `prefix`, in table order
///
/// An empty result means the group is absent from this table.
pub fn select_by_prefix(table: &SampleTable, prefix: &str) -> Result<Vec<String>, MantelError> {
    select_by_prefixes(table, &[prefix])
}

/// Sample ids of `table` starting with any of `prefixes`, in table order
pub fn select_by_prefixes(
    table: &SampleTable,
    prefixes: &[&str],
) -> Result<Vec<String>, MantelError> {
    if prefixes.is_empty() || prefixes.iter().any(|p| p.is_empty()) {
        return Err(MantelError::EmptyPrefix);
    }

    Ok(table
        .sample_ids()
        .iter()
        .filter(|id| prefixes.iter().any(|p| id.starts_with(p)))
        .cloned()
        .collect())
}

/// Like [`select_by_prefix`], but an empty group is a `GroupNotFound` error
pub fn require_group(table: &SampleTable, prefix: &str) -> Result<Vec<String>, MantelError> {
    let ids = select_by_prefix(table, prefix)?;
    if ids.is_empty() {
        return Err(MantelError::GroupNotFound {
            dataset: table.name().to_string(),
            prefix: prefix.to_string(),
        });
    }
    Ok(ids)
}

/// Sample ids with `prefix` present in both tables
///
/// Order follows `left`, so rows gathered from either table line up
/// sample-by-sample.
pub fn intersect_common(
    left: &SampleTable,
    right: &SampleTable,
    prefix: &str,
) -> Result<Vec<String>, MantelError> {
    let right_ids: FxHashSet<String> = select_by_prefix(right, prefix)?.into_iter().collect();

    let common: Vec<String> = select_by_prefix(left, prefix)?
        .into_iter()
        .filter(|id| right_ids.contains(id))
        .collect();

    if common.is_empty() {
        return Err(MantelError::NoCommonSamples {
            dataset: left.name().to_string(),
            other: right.name().to_string(),
            prefix: prefix.to_string(),
        });
    }

    Ok(common)
}
