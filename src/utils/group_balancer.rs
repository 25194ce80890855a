//! Group Balancer
//!
//! Two groups compared by a Mantel test must yield distance matrices of the
//! same size. The larger group is downsampled, uniformly and without
//! replacement, to the size of the smaller one.

use rand::seq::SliceRandom;
use rand::Rng;
use std::borrow::Cow;

/// Pair of equal-sized groups
///
/// A group that was already at the target size is `Cow::Borrowed` from the
/// caller's slice.
#[derive(Debug, Clone)]
pub struct BalancedGroups<'a> {
    pub first: Cow<'a, [String]>,
    pub second: Cow<'a, [String]>,
}

impl BalancedGroups<'_> {
    /// Common group size after balancing
    pub fn size(&self) -> usize {
        self.first.len()
    }
}

/// Downsample the larger of two groups to `min(|first|, |second|)`
///
/// The random source is passed in so runs can be reproduced from a seed.
pub fn balance_groups<'a, R: Rng + ?Sized>(
    first: &'a [String],
    second: &'a [String],
    rng: &mut R,
) -> BalancedGroups<'a> {
    let target = first.len().min(second.len());

    BalancedGroups {
        first: subsample(first, target, rng),
        second: subsample(second, target, rng),
    }
}

fn subsample<'a, R: Rng + ?Sized>(
    group: &'a [String],
    size: usize,
    rng: &mut R,
) -> Cow<'a, [String]> {
    if group.len() <= size {
        return Cow::Borrowed(group);
    }
    Cow::Owned(group.choose_multiple(rng, size).cloned().collect())
}
