//! Utility modules for Mantel comparisons
//!
//! Contains the steps shared by every comparison:
//! - Sample selection: prefix groups and common samples between tables
//! - Group balancing: random downsampling to equal group sizes
//! - Distance: pairwise Euclidean distance matrices

pub mod sample_selector;
pub mod group_balancer;
pub mod distance;

// Re-export commonly used items
pub use sample_selector::{select_by_prefix, select_by_prefixes, require_group, intersect_common};
pub use group_balancer::{balance_groups, BalancedGroups};
pub use distance::{euclidean_condensed, euclidean_distance_matrix, DistanceMatrix};
