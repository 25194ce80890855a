//! Mantel Batch
//!
//! Mantel correlation tests between Euclidean distance matrices of microbiome
//! abundance tables (phylum, genus, order counts) and a nutrient table, across
//! sample groups identified by id prefix ("AC", "AS", "EC", "ES").
//!
//! Module layout:
//! - `data`, `table`: Table loading with Polars
//! - `utils/`: Sample selection, group balancing, distance matrices
//! - `mantel`: Permutation test
//! - `runner`: Batch coordinator for within-table and cross-table comparisons
//! - `output`: Result tables
//! - `config`, `error`: Run configuration and error types

pub mod config;
pub mod data;
pub mod error;
pub mod mantel;
pub mod output;
pub mod runner;
pub mod table;
pub mod utils;

// Re-export commonly used types
pub use config::RunConfig;
pub use data::MantelData;
pub use error::MantelError;
pub use mantel::{mantel, Alternative, CorrelationMethod, MantelParams, MantelResult};
pub use output::{Comparison, ResultLayout, ResultRecord};
pub use runner::{run_all, BatchOutcome, BatchReport, ComparisonMode, MantelRunner};
pub use table::SampleTable;
