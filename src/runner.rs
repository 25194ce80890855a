//! Mantel Runner - batch coordinator for all comparisons
//!
//! Drives selection → balancing/intersection → distance matrices → Mantel
//! test over a fixed list of comparisons, collecting one result record per
//! completed comparison.
//!
//! Two modes:
//! - Within-table: two prefix groups of the same table, balanced to equal size
//! - Cross-table: one prefix, each taxonomic table against the nutrient table,
//!   restricted to the samples both tables share

use crate::config::RunConfig;
use crate::data::{MantelData, NUTRIENTS, TAXA_DATASETS};
use crate::error::MantelError;
use crate::mantel::{mantel, MantelParams, MantelResult};
use crate::output::{write_results, Comparison, ResultLayout, ResultRecord};
use crate::table::SampleTable;
use crate::utils::{balance_groups, euclidean_distance_matrix, intersect_common, require_group};
use anyhow::{anyhow, Context, Result};
use rand::Rng;
use std::fs;
use std::path::PathBuf;

/// Group pairs compared within every table
pub const GROUP_PAIRS: [(&str, &str); 4] = [("AC", "AS"), ("EC", "ES"), ("AC", "EC"), ("AS", "ES")];

/// Prefixes compared between taxonomic tables and nutrients
pub const CROSS_TABLE_PREFIXES: [&str; 2] = ["AS", "ES"];

/// What a batch compares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonMode {
    /// Each group pair against each dataset (or every loaded table if empty)
    WithinTable {
        pairs: Vec<(String, String)>,
        datasets: Vec<String>,
    },
    /// Each prefix × dataset against the `reference` table
    CrossTable {
        prefixes: Vec<String>,
        datasets: Vec<String>,
        reference: String,
    },
}

impl ComparisonMode {
    /// (AC,AS), (EC,ES), (AC,EC), (AS,ES) across all loaded tables
    pub fn within_table_default() -> Self {
        ComparisonMode::WithinTable {
            pairs: GROUP_PAIRS
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
            datasets: Vec::new(),
        }
    }

    /// AS, ES across Phylum, Genus, Order against Nutrients
    pub fn cross_table_default() -> Self {
        ComparisonMode::CrossTable {
            prefixes: CROSS_TABLE_PREFIXES.iter().map(|p| p.to_string()).collect(),
            datasets: TAXA_DATASETS.iter().map(|d| d.to_string()).collect(),
            reference: NUTRIENTS.to_string(),
        }
    }

    pub fn layout(&self) -> ResultLayout {
        match self {
            ComparisonMode::WithinTable { .. } => ResultLayout::Groups,
            ComparisonMode::CrossTable { .. } => ResultLayout::CrossTable,
        }
    }
}

/// A comparison that was not run, and why
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedComparison {
    pub dataset: String,
    pub comparison: Comparison,
    pub reason: MantelError,
}

/// Results of one batch, in the order comparisons were attempted
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub layout: ResultLayout,
    pub records: Vec<ResultRecord>,
    pub skipped: Vec<SkippedComparison>,
}

/// Main Mantel runner
pub struct MantelRunner<'a, R: Rng> {
    data: &'a MantelData,
    params: MantelParams,
    min_samples: usize,
    rng: R,
}

impl<'a, R: Rng> MantelRunner<'a, R> {
    pub fn new(data: &'a MantelData, params: MantelParams, min_samples: usize, rng: R) -> Self {
        Self {
            data,
            params,
            min_samples,
            rng,
        }
    }

    /// Compare two prefix groups within one table
    ///
    /// The larger group is downsampled to the size of the smaller before
    /// distances are computed.
    pub fn compare_groups(
        &mut self,
        table: &SampleTable,
        group1: &str,
        group2: &str,
    ) -> Result<MantelResult> {
        let first = require_group(table, group1)?;
        let second = require_group(table, group2)?;

        let balanced = balance_groups(&first, &second, &mut self.rng);
        self.check_size(balanced.size())?;

        let x = euclidean_distance_matrix(&table.select_rows(&balanced.first)?)?;
        let y = euclidean_distance_matrix(&table.select_rows(&balanced.second)?)?;

        Ok(mantel(&x, &y, &self.params, &mut self.rng)?)
    }

    /// Compare `table` against `reference` over their common `prefix` samples
    pub fn compare_tables(
        &mut self,
        table: &SampleTable,
        reference: &SampleTable,
        prefix: &str,
    ) -> Result<MantelResult> {
        let common = intersect_common(table, reference, prefix)?;
        self.check_size(common.len())?;

        let x = euclidean_distance_matrix(&table.select_rows(&common)?)?;
        let y = euclidean_distance_matrix(&reference.select_rows(&common)?)?;

        Ok(mantel(&x, &y, &self.params, &mut self.rng)?)
    }

    /// Run every comparison of `mode`
    ///
    /// Missing groups, missing common samples and undersized groups are
    /// skipped with a warning; any other error aborts the batch.
    pub fn run(&mut self, mode: &ComparisonMode) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome {
            layout: mode.layout(),
            records: Vec::new(),
            skipped: Vec::new(),
        };

        match mode {
            ComparisonMode::WithinTable { pairs, datasets } => {
                let tables = self.resolve(datasets)?;
                for (group1, group2) in pairs {
                    for &table in &tables {
                        let comparison = Comparison::Groups {
                            group1: group1.clone(),
                            group2: group2.clone(),
                        };
                        let result = self.compare_groups(table, group1, group2);
                        Self::collect(&mut outcome, table.name(), comparison, result)?;
                    }
                }
            }
            ComparisonMode::CrossTable {
                prefixes,
                datasets,
                reference,
            } => {
                let data = self.data;
                let reference = data
                    .get(reference)
                    .ok_or_else(|| anyhow!("Reference table '{}' not loaded", reference))?;
                let tables = self.resolve(datasets)?;
                for prefix in prefixes {
                    for &table in &tables {
                        let comparison = Comparison::CrossTable {
                            prefix: prefix.clone(),
                        };
                        let result = self.compare_tables(table, reference, prefix);
                        Self::collect(&mut outcome, table.name(), comparison, result)?;
                    }
                }
            }
        }

        tracing::info!(
            "Batch finished: {} completed, {} skipped",
            outcome.records.len(),
            outcome.skipped.len()
        );
        Ok(outcome)
    }

    fn check_size(&self, found: usize) -> Result<(), MantelError> {
        if found < self.min_samples {
            return Err(MantelError::TooFewSamples {
                needed: self.min_samples,
                found,
            });
        }
        Ok(())
    }

    /// Named tables, or every loaded table when `names` is empty
    fn resolve(&self, names: &[String]) -> Result<Vec<&'a SampleTable>> {
        let data = self.data;
        if names.is_empty() {
            return Ok(data.tables().iter().collect());
        }
        names
            .iter()
            .map(|name| {
                data.get(name)
                    .ok_or_else(|| anyhow!("Dataset '{}' not loaded", name))
            })
            .collect()
    }

    fn collect(
        outcome: &mut BatchOutcome,
        dataset: &str,
        comparison: Comparison,
        result: Result<MantelResult>,
    ) -> Result<()> {
        match result {
            Ok(result) => {
                tracing::debug!(
                    "{} {:?}: statistic={:.4} p={:.4} n={}",
                    dataset,
                    comparison,
                    result.statistic,
                    result.p_value,
                    result.n
                );
                outcome.records.push(ResultRecord {
                    dataset: dataset.to_string(),
                    comparison,
                    statistic: result.statistic,
                    p_value: result.p_value,
                    n: result.n,
                });
                Ok(())
            }
            Err(err) => match err.downcast::<MantelError>() {
                Ok(reason) if reason.is_recoverable() => {
                    tracing::warn!("Skipping Mantel test for {}: {}", dataset, reason);
                    outcome.skipped.push(SkippedComparison {
                        dataset: dataset.to_string(),
                        comparison,
                        reason,
                    });
                    Ok(())
                }
                Ok(reason) => Err(reason.into()),
                Err(err) => Err(err),
            },
        }
    }
}

/// Output of a full run
#[derive(Debug)]
pub struct BatchReport {
    pub within_table: BatchOutcome,
    pub within_table_path: PathBuf,
    pub cross_table: BatchOutcome,
    pub cross_table_path: PathBuf,
}

/// Load the tables, run both comparison modes and write both result files
pub fn run_all(config: &RunConfig) -> Result<BatchReport> {
    let data = MantelData::load(&config.data_dir)?;
    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("Failed to create output directory: {}", config.output_dir.display())
    })?;

    let mut runner = MantelRunner::new(&data, config.mantel_params(), config.min_samples, config.rng());

    let within_mode = ComparisonMode::within_table_default();
    let within_table = runner.run(&within_mode)?;
    let within_table_path = config.output_dir.join(within_mode.layout().file_name());
    write_results(&within_table.records, within_table.layout, &within_table_path)?;

    let cross_mode = ComparisonMode::cross_table_default();
    let cross_table = runner.run(&cross_mode)?;
    let cross_table_path = config.output_dir.join(cross_mode.layout().file_name());
    write_results(&cross_table.records, cross_table.layout, &cross_table_path)?;

    Ok(BatchReport {
        within_table,
        within_table_path,
        cross_table,
        cross_table_path,
    })
}
