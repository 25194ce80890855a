//! Result records and TSV output
//!
//! Each completed comparison becomes one row. Skipped comparisons never
//! reach the output tables.

use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs;
use std::path::Path;

pub const WITHIN_TABLE_RESULTS_FILE: &str = "mantel_results.tsv";
pub const CROSS_TABLE_RESULTS_FILE: &str = "mantel_results_motus_vs_nutrients.tsv";

/// What was compared within a dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    /// Two prefix groups of the same table
    Groups { group1: String, group2: String },
    /// One prefix, this table against the reference table
    CrossTable { prefix: String },
}

/// One completed comparison
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub dataset: String,
    pub comparison: Comparison,
    pub statistic: f64,
    pub p_value: f64,
    /// Samples per distance matrix
    pub n: usize,
}

/// Column layout of a result table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultLayout {
    /// Dataset, Group 1 Prefix, Group 2 Prefix, Mantel Statistic, P-value
    Groups,
    /// Dataset, Prefix, Mantel Statistic, P-value
    CrossTable,
}

impl ResultLayout {
    pub fn column_names(self) -> &'static [&'static str] {
        match self {
            ResultLayout::Groups => &[
                "Dataset",
                "Group 1 Prefix",
                "Group 2 Prefix",
                "Mantel Statistic",
                "P-value",
            ],
            ResultLayout::CrossTable => &["Dataset", "Prefix", "Mantel Statistic", "P-value"],
        }
    }

    /// Default output file name for this layout
    pub fn file_name(self) -> &'static str {
        match self {
            ResultLayout::Groups => WITHIN_TABLE_RESULTS_FILE,
            ResultLayout::CrossTable => CROSS_TABLE_RESULTS_FILE,
        }
    }
}

/// Build the output DataFrame for `records`
///
/// Records whose comparison does not match `layout` are left out.
pub fn records_to_dataframe(records: &[ResultRecord], layout: ResultLayout) -> Result<DataFrame> {
    let mut dataset = Vec::new();
    let mut first = Vec::new();
    let mut second = Vec::new();
    let mut statistic = Vec::new();
    let mut p_value = Vec::new();

    for record in records {
        match (&record.comparison, layout) {
            (Comparison::Groups { group1, group2 }, ResultLayout::Groups) => {
                first.push(group1.as_str());
                second.push(group2.as_str());
            }
            (Comparison::CrossTable { prefix }, ResultLayout::CrossTable) => {
                first.push(prefix.as_str());
            }
            _ => continue,
        }
        dataset.push(record.dataset.as_str());
        statistic.push(record.statistic);
        p_value.push(record.p_value);
    }

    let names = layout.column_names();
    let mut columns: Vec<Column> = vec![
        Series::new(names[0].into(), dataset).into(),
        Series::new(names[1].into(), first).into(),
    ];
    if layout == ResultLayout::Groups {
        columns.push(Series::new(names[2].into(), second).into());
    }
    let n = names.len();
    columns.push(Series::new(names[n - 2].into(), statistic).into());
    columns.push(Series::new(names[n - 1].into(), p_value).into());

    DataFrame::new(columns).with_context(|| "Failed to assemble result table")
}

/// Write `records` as a tab-separated table, creating parent directories
pub fn write_results(records: &[ResultRecord], layout: ResultLayout, path: &Path) -> Result<()> {
    let mut df = records_to_dataframe(records, layout)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let mut file = fs::File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b'\t')
        .finish(&mut df)
        .with_context(|| format!("Failed to write results: {}", path.display()))?;

    tracing::info!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}
