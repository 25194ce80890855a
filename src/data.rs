//! Data Loading and Management
//!
//! Loads the phylum, genus, order and nutrient tables from tab-separated files
//! using Polars. The first column of each file is the sample identifier.

use crate::table::SampleTable;
use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

pub const PHYLUM: &str = "Phylum";
pub const GENUS: &str = "Genus";
pub const ORDER: &str = "Order";
pub const NUTRIENTS: &str = "Nutrients";

/// Dataset name → file name, in the order comparisons are run
pub const DATASET_FILES: [(&str, &str); 4] = [
    (PHYLUM, "phylum_count.tsv"),
    (GENUS, "genus_count.tsv"),
    (ORDER, "order_count.tsv"),
    (NUTRIENTS, "nutrients_all.tsv"),
];

/// Taxonomic tables compared against the nutrient table
pub const TAXA_DATASETS: [&str; 3] = [PHYLUM, GENUS, ORDER];

/// Named collection of loaded tables
///
/// Loaded once per run and passed by reference into the runner.
pub struct MantelData {
    tables: Vec<SampleTable>,
}

impl MantelData {
    /// Load all four tables from `data_dir`
    pub fn load(data_dir: &Path) -> Result<Self> {
        tracing::info!("Loading datasets from {}", data_dir.display());

        let mut tables = Vec::with_capacity(DATASET_FILES.len());
        for (name, file_name) in DATASET_FILES {
            let table = Self::load_table(name, &data_dir.join(file_name))?;
            tracing::info!(
                "  {}: {} samples × {} features",
                name,
                table.height(),
                table.width()
            );
            tables.push(table);
        }

        Ok(Self { tables })
    }

    /// Build a registry from tables already in memory
    pub fn from_tables(tables: Vec<SampleTable>) -> Self {
        Self { tables }
    }

    /// Load one tab-separated table
    pub fn load_table(name: &str, path: &Path) -> Result<SampleTable> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None) // Scan entire file
            .map_parse_options(|opts| opts.with_separator(b'\t'))
            .try_into_reader_with_file_path(Some(path.into()))
            .with_context(|| format!("Failed to create TSV reader: {}", path.display()))?
            .finish()
            .with_context(|| format!("Failed to load {} table: {}", name, path.display()))?;

        SampleTable::from_dataframe(name, &df)
            .with_context(|| format!("Malformed {} table: {}", name, path.display()))
    }

    pub fn get(&self, name: &str) -> Option<&SampleTable> {
        self.tables.iter().find(|t| t.name() == name)
    }

    /// Tables in registry order
    pub fn tables(&self) -> &[SampleTable] {
        &self.tables
    }
}
