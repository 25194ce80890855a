//! Sample Tables
//!
//! Row-major numeric tables keyed by sample identifier. Rows are samples
//! (e.g. "AC01"), columns are features (taxa or nutrients).
//!
//! Tables are built once from a polars `DataFrame` and never mutated; every
//! comparison reads rows out of them by identifier.

use anyhow::{anyhow, bail, Context, Result};
use polars::prelude::*;
use rustc_hash::FxHashMap;

/// Numeric feature table indexed by sample identifier
#[derive(Debug, Clone)]
pub struct SampleTable {
    name: String,
    sample_ids: Vec<String>,
    features: Vec<String>,
    rows: Vec<Vec<f64>>,
    index: FxHashMap<String, usize>,
}

impl SampleTable {
    /// Build a table from identifiers, feature names and row values
    ///
    /// # Errors
    /// Returns error if:
    /// - Row count differs from identifier count
    /// - Any row has a different width from the feature list
    /// - A sample identifier appears twice
    pub fn new(
        name: impl Into<String>,
        sample_ids: Vec<String>,
        features: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let name = name.into();

        if sample_ids.len() != rows.len() {
            bail!(
                "{}: {} sample ids but {} rows",
                name,
                sample_ids.len(),
                rows.len()
            );
        }

        let mut index = FxHashMap::default();
        for (idx, (id, row)) in sample_ids.iter().zip(&rows).enumerate() {
            if row.len() != features.len() {
                bail!(
                    "{}: sample '{}' has {} values, expected {}",
                    name,
                    id,
                    row.len(),
                    features.len()
                );
            }
            if index.insert(id.clone(), idx).is_some() {
                bail!("{}: duplicate sample id '{}'", name, id);
            }
        }

        Ok(Self {
            name,
            sample_ids,
            features,
            rows,
            index,
        })
    }

    /// Convert a loaded DataFrame into a table
    ///
    /// The first column is the sample identifier; every other column must be
    /// numeric with no missing cells.
    pub fn from_dataframe(name: &str, df: &DataFrame) -> Result<Self> {
        let columns = df.get_columns();
        let (id_column, feature_columns) = columns
            .split_first()
            .ok_or_else(|| anyhow!("{}: table has no columns", name))?;

        let ids = id_column
            .cast(&DataType::String)
            .with_context(|| format!("{}: sample id column is not text", name))?;
        let sample_ids: Vec<String> = ids
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, id)| {
                id.map(str::to_string)
                    .ok_or_else(|| anyhow!("{}: missing sample id on row {}", name, row + 1))
            })
            .collect::<Result<_>>()?;

        let mut rows = vec![Vec::with_capacity(feature_columns.len()); sample_ids.len()];
        let mut features = Vec::with_capacity(feature_columns.len());

        for column in feature_columns {
            let feature = column.name().to_string();
            let values = column
                .cast(&DataType::Float64)
                .with_context(|| format!("{}: column '{}' is not numeric", name, feature))?;

            for (row, value) in values.f64()?.into_iter().enumerate() {
                let value = value.ok_or_else(|| {
                    anyhow!(
                        "{}: missing or non-numeric value for sample '{}' in column '{}'",
                        name,
                        sample_ids[row],
                        feature
                    )
                })?;
                rows[row].push(value);
            }
            features.push(feature);
        }

        Self::new(name, sample_ids, features, rows)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sample identifiers in file order
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Number of samples (rows)
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of features (columns)
    pub fn width(&self) -> usize {
        self.features.len()
    }

    pub fn contains(&self, sample_id: &str) -> bool {
        self.index.contains_key(sample_id)
    }

    pub fn row(&self, sample_id: &str) -> Option<&[f64]> {
        self.index.get(sample_id).map(|&idx| self.rows[idx].as_slice())
    }

    /// Gather rows for the given identifiers, in the order given
    pub fn select_rows(&self, sample_ids: &[String]) -> Result<Vec<&[f64]>> {
        sample_ids
            .iter()
            .map(|id| {
                self.row(id)
                    .ok_or_else(|| anyhow!("{}: unknown sample id '{}'", self.name, id))
            })
            .collect()
    }
}
