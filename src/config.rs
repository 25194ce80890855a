//! Run configuration
//!
//! Built-in defaults, optionally overlaid by a JSON file named in
//! `MANTEL_CONFIG`, then by individual environment variables.

use crate::error::MantelError;
use crate::mantel::{
    Alternative, CorrelationMethod, MantelParams, DEFAULT_PERMUTATIONS, MIN_MANTEL_SAMPLES,
};
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "MANTEL_CONFIG";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const OUTPUT_DIR_ENV: &str = "OUTPUT_DIR";
pub const SEED_ENV: &str = "MANTEL_SEED";
pub const PERMUTATIONS_ENV: &str = "MANTEL_PERMUTATIONS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Directory holding the four input tables
    pub data_dir: PathBuf,
    /// Directory receiving the result tables (created if absent)
    pub output_dir: PathBuf,
    pub permutations: usize,
    pub method: CorrelationMethod,
    pub alternative: Alternative,
    /// Fixed seed for balancing and permutations; entropy if unset
    pub seed: Option<u64>,
    /// Comparisons with fewer samples per side are skipped
    pub min_samples: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("../01_data"),
            output_dir: PathBuf::from("../03_results/out_mantel"),
            permutations: DEFAULT_PERMUTATIONS,
            method: CorrelationMethod::Pearson,
            alternative: Alternative::TwoSided,
            seed: None,
            min_samples: MIN_MANTEL_SAMPLES,
        }
    }
}

impl RunConfig {
    /// Resolve configuration from the process environment
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::load(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        serde_json::from_str(&contents).with_context(|| "Failed to parse config JSON")
    }

    /// Apply `DATA_DIR`, `OUTPUT_DIR`, `MANTEL_SEED`, `MANTEL_PERMUTATIONS`
    /// as returned by `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), MantelError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(DATA_DIR_ENV) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(OUTPUT_DIR_ENV) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(seed) = lookup(SEED_ENV) {
            let seed = seed.trim().parse().map_err(|_| {
                MantelError::InvalidConfig(format!(
                    "{} must be an unsigned integer, got '{}'",
                    SEED_ENV, seed
                ))
            })?;
            self.seed = Some(seed);
        }
        if let Some(perms) = lookup(PERMUTATIONS_ENV) {
            self.permutations = perms.trim().parse().map_err(|_| {
                MantelError::InvalidConfig(format!(
                    "{} must be an unsigned integer, got '{}'",
                    PERMUTATIONS_ENV, perms
                ))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), MantelError> {
        if self.min_samples < MIN_MANTEL_SAMPLES {
            return Err(MantelError::InvalidConfig(format!(
                "min_samples must be at least {}, got {}",
                MIN_MANTEL_SAMPLES, self.min_samples
            )));
        }
        Ok(())
    }

    pub fn mantel_params(&self) -> MantelParams {
        MantelParams {
            permutations: self.permutations,
            method: self.method,
            alternative: self.alternative,
        }
    }

    /// Random source for the whole batch
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
