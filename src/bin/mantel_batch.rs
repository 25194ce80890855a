//! Mantel batch runner
//!
//! Reads phylum_count.tsv, genus_count.tsv, order_count.tsv and
//! nutrients_all.tsv from DATA_DIR and writes:
//!   - mantel_results.tsv (group pairs within each table)
//!   - mantel_results_motus_vs_nutrients.tsv (taxa vs nutrients per prefix)
//!
//! Optional environment: MANTEL_CONFIG (JSON), DATA_DIR, OUTPUT_DIR,
//! MANTEL_SEED, MANTEL_PERMUTATIONS.

use anyhow::Result;
use mantel_batch::{run_all, BatchOutcome, RunConfig};
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mantel_batch=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("\n{}", "=".repeat(80));
    println!("MANTEL TESTS: MOTUS AND NUTRIENTS");
    println!("{}", "=".repeat(80));

    let total_start = Instant::now();

    let config = RunConfig::from_env()?;
    println!("  Data dir: {}", config.data_dir.display());
    println!("  Output dir: {}", config.output_dir.display());
    println!(
        "  Method: {:?}, alternative: {:?}, permutations: {}",
        config.method, config.alternative, config.permutations
    );
    match config.seed {
        Some(seed) => println!("  Seed: {}", seed),
        None => println!("  Seed: none (results vary between runs)"),
    }

    let report = run_all(&config)?;

    println!("\n{}", "-".repeat(80));
    print_summary("Within-table group comparisons", &report.within_table);
    println!("Mantel test results saved to {}", report.within_table_path.display());

    println!("\n{}", "-".repeat(80));
    print_summary("Taxa vs nutrients comparisons", &report.cross_table);
    println!("Mantel test results saved to {}", report.cross_table_path.display());

    println!("\n{}", "=".repeat(80));
    println!("COMPLETE in {:.1}s", total_start.elapsed().as_secs_f64());
    println!("{}", "=".repeat(80));

    Ok(())
}

fn print_summary(title: &str, outcome: &BatchOutcome) {
    println!("{}", title);
    println!("  Completed: {}", outcome.records.len());
    println!("  Skipped: {}", outcome.skipped.len());
    for skipped in &outcome.skipped {
        println!("    ⚠ {}: {}", skipped.dataset, skipped.reason);
    }
}
