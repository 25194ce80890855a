//! Mantel Batch Integration Tests
//!
//! Writes small synthetic tables into a temp directory and runs the full
//! pipeline from TSV loading to result files.

use mantel_batch::data::{MantelData, NUTRIENTS, PHYLUM};
use mantel_batch::output::{CROSS_TABLE_RESULTS_FILE, WITHIN_TABLE_RESULTS_FILE};
use mantel_batch::{
    run_all, Comparison, ComparisonMode, MantelError, MantelParams, MantelRunner, RunConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const FEATURES: usize = 4;

/// Tab-separated table with deterministic, non-degenerate values
fn write_table(dir: &Path, file_name: &str, samples: &[String]) {
    let mut contents = String::from("sample");
    for f in 0..FEATURES {
        contents.push_str(&format!("\tfeature_{}", f));
    }
    contents.push('\n');

    for (k, sample) in samples.iter().enumerate() {
        contents.push_str(sample);
        for f in 0..FEATURES {
            let value = ((k * 31 + f * 17) % 23) as f64 + (k as f64 + 1.0).sqrt();
            contents.push_str(&format!("\t{}", value));
        }
        contents.push('\n');
    }

    fs::write(dir.join(file_name), contents).unwrap();
}

fn ids(groups: &[(&str, usize)]) -> Vec<String> {
    groups
        .iter()
        .flat_map(|(prefix, n)| (1..=*n).map(move |i| format!("{}{:02}", prefix, i)))
        .collect()
}

/// Phylum/Order hold all four groups, Genus lacks EC/ES, Nutrients lacks EC
fn write_fixture(dir: &Path) {
    write_table(
        dir,
        "phylum_count.tsv",
        &ids(&[("AC", 5), ("AS", 3), ("EC", 3), ("ES", 4)]),
    );
    write_table(dir, "genus_count.tsv", &ids(&[("AC", 4), ("AS", 4)]));
    write_table(
        dir,
        "order_count.tsv",
        &ids(&[("AC", 3), ("AS", 3), ("EC", 3), ("ES", 3)]),
    );
    write_table(
        dir,
        "nutrients_all.tsv",
        &ids(&[("AC", 3), ("AS", 4), ("ES", 3)]),
    );
}

fn config(data: &TempDir, out: &Path) -> RunConfig {
    RunConfig {
        data_dir: data.path().to_path_buf(),
        output_dir: out.to_path_buf(),
        permutations: 99,
        seed: Some(17),
        ..RunConfig::default()
    }
}

/// Result rows without the header, split on tabs
fn read_rows(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let contents = fs::read_to_string(path).unwrap();
    let mut lines = contents.lines().map(|line| {
        line.split('\t')
            .map(|cell| cell.trim_matches('"').to_string())
            .collect::<Vec<_>>()
    });
    let header = lines.next().unwrap();
    (header, lines.collect())
}

#[test]
fn test_full_batch_writes_both_tables() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_fixture(data.path());
    let out_dir = out.path().join("out_mantel");

    let report = run_all(&config(&data, &out_dir)).unwrap();

    // Within-table: Phylum 4 + Genus 1 + Order 4 + Nutrients 2 completed,
    // Genus ×3 and Nutrients ×2 skipped
    let (header, rows) = read_rows(&out_dir.join(WITHIN_TABLE_RESULTS_FILE));
    assert_eq!(
        header,
        vec!["Dataset", "Group 1 Prefix", "Group 2 Prefix", "Mantel Statistic", "P-value"]
    );
    assert_eq!(rows.len(), 11);
    assert_eq!(report.within_table.records.len(), 11);
    assert_eq!(report.within_table.skipped.len(), 5);
    assert_eq!(
        rows[0][..3],
        ["Phylum".to_string(), "AC".to_string(), "AS".to_string()]
    );
    assert!(!rows
        .iter()
        .any(|row| row[0] == "Genus" && (row[1] == "EC" || row[2] == "EC")));

    for row in &rows {
        let statistic: f64 = row[3].parse().unwrap();
        let p_value: f64 = row[4].parse().unwrap();
        assert!((-1.0..=1.0).contains(&statistic), "statistic {}", statistic);
        assert!(p_value > 0.0 && p_value <= 1.0, "p-value {}", p_value);
    }

    // Cross-table: AS × 3 datasets, ES × Phylum/Order; Genus has no ES
    let (header, rows) = read_rows(&out_dir.join(CROSS_TABLE_RESULTS_FILE));
    assert_eq!(header, vec!["Dataset", "Prefix", "Mantel Statistic", "P-value"]);
    let labels: Vec<(String, String)> = rows
        .iter()
        .map(|row| (row[0].clone(), row[1].clone()))
        .collect();
    let expected: Vec<(String, String)> = [
        ("Phylum", "AS"),
        ("Genus", "AS"),
        ("Order", "AS"),
        ("Phylum", "ES"),
        ("Order", "ES"),
    ]
    .iter()
    .map(|(d, p)| (d.to_string(), p.to_string()))
    .collect();
    assert_eq!(labels, expected);
    assert_eq!(report.cross_table.skipped.len(), 1);
    assert!(matches!(
        report.cross_table.skipped[0].reason,
        MantelError::NoCommonSamples { .. }
    ));
}

#[test]
fn test_unequal_groups_are_balanced() {
    let data = tempfile::tempdir().unwrap();
    write_table(data.path(), "phylum_count.tsv", &ids(&[("AC", 5), ("AS", 3)]));
    let phylum = MantelData::load_table(PHYLUM, &data.path().join("phylum_count.tsv")).unwrap();
    let registry = MantelData::from_tables(vec![phylum]);

    let mut runner = MantelRunner::new(
        &registry,
        MantelParams::default(),
        3,
        StdRng::seed_from_u64(1),
    );
    let outcome = runner.run(&ComparisonMode::within_table_default()).unwrap();

    assert_eq!(outcome.records.len(), 1);
    let record = &outcome.records[0];
    assert_eq!(record.n, 3);
    assert_eq!(
        record.comparison,
        Comparison::Groups {
            group1: "AC".to_string(),
            group2: "AS".to_string()
        }
    );
    assert!((-1.0..=1.0).contains(&record.statistic));
    assert!(record.p_value > 0.0 && record.p_value <= 1.0);
}

#[test]
fn test_absent_group_produces_no_row() {
    let data = tempfile::tempdir().unwrap();
    write_fixture(data.path());
    let registry = MantelData::load(data.path()).unwrap();

    let mode = ComparisonMode::WithinTable {
        pairs: vec![
            ("AC".to_string(), "XY".to_string()),
            ("AC".to_string(), "AS".to_string()),
        ],
        datasets: vec![PHYLUM.to_string()],
    };
    let mut runner = MantelRunner::new(
        &registry,
        MantelParams::default(),
        3,
        StdRng::seed_from_u64(8),
    );
    let outcome = runner.run(&mode).unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert!(outcome.records.iter().all(|r| match &r.comparison {
        Comparison::Groups { group1, group2 } => group1 != "XY" && group2 != "XY",
        Comparison::CrossTable { .. } => false,
    }));
    assert_eq!(
        outcome.skipped[0].reason,
        MantelError::GroupNotFound {
            dataset: PHYLUM.to_string(),
            prefix: "XY".to_string()
        }
    );
}

#[test]
fn test_cross_table_on_shared_samples() {
    let data = tempfile::tempdir().unwrap();
    write_table(
        data.path(),
        "phylum_count.tsv",
        &ids(&[("AS", 6), ("AC", 2)]),
    );
    // shares AS01..AS04 with phylum, plus ids phylum does not have
    let mut nutrient_ids = ids(&[("AS", 4)]);
    nutrient_ids.reverse();
    nutrient_ids.extend(ids(&[("ES", 3)]));
    nutrient_ids.push("AS99".to_string());
    write_table(data.path(), "nutrients_all.tsv", &nutrient_ids);

    let registry = MantelData::from_tables(vec![
        MantelData::load_table(PHYLUM, &data.path().join("phylum_count.tsv")).unwrap(),
        MantelData::load_table(NUTRIENTS, &data.path().join("nutrients_all.tsv")).unwrap(),
    ]);
    let mode = ComparisonMode::CrossTable {
        prefixes: vec!["AS".to_string()],
        datasets: vec![PHYLUM.to_string()],
        reference: NUTRIENTS.to_string(),
    };
    let mut runner = MantelRunner::new(
        &registry,
        MantelParams::default(),
        3,
        StdRng::seed_from_u64(3),
    );
    let outcome = runner.run(&mode).unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].dataset, "Phylum");
    assert_eq!(outcome.records[0].n, 4);
    assert_eq!(
        outcome.records[0].comparison,
        Comparison::CrossTable {
            prefix: "AS".to_string()
        }
    );
}

#[test]
fn test_seeded_batches_identical() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_fixture(data.path());

    let first = out.path().join("first");
    let second = out.path().join("second");
    run_all(&config(&data, &first)).unwrap();
    run_all(&config(&data, &second)).unwrap();

    for file in [WITHIN_TABLE_RESULTS_FILE, CROSS_TABLE_RESULTS_FILE] {
        assert_eq!(
            fs::read_to_string(first.join(file)).unwrap(),
            fs::read_to_string(second.join(file)).unwrap()
        );
    }
}

#[test]
fn test_malformed_table_is_fatal() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_fixture(data.path());
    fs::write(
        data.path().join("nutrients_all.tsv"),
        "sample\tIron\nAS01\t1.5\nAS02\tnot-a-number\n",
    )
    .unwrap();

    let result = run_all(&config(&data, out.path()));

    assert!(result.is_err());
    assert!(!out.path().join(WITHIN_TABLE_RESULTS_FILE).exists());
}

#[test]
fn test_missing_input_is_fatal() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    assert!(run_all(&config(&data, out.path())).is_err());
}
