//! CLI integration tests

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const HEADER: &str =
    "list_id,url,brand,model,year,horsepower,f_horsepower,mileage,nb_doors,nb_seats,gearbox,fuel_type,price_cents";

/// Write a small snapshot: three brands, twelve listings each
fn write_snapshot(dir: &Path) {
    let mut lines = vec![HEADER.to_string()];
    let cars = [
        ("Renault", "Clio", 90, 5, 1_000_000i64),
        ("Peugeot", "208", 100, 5, 1_200_000),
        ("Volkswagen", "Golf", 150, 8, 2_200_000),
    ];
    for (i, (brand, model, hp, fiscal, base)) in cars.iter().enumerate() {
        for k in 0..12i64 {
            let id = i as i64 * 12 + k;
            lines.push(format!(
                "{id},https://example.test/{id},{brand},{model},{year},{hp},{fiscal},{mileage},5,5,{gearbox},{fuel},{price}",
                year = 2023 - k,
                mileage = 10_000 * (k + 1),
                gearbox = k % 2,
                fuel = if k % 3 == 0 { "Diesel" } else { "Essence" },
                price = base - 50_000 * k,
            ));
        }
    }
    fs::write(dir.join("listings.csv"), lines.join("\n")).unwrap();
}

fn carprice(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_carprice"))
        .current_dir(dir)
        .env("CARPRICE__SEED", "3")
        .env("CARPRICE__FOREST__N_ESTIMATORS", "10")
        .env_remove("RUST_LOG")
        .args(["--data", "listings.csv", "--model-path", "model.bin.gz"])
        .args(args)
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_carprice"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Used-car price estimator"), "Should show app name");
    assert!(stdout.contains("train"), "Should show train command");
    assert!(stdout.contains("estimate"), "Should show estimate command");
    assert!(stdout.contains("market"), "Should show market command");
    assert!(stdout.contains("analyze"), "Should show analyze command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_carprice"))
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("carprice"), "Should show binary name");
}

#[test]
fn test_train_writes_model() {
    let dir = TempDir::new().unwrap();
    write_snapshot(dir.path());

    let output = carprice(dir.path(), &["--format", "json", "train"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["rows_complete"], 36);
    assert_eq!(report["seed"], 3);
    assert!(dir.path().join("model.bin.gz").exists());
}

#[test]
fn test_estimate_trains_when_model_missing() {
    let dir = TempDir::new().unwrap();
    write_snapshot(dir.path());

    let output = carprice(
        dir.path(),
        &[
            "--format", "json", "estimate", "--brand", "Renault", "--model", "Clio", "--year",
            "2018", "--horsepower", "90", "--f-horsepower", "5", "--mileage", "60000", "--fuel",
            "Essence",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let estimate: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(estimate["trained_now"], true);
    assert_eq!(estimate["degraded"], false);
    let price = estimate["price"].as_f64().unwrap();
    assert!((4_500.0..=22_000.0).contains(&price), "price out of range: {}", price);
    assert!(dir.path().join("model.bin.gz").exists());
}

#[test]
fn test_estimate_rejects_unknown_fuel() {
    let dir = TempDir::new().unwrap();
    write_snapshot(dir.path());

    let output = carprice(
        dir.path(),
        &[
            "estimate", "--brand", "Renault", "--model", "Clio", "--year", "2018",
            "--horsepower", "90", "--f-horsepower", "5", "--mileage", "60000", "--fuel", "Electrique",
        ],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown fuel type"), "stderr: {}", stderr);
}

#[test]
fn test_market_brands_json() {
    let dir = TempDir::new().unwrap();
    write_snapshot(dir.path());

    let output = carprice(dir.path(), &["--format", "json", "market", "brands", "--top", "2"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let brands: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let brands = brands.as_array().unwrap();
    assert_eq!(brands.len(), 2);
    // Equal counts are ordered by name
    assert_eq!(brands[0]["brand"], "Peugeot");
    assert_eq!(brands[0]["count"], 12);
}

#[test]
fn test_analyze_summary_table() {
    let dir = TempDir::new().unwrap();
    write_snapshot(dir.path());

    let output = carprice(
        dir.path(),
        &["analyze", "summary", "--brand", "renault", "--model", "cli"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Mean price"));
    assert!(stdout.contains("Listings: 12"));
}

#[test]
fn test_analyze_trend_points() {
    let dir = TempDir::new().unwrap();
    write_snapshot(dir.path());

    let output = carprice(
        dir.path(),
        &["--format", "json", "analyze", "trend", "--brand", "Golf", "--model", "Golf"],
    );
    assert!(!output.status.success(), "unknown brand should fail");

    let output = carprice(
        dir.path(),
        &[
            "--format", "json", "analyze", "trend", "--brand", "Volkswagen", "--model", "Golf",
            "--points", "7",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let trend: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(trend["curve"].as_array().unwrap().len(), 7);
}

#[test]
fn test_missing_snapshot_reports_path() {
    let dir = TempDir::new().unwrap();
    let output = carprice(dir.path(), &["market", "correlation"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("listings.csv"), "stderr: {}", stderr);
}
