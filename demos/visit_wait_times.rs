//! Waiting time between consecutive visit days.
//!
//! Demonstrates:
//! - Loading visits with typed, excluded, custom and encoded columns
//! - Grouped sort (person, then visit day)
//! - Grouped filter (people with at least four visits)
//! - Grouped traversal with look-behind to the previous visit day
//! - Writing the enriched dataset back to CSV
//!
//! Run with: cargo run --example visit_wait_times [-- visits.csv [out.csv]]
//!
//! Without arguments the built-in sample is used. Set `RUST_LOG=visitframe=debug`
//! to see what each step did.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use visitframe::testing::{SAMPLE_VISITS_CSV, sample_config};
use visitframe::*;

const DAY_MS: f64 = 86_400_000.0;
const MIN_VISITS: usize = 4;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let input = args.next();
    let output = args.next();

    println!("🩺 Visit Wait Times\n");

    let config = sample_config();
    let mut data = match &input {
        Some(path) => Dataset::from_path(path, &config)?,
        None => Dataset::from_text(SAMPLE_VISITS_CSV, &config)?,
    };
    println!(
        "Loaded {} visits with columns: {}",
        data.len(),
        data.columns().collect::<Vec<_>>().join(", ")
    );

    // =============================================================================
    // STEP 1: Sort visits by person, then by day
    // =============================================================================
    data.sort_with(
        &[SortSpec::asc("person_id"), SortSpec::asc("contact_date")],
        &SortOptions::new().group_by(["person_id", "contact_date"]),
    )?;

    // =============================================================================
    // STEP 2: Keep people with enough visits
    // =============================================================================
    let dropped = data.filter_with(
        &FilterOptions::new()
            .group_by(["person_id"])
            .group_filter("person_id", |p| p.row_count() >= MIN_VISITS),
    )?;
    println!("Dropped {dropped} visits of people with fewer than {MIN_VISITS} visits\n");

    // =============================================================================
    // STEP 3: Days since the previous visit day of the same person
    // =============================================================================
    let by_day = TraverseOptions::new().group_by(["person_id", "contact_date"]);
    data.derive_column("wait_time_days", &by_day, |entry| {
        if entry.is_first(1) {
            return Value::Number(0.0);
        }
        let day = entry.get("contact_date").and_then(Value::as_f64);
        let previous = entry
            .preceding(1)
            .and_then(|row| row.get("contact_date"))
            .and_then(Value::as_f64);
        Value::from(day.zip(previous).map(|(d, p)| ((d - p) / DAY_MS).floor()))
    })?;
    data.derive_column("wait_time_weeks", &TraverseOptions::new(), |entry| {
        let days = entry.get("wait_time_days").and_then(Value::as_f64);
        Value::from(days.map(|d| (d / 7.0).floor()))
    })?;

    data.decode::<&str>(&[]);
    println!("{:>8}  {:>10}  {:>8}  {:>5}  {:>6}", "person", "day", "atc", "days", "weeks");
    for row in data.rows() {
        let cell = |column: &str| row.get(column).map(Value::to_raw).unwrap_or_default();
        let day = row
            .get("contact_date")
            .and_then(Value::as_f64)
            .and_then(|ms| chrono::DateTime::from_timestamp_millis(ms as i64))
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default();
        println!(
            "{:>8}  {:>10}  {:>8}  {:>5}  {:>6}",
            cell("person_id"),
            day,
            cell("product_atc_code"),
            cell("wait_time_days"),
            cell("wait_time_weeks")
        );
    }

    if let Some(path) = output {
        let written = write_dataset(&path, &data)?;
        println!("\n✅ Wrote {written} rows to {path}");
    }
    Ok(())
}
