//! Duplicate audit for exported coordinate files
//!
//! `coords_audit <CSV_FILE>` reports how many data rows are unique and lists
//! every repeated row.

use anyhow::{Context, Result};
use clap::{Arg, Command};
use coords_export::audit_csv_duplicates;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

fn build_command() -> Command {
    Command::new("coords_audit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Count duplicate rows in an exported coordinates CSV.")
        .arg(
            Arg::new("file")
                .help("CSV file to audit")
                .required(true)
                .num_args(1)
                .index(1)
                .value_parser(clap::value_parser!(PathBuf)),
        )
}

fn main() -> Result<()> {
    let matches = build_command().get_matches();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let path = matches
        .get_one::<PathBuf>("file")
        .context("Missing CSV file argument")?;

    let report = audit_csv_duplicates(path, |pct| info!("Processing: {pct:.2}%"))
        .with_context(|| format!("Failed to audit {}", path.display()))?;

    println!(
        "Uniques: {} / Duplicates: {}",
        report.uniques,
        report.duplicate_count()
    );
    for row in &report.duplicates {
        println!("{}", row.join(","));
    }

    Ok(())
}
