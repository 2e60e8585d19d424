//! CLI binary for the coordinates export
//!
//! `coords_export <SURVEY>` writes `<SURVEY>-coordinates_filtered.csv`.

use anyhow::{Context, Result};
use clap::{Arg, Command};
use coords_export::{output_path, CsvSink, ExportConfig, PgCoordinateSource, SurveyExport};
use env_logger::Env;

fn long_version() -> String {
    format!(
        "{} ({} built {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
        option_env!("VERGEN_BUILD_DATE").unwrap_or("unknown"),
    )
}

fn build_command() -> Command {
    Command::new("coords_export")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version())
        .about("Export the deduplicated GPS coordinates of a survey to CSV.")
        .after_help(
            "Connection and tuning come from the environment (a .env file is read if present):\n  \
             DATABASE_URL or PGHOST/PGPORT/PGUSER/PGPASSWORD/PGDATABASE\n  \
             COORDS_BATCH_SIZE (default 500000)\n  \
             COORDS_TIMESTAMP_CUTOFF (default '2017-01-01 00:00:00', 'none' to disable)\n  \
             COORDS_OUTPUT_DIR (default .)\n  \
             RUST_LOG (default info)",
        )
        .arg(
            Arg::new("survey")
                .help("Name of the survey to export")
                .required(true)
                .num_args(1)
                .index(1),
        )
}

fn main() -> Result<()> {
    let matches = build_command().get_matches();
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let survey_name = matches
        .get_one::<String>("survey")
        .context("Inadequate number of commandline arguments, please provide a survey name")?;

    let config = ExportConfig::from_env().context("Invalid configuration")?;
    let source = PgCoordinateSource::connect(&config).context("Could not connect to database")?;

    let export = SurveyExport::prepare(&source, survey_name, &config)
        .with_context(|| format!("Error fetching survey {survey_name}"))?;

    let csv_path = output_path(&config.output_dir, survey_name);
    let mut sink = CsvSink::create(&csv_path)
        .with_context(|| format!("Cannot create file {}", csv_path.display()))?;

    let report = export
        .run(&mut sink)
        .with_context(|| format!("Export of {survey_name} failed"))?;

    println!(
        "Exported {} coordinates to: {}",
        report.stats.processed,
        csv_path.display()
    );
    println!("{}", report.stats.progress_line());
    println!("Coordinates export finished.");

    Ok(())
}
