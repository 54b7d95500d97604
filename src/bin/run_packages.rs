//! Run projections for every package in a CSV export
//!
//! Outputs one summary row per package

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;

use vault_projection::format::format_price_unit;
use vault_projection::package::load_packages;
use vault_projection::projection::{ProjectionConfig, ProjectionEngine, ProjectionSummary};

#[derive(Debug, Parser)]
#[command(name = "run_packages", about = "Project every package in a CSV file")]
struct Args {
    /// Package CSV (PackageID,DisplayName,StartDate,...)
    #[arg(default_value = "packages.csv")]
    input: PathBuf,

    /// Summary CSV destination
    #[arg(long, default_value = "package_projection_output.csv")]
    output: PathBuf,

    /// Optional JSON projection config
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Per-package summary row
#[derive(Debug, serde::Serialize)]
struct SummaryRow {
    package_id: u32,
    display_name: String,
    base_currency: String,
    days: usize,
    elapsed_days: usize,
    final_principal: f64,
    final_interest: f64,
    final_total: f64,
    claimable_principal: f64,
    claimable_interest: f64,
    error: Option<String>,
}

impl SummaryRow {
    fn empty(package_id: u32, display_name: String, base_currency: String) -> Self {
        Self {
            package_id,
            display_name,
            base_currency,
            days: 0,
            elapsed_days: 0,
            final_principal: 0.0,
            final_interest: 0.0,
            final_total: 0.0,
            claimable_principal: 0.0,
            claimable_interest: 0.0,
            error: None,
        }
    }

    fn fill(mut self, summary: &ProjectionSummary) -> Self {
        self.days = summary.total_days;
        self.elapsed_days = summary.elapsed_days;
        self.final_principal = summary.final_principal;
        self.final_interest = summary.final_interest;
        self.final_total = summary.final_total;
        self.claimable_principal = summary.claimable_principal;
        self.claimable_interest = summary.claimable_interest;
        self
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ProjectionConfig::from_json_path(path)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ProjectionConfig::default(),
    };

    let start = Instant::now();
    println!("Loading packages from {}...", args.input.display());
    let packages = load_packages(&args.input)
        .with_context(|| format!("Failed to load packages from {}", args.input.display()))?;
    println!("Loaded {} packages in {:?}", packages.len(), start.elapsed());

    let engine = ProjectionEngine::new(config);

    println!("Running projections...");
    let proj_start = Instant::now();

    let rows: Vec<SummaryRow> = packages
        .par_iter()
        .map(|package| {
            let row = SummaryRow::empty(
                package.package_id,
                package.display_name.clone(),
                package.base_currency.to_string(),
            );
            match engine.project_package(package) {
                Ok(output) => row.fill(&output.summary()),
                Err(e) => {
                    log::warn!("package {} rejected: {}", package.package_id, e);
                    SummaryRow { error: Some(e.to_string()), ..row }
                }
            }
        })
        .collect();

    println!("Projections complete in {:?}", proj_start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    let rejected = rows.iter().filter(|r| r.error.is_some()).count();
    let total_interest: f64 = rows.iter().map(|r| r.final_interest).sum();
    let claimable_interest: f64 = rows.iter().map(|r| r.claimable_interest).sum();

    println!("\nSummary:");
    println!("  Packages:            {}", rows.len());
    println!("  Rejected:            {}", rejected);
    println!("  Projected Interest:  {}", format_price_unit(total_interest));
    println!("  Claimable Interest:  {}", format_price_unit(claimable_interest));
    println!("\nResults written to: {}", args.output.display());

    Ok(())
}
