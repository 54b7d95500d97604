//! Vault Projection CLI
//!
//! Projects a single deposit package and prints its revenue schedule

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::path::{Path, PathBuf};

use vault_projection::format::format_amount;
use vault_projection::projection::{
    Clock, DayCount, FixedClock, PrincipalSchedule, ProjectionConfig, ProjectionEngine,
    ProjectionInput, ProjectionOutput, SystemClock,
};
use vault_projection::BaseCurrency;

#[derive(Debug, Parser)]
#[command(name = "vault_projection", version, about = "Project deposit revenue for a staking package")]
struct Args {
    /// First accruing day (YYYY-MM-DD)
    #[arg(long)]
    start_date: NaiveDate,

    /// Deposit principal
    #[arg(long)]
    amount: f64,

    /// Annual rate as a decimal (0.08 = 8%)
    #[arg(long)]
    interest_rate: f64,

    /// Projection horizon in days
    #[arg(long)]
    duration: u32,

    /// Lock-up before principal unlocks, in days
    #[arg(long, default_value_t = 0)]
    principal_delay: u32,

    #[arg(long, value_enum, default_value_t = DayCount::Fixed365)]
    day_count: DayCount,

    #[arg(long, value_enum, default_value_t = PrincipalSchedule::Cliff)]
    principal_schedule: PrincipalSchedule,

    /// JSON projection config; CLI day-count and schedule flags are ignored when set
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pretend today is this date when computing the elapsed marker
    #[arg(long)]
    today: Option<NaiveDate>,

    #[arg(long, default_value = "USDT")]
    currency: BaseCurrency,

    /// Number of rows to print
    #[arg(long, default_value_t = 14)]
    rows: usize,

    /// Write every row to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the full output as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    date: &'a str,
    principal: f64,
    interest: f64,
    total: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ProjectionConfig::from_json_path(path)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ProjectionConfig {
            day_count: args.day_count,
            principal_schedule: args.principal_schedule,
            ..Default::default()
        },
    };

    let input = ProjectionInput::new(
        args.start_date,
        args.amount,
        args.interest_rate,
        args.duration,
        args.principal_delay,
    );

    let output = match args.today {
        Some(today) => run(config, FixedClock(today), &input)?,
        None => run(config, SystemClock, &input)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_table(&output, &args);
    }

    if let Some(path) = &args.output {
        write_csv(&output, path)?;
        println!("\nFull results written to: {}", path.display());
    }

    Ok(())
}

fn run<C: Clock>(config: ProjectionConfig, clock: C, input: &ProjectionInput) -> Result<ProjectionOutput> {
    let engine = ProjectionEngine::with_clock(config, clock);
    engine.project(input).context("Projection rejected")
}

fn print_table(output: &ProjectionOutput, args: &Args) {
    println!("Vault Projection v{}", env!("CARGO_PKG_VERSION"));
    println!("======================\n");

    println!("Deposit:");
    println!("  Start:     {}", args.start_date);
    println!("  Amount:    {}", format_amount(args.amount, args.currency));
    println!("  Rate:      {:.2}%", args.interest_rate * 100.0);
    println!("  Duration:  {} days", args.duration);
    println!("  Delay:     {} days", args.principal_delay);
    println!();

    println!("{:>4} {:>12} {:>14} {:>14} {:>14}", "Day", "Date", "Principal", "Interest", "Total");
    println!("{}", "-".repeat(62));

    for i in 0..output.len().min(args.rows) {
        let marker = if i < output.elapsed_index { "*" } else { " " };
        println!(
            "{:>4} {:>12} {:>14.2} {:>14.6} {:>14.6}{}",
            i + 1,
            output.categories[i],
            output.principal_series[i],
            output.interest_series[i],
            output.total_series[i],
            marker,
        );
    }
    if output.len() > args.rows {
        println!("... ({} more days)", output.len() - args.rows);
    }

    let summary = output.summary();
    println!("\nSummary:");
    println!("  Elapsed Days:        {}", summary.elapsed_days);
    println!("  Final Principal:     {}", format_amount(summary.final_principal, args.currency));
    println!("  Final Interest:      {}", format_amount(summary.final_interest, args.currency));
    println!("  Final Total:         {}", format_amount(summary.final_total, args.currency));
    println!("  Claimable Interest:  {}", format_amount(summary.claimable_interest, args.currency));

    if let Some(annotation) = output.claim_annotation() {
        println!(
            "  Elapsed Range:       {} .. {} {}",
            annotation.from,
            annotation.to,
            annotation.label.unwrap_or_default()
        );
    }
}

fn write_csv(output: &ProjectionOutput, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Unable to create {}", path.display()))?;

    for i in 0..output.len() {
        writer.serialize(CsvRow {
            date: &output.categories[i],
            principal: output.principal_series[i],
            interest: output.interest_series[i],
            total: output.total_series[i],
        })?;
    }
    writer.flush()?;
    Ok(())
}
