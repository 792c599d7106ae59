use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

mod aggregate;
mod db;
mod models;
mod report;

use models::{LocationSummary, WaiterSummary};

#[derive(Parser)]
#[command(name = "shift-sales-report")]
#[command(about = "Waiter and location sales comparison reports for a restaurant chain", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import shift records from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Print headline numbers for a date range
    Summary {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        location: Option<String>,
    },
    /// Generate a report file
    Report {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        location: Option<String>,
        #[arg(long, value_enum, default_value_t = View::Both)]
        view: View,
        #[arg(long, value_enum, default_value_t = Format::Markdown)]
        format: Format,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, PartialEq, ValueEnum)]
enum View {
    Waiter,
    Location,
    Both,
}

#[derive(Clone, Copy, PartialEq, ValueEnum)]
enum Format {
    Markdown,
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} shift records from {}.", csv.display());
        }
        Commands::Summary {
            start,
            end,
            location,
        } => {
            let (waiters, locations) =
                run_aggregation(&pool, start, end, location.as_deref()).await?;
            print_summary(start, end, &waiters, &locations);
        }
        Commands::Report {
            start,
            end,
            location,
            view,
            format,
            out,
        } => {
            let (waiters, locations) =
                run_aggregation(&pool, start, end, location.as_deref()).await?;
            let waiters = (view != View::Location).then_some(waiters.as_slice());
            let locations = (view != View::Waiter).then_some(locations.as_slice());

            match format {
                Format::Markdown => {
                    let content =
                        report::build_report(location.as_deref(), start, end, waiters, locations);
                    std::fs::write(&out, content)?;
                    println!("Report written to {}.", out.display());
                }
                Format::Json => {
                    let content = report::render_json(waiters, locations)?;
                    std::fs::write(&out, content)?;
                    println!("Report written to {}.", out.display());
                }
                Format::Csv => {
                    if let Some(waiters) = waiters {
                        let path = if locations.is_some() {
                            sibling_path(&out, "_waiters.csv")
                        } else {
                            out.clone()
                        };
                        std::fs::write(&path, report::waiter_csv(waiters)?)?;
                        println!("Report written to {}.", path.display());
                    }
                    if let Some(locations) = locations {
                        let path = if waiters.is_some() {
                            sibling_path(&out, "_locations.csv")
                        } else {
                            out.clone()
                        };
                        std::fs::write(&path, report::location_csv(locations)?)?;
                        println!("Report written to {}.", path.display());
                    }
                }
            }
        }
    }

    Ok(())
}

/// Validates the requested range, fetches both periods concurrently, and
/// runs the aggregation.
async fn run_aggregation(
    pool: &PgPool,
    start: NaiveDate,
    end: NaiveDate,
    location: Option<&str>,
) -> anyhow::Result<(Vec<WaiterSummary>, Vec<LocationSummary>)> {
    aggregate::validate_range(start, end)?;
    let (previous_start, previous_end) = aggregate::comparison_period(start, end);

    let (current, previous) = tokio::try_join!(
        db::fetch_records(pool, start, end, location),
        db::fetch_records(pool, previous_start, previous_end, location),
    )?;

    Ok(aggregate::aggregate(&current, &previous, start, end))
}

fn print_summary(
    start: NaiveDate,
    end: NaiveDate,
    waiters: &[WaiterSummary],
    locations: &[LocationSummary],
) {
    if waiters.is_empty() && locations.is_empty() {
        println!("No shift records found between {start} and {end}.");
        return;
    }

    println!("Location sales, {start} to {end}:");
    let mut by_revenue = locations.to_vec();
    by_revenue.sort_by(|a, b| {
        b.current_revenue
            .partial_cmp(&a.current_revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for summary in by_revenue.iter() {
        println!(
            "- {} ({}): {} orders ({}), revenue {:.2} ({})",
            summary.location_name,
            summary.location_id,
            summary.current_orders_count,
            report::format_percent(summary.delta_orders_percent),
            summary.current_revenue,
            report::format_percent(summary.delta_revenue_percent),
        );
    }

    println!("Top waiters by hours:");
    let mut by_hours = waiters.to_vec();
    by_hours.sort_by(|a, b| {
        b.current_hours
            .partial_cmp(&a.current_hours)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for summary in by_hours.iter().take(10) {
        println!(
            "- {} ({}) {:.1}h ({}), avg service feedback {:.2}",
            summary.waiter_name,
            summary.waiter_email,
            summary.current_hours,
            report::format_percent(summary.delta_hours),
            summary.current_avg_service_feedback,
        );
    }
}

fn sibling_path(out: &Path, suffix: &str) -> PathBuf {
    let stem = out
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("report");
    out.with_file_name(format!("{stem}{suffix}"))
}
