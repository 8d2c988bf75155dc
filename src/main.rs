use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use ecom_dashboard::config::DashboardConfig;
use ecom_dashboard::filter::{validate_top_n, FilterSpec, TOP_N_MAX, TOP_N_MIN};
use ecom_dashboard::format::format_count;
use ecom_dashboard::report::{render_json, render_text, DashboardView};
use ecom_dashboard::{apply, load_cached, LoadOptions};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ecom-dashboard")]
#[command(about = "E-Commerce Revenue & Profit Dashboard")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter the transactions and print KPIs, trend and rankings
    Report {
        /// Source spreadsheet or CSV (or set DASHBOARD_SOURCE)
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Worksheet holding the transactions (or set DASHBOARD_SHEET)
        #[arg(long)]
        sheet: Option<String>,

        /// First invoice date, inclusive (default: earliest in source)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last invoice date, inclusive (default: latest in source)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Country to include; repeat for several (default: 3 most frequent)
        #[arg(short, long = "country")]
        countries: Vec<String>,

        /// Do not restrict by country
        #[arg(long, conflicts_with = "countries")]
        all_countries: bool,

        /// Rows in the product and customer rankings (5-20)
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        /// Rows in the raw data preview
        #[arg(long)]
        preview_rows: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print filter choices offered for the source: date bounds and countries
    Options {
        /// Source spreadsheet or CSV (or set DASHBOARD_SOURCE)
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Worksheet holding the transactions (or set DASHBOARD_SHEET)
        #[arg(long)]
        sheet: Option<String>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = DashboardConfig::from_env().context("Invalid dashboard configuration")?;

    match args.command {
        Commands::Report {
            source,
            sheet,
            from,
            to,
            countries,
            all_countries,
            top_n,
            preview_rows,
            format,
        } => {
            let config = DashboardConfig {
                source: source.unwrap_or(config.source),
                sheet: sheet.unwrap_or(config.sheet),
                top_n: top_n.unwrap_or(config.top_n),
                preview_rows: preview_rows.unwrap_or(config.preview_rows),
            };
            run_report(config, from, to, countries, all_countries, format)
        }
        Commands::Options { source, sheet } => {
            let config = DashboardConfig {
                source: source.unwrap_or(config.source),
                sheet: sheet.unwrap_or(config.sheet),
                ..config
            };
            print_options(config)
        }
    }
}

fn run_report(
    config: DashboardConfig,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    countries: Vec<String>,
    all_countries: bool,
    format: OutputFormat,
) -> Result<()> {
    let top_n = validate_top_n(config.top_n)?;

    let table = load_cached(&config.source, &LoadOptions::with_sheet(config.sheet.clone()))
        .with_context(|| format!("Failed to load {}", config.source.display()))?;

    let defaults = FilterSpec::defaults_for(&table)?;
    let mut spec = FilterSpec::new(
        from.unwrap_or(defaults.date_start),
        to.unwrap_or(defaults.date_end),
    );
    spec = if all_countries {
        spec
    } else if countries.is_empty() {
        spec.with_countries(defaults.countries)
    } else {
        spec.with_countries(countries)
    };

    info!(
        "Applying filter {} to {} over {} countries, top {}",
        spec.date_start,
        spec.date_end,
        spec.countries.len(),
        top_n
    );
    let result = apply(&table, &spec, top_n)?;

    let view = DashboardView::build(
        config.source.display().to_string(),
        &spec,
        top_n,
        &result,
        config.preview_rows,
    )?;

    match format {
        OutputFormat::Text => print!("{}", render_text(&view)),
        OutputFormat::Json => println!("{}", render_json(&view)?),
    }
    Ok(())
}

fn print_options(config: DashboardConfig) -> Result<()> {
    let table = load_cached(&config.source, &LoadOptions::with_sheet(config.sheet.clone()))
        .with_context(|| format!("Failed to load {}", config.source.display()))?;

    let defaults = FilterSpec::defaults_for(&table)?;

    println!("\n{}", "=".repeat(80));
    println!(" FILTER OPTIONS: {}", config.source.display());
    println!("{}", "=".repeat(80));
    println!(" Rows:       {}", format_count(table.height() as u64));
    match table.date_bounds()? {
        Some((first, last)) => println!(" Date range: {} to {}", first, last),
        None => println!(" Date range: no parseable invoice dates"),
    }
    println!(" Top N:      {}-{} (default {})", TOP_N_MIN, TOP_N_MAX, config.top_n);
    println!(
        " Default countries: {}",
        defaults.countries.iter().cloned().collect::<Vec<_>>().join(", ")
    );
    println!("\n Countries (top listed first):");
    for (country, rows) in table.countries_by_frequency()? {
        println!("   {:<28} {:>10}", country, format_count(rows as u64));
    }
    Ok(())
}
