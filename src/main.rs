//! Sales Aggregator - declarative sales analytics over order exports
//!
//! Loads JSON order exports, de-duplicates re-exported orders and reports
//! order counts per status, gross revenue and products sold.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, unreadable input, config, etc.)
//!   2 - Some inputs failed to load and --fail-on-invalid was set

use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use sales_aggregator::cli::{Args, OutputFormat};
use sales_aggregator::config::{Config, CONFIG_FILE_NAME};
use sales_aggregator::domain::{DomainError, Order};
use sales_aggregator::ingest::{self, LoadedInput};
use sales_aggregator::models::{ReportMetadata, SalesReport};
use sales_aggregator::{analysis, report, scanner, source};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let config = match load_config(&args) {
        Ok(mut config) => {
            config.merge_with_args(&args);
            config
        }
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&args, &config)?;

    info!("sales-aggregator v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Aggregation failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .salesagg.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    Ok(())
}

/// Initialize logging from the flags and the configured verbosity.
fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level(config.general.verbose))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Run the complete aggregation workflow. Returns the exit code.
async fn run(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    let scan_config = scanner::ScanConfig::from(&config.scanner);

    if args.dry_run {
        return handle_dry_run(args.input.as_deref(), scan_config);
    }

    // Step 1: Load orders
    let inputs = match (&args.url, &args.input) {
        (Some(url), _) => {
            println!("🌐 Fetching export: {}", url);
            vec![source::load_remote(url, config.source.timeout_seconds).await]
        }
        (None, Some(input)) => {
            println!("📥 Loading orders from: {}", input.display());
            load_local(input.clone(), scan_config, &config, args.quiet).await?
        }
        (None, None) => return Err(anyhow::anyhow!("Either --input or --url is required")),
    };

    let orders = ingest::collect_orders(&inputs);
    let files_failed = inputs.iter().filter(|i| i.file.is_failed()).count();
    info!(
        "Loaded {} orders from {} inputs ({} failed)",
        orders.len(),
        inputs.len(),
        files_failed
    );

    if orders.is_empty() {
        warn!("No orders were loaded");
    }

    // Step 2: Aggregate
    println!("\n📊 Aggregating {} orders...", orders.len());

    let metadata = ReportMetadata {
        source: args.source_label(),
        generated_at: Utc::now(),
        files_loaded: inputs.len() - files_failed,
        files_failed,
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };

    let input_files = inputs.iter().map(|i| i.file.clone()).collect();
    let mut sales_report =
        SalesReport::build(metadata, &orders, input_files, config.report.top_products)
            .context("Failed to aggregate orders")?;

    if !config.report.include_products {
        sales_report.products.clear();
    }
    if !config.report.include_failures {
        sales_report.inputs.retain(|i| !i.is_failed());
    }

    // Step 3: Write the report
    let output_path = PathBuf::from(&config.general.output);
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&sales_report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&sales_report),
    };

    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    print_summary(&args, &orders, &sales_report);
    println!(
        "\n✅ Report saved to: {}",
        output_path.display()
    );

    if args.fail_on_invalid && files_failed > 0 {
        eprintln!(
            "\n⛔ {} input(s) failed to load. Failing (exit code 2).",
            files_failed
        );
        return Ok(2);
    }

    Ok(0)
}

/// Scan a local path and load every matching file.
async fn load_local(
    input: PathBuf,
    scan_config: scanner::ScanConfig,
    config: &Config,
    quiet: bool,
) -> Result<Vec<LoadedInput>> {
    let file_scanner = scanner::FileScanner::new(input, scan_config);
    let files = file_scanner.scan()?;
    info!("Found {} order files", files.len());

    let progress = if quiet || files.is_empty() {
        None
    } else {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
                .context("Invalid progress template")?
                .progress_chars("#>-"),
        );
        Some(pb)
    };

    Ok(ingest::load_files(files, config.general.concurrency, progress).await)
}

/// Print the console summary.
fn print_summary(args: &Args, orders: &[Order], report: &SalesReport) {
    let summary = &report.summary;

    println!("\n📊 Sales Summary:");
    println!(
        "   Inputs: {} loaded, {} failed",
        report.metadata.files_loaded, report.metadata.files_failed
    );
    println!(
        "   Orders: {} read, {} distinct ({} duplicates dropped)",
        summary.orders_read, summary.distinct_orders, summary.duplicates_dropped
    );

    if let Some(status) = args.status {
        println!(
            "   {} orders: {}",
            status,
            analysis::count_orders_by_status(orders, status)
        );
    }

    match analysis::calculate_total_revenue(orders) {
        Ok(Some(total)) => println!("   Gross revenue: {} {}", total, total.currency()),
        Ok(None) => println!("   Gross revenue: none"),
        Err(DomainError::CurrencyMismatch { .. }) => {
            println!("   Gross revenue (mixed currencies):");
            for (currency, amount) in &summary.revenue {
                println!("     - {}: {}", currency, amount);
            }
        }
        Err(e) => warn!("Could not total revenue: {}", e),
    }

    println!("   Distinct products: {}", summary.distinct_products);
}

/// Handle --dry-run: scan files, print what would be loaded, exit.
fn handle_dry_run(input: Option<&Path>, scan_config: scanner::ScanConfig) -> Result<i32> {
    let input = input.context("--dry-run needs --input")?;
    println!("\n🔍 Dry run: scanning {} ...\n", input.display());

    let file_scanner = scanner::FileScanner::new(input.to_path_buf(), scan_config);
    let files = file_scanner.scan()?;

    if files.is_empty() {
        println!("   No matching order files found.");
    } else {
        println!("   Found {} files that would be loaded:\n", files.len());
        for file in &files {
            println!("     📄 {} ({} bytes)", file.path, file.size);
        }
    }

    println!("\n✅ Dry run complete. No files were parsed.");
    Ok(0)
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems go straight to stderr.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Failed to load {}: {:#}", CONFIG_FILE_NAME, e);
            Ok(Config::default())
        }
    }
}
