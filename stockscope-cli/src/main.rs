//! StockScope CLI: technical analysis for one symbol at a time.
//!
//! Commands:
//! - `analyze`: fetch daily bars, compute indicators, classify, render the chart
//! - `markets`: list supported markets and how symbols are routed

mod logging;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use stockscope_core::data::{AlphaVantageFeed, JsonFileFeed, QuoteFeed, SyntheticFeed};
use stockscope_core::domain::Market;
use stockscope_runner::{run_analysis, AnalysisConfig, AnalysisReport, AnalysisRequest, ArtifactManager};

const API_KEY_ENV: &str = "ALPHAVANTAGE_API_KEY";

#[derive(Parser)]
#[command(
    name = "stockscope",
    about = "StockScope CLI: moving averages, Fibonacci levels and a BUY/SELL/HOLD call"
)]
struct Cli {
    /// Debug-level logging (RUST_LOG overrides).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one symbol and write chart, report and indicator table.
    Analyze {
        /// Ticker symbol (e.g., RELIANCE, IBM).
        #[arg(long)]
        symbol: String,

        /// Market: BSE, NSE, NASDAQ or NYSE.
        #[arg(long)]
        market: Market,

        /// Read a saved TIME_SERIES_DAILY response instead of calling the API.
        #[arg(long, conflicts_with = "synthetic")]
        feed_file: Option<PathBuf>,

        /// Use a seeded synthetic random walk instead of calling the API.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Seed for --synthetic.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Weekday bars for --synthetic.
        #[arg(long, default_value_t = 260)]
        days: usize,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory (overrides the config).
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Chart path (defaults to a request-unique path under the output directory).
        #[arg(long)]
        destination: Option<PathBuf>,
    },
    /// List supported markets.
    Markets,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    match cli.command {
        Commands::Analyze {
            symbol,
            market,
            feed_file,
            synthetic,
            seed,
            days,
            config,
            output_dir,
            destination,
        } => run_analyze(AnalyzeArgs {
            symbol,
            market,
            feed_file,
            synthetic,
            seed,
            days,
            config,
            output_dir,
            destination,
        }),
        Commands::Markets => {
            run_markets();
            Ok(())
        }
    }
}

struct AnalyzeArgs {
    symbol: String,
    market: Market,
    feed_file: Option<PathBuf>,
    synthetic: bool,
    seed: u64,
    days: usize,
    config: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    destination: Option<PathBuf>,
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    if args.symbol.trim().is_empty() {
        bail!("--symbol must not be empty");
    }

    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }

    let feed = select_feed(&args, &config)?;
    let mut request = AnalysisRequest::new(args.symbol.trim(), args.market);
    if let Some(path) = &args.destination {
        request = request.with_destination(path);
    }

    let analysis = run_analysis(feed.as_ref(), &request, &config)
        .with_context(|| format!("analyzing {} on {}", request.symbol, request.market))?;

    let paths = ArtifactManager::beside_chart(&analysis)?.save(&analysis)?;
    info!(dir = %paths.report_json.display(), "artifacts saved");

    print_summary(&analysis.report);
    println!();
    println!("Chart:      {}", paths.chart.display());
    println!("Report:     {}", paths.report_json.display());
    println!("Indicators: {}", paths.indicators_csv.display());
    Ok(())
}

fn select_feed(args: &AnalyzeArgs, config: &AnalysisConfig) -> Result<Box<dyn QuoteFeed>> {
    if let Some(path) = &args.feed_file {
        return Ok(Box::new(JsonFileFeed::new(path)));
    }
    if args.synthetic {
        if args.days == 0 {
            bail!("--days must be at least 1");
        }
        let end = chrono::Local::now().date_naive();
        return Ok(Box::new(SyntheticFeed::new(args.seed, args.days, end)));
    }

    let api_key = std::env::var(API_KEY_ENV).with_context(|| {
        format!("{API_KEY_ENV} is not set (use --feed-file or --synthetic to run offline)")
    })?;
    let feed = AlphaVantageFeed::new(config.feed.alpha_vantage(api_key))?;
    Ok(Box::new(feed))
}

fn print_summary(report: &AnalysisReport) {
    println!("=== {} ({}) ===", report.symbol, report.market);
    println!("Feed symbol:  {}", report.feed_symbol);
    println!("Bars:         {} ({})", report.bar_count, report.time_zone);
    if let (Some(first), Some(last)) = (&report.first_key, &report.last_key) {
        println!("Range:        {first} to {last}");
    }
    if let Some(close) = report.latest_close {
        println!("Latest close: {close:.2}");
    }
    println!("Signal:       {} ({:?})", report.signal, report.signal_basis);

    println!();
    println!("Moving averages:");
    for (window, value) in &report.moving_averages {
        match value {
            Some(v) => println!("  MA-{window:<4} {v:>12.2}"),
            None => println!("  MA-{window:<4} {:>12}", "n/a"),
        }
    }

    println!();
    println!(
        "Fibonacci retracement (high {:.2}, low {:.2}, {} bars):",
        report.retracement.max, report.retracement.min, report.retracement.window_len
    );
    for level in report.retracement.iter() {
        println!("  {:>6.1}% {:>12.2}", level.ratio * 100.0, level.price);
    }
}

fn run_markets() {
    println!("{:<8} {:<14} {:<18}", "Market", "Feed symbol", "Home time zone");
    println!("{}", "-".repeat(42));
    for spec in Market::all() {
        println!(
            "{:<8} {:<14} {:<18}",
            spec.name,
            spec.market.feed_symbol("TICKER"),
            spec.home_time_zone
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_analyze_with_market() {
        let cli = Cli::try_parse_from([
            "stockscope", "analyze", "--symbol", "RELIANCE", "--market", "bse", "--synthetic",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze {
                market, synthetic, ..
            } => {
                assert_eq!(market, Market::Bse);
                assert!(synthetic);
            }
            Commands::Markets => panic!("expected analyze"),
        }
    }

    #[test]
    fn rejects_unknown_market() {
        let result = Cli::try_parse_from([
            "stockscope", "analyze", "--symbol", "X", "--market", "LSE",
        ]);
        assert!(result.is_err());
    }

    fn synthetic_args(output_dir: Option<PathBuf>) -> AnalyzeArgs {
        AnalyzeArgs {
            symbol: "IBM".into(),
            market: Market::Nyse,
            feed_file: None,
            synthetic: true,
            seed: 7,
            days: 30,
            config: None,
            output_dir,
            destination: None,
        }
    }

    #[test]
    fn analyze_writes_into_output_dir_override() {
        let dir = tempfile::tempdir().unwrap();
        run_analyze(synthetic_args(Some(dir.path().to_path_buf()))).unwrap();

        let runs: Vec<PathBuf> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(runs.len(), 1);
        assert!(runs[0].join("chart.png").exists());
        assert!(runs[0].join("chart.report.json").exists());
        assert!(runs[0].join("chart.indicators.csv").exists());
    }

    #[test]
    fn analyze_rejects_zero_synthetic_days() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = synthetic_args(Some(dir.path().to_path_buf()));
        args.days = 0;
        assert!(run_analyze(args).is_err());
    }

    #[test]
    fn feed_file_conflicts_with_synthetic() {
        let result = Cli::try_parse_from([
            "stockscope", "analyze", "--symbol", "X", "--market", "NYSE", "--synthetic",
            "--feed-file", "x.json",
        ]);
        assert!(result.is_err());
    }
}
