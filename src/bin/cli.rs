//! NBA Edge CLI - score odds files and pick the best bets

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use nba_edge::backtesting::metrics::{analyze_by_market, analyze_by_odds_range, calculate_sharpe_ratio};
use nba_edge::backtesting::{BacktestConfig, BacktestSimulator};
use nba_edge::core::{
    american_to_decimal, calculate_ev, implied_edge, kelly_criterion, odds_to_probability,
    probability_to_odds, DEFAULT_KELLY_CAP,
};
use nba_edge::pipeline::attach_stakes;
use nba_edge::report::{to_records, write_report, ReportFormat};
use nba_edge::{Pick, PickTable, ScoringConfig, ScoringPipeline};

#[derive(Parser)]
#[command(name = "nba-edge")]
#[command(author, version, about = "NBA betting edge calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert between American odds and implied probability
    Convert {
        /// American odds (e.g. -150 or 130)
        #[arg(long, allow_negative_numbers = true, conflicts_with = "probability")]
        odds: Option<i32>,

        /// Win probability in (0, 1)
        #[arg(long, required_unless_present = "odds")]
        probability: Option<f64>,
    },

    /// Expected value and Kelly fraction for a single bet
    Ev {
        /// Model win probability in [0, 1]
        #[arg(short, long)]
        probability: f64,

        /// Market American odds
        #[arg(short, long, allow_negative_numbers = true)]
        odds: i32,

        /// Kelly fraction cap
        #[arg(long, default_value_t = DEFAULT_KELLY_CAP)]
        cap: f64,
    },

    /// Score an odds CSV and keep the best pick per bet
    Score {
        /// Input CSV with odds and model probabilities
        #[arg(short, long)]
        input: PathBuf,

        /// Write the ranked picks to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (default: from the output file extension)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Drop picks with EV below this
        #[arg(long, allow_negative_numbers = true)]
        min_ev: Option<f64>,

        /// Kelly fraction cap
        #[arg(long)]
        kelly_cap: Option<f64>,

        /// Bankroll for stake recommendations
        #[arg(long)]
        bankroll: Option<f64>,

        /// Number of picks to display
        #[arg(long, default_value = "20")]
        top: usize,
    },

    /// Settle selected picks against known outcomes
    Backtest {
        /// Input CSV with an `outcome` or `won` column
        #[arg(short, long)]
        input: PathBuf,

        /// EV threshold for betting
        #[arg(long, allow_negative_numbers = true)]
        min_ev: Option<f64>,

        /// Flat stake per bet
        #[arg(long, default_value = "100")]
        stake: f64,

        /// Stake with capped Kelly instead of a flat amount
        #[arg(long)]
        kelly: bool,

        /// Starting bankroll for Kelly staking (default: config, then 10000)
        #[arg(long)]
        bankroll: Option<f64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Convert { odds, probability } => run_convert(odds, probability),
        Commands::Ev {
            probability,
            odds,
            cap,
        } => run_ev(probability, odds, cap),
        Commands::Score {
            input,
            output,
            format,
            min_ev,
            kelly_cap,
            bankroll,
            top,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(min_ev) = min_ev {
                config.min_ev = min_ev;
            }
            if let Some(cap) = kelly_cap {
                config.kelly_cap = cap;
            }
            if bankroll.is_some() {
                config.bankroll = bankroll;
            }
            config.validate().context("Invalid configuration")?;

            run_score(&config, &input, output.as_deref(), format, top)
        }
        Commands::Backtest {
            input,
            min_ev,
            stake,
            kelly,
            bankroll,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(min_ev) = min_ev {
                config.min_ev = min_ev;
            }
            if bankroll.is_some() {
                config.bankroll = bankroll;
            }
            config.validate().context("Invalid configuration")?;

            let backtest = BacktestConfig {
                stake,
                use_kelly: kelly,
                ..BacktestConfig::from_scoring(&config)
            };
            run_backtest(&config, backtest, &input)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ScoringConfig> {
    match path {
        Some(p) => ScoringConfig::load(Some(p))
            .with_context(|| format!("Failed to load config from {:?}", p)),
        None => ScoringConfig::load(None).context("Invalid configuration from environment"),
    }
}

fn run_convert(odds: Option<i32>, probability: Option<f64>) -> Result<()> {
    if let Some(odds) = odds {
        let p = odds_to_probability(odds)?;
        println!("{} {:+}", "American odds:".cyan(), odds);
        println!("Implied probability: {:.2}%", p * 100.0);
        println!("Decimal odds:        {:.3}", american_to_decimal(odds)?);
    } else if let Some(p) = probability {
        let odds = probability_to_odds(p)?;
        println!("{} {:.2}%", "Probability:".cyan(), p * 100.0);
        println!("American odds: {:+}", odds);
    }
    Ok(())
}

fn run_ev(probability: f64, odds: i32, cap: f64) -> Result<()> {
    let ev = calculate_ev(probability, odds)?;
    let edge = implied_edge(probability, odds)?;
    let kelly = kelly_criterion(probability, odds, cap)?;

    println!("Model probability:   {:.2}%", probability * 100.0);
    println!("Implied probability: {:.2}%", odds_to_probability(odds)? * 100.0);
    println!("Edge:                {:+.2}%", edge * 100.0);

    let ev_str = format!("{:+.4}", ev);
    let ev_str = if ev > 0.0 { ev_str.green() } else { ev_str.red() };
    println!("Expected value:      {} per unit", ev_str);
    println!("Kelly fraction:      {:.2}% (cap {:.0}%)", kelly * 100.0, cap * 100.0);

    Ok(())
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb
}

fn load_table(input: &Path) -> Result<PickTable> {
    let pb = spinner("Loading picks...");
    let table = PickTable::load(input);
    pb.finish_and_clear();

    let table = table.with_context(|| format!("Failed to load picks from {:?}", input))?;
    info!(rows = table.len(), games = table.games().len(), "Loaded picks");
    Ok(table)
}

fn select_picks(config: &ScoringConfig, table: PickTable, input: &Path) -> Result<Vec<Pick>> {
    let mut pipeline = ScoringPipeline::from_config(config)?;
    let output = pipeline
        .run(table.into_picks())
        .with_context(|| format!("Failed to score picks from {:?}", input))?;

    Ok(output.picks)
}

fn run_score(
    config: &ScoringConfig,
    input: &Path,
    output: Option<&Path>,
    format: Option<OutputFormat>,
    top: usize,
) -> Result<()> {
    let table = load_table(input)?;
    let picks = select_picks(config, table, input)?;

    let stakes = match config.kelly_calculator() {
        Some(kelly) => attach_stakes(&picks, &kelly)?,
        None => Vec::new(),
    };

    print_picks(&picks, &stakes, top);

    if let Some(path) = output {
        let format = match format {
            Some(OutputFormat::Csv) => ReportFormat::Csv,
            Some(OutputFormat::Json) => ReportFormat::Json,
            None => ReportFormat::from_path(path),
        };
        let records = to_records(&picks, &stakes)?;
        write_report(records, config, path, format)
            .with_context(|| format!("Failed to write report to {:?}", path))?;
        println!("Saved {} picks to {:?}", picks.len(), path);
    }

    Ok(())
}

fn print_picks(picks: &[Pick], stakes: &[f64], top: usize) {
    if picks.is_empty() {
        println!("{}", "No picks above the EV threshold.".yellow());
        return;
    }

    println!("{}", "Best picks:".yellow().bold());
    println!(
        "{:>4} {:<12} {:<36} {:>6} {:>7} {:>7} {:>8} {:>7} {:>9}",
        "#", "Game", "Pick", "Odds", "Model", "Implied", "EV", "Kelly", "Stake"
    );
    println!("{}", "-".repeat(104));

    for (i, pick) in picks.iter().take(top).enumerate() {
        let implied = odds_to_probability(pick.market_odds).unwrap_or(0.0);
        let stake = stakes
            .get(i)
            .map(|s| format!("{:.0}", s))
            .unwrap_or_else(|| "-".to_string());
        let ev = format!("{:+.4}", pick.expected_value);
        let ev = if pick.expected_value > 0.0 {
            ev.green()
        } else {
            ev.normal()
        };

        println!(
            "{:>4} {:<12} {:<36} {:>+6} {:>6.1}% {:>6.1}% {:>8} {:>6.1}% {:>9}",
            i + 1,
            truncate(&pick.game_id, 12),
            truncate(&pick.label(), 36),
            pick.market_odds,
            pick.model_probability * 100.0,
            implied * 100.0,
            ev,
            pick.kelly_fraction * 100.0,
            stake
        );
    }

    if picks.len() > top {
        println!("{}", format!("... {} more", picks.len() - top).dimmed());
    }
    println!();
}

fn run_backtest(config: &ScoringConfig, backtest: BacktestConfig, input: &Path) -> Result<()> {
    let table = load_table(input)?;
    if !table.has_outcomes() {
        warn!("No settled outcomes in {:?}; add an `outcome` or `won` column", input);
    }
    let picks = select_picks(config, table, input)?;

    println!("{}", "Running backtest...".green());
    println!("EV threshold: {:.3}", backtest.ev_threshold);
    if backtest.use_kelly {
        println!("Staking: capped Kelly, bankroll {:.0}", backtest.bankroll);
    } else {
        println!("Staking: flat {:.0}", backtest.stake);
    }

    let mut simulator = BacktestSimulator::new(backtest);
    let result = simulator.run(&picks).context("Backtest failed")?;

    println!("\n{}", "=".repeat(60));
    println!("BACKTEST RESULTS");
    println!("{}", "=".repeat(60));
    println!("Selected picks: {}", result.total_picks);
    println!("Unsettled picks: {}", result.unsettled);
    println!("Total bets: {}", result.bets.len());
    println!("{}", "-".repeat(60));
    println!("Total stake: {:.2}", result.total_stake);
    println!("Total payout: {:.2}", result.total_payout);
    println!("Total profit: {:.2}", result.total_profit());
    println!("ROI: {:.1}%", result.roi() * 100.0);

    if let Some(ref metrics) = result.metrics {
        println!("{}", "-".repeat(60));
        println!("Hit rate: {:.1}%", metrics.hit_rate * 100.0);
        println!("Average EV: {:.4}", metrics.avg_ev);
        println!("Profit factor: {:.2}", metrics.profit_factor);
        println!("Max drawdown: {:.2}", metrics.max_drawdown);
        println!("Sharpe: {:.2}", calculate_sharpe_ratio(&result.bets, 0.0));
    }
    if let Some(bankroll) = simulator.bankroll() {
        println!("Final bankroll: {:.2}", bankroll);
    }
    println!("{}", "=".repeat(60));

    if result.bets.is_empty() {
        return Ok(());
    }

    for (title, analysis) in [
        ("Analysis by Market:", analyze_by_market(&result.bets)),
        ("Analysis by Odds Range:", analyze_by_odds_range(&result.bets)),
    ] {
        println!("\n{}", title.yellow().bold());
        println!(
            "{:<24} {:>6} {:>6} {:>9} {:>10} {:>8}",
            "Key", "Bets", "Wins", "Hit Rate", "Profit", "ROI"
        );
        println!("{}", "-".repeat(68));
        for a in &analysis {
            println!(
                "{:<24} {:>6} {:>6} {:>8.1}% {:>10.2} {:>7.1}%",
                a.key,
                a.bets,
                a.wins,
                a.hit_rate * 100.0,
                a.profit,
                a.roi * 100.0
            );
        }
    }

    Ok(())
}

/// Truncate text to fit display width
fn truncate(text: &str, max_len: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_len {
        text.to_string()
    } else {
        chars[..max_len - 1].iter().collect::<String>() + "…"
    }
}
