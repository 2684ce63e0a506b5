use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use intake_guard::{analyze_value, mask_pii, IntakeReport, PatternConfig, PatternSet};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "intake-guard",
    about = "Score risk, themes and emotions in pre-counseling intake conversations",
    version
)]
struct Cli {
    /// Session files to analyze, one utterance per line (reads stdin if none provided)
    files: Vec<PathBuf>,

    /// Treat input as a JSON array of utterance strings
    #[arg(long)]
    json: bool,

    /// Pattern tables to use instead of the built-in ones
    #[arg(long, value_name = "FILE")]
    patterns: Option<PathBuf>,

    /// Print the built-in pattern tables as TOML and exit
    #[arg(long)]
    init_patterns: bool,

    /// Mask phone numbers, e-mail addresses and names before analysis
    #[arg(long)]
    mask: bool,

    /// Emit the full intake report instead of the raw analysis
    #[arg(long)]
    report: bool,

    /// Blend an external classifier's negative ratio into the report scores
    #[arg(long, value_name = "RATIO", requires = "report")]
    neg_ratio: Option<f64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();
    // Only fails if a subscriber is already installed.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run(cli: &Cli) -> Result<()> {
    if cli.init_patterns {
        print!("{}", PatternConfig::default_toml()?);
        return Ok(());
    }

    let patterns = match &cli.patterns {
        Some(path) => PatternConfig::load(path)?
            .compile()
            .with_context(|| format!("Failed to compile patterns in {}", path.display()))?,
        None => PatternSet::builtin().clone(),
    };

    if cli.files.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read stdin")?;
        emit(cli, &patterns, &input)?;
    } else {
        for path in &cli.files {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            debug!("Analyzing {}", path.display());
            emit(cli, &patterns, &text)
                .with_context(|| format!("Failed to analyze {}", path.display()))?;
        }
    }
    Ok(())
}

fn emit(cli: &Cli, patterns: &PatternSet, input: &str) -> Result<()> {
    let value: serde_json::Value = if cli.json {
        serde_json::from_str(input).context("Input is not valid JSON")?
    } else {
        serde_json::Value::Array(
            input
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(serde_json::Value::from)
                .collect(),
        )
    };
    let value = if cli.mask { mask_entries(value) } else { value };

    let analysis = analyze_value(patterns, &value)?;
    let json = if cli.report {
        let mut report = IntakeReport::from_analysis(&analysis);
        if let Some(ratio) = cli.neg_ratio {
            report = report.with_fusion(ratio)?;
        }
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string_pretty(&analysis)?
    };
    println!("{json}");
    Ok(())
}

// Non-string entries are left alone so validation still reports them.
fn mask_entries(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Array(entries) => serde_json::Value::Array(
            entries
                .into_iter()
                .map(|entry| match entry {
                    serde_json::Value::String(text) => serde_json::Value::String(mask_pii(&text)),
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}
