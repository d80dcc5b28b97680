// src/bin/simulate.rs

use agentic_market::telemetry::init_tracing;
use agentic_market::{SimConfig, run_simulation};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

/// Run the agent-based market and print or export the per-step record.
#[derive(Debug, Parser)]
#[command(name = "simulate", version)]
struct Args {
    /// TOML file with a full or partial configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    steps: Option<usize>,
    #[arg(long)]
    agents: Option<usize>,
    /// Annualized drift.
    #[arg(long, allow_negative_numbers = true)]
    drift: Option<f64>,
    /// Annualized volatility.
    #[arg(long)]
    volatility: Option<f64>,
    /// Step size in years.
    #[arg(long)]
    dt: Option<f64>,
    #[arg(long)]
    initial_price: Option<f64>,
    #[arg(long)]
    seed: Option<u64>,
    /// Ask the live analyst (needs GROQ_API_KEY) before falling back.
    #[arg(long)]
    live: bool,
    /// Let investors sell up to this many units short.
    #[arg(long)]
    short_limit: Option<f64>,
    /// Write the record as CSV.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Skip the per-step lines.
    #[arg(short, long)]
    quiet: bool,
    /// Debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(&self, config: &mut SimConfig) {
        if let Some(steps) = self.steps {
            config.num_steps = steps;
        }
        if let Some(agents) = self.agents {
            config.num_agents = agents;
        }
        if let Some(drift) = self.drift {
            config.price.drift = drift;
        }
        if let Some(volatility) = self.volatility {
            config.price.volatility = volatility;
        }
        if let Some(dt) = self.dt {
            config.price.dt = dt;
        }
        if let Some(price) = self.initial_price {
            config.price.initial_price = price;
        }
        if self.seed.is_some() {
            config.price.seed = self.seed;
        }
        if self.live {
            config.use_live_analyst = true;
        }
        if let Some(limit) = self.short_limit {
            config.agents.allow_short = true;
            config.agents.short_limit = limit;
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(if args.verbose { Level::DEBUG } else { Level::INFO });

    let mut config = match &args.config {
        Some(path) => SimConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => SimConfig::default(),
    };
    args.apply(&mut config);

    let record = run_simulation(&config).context("simulation setup failed")?;

    if !args.quiet {
        for s in &record {
            println!(
                "Step {:>4}/{} | Price: {:>9.2} | Signal: {:<4} {:.2} ({:<8}) | Investors: {} BUY / {} SELL / {} HOLD",
                s.step,
                config.num_steps,
                s.price,
                s.signal_action,
                s.signal_confidence,
                s.signal_source,
                s.buys,
                s.sells,
                s.holds
            );
        }
    }

    let summary = record.summary(config.price.initial_price);
    println!(
        "Finished {} steps: final price {:.2} ({:+.2}%), per-step return std-dev {:.5}, volume {:.2}, degraded steps {}",
        summary.steps,
        summary.final_price,
        summary.total_return * 100.0,
        summary.return_std_dev,
        summary.total_volume,
        summary.degraded_steps
    );

    if let Some(path) = &args.output {
        record
            .save_csv(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Results saved to {}", path.display());
    }
    Ok(())
}
