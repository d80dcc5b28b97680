// src/runner.rs

//! The execution entry point: config in, finished record (or a setup error) out.

use crate::analyst::{Analyst, GroqAnalyst, RecommendationAdapter};
use crate::config::SimConfig;
use crate::error::SimError;
use crate::market::MarketModel;
use crate::types::SimulationRecord;
use std::sync::Arc;
use tracing::{info, warn};

/// Validates `config`, builds the market and runs it for `config.num_steps`.
///
/// With `use_live_analyst` the Groq client is built from the environment.
/// Missing credentials do not stop the run; every step then degrades to the
/// moving-average rule and says so in the logs and the record.
pub fn run_simulation(config: &SimConfig) -> Result<SimulationRecord, SimError> {
    config.validate()?;

    let adapter = if config.use_live_analyst {
        match GroqAnalyst::from_env(config.signal.live_timeout()) {
            Ok(analyst) => {
                if !analyst.has_credential() {
                    warn!("live analyst requested without credentials, steps will degrade to the fallback rule");
                }
                RecommendationAdapter::live(&config.signal, Arc::new(analyst))
            }
            Err(err) => {
                warn!(reason = %err, "could not build live analyst client, running on the fallback rule");
                RecommendationAdapter::fallback(&config.signal)
            }
        }
    } else {
        RecommendationAdapter::fallback(&config.signal)
    };

    run_with_adapter(config, adapter)
}

/// Same as `run_simulation`, with a caller-supplied analyst for the live path.
pub fn run_with_analyst(
    config: &SimConfig,
    analyst: Arc<dyn Analyst>,
) -> Result<SimulationRecord, SimError> {
    config.validate()?;
    run_with_adapter(config, RecommendationAdapter::live(&config.signal, analyst))
}

fn run_with_adapter(
    config: &SimConfig,
    adapter: RecommendationAdapter,
) -> Result<SimulationRecord, SimError> {
    info!(
        steps = config.num_steps,
        agents = config.num_agents,
        seed = ?config.price.seed,
        live = adapter.is_live(),
        "starting simulation"
    );
    MarketModel::with_adapter(config.clone(), adapter)?.run(config.num_steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SignalSource;

    fn config() -> SimConfig {
        let mut cfg = SimConfig {
            num_steps: 12,
            num_agents: 4,
            ..SimConfig::default()
        };
        cfg.price.seed = Some(1);
        cfg
    }

    #[test]
    fn fallback_run_produces_full_record() {
        let record = run_simulation(&config()).unwrap();
        assert_eq!(record.len(), 12);
        assert!(record
            .snapshots()
            .iter()
            .all(|s| s.signal_source == SignalSource::Fallback));
    }

    #[test]
    fn setup_errors_are_reported_before_running() {
        let mut cfg = config();
        cfg.price.initial_price = 0.0;
        let err = run_simulation(&cfg).unwrap_err();
        assert!(err.to_string().contains("initial_price"));
    }

    #[test]
    fn zero_steps_is_an_empty_record() {
        let cfg = SimConfig {
            num_steps: 0,
            ..config()
        };
        assert!(run_simulation(&cfg).unwrap().is_empty());
    }
}
