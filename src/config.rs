// src/config.rs

//! Run configuration. Everything here is plain data that can be built in code
//! or deserialized from TOML; `SimConfig::validate` is the single gate every
//! run passes through before its first step.

use crate::agents::config::{
    DEFAULT_INITIAL_CASH, DEFAULT_INITIAL_HOLDINGS, DEFAULT_MEMORY_CAPACITY, DEFAULT_SHORT_LIMIT,
};
use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// --- Price process defaults ---
pub const DEFAULT_INITIAL_PRICE: f64 = 100.0;
pub const DEFAULT_DRIFT: f64 = 0.05;
pub const DEFAULT_VOLATILITY: f64 = 0.20;
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

// --- Moving-average fallback defaults ---
pub const DEFAULT_SHORT_WINDOW: usize = 5;
pub const DEFAULT_LONG_WINDOW: usize = 20;
pub const DEFAULT_SIGNAL_THRESHOLD: f64 = 0.002;
/// A 5% divergence between the averages maps to full confidence.
pub const DEFAULT_CONFIDENCE_GAIN: f64 = 20.0;

// --- Live analyst defaults ---
pub const DEFAULT_HISTORY_WINDOW: usize = 30;
pub const DEFAULT_LIVE_TIMEOUT_MS: u64 = 5_000;

/// Parameters of the geometric Brownian motion driving the asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceParams {
    /// Starting price, strictly positive.
    pub initial_price: f64,
    /// Annualized mean return (μ).
    pub drift: f64,
    /// Annualized standard deviation of returns (σ).
    pub volatility: f64,
    /// Step size in years.
    pub dt: f64,
    /// Seed for the normal draws. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for PriceParams {
    fn default() -> Self {
        Self {
            initial_price: DEFAULT_INITIAL_PRICE,
            drift: DEFAULT_DRIFT,
            volatility: DEFAULT_VOLATILITY,
            dt: 1.0 / TRADING_DAYS_PER_YEAR,
            seed: None,
        }
    }
}

impl PriceParams {
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.initial_price.is_finite() && self.initial_price > 0.0) {
            return Err(SimError::precondition(
                "initial_price",
                "a finite number > 0",
                self.initial_price,
            ));
        }
        if !self.drift.is_finite() {
            return Err(SimError::precondition("drift", "finite", self.drift));
        }
        if !(self.volatility.is_finite() && self.volatility >= 0.0) {
            return Err(SimError::precondition(
                "volatility",
                "a finite number >= 0",
                self.volatility,
            ));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::precondition("dt", "a finite number > 0", self.dt));
        }
        Ok(())
    }
}

/// How the per-step recommendation is produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Prices averaged for the fast moving average.
    pub short_window: usize,
    /// Prices averaged for the slow moving average.
    pub long_window: usize,
    /// Relative divergence the averages must exceed before BUY/SELL is emitted.
    pub threshold: f64,
    /// Multiplier turning the relative divergence into a confidence.
    pub confidence_gain: f64,
    /// Most recent prices handed to the live analyst.
    pub history_window: usize,
    /// Upper bound on a single live analyst call.
    pub live_timeout_ms: u64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
            threshold: DEFAULT_SIGNAL_THRESHOLD,
            confidence_gain: DEFAULT_CONFIDENCE_GAIN,
            history_window: DEFAULT_HISTORY_WINDOW,
            live_timeout_ms: DEFAULT_LIVE_TIMEOUT_MS,
        }
    }
}

impl SignalConfig {
    pub fn live_timeout(&self) -> Duration {
        Duration::from_millis(self.live_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.short_window == 0 {
            return Err(SimError::precondition("short_window", ">= 1", self.short_window));
        }
        if self.long_window < self.short_window {
            return Err(SimError::precondition(
                "long_window",
                ">= short_window",
                self.long_window,
            ));
        }
        if !(self.threshold.is_finite() && self.threshold >= 0.0) {
            return Err(SimError::precondition(
                "threshold",
                "a finite number >= 0",
                self.threshold,
            ));
        }
        if !(self.confidence_gain.is_finite() && self.confidence_gain >= 0.0) {
            return Err(SimError::precondition(
                "confidence_gain",
                "a finite number >= 0",
                self.confidence_gain,
            ));
        }
        if self.history_window < 2 {
            return Err(SimError::precondition(
                "history_window",
                ">= 2",
                self.history_window,
            ));
        }
        if self.live_timeout_ms == 0 {
            return Err(SimError::precondition("live_timeout_ms", "> 0", 0));
        }
        Ok(())
    }
}

/// Starting portfolio and trading permissions shared by the population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub initial_cash: f64,
    pub initial_holdings: f64,
    /// Fixes every agent's tolerance; otherwise profiles are assigned round-robin.
    pub risk_tolerance: Option<f64>,
    /// Short positions stay disabled unless this is set.
    pub allow_short: bool,
    /// Units an agent may sell beyond its holdings when shorting is allowed.
    pub short_limit: f64,
    pub memory_capacity: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            initial_cash: DEFAULT_INITIAL_CASH,
            initial_holdings: DEFAULT_INITIAL_HOLDINGS,
            risk_tolerance: None,
            allow_short: false,
            short_limit: DEFAULT_SHORT_LIMIT,
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.initial_cash.is_finite() && self.initial_cash >= 0.0) {
            return Err(SimError::precondition(
                "initial_cash",
                "a finite number >= 0",
                self.initial_cash,
            ));
        }
        if !(self.initial_holdings.is_finite() && self.initial_holdings >= 0.0) {
            return Err(SimError::precondition(
                "initial_holdings",
                "a finite number >= 0",
                self.initial_holdings,
            ));
        }
        if let Some(tolerance) = self.risk_tolerance {
            if !(0.0..=1.0).contains(&tolerance) {
                return Err(SimError::precondition(
                    "risk_tolerance",
                    "within [0, 1]",
                    tolerance,
                ));
            }
        }
        if !(self.short_limit.is_finite() && self.short_limit >= 0.0) {
            return Err(SimError::precondition(
                "short_limit",
                "a finite number >= 0",
                self.short_limit,
            ));
        }
        if self.memory_capacity == 0 {
            return Err(SimError::precondition("memory_capacity", ">= 1", 0));
        }
        Ok(())
    }
}

/// Everything a single run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub num_steps: usize,
    pub num_agents: usize,
    pub use_live_analyst: bool,
    pub price: PriceParams,
    pub signal: SignalConfig,
    pub agents: AgentConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_steps: 100,
            num_agents: 30,
            use_live_analyst: false,
            price: PriceParams::default(),
            signal: SignalConfig::default(),
            agents: AgentConfig::default(),
        }
    }
}

impl SimConfig {
    /// Checks every setup precondition, reporting the first one violated.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.num_agents == 0 {
            return Err(SimError::precondition("num_agents", ">= 1", 0));
        }
        self.price.validate()?;
        self.signal.validate()?;
        self.agents.validate()
    }

    pub fn from_toml_str(source: &str) -> Result<Self, SimError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_initial_price() {
        let mut cfg = SimConfig::default();
        cfg.price.initial_price = 0.0;
        match cfg.validate() {
            Err(SimError::Precondition { parameter, .. }) => assert_eq!(parameter, "initial_price"),
            other => panic!("expected precondition violation, got {other:?}"),
        }
    }

    #[test]
    fn rejects_negative_volatility_and_zero_dt() {
        let mut cfg = SimConfig::default();
        cfg.price.volatility = -0.1;
        assert!(matches!(
            cfg.validate(),
            Err(SimError::Precondition { parameter: "volatility", .. })
        ));

        let mut cfg = SimConfig::default();
        cfg.price.dt = 0.0;
        assert!(matches!(
            cfg.validate(),
            Err(SimError::Precondition { parameter: "dt", .. })
        ));
    }

    #[test]
    fn zero_volatility_is_allowed() {
        let mut cfg = SimConfig::default();
        cfg.price.volatility = 0.0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_empty_population() {
        let cfg = SimConfig {
            num_agents: 0,
            ..SimConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(SimError::Precondition { parameter: "num_agents", .. })
        ));
    }

    #[test]
    fn rejects_inverted_windows() {
        let mut cfg = SimConfig::default();
        cfg.signal.short_window = 10;
        cfg.signal.long_window = 5;
        assert!(matches!(
            cfg.validate(),
            Err(SimError::Precondition { parameter: "long_window", .. })
        ));
    }

    #[test]
    fn rejects_tolerance_outside_unit_interval() {
        let mut cfg = SimConfig::default();
        cfg.agents.risk_tolerance = Some(1.5);
        assert!(matches!(
            cfg.validate(),
            Err(SimError::Precondition { parameter: "risk_tolerance", .. })
        ));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = SimConfig::from_toml_str(
            r#"
            num_steps = 10
            use_live_analyst = true

            [price]
            initial_price = 50.0
            seed = 7

            [agents]
            allow_short = true
            short_limit = 3.0
            "#,
        )
        .unwrap();

        assert_eq!(cfg.num_steps, 10);
        assert!(cfg.use_live_analyst);
        assert_eq!(cfg.num_agents, SimConfig::default().num_agents);
        assert_eq!(cfg.price.initial_price, 50.0);
        assert_eq!(cfg.price.seed, Some(7));
        assert_eq!(cfg.price.volatility, DEFAULT_VOLATILITY);
        assert!(cfg.agents.allow_short);
        assert_eq!(cfg.agents.short_limit, 3.0);
        assert_eq!(cfg.signal, SignalConfig::default());
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = SimConfig::from_toml_str("num_steps = \"many\"").unwrap_err();
        assert!(matches!(err, SimError::ConfigParse(_)));
    }
}
