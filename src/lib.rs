// src/lib.rs

// === 1. Declare all the top-level modules ===
pub mod agents;
pub mod analyst;
pub mod config;
pub mod error;
pub mod market;
pub mod runner;
pub mod simulators;
pub mod telemetry;
pub mod types;

// === 2. Re-export the public-facing components to create a clean API ===

// --- From `agents` ---
pub use agents::action::{ActionTaken, MarketView};
pub use agents::investor_agent::InvestorAgent;
pub use agents::memory::{AgentMemory, Episode};
pub use agents::portfolio::PortfolioState;
pub use agents::profile::InvestorProfile;

// --- From `analyst` ---
pub use analyst::{
    AnalysisRequest, Analyst, GroqAnalyst, LiveAnalyst, MovingAverageRule, RecommendationAdapter,
};

// --- From our `market` engine ---
pub use market::MarketModel;
pub use runner::{run_simulation, run_with_analyst};

// --- From `simulators` ---
pub use simulators::gbm::GBMSimulator;
pub use simulators::price_process::PriceProcess;

// --- Config, errors and data types ---
pub use config::{AgentConfig, PriceParams, SignalConfig, SimConfig};
pub use error::{AnalystError, SimError};
pub use types::{
    Action, MarketState, Recommendation, RunSummary, SignalSource, SimulationRecord, Snapshot,
};
