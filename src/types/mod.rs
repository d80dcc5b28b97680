// src/types/mod.rs

pub mod recommendation;
pub mod record;
pub mod state;

pub use recommendation::{Action, Recommendation, SignalSource};
pub use record::{RunSummary, SimulationRecord, Snapshot};
pub use state::MarketState;
