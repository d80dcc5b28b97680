// src/agents/config.rs

//! A centralized place for tuning investor behavior parameters.

// --- Portfolio ---
pub const DEFAULT_INITIAL_CASH: f64 = 10_000.0;
pub const DEFAULT_INITIAL_HOLDINGS: f64 = 0.0;
// Only consulted when short selling is switched on.
pub const DEFAULT_SHORT_LIMIT: f64 = 0.0;

// --- Profiles ---
// Round-robin population: every third investor is cautious, the next moderate,
// the next speculative.
pub const RISK_AVERSE_TOLERANCE: f64 = 0.2;
pub const MODERATE_TOLERANCE: f64 = 0.5;
pub const SPECULATIVE_TOLERANCE: f64 = 0.8;

// --- Memory ---
pub const DEFAULT_MEMORY_CAPACITY: usize = 50;
pub const MEMORY_SUMMARY_LEN: usize = 5;

// Trades smaller than this are treated as no trade at all.
pub const MIN_TRADE_QTY: f64 = 1e-12;
