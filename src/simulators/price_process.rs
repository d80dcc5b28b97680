// src/simulators/price_process.rs

use crate::error::SimError;

/// Anything that can move the asset price forward by one step.
///
/// The market model owns the price; a process only turns the current price
/// into the next one. This keeps the engine pluggable: the model runs the same
/// way on a seeded GBM as on a scripted path in tests.
pub trait PriceProcess: Send {
    /// Returns the next price. Fails if `current_price` is not strictly positive.
    fn advance(&mut self, current_price: f64) -> Result<f64, SimError>;

    /// Rewinds the process so the next run replays the same draws.
    fn reset(&mut self);
}
