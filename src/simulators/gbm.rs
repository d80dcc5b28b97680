// src/simulators/gbm.rs

use super::price_process::PriceProcess;
use crate::config::PriceParams;
use crate::error::SimError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use tracing::trace;

// Smallest positive subnormal f64.
const PRICE_FLOOR: f64 = f64::from_bits(1);

/// One discrete GBM step:
/// `current * exp((mu - sigma^2 / 2) * dt + sigma * sqrt(dt) * z)`.
///
/// Pure: the standard-normal draw `z` is supplied by the caller. Outcomes that
/// underflow to zero clamp to the smallest positive subnormal, which is never
/// above `current_price`; outcomes that overflow clamp to `f64::MAX`.
pub fn advance(
    current_price: f64,
    drift: f64,
    volatility: f64,
    dt: f64,
    z: f64,
) -> Result<f64, SimError> {
    if !(current_price.is_finite() && current_price > 0.0) {
        return Err(SimError::NonPositivePrice {
            price: current_price,
        });
    }
    if !(dt.is_finite() && dt > 0.0) {
        return Err(SimError::precondition("dt", "a finite number > 0", dt));
    }
    if !(volatility.is_finite() && volatility >= 0.0) {
        return Err(SimError::precondition(
            "volatility",
            "a finite number >= 0",
            volatility,
        ));
    }
    if !z.is_finite() {
        return Err(SimError::precondition("random_draw", "finite", z));
    }

    // Ito-corrected log return.
    let log_return = (drift - 0.5 * volatility.powi(2)) * dt + volatility * dt.sqrt() * z;
    let next_price = current_price * log_return.exp();

    if next_price.is_finite() && next_price > 0.0 {
        Ok(next_price)
    } else if next_price <= 0.0 {
        trace!(current_price, log_return, "price underflowed, clamping");
        Ok(PRICE_FLOOR)
    } else {
        trace!(current_price, log_return, "price overflowed, clamping");
        Ok(f64::MAX)
    }
}

/// Geometric Brownian motion driven by its own seeded generator.
pub struct GBMSimulator {
    drift: f64,
    volatility: f64,
    dt: f64,
    seed: u64,
    rng: StdRng,
}

impl GBMSimulator {
    /// Builds the process from validated parameters. Without a configured seed
    /// one is drawn from OS entropy and kept, so `reset` still replays the path.
    pub fn new(params: &PriceParams) -> Self {
        let seed = params.seed.unwrap_or_else(rand::random);
        Self {
            drift: params.drift,
            volatility: params.volatility,
            dt: params.dt,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The seed actually in use, including one drawn from entropy.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn draw(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }
}

impl PriceProcess for GBMSimulator {
    fn advance(&mut self, current_price: f64) -> Result<f64, SimError> {
        let z = self.draw();
        advance(current_price, self.drift, self.volatility, self.dt, z)
    }

    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }
}

// ──────────────────────────────────────────────────────────────────────────────
//  Unit tests for the GBM step
// ──────────────────────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn params(seed: u64) -> PriceParams {
        PriceParams {
            initial_price: 100.0,
            drift: 0.05,
            volatility: 0.2,
            dt: 1.0 / 252.0,
            seed: Some(seed),
        }
    }

    #[test]
    fn zero_volatility_is_deterministic_drift() {
        let dt = 0.5;
        let next = advance(100.0, 0.1, 0.0, dt, 3.7).unwrap();
        assert!((next - 100.0 * (0.1f64 * dt).exp()).abs() < 1e-9);
    }

    #[test]
    fn zero_draw_applies_ito_correction() {
        let next = advance(100.0, 0.05, 0.2, 1.0, 0.0).unwrap();
        let expected = 100.0 * (0.05f64 - 0.02).exp();
        assert!((next - expected).abs() < 1e-9);
    }

    #[test]
    fn rejects_non_positive_current_price() {
        assert!(matches!(
            advance(0.0, 0.05, 0.2, 1.0, 0.1),
            Err(SimError::NonPositivePrice { .. })
        ));
        assert!(matches!(
            advance(-5.0, 0.05, 0.2, 1.0, 0.1),
            Err(SimError::NonPositivePrice { .. })
        ));
    }

    #[test]
    fn rejects_bad_step_size_and_volatility() {
        assert!(advance(100.0, 0.05, 0.2, 0.0, 0.1).is_err());
        assert!(advance(100.0, 0.05, -0.2, 1.0, 0.1).is_err());
    }

    #[test]
    fn extreme_shocks_are_clamped_positive() {
        let crash = advance(1e-300, 0.0, 50.0, 1.0, -40.0).unwrap();
        assert!(crash > 0.0);
        let boom = advance(1e300, 0.0, 50.0, 1.0, 40.0).unwrap();
        assert!(boom.is_finite() && boom > 0.0);
    }

    #[test]
    fn negative_drift_stays_monotone_through_underflow() {
        // sigma = 0 with a strongly negative drift walks into the subnormal range.
        let mut price = 100.0;
        for _ in 0..40 {
            let next = advance(price, -60.0, 0.0, 1.0, 0.0).unwrap();
            assert!(next > 0.0);
            assert!(next <= price, "{price} rose to {next}");
            price = next;
        }
        assert_eq!(price, PRICE_FLOOR);
        assert_eq!(advance(2.03e-311, -60.0, 0.0, 1.0, 0.0).unwrap(), PRICE_FLOOR);
    }

    #[test]
    fn seeded_step_matches_closed_form_with_same_draw() {
        // Scenario: 100, mu=0.05, sigma=0.2, dt=1/252, seed 42, one step.
        let p = params(42);
        let mut sim = GBMSimulator::new(&p);
        let simulated = sim.advance(p.initial_price).unwrap();

        let mut rng = StdRng::seed_from_u64(42);
        let z: f64 = rng.sample(StandardNormal);
        let expected = 100.0
            * ((0.05 - 0.5 * 0.2f64.powi(2)) * (1.0 / 252.0) + 0.2 * (1.0f64 / 252.0).sqrt() * z)
                .exp();

        assert_eq!(simulated.to_bits(), expected.to_bits());
    }

    #[test]
    fn same_seed_same_path() {
        let mut a = GBMSimulator::new(&params(7));
        let mut b = GBMSimulator::new(&params(7));
        let (mut pa, mut pb) = (100.0, 100.0);
        for _ in 0..500 {
            pa = a.advance(pa).unwrap();
            pb = b.advance(pb).unwrap();
            assert_eq!(pa.to_bits(), pb.to_bits());
        }
    }

    #[test]
    fn reset_replays_the_path() {
        let mut sim = GBMSimulator::new(&PriceParams {
            seed: None,
            ..params(0)
        });
        let first: Vec<f64> = (0..10).map(|_| sim.advance(100.0).unwrap()).collect();
        sim.reset();
        let second: Vec<f64> = (0..10).map(|_| sim.advance(100.0).unwrap()).collect();
        assert_eq!(first, second);
    }
}
