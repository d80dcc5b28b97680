// src/types/state.rs

/// The market's view of the single traded asset.
///
/// Owned by `MarketModel`. The only mutation is `record_price`, which the model
/// calls once per step with the freshly advanced price.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketState {
    initial_price: f64,
    price: f64,
    step: u64,
    history: Vec<f64>,
}

impl MarketState {
    pub fn new(initial_price: f64) -> Self {
        Self {
            initial_price,
            price: initial_price,
            step: 0,
            history: Vec::new(),
        }
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn initial_price(&self) -> f64 {
        self.initial_price
    }

    /// Number of completed steps.
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Every post-step price, oldest first. The initial price is not included.
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// The last `window` prices (or fewer, early in the run).
    pub fn recent(&self, window: usize) -> &[f64] {
        let start = self.history.len().saturating_sub(window);
        &self.history[start..]
    }

    /// Log return of the most recent step, 0 before the first step.
    pub fn last_return(&self) -> f64 {
        match self.history.as_slice() {
            [] => 0.0,
            [only] => (only / self.initial_price).ln(),
            [.., prev, last] => (last / prev).ln(),
        }
    }

    pub(crate) fn record_price(&mut self, price: f64) {
        debug_assert!(price > 0.0, "price invariant broken: {price}");
        self.price = price;
        self.history.push(price);
        self.step += 1;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new(self.initial_price);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_empty_history() {
        let state = MarketState::new(100.0);
        assert_eq!(state.price(), 100.0);
        assert_eq!(state.step(), 0);
        assert!(state.history().is_empty());
        assert_eq!(state.last_return(), 0.0);
    }

    #[test]
    fn record_price_appends_and_advances_step() {
        let mut state = MarketState::new(100.0);
        state.record_price(110.0);
        state.record_price(121.0);

        assert_eq!(state.step(), 2);
        assert_eq!(state.price(), 121.0);
        assert_eq!(state.history(), &[110.0, 121.0]);
        assert!((state.last_return() - 1.1f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn first_return_is_measured_against_initial_price() {
        let mut state = MarketState::new(100.0);
        state.record_price(105.0);
        assert!((state.last_return() - 1.05f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn recent_is_bounded_by_history() {
        let mut state = MarketState::new(1.0);
        for p in [2.0, 3.0, 4.0] {
            state.record_price(p);
        }
        assert_eq!(state.recent(2), &[3.0, 4.0]);
        assert_eq!(state.recent(10), &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut state = MarketState::new(50.0);
        state.record_price(55.0);
        state.reset();
        assert_eq!(state, MarketState::new(50.0));
    }
}
