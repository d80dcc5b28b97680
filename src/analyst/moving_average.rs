// src/analyst/moving_average.rs

use crate::config::SignalConfig;
use crate::types::{Action, Recommendation, SignalSource};
use statrs::statistics::Statistics;

/// Deterministic crossover rule used whenever no live analyst answer is available.
///
/// `d = (short_ma - long_ma) / long_ma`. BUY above `threshold`, SELL below
/// `-threshold`, HOLD otherwise, with confidence `clamp(|d| * confidence_gain, 0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingAverageRule {
    short_window: usize,
    long_window: usize,
    threshold: f64,
    confidence_gain: f64,
}

impl MovingAverageRule {
    pub fn new(short_window: usize, long_window: usize, threshold: f64, confidence_gain: f64) -> Self {
        Self {
            short_window,
            long_window,
            threshold,
            confidence_gain,
        }
    }

    pub fn from_config(config: &SignalConfig) -> Self {
        Self::new(
            config.short_window,
            config.long_window,
            config.threshold,
            config.confidence_gain,
        )
    }

    /// Moving averages over the tail of `prices`, or `None` while there are
    /// fewer prices than the long window.
    pub fn averages(&self, prices: &[f64]) -> Option<(f64, f64)> {
        if self.short_window == 0 || prices.len() < self.long_window.max(self.short_window) {
            return None;
        }
        let short = prices[prices.len() - self.short_window..].iter().mean();
        let long = prices[prices.len() - self.long_window..].iter().mean();
        Some((short, long))
    }

    /// Relative divergence of the short average from the long one.
    pub fn divergence(&self, prices: &[f64]) -> Option<f64> {
        let (short, long) = self.averages(prices)?;
        (long > 0.0).then(|| (short - long) / long)
    }

    pub fn evaluate(&self, prices: &[f64], source: SignalSource) -> Recommendation {
        let Some((short, long)) = self.averages(prices) else {
            return Recommendation::neutral(source).with_rationale(format!(
                "not enough history: {} of {} prices",
                prices.len(),
                self.long_window
            ));
        };
        let Some(divergence) = self.divergence(prices) else {
            return Recommendation::neutral(source).with_rationale("degenerate long average");
        };

        let action = if divergence > self.threshold {
            Action::Buy
        } else if divergence < -self.threshold {
            Action::Sell
        } else {
            Action::Hold
        };
        let confidence = (divergence.abs() * self.confidence_gain).clamp(0.0, 1.0);

        Recommendation::new(action, confidence, source).with_rationale(format!(
            "short_ma={short:.4} long_ma={long:.4} divergence={divergence:.6}"
        ))
    }
}
