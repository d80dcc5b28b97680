// src/agents/portfolio.rs

use serde::Serialize;
use tracing::trace;

/// Cash, asset holdings and the owner's private risk tolerance.
///
/// Only the owning investor mutates this, and only through `buy`/`sell`, which
/// clamp every trade to what is actually available. Valuation is always
/// recomputed from the current price, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PortfolioState {
    cash: f64,
    holdings: f64,
    risk_tolerance: f64,
}

impl PortfolioState {
    pub fn new(cash: f64, holdings: f64, risk_tolerance: f64) -> Self {
        Self {
            cash,
            holdings,
            risk_tolerance: risk_tolerance.clamp(0.0, 1.0),
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn holdings(&self) -> f64 {
        self.holdings
    }

    pub fn risk_tolerance(&self) -> f64 {
        self.risk_tolerance
    }

    /// `holdings * price + cash`.
    pub fn valuation(&self, price: f64) -> f64 {
        self.holdings * price + self.cash
    }

    /// Buys up to `qty` units at `price` and returns the quantity actually bought.
    /// An order larger than the cash allows shrinks to the affordable maximum.
    /// Nothing is bought when the quantity or the resulting holdings would not
    /// be finite.
    pub(crate) fn buy(&mut self, qty: f64, price: f64) -> f64 {
        if !(qty > 0.0 && price > 0.0) || self.cash <= 0.0 {
            return 0.0;
        }
        let affordable = self.cash / price;
        let qty = if qty > affordable {
            trace!(requested = qty, affordable, "buy clamped to available cash");
            affordable
        } else {
            qty
        };
        let holdings = self.holdings + qty;
        if !(qty.is_finite() && holdings.is_finite()) {
            trace!(requested = qty, price, "buy skipped, quantity not representable");
            return 0.0;
        }
        let cost = (qty * price).min(self.cash);
        self.cash = (self.cash - cost).max(0.0);
        self.holdings = holdings;
        qty
    }

    /// Sells up to `qty` units at `price` and returns the quantity actually sold.
    /// `short_limit` is how far below zero holdings may go (0 without shorting).
    pub(crate) fn sell(&mut self, qty: f64, price: f64, short_limit: f64) -> f64 {
        let capacity = self.sellable(short_limit);
        if !(qty > 0.0 && price > 0.0) || capacity <= 0.0 {
            return 0.0;
        }
        let qty = if qty > capacity {
            trace!(requested = qty, capacity, "sell clamped to available holdings");
            capacity
        } else {
            qty
        };
        let cash = self.cash + qty * price;
        if !(qty.is_finite() && cash.is_finite()) {
            trace!(requested = qty, price, "sell skipped, proceeds not representable");
            return 0.0;
        }
        self.holdings -= qty;
        if short_limit == 0.0 {
            self.holdings = self.holdings.max(0.0);
        }
        self.cash = cash;
        qty
    }

    /// Units that can be sold right now.
    pub fn sellable(&self, short_limit: f64) -> f64 {
        (self.holdings + short_limit.max(0.0)).max(0.0)
    }
}
