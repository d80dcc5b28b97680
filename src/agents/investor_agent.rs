// src/agents/investor_agent.rs

use super::action::{ActionTaken, MarketView};
use super::config::{MEMORY_SUMMARY_LEN, MIN_TRADE_QTY};
use super::memory::{AgentMemory, Episode};
use super::portfolio::PortfolioState;
use super::profile::InvestorProfile;
use crate::config::AgentConfig;
use crate::types::{Action, Recommendation};
use tracing::trace;

/// A single investor: its own portfolio, a sizing policy, and a short memory.
///
/// The investor never looks at other agents. Everything it needs arrives in
/// the per-step `MarketView`.
#[derive(Debug, Clone)]
pub struct InvestorAgent {
    pub id: usize,
    profile: InvestorProfile,
    portfolio: PortfolioState,
    // 0 unless short selling is enabled.
    short_limit: f64,
    memory: AgentMemory,
    last_wealth: f64,
}

impl InvestorAgent {
    pub fn new(
        id: usize,
        profile: InvestorProfile,
        portfolio: PortfolioState,
        config: &AgentConfig,
        initial_price: f64,
    ) -> Self {
        let short_limit = if config.allow_short {
            config.short_limit
        } else {
            0.0
        };
        Self {
            id,
            profile,
            portfolio,
            short_limit,
            memory: AgentMemory::new(config.memory_capacity),
            last_wealth: portfolio.valuation(initial_price),
        }
    }

    /// Creates investor `id` of the configured population. The profile is
    /// assigned round-robin; a configured tolerance overrides the profile's.
    pub fn from_config(id: usize, config: &AgentConfig, initial_price: f64) -> Self {
        let profile = InvestorProfile::for_index(id);
        let tolerance = config
            .risk_tolerance
            .unwrap_or_else(|| profile.risk_tolerance());
        let portfolio = PortfolioState::new(config.initial_cash, config.initial_holdings, tolerance);
        Self::new(id, profile, portfolio, config, initial_price)
    }

    pub fn profile(&self) -> InvestorProfile {
        self.profile
    }

    pub fn portfolio(&self) -> &PortfolioState {
        &self.portfolio
    }

    pub fn memory(&self) -> &AgentMemory {
        &self.memory
    }

    pub fn wealth(&self, price: f64) -> f64 {
        self.portfolio.valuation(price)
    }

    /// Share of cash (BUY) or sellable holdings (SELL) the investor wants to trade.
    pub fn intended_fraction(&self, recommendation: &Recommendation) -> f64 {
        match recommendation.action() {
            Action::Hold => 0.0,
            Action::Buy | Action::Sell => {
                (self.portfolio.risk_tolerance() * recommendation.confidence()).clamp(0.0, 1.0)
            }
        }
    }

    /// Trades on `recommendation` at `price`.
    ///
    /// The result depends only on the portfolio, price and recommendation.
    /// Oversized trades shrink to what cash/holdings allow instead of failing.
    pub fn act(&mut self, price: f64, recommendation: &Recommendation) -> ActionTaken {
        let fraction = self.intended_fraction(recommendation);
        if fraction <= 0.0 || !(price > 0.0) {
            return ActionTaken::Hold;
        }

        let taken = match recommendation.action() {
            Action::Buy => {
                let qty = self.portfolio.cash() * fraction / price;
                if !qty.is_finite() || qty < MIN_TRADE_QTY {
                    return ActionTaken::Hold;
                }
                ActionTaken::Buy {
                    qty: self.portfolio.buy(qty, price),
                }
            }
            Action::Sell => {
                let qty = self.portfolio.sellable(self.short_limit) * fraction;
                if !qty.is_finite() || qty < MIN_TRADE_QTY {
                    return ActionTaken::Hold;
                }
                ActionTaken::Sell {
                    qty: self.portfolio.sell(qty, price, self.short_limit),
                }
            }
            Action::Hold => ActionTaken::Hold,
        };

        if taken.qty() < MIN_TRADE_QTY {
            ActionTaken::Hold
        } else {
            taken
        }
    }

    /// One full activation: trade on the view, then mark to market and remember
    /// the outcome.
    pub fn activate(&mut self, view: &MarketView) -> ActionTaken {
        let taken = self.act(view.price, view.recommendation);

        let wealth = self.wealth(view.price);
        let pnl = wealth - self.last_wealth;
        self.last_wealth = wealth;
        self.memory.record(Episode {
            step: view.step,
            taken,
            price: view.price,
            confidence: view.recommendation.confidence(),
            wealth,
            pnl,
        });

        trace!(
            agent = self.id,
            profile = %self.profile,
            action = %taken.action(),
            qty = taken.qty(),
            wealth,
            "investor activated"
        );
        taken
    }

    /// Recent decisions as text, newest last.
    pub fn recent_decisions(&self) -> String {
        self.memory.summarize(MEMORY_SUMMARY_LEN)
    }
}
