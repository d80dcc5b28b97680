// src/agents/action.rs

use crate::types::{Action, Recommendation};

/// The read-only tuple every investor sees during a step.
///
/// Built once per step by the market; all agents activated in that step get
/// the same view.
#[derive(Debug, Clone, Copy)]
pub struct MarketView<'a> {
    pub step: u64,
    pub price: f64,
    pub recommendation: &'a Recommendation,
}

/// What an investor actually did after clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionTaken {
    Buy { qty: f64 },
    Sell { qty: f64 },
    Hold,
}

impl ActionTaken {
    pub fn action(&self) -> Action {
        match self {
            ActionTaken::Buy { .. } => Action::Buy,
            ActionTaken::Sell { .. } => Action::Sell,
            ActionTaken::Hold => Action::Hold,
        }
    }

    /// Units traded, 0 for HOLD.
    pub fn qty(&self) -> f64 {
        match *self {
            ActionTaken::Buy { qty } | ActionTaken::Sell { qty } => qty,
            ActionTaken::Hold => 0.0,
        }
    }
}
