// src/agents/memory.rs

use super::action::ActionTaken;
use std::collections::VecDeque;
use std::fmt::Write;

/// One activation, as the investor remembers it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Episode {
    pub step: u64,
    pub taken: ActionTaken,
    pub price: f64,
    /// Confidence of the recommendation acted on.
    pub confidence: f64,
    /// Marked-to-market wealth after the trade.
    pub wealth: f64,
    /// Change in wealth since the previous activation.
    pub pnl: f64,
}

/// Bounded episodic memory: the oldest episode is dropped once full.
#[derive(Debug, Clone)]
pub struct AgentMemory {
    episodes: VecDeque<Episode>,
    capacity: usize,
    cumulative_pnl: f64,
}

impl AgentMemory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            episodes: VecDeque::with_capacity(capacity),
            capacity,
            cumulative_pnl: 0.0,
        }
    }

    pub fn record(&mut self, episode: Episode) {
        if self.episodes.len() == self.capacity {
            self.episodes.pop_front();
        }
        self.cumulative_pnl += episode.pnl;
        self.episodes.push_back(episode);
    }

    pub fn last(&self) -> Option<&Episode> {
        self.episodes.back()
    }

    pub fn episodes(&self) -> impl Iterator<Item = &Episode> {
        self.episodes.iter()
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// PnL over every activation, including ones already evicted.
    pub fn cumulative_pnl(&self) -> f64 {
        self.cumulative_pnl
    }

    /// The last `k` episodes, one compact line each.
    pub fn summarize(&self, k: usize) -> String {
        if self.episodes.is_empty() {
            return "No prior decisions.".to_string();
        }
        let skip = self.episodes.len().saturating_sub(k);
        let mut out = String::new();
        for (i, ep) in self.episodes.iter().skip(skip).enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = write!(
                out,
                "t={} act={} qty={:.4} price={:.2} pnl={:.2} wealth={:.2} conf={:.2}",
                ep.step,
                ep.taken.action(),
                ep.taken.qty(),
                ep.price,
                ep.pnl,
                ep.wealth,
                ep.confidence
            );
        }
        out
    }
}
