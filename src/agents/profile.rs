// src/agents/profile.rs

use super::config::{MODERATE_TOLERANCE, RISK_AVERSE_TOLERANCE, SPECULATIVE_TOLERANCE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Behavioral archetype of an investor. It fixes the risk tolerance used to
/// size trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestorProfile {
    RiskAverse,
    Moderate,
    Speculative,
}

impl InvestorProfile {
    /// Round-robin assignment by agent id.
    pub fn for_index(id: usize) -> Self {
        match id % 3 {
            0 => InvestorProfile::RiskAverse,
            1 => InvestorProfile::Moderate,
            _ => InvestorProfile::Speculative,
        }
    }

    pub fn risk_tolerance(self) -> f64 {
        match self {
            InvestorProfile::RiskAverse => RISK_AVERSE_TOLERANCE,
            InvestorProfile::Moderate => MODERATE_TOLERANCE,
            InvestorProfile::Speculative => SPECULATIVE_TOLERANCE,
        }
    }
}

impl fmt::Display for InvestorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvestorProfile::RiskAverse => "risk_averse",
            InvestorProfile::Moderate => "moderate",
            InvestorProfile::Speculative => "speculative",
        };
        f.pad(label)
    }
}
