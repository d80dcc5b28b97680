// src/types/recommendation.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three things a recommendation can tell an investor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Hold => "HOLD",
        };
        f.pad(label)
    }
}

impl FromStr for Action {
    type Err = String;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Action::Buy),
            "SELL" => Ok(Action::Sell),
            "HOLD" => Ok(Action::Hold),
            other => Err(format!("unknown action `{other}`")),
        }
    }
}

/// Where the active recommendation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSource {
    /// Parsed from the live analyst's answer.
    Live,
    /// The moving-average rule, because the run is configured without a live analyst.
    Fallback,
    /// The moving-average rule, because the live analyst failed this step.
    Degraded,
}

impl fmt::Display for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SignalSource::Live => "live",
            SignalSource::Fallback => "fallback",
            SignalSource::Degraded => "degraded",
        };
        f.pad(label)
    }
}

/// A structured trading signal, read identically by every investor in a step.
///
/// Fields are private so a recommendation cannot be edited once produced;
/// the confidence is clamped into `[0, 1]` on construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    action: Action,
    confidence: f64,
    rationale: Option<String>,
    source: SignalSource,
}

impl Recommendation {
    pub fn new(action: Action, confidence: f64, source: SignalSource) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            action,
            confidence,
            rationale: None,
            source,
        }
    }

    /// A HOLD with no conviction. Trading on it is a no-op.
    pub fn neutral(source: SignalSource) -> Self {
        Self::new(Action::Hold, 0.0, source)
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn rationale(&self) -> Option<&str> {
        self.rationale.as_deref()
    }

    pub fn source(&self) -> SignalSource {
        self.source
    }
}
