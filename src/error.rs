// src/error.rs

use std::time::Duration;
use thiserror::Error;

/// Fatal errors surfaced to whoever drives the simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid configuration, caught before the first step runs.
    #[error("invalid configuration: `{parameter}` must be {constraint} (got {value})")]
    Precondition {
        parameter: &'static str,
        constraint: &'static str,
        value: String,
    },

    /// The price process was asked to advance from a price it can never hold.
    #[error("price process cannot advance from a non-positive price ({price})")]
    NonPositivePrice { price: f64 },

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to write simulation record: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SimError {
    pub(crate) fn precondition(
        parameter: &'static str,
        constraint: &'static str,
        value: impl ToString,
    ) -> Self {
        SimError::Precondition {
            parameter,
            constraint,
            value: value.to_string(),
        }
    }
}

/// Why the live analysis path could not produce a recommendation.
///
/// These never leave the recommendation adapter: each one downgrades the
/// step to the moving-average fallback.
#[derive(Debug, Clone, Error)]
pub enum AnalystError {
    #[error("analyst did not answer within {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("malformed analyst response: {reason}")]
    Malformed { reason: String },

    #[error("analyst unavailable: {0}")]
    Unavailable(String),

    #[error("missing credential: set {0}")]
    MissingCredential(&'static str),

    #[error("transport error: {0}")]
    Transport(String),
}

impl AnalystError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        AnalystError::Malformed {
            reason: reason.into(),
        }
    }

    /// Classifies a reqwest failure. Timeouts carry the deadline that was
    /// exceeded; everything else is a transport error.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            AnalystError::Timeout(timeout)
        } else {
            AnalystError::Transport(err.to_string())
        }
    }
}
