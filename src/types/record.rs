// src/types/record.rs

use crate::error::SimError;
use crate::types::recommendation::{Action, SignalSource};
use serde::Serialize;
use statrs::statistics::Statistics;
use std::io::Write;
use std::path::Path;

/// Aggregate market state after one completed step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub step: u64,
    pub price: f64,
    pub aggregate_holdings: f64,
    pub aggregate_cash: f64,
    /// Holdings marked to `price` plus cash, summed over the population.
    pub aggregate_wealth: f64,
    pub mean_holdings: f64,
    /// Units that changed hands this step, both directions.
    pub volume: f64,
    pub buys: usize,
    pub sells: usize,
    pub holds: usize,
    pub signal_action: Action,
    pub signal_confidence: f64,
    pub signal_source: SignalSource,
}

/// The append-only result of a run: one snapshot per completed step.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SimulationRecord {
    snapshots: Vec<Snapshot>,
}

impl SimulationRecord {
    pub fn with_capacity(steps: usize) -> Self {
        Self {
            snapshots: Vec::with_capacity(steps),
        }
    }

    pub(crate) fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    pub(crate) fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.price).collect()
    }

    /// Writes the record as CSV with a header row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), SimError> {
        let mut csv = csv::Writer::from_writer(writer);
        for snapshot in &self.snapshots {
            csv.serialize(snapshot)?;
        }
        csv.flush()?;
        Ok(())
    }

    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let file = std::fs::File::create(path)?;
        self.write_csv(std::io::BufWriter::new(file))
    }

    /// Price statistics over the run, measured from `initial_price`.
    pub fn summary(&self, initial_price: f64) -> RunSummary {
        let mut prev = initial_price;
        let log_returns: Vec<f64> = self
            .snapshots
            .iter()
            .map(|s| {
                let r = (s.price / prev).ln();
                prev = s.price;
                r
            })
            .collect();

        let mean_log_return = if log_returns.is_empty() {
            0.0
        } else {
            log_returns.iter().mean()
        };
        // Sample std-dev needs at least two observations.
        let return_std_dev = if log_returns.len() < 2 {
            0.0
        } else {
            log_returns.iter().std_dev()
        };

        RunSummary {
            steps: self.snapshots.len(),
            final_price: self.last().map_or(initial_price, |s| s.price),
            total_return: prev / initial_price - 1.0,
            mean_log_return,
            return_std_dev,
            total_volume: self.snapshots.iter().map(|s| s.volume).sum(),
            degraded_steps: self
                .snapshots
                .iter()
                .filter(|s| s.signal_source == SignalSource::Degraded)
                .count(),
        }
    }
}

impl<'a> IntoIterator for &'a SimulationRecord {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}

/// Headline numbers for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    pub steps: usize,
    pub final_price: f64,
    pub total_return: f64,
    pub mean_log_return: f64,
    /// Per-step standard deviation of log returns.
    pub return_std_dev: f64,
    pub total_volume: f64,
    /// Steps where the live analyst failed and the fallback rule stood in.
    pub degraded_steps: usize,
}
