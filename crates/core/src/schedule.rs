//! Rebalance schedule: dated target-weight vectors.
//!
//! Each scheduled timestamp carries one non-negative weight per symbol. The
//! driver sells the book at that bar's close and redeploys at the next
//! bar's open, so the schedule must be an exact ascending subset of the
//! panel's bar timestamps.

use crate::error::{Error, Result};
use crate::panel::{MarketDataPanel, TimestampSec};

/// Ascending rebalance dates paired with per-symbol target weights.
#[derive(Debug, Clone)]
pub struct RebalanceSchedule {
    timestamps: Vec<TimestampSec>,
    weights: Vec<Vec<f64>>,
}

impl RebalanceSchedule {
    /// Build a schedule, validating shape and weight preconditions.
    pub fn new(timestamps: Vec<TimestampSec>, weights: Vec<Vec<f64>>) -> Result<Self> {
        if timestamps.len() != weights.len() {
            return Err(Error::config(format!(
                "{} rebalance timestamps for {} weight rows",
                timestamps.len(),
                weights.len()
            )));
        }

        if let Some(w) = timestamps.windows(2).find(|w| w[1] <= w[0]) {
            return Err(Error::config(format!(
                "rebalance timestamps not strictly ascending: {} then {}",
                w[0], w[1]
            )));
        }

        let width = weights.first().map(Vec::len).unwrap_or(0);
        for (i, row) in weights.iter().enumerate() {
            if row.len() != width {
                return Err(Error::config(format!(
                    "weight row {} has width {}, expected {}",
                    i,
                    row.len(),
                    width
                )));
            }
            if let Some(&w) = row.iter().find(|w| !w.is_finite() || **w < 0.0) {
                return Err(Error::config(format!(
                    "weight row {i} contains invalid weight {w}"
                )));
            }
        }

        Ok(Self {
            timestamps,
            weights,
        })
    }

    /// Number of scheduled rebalances.
    #[inline]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the schedule is empty (pure hold-cash run).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Timestamp of one scheduled rebalance.
    #[inline]
    pub fn timestamp(&self, idx: usize) -> TimestampSec {
        self.timestamps[idx]
    }

    /// Target weights of one scheduled rebalance.
    #[inline]
    pub fn weights(&self, idx: usize) -> &[f64] {
        &self.weights[idx]
    }

    /// Check that the schedule is aligned to a panel.
    ///
    /// Every scheduled timestamp must exist in the panel's bar sequence and
    /// every weight row must span the panel's symbols. A timestamp that got
    /// silently skipped would corrupt all downstream accounting, so this is
    /// fatal before the loop starts.
    pub fn validate_against(&self, panel: &MarketDataPanel) -> Result<()> {
        for (idx, &ts) in self.timestamps.iter().enumerate() {
            if panel.find_bar(ts).is_none() {
                return Err(Error::config(format!(
                    "rebalance timestamp {ts} (index {idx}) not found in the bar sequence"
                )));
            }
        }
        if let Some(row) = self.weights.first() {
            if row.len() != panel.n_symbols() {
                return Err(Error::config(format!(
                    "weight rows span {} symbols, panel has {}",
                    row.len(),
                    panel.n_symbols()
                )));
            }
        }
        Ok(())
    }
}
