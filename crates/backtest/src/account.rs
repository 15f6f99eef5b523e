//! Account curve: the dated per-bar output table.
//!
//! Wraps the raw simulation arrays into the table consumed by performance
//! evaluation and reporting: total assets, NAV normalized by initial cash,
//! combined fees and NAV percent change.

use chrono::{DateTime, NaiveDate};
use serde::Serialize;

use rebal_core::{Error, Result, TimestampSec};

use crate::driver::RawBarSeries;

/// One dated row of the account table.
#[derive(Debug, Clone, Serialize)]
pub struct AccountRow {
    /// Trading date.
    pub date: NaiveDate,
    /// End-of-bar cash.
    pub cash: f64,
    /// End-of-bar position notional.
    pub position_value: f64,
    /// Stamp tax charged this bar.
    pub stamp_tax: f64,
    /// Commission charged this bar.
    pub commission: f64,
    /// `cash + position_value`.
    pub total_assets: f64,
    /// `total_assets / init_cash`.
    pub nav: f64,
    /// `stamp_tax + commission`.
    pub fees: f64,
    /// NAV percent change; `NaN` on the first bar.
    pub ret: f64,
}

/// Dated account table derived from one simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct AccountCurve {
    /// Initial cash the NAV is normalized by.
    pub init_cash: f64,
    /// One row per bar, ascending by date.
    pub rows: Vec<AccountRow>,
}

impl AccountCurve {
    /// Build the dated table from raw per-bar arrays.
    pub fn build(timestamps: &[TimestampSec], raw: &RawBarSeries, init_cash: f64) -> Result<Self> {
        let n = timestamps.len();
        if raw.cash.len() != n
            || raw.position_value.len() != n
            || raw.stamp_tax.len() != n
            || raw.commission.len() != n
        {
            return Err(Error::data(format!(
                "raw series length {} does not match {} timestamps",
                raw.len(),
                n
            )));
        }
        if init_cash <= 0.0 {
            return Err(Error::config(format!(
                "init_cash must be positive, got {init_cash}"
            )));
        }

        let mut rows = Vec::with_capacity(n);
        let mut prev_nav = f64::NAN;
        for bar in 0..n {
            let date = DateTime::from_timestamp(timestamps[bar], 0)
                .ok_or_else(|| Error::data(format!("timestamp {} out of range", timestamps[bar])))?
                .date_naive();

            let total_assets = raw.cash[bar] + raw.position_value[bar];
            let nav = total_assets / init_cash;
            let ret = nav / prev_nav - 1.0;
            prev_nav = nav;

            rows.push(AccountRow {
                date,
                cash: raw.cash[bar],
                position_value: raw.position_value[bar],
                stamp_tax: raw.stamp_tax[bar],
                commission: raw.commission[bar],
                total_assets,
                nav,
                fees: raw.stamp_tax[bar] + raw.commission[bar],
                ret,
            });
        }

        Ok(Self { init_cash, rows })
    }

    /// NAV series, one value per bar.
    pub fn nav_series(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.nav).collect()
    }

    /// Final NAV (1.0 when the table is empty).
    pub fn final_nav(&self) -> f64 {
        self.rows.last().map(|r| r.nav).unwrap_or(1.0)
    }

    /// Sum of all fees paid over the run.
    pub fn total_fees(&self) -> f64 {
        self.rows.iter().map(|r| r.fees).sum()
    }

    /// Serialize the table to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
