//! Portfolio simulation engine for the rebalance framework.
//!
//! This crate provides:
//! - Notional ledger with halted-price carry-forward
//! - Pluggable lot sizing (proportional and board-lot)
//! - Per-bar simulation driver with one-bar execution lag
//! - Account-curve construction and performance metrics

pub mod account;
pub mod driver;
pub mod ledger;
pub mod metrics;
pub mod sizer;

pub use account::{AccountCurve, AccountRow};
pub use driver::{RawBarSeries, SimulationDriver};
pub use ledger::Ledger;
pub use metrics::PerformanceReport;
pub use sizer::{BoardLotSizer, LotSizer, WeightSizer};
