//! Core types and configuration for the rebalance simulation engine.
//!
//! This crate provides shared types used by the backtest crate:
//! - Market data panel (per-bar timestamps + open/close/preclose matrices)
//! - Symbol board classification for the mainland exchanges
//! - Simulation parameters and rebalance schedules
//! - Common error types

pub mod config;
pub mod error;
pub mod panel;
pub mod schedule;
pub mod symbols;

pub use config::SimulationParams;
pub use error::{Error, Result};
pub use panel::{MarketDataPanel, PriceMatrix, TimestampSec};
pub use schedule::RebalanceSchedule;
pub use symbols::SymbolType;
