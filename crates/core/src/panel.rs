//! Market data panel: per-bar timestamps and dense price matrices.
//!
//! All price data is materialized as dense `[bars x symbols]` arrays before
//! the simulation loop starts; `NaN` marks a symbol that did not trade on a
//! bar (halt). The panel is immutable once constructed and every shape
//! precondition is checked at construction, never inside the loop.

use crate::error::{Error, Result};
use crate::symbols::SymbolType;

/// Timestamp in seconds since Unix epoch (UTC), one per bar.
pub type TimestampSec = i64;

/// Dense row-major `[bars x symbols]` matrix of f64 prices.
#[derive(Debug, Clone)]
pub struct PriceMatrix {
    data: Vec<f64>,
    n_bars: usize,
    n_symbols: usize,
}

impl PriceMatrix {
    /// Create a matrix from row-major data.
    pub fn new(data: Vec<f64>, n_bars: usize, n_symbols: usize) -> Result<Self> {
        if data.len() != n_bars * n_symbols {
            return Err(Error::data(format!(
                "matrix length {} does not match shape {}x{}",
                data.len(),
                n_bars,
                n_symbols
            )));
        }
        Ok(Self {
            data,
            n_bars,
            n_symbols,
        })
    }

    /// Create a matrix from per-bar rows. All rows must have the same width.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n_bars = rows.len();
        let n_symbols = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(n_bars * n_symbols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_symbols {
                return Err(Error::data(format!(
                    "row {} has width {}, expected {}",
                    i,
                    row.len(),
                    n_symbols
                )));
            }
            data.extend_from_slice(row);
        }
        Self::new(data, n_bars, n_symbols)
    }

    /// Matrix shape as `(bars, symbols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_bars, self.n_symbols)
    }

    /// One bar's prices across all symbols.
    #[inline]
    pub fn row(&self, bar: usize) -> &[f64] {
        &self.data[bar * self.n_symbols..(bar + 1) * self.n_symbols]
    }

    /// Single price lookup.
    #[inline]
    pub fn get(&self, bar: usize, symbol: usize) -> f64 {
        self.data[bar * self.n_symbols + symbol]
    }
}

/// Immutable per-bar market data consumed by the simulation driver.
#[derive(Debug, Clone)]
pub struct MarketDataPanel {
    timestamps: Vec<TimestampSec>,
    open: PriceMatrix,
    close: PriceMatrix,
    preclose: PriceMatrix,
    symbol_types: Vec<SymbolType>,
}

impl MarketDataPanel {
    /// Build a panel, validating every alignment precondition.
    ///
    /// Misaligned shapes or non-monotonic timestamps would silently corrupt
    /// years of downstream accounting, so they are fatal here.
    pub fn new(
        timestamps: Vec<TimestampSec>,
        open: PriceMatrix,
        close: PriceMatrix,
        preclose: PriceMatrix,
        symbol_types: Vec<SymbolType>,
    ) -> Result<Self> {
        let shape = open.shape();
        if close.shape() != shape || preclose.shape() != shape {
            return Err(Error::data(format!(
                "price matrices disagree on shape: open {:?}, close {:?}, preclose {:?}",
                shape,
                close.shape(),
                preclose.shape()
            )));
        }

        let (n_bars, n_symbols) = shape;
        if timestamps.len() != n_bars {
            return Err(Error::data(format!(
                "{} timestamps for {} bars",
                timestamps.len(),
                n_bars
            )));
        }
        if symbol_types.len() != n_symbols {
            return Err(Error::data(format!(
                "{} symbol types for {} symbols",
                symbol_types.len(),
                n_symbols
            )));
        }

        if let Some(w) = timestamps.windows(2).find(|w| w[1] <= w[0]) {
            return Err(Error::data(format!(
                "timestamps not strictly ascending: {} then {}",
                w[0], w[1]
            )));
        }

        Ok(Self {
            timestamps,
            open,
            close,
            preclose,
            symbol_types,
        })
    }

    /// Number of bars.
    #[inline]
    pub fn n_bars(&self) -> usize {
        self.timestamps.len()
    }

    /// Number of symbols.
    #[inline]
    pub fn n_symbols(&self) -> usize {
        self.symbol_types.len()
    }

    /// Timestamp of one bar.
    #[inline]
    pub fn timestamp(&self, bar: usize) -> TimestampSec {
        self.timestamps[bar]
    }

    /// All bar timestamps, ascending.
    #[inline]
    pub fn timestamps(&self) -> &[TimestampSec] {
        &self.timestamps
    }

    /// Open prices for one bar.
    #[inline]
    pub fn open_row(&self, bar: usize) -> &[f64] {
        self.open.row(bar)
    }

    /// Close prices for one bar.
    #[inline]
    pub fn close_row(&self, bar: usize) -> &[f64] {
        self.close.row(bar)
    }

    /// Previous-close prices for one bar (adjusted for corporate actions).
    #[inline]
    pub fn preclose_row(&self, bar: usize) -> &[f64] {
        self.preclose.row(bar)
    }

    /// Symbol board classification, aligned to the matrix columns.
    #[inline]
    pub fn symbol_types(&self) -> &[SymbolType] {
        &self.symbol_types
    }

    /// Find the bar index for an exact timestamp.
    pub fn find_bar(&self, ts: TimestampSec) -> Option<usize> {
        self.timestamps.binary_search(&ts).ok()
    }
}
