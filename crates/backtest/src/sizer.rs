//! Lot sizing: converting cash and target weights into per-symbol notional.
//!
//! Sizers are the swappable policy seam between stock selection and the
//! accounting core: one pure method, no ledger access. Alternative rounding
//! or allocation rules replace the sizer without touching ledger or driver.

use rebal_core::SymbolType;

/// Lot sizing policy.
///
/// Implementations must be deterministic, must never allocate more than
/// `cash` in total (entry commission included), and must skip symbol
/// classes their policy disallows.
pub trait LotSizer: Send + Sync {
    /// Compute the per-symbol target notional for one rebalance.
    ///
    /// `prices` are the execution prices (`NaN` = halted), `weights` the
    /// non-negative target weights and `symbol_types` the board
    /// classification, all aligned to the same symbol order.
    fn target_notional(
        &self,
        cash: f64,
        prices: &[f64],
        weights: &[f64],
        symbol_types: &[SymbolType],
    ) -> Vec<f64>;

    /// Sizer name for logging.
    fn name(&self) -> &str;
}

/// Proportional allocation: weights normalized over the allocatable symbols.
///
/// A symbol is allocatable when its weight is positive, its execution price
/// is defined and its board is not excluded (Beijing main board by default).
/// The invested budget withholds round-trip commission from cash so neither
/// the entry nor the eventual exit can overdraw the account.
#[derive(Debug, Clone)]
pub struct WeightSizer {
    commission_rate: f64,
    excluded: Vec<SymbolType>,
}

impl WeightSizer {
    /// Proportional sizer excluding the Beijing main board.
    pub fn new(commission_rate: f64) -> Self {
        Self::with_exclusions(commission_rate, vec![SymbolType::BseMain])
    }

    /// Proportional sizer with an explicit board-exclusion policy.
    pub fn with_exclusions(commission_rate: f64, excluded: Vec<SymbolType>) -> Self {
        Self {
            commission_rate,
            excluded,
        }
    }

    fn allocatable(&self, weight: f64, price: f64, symbol_type: SymbolType) -> bool {
        weight > 0.0 && price.is_finite() && price > 0.0 && !self.excluded.contains(&symbol_type)
    }

    /// Cash available for positions once round-trip commission is withheld.
    fn budget(&self, cash: f64) -> f64 {
        cash / (1.0 + 2.0 * self.commission_rate)
    }
}

impl LotSizer for WeightSizer {
    fn target_notional(
        &self,
        cash: f64,
        prices: &[f64],
        weights: &[f64],
        symbol_types: &[SymbolType],
    ) -> Vec<f64> {
        let mut targets = vec![0.0; weights.len()];
        if cash <= 0.0 {
            return targets;
        }

        let weight_sum: f64 = (0..weights.len())
            .filter(|&i| self.allocatable(weights[i], prices[i], symbol_types[i]))
            .map(|i| weights[i])
            .sum();
        if weight_sum <= 0.0 {
            return targets;
        }

        let budget = self.budget(cash);
        for i in 0..weights.len() {
            if self.allocatable(weights[i], prices[i], symbol_types[i]) {
                targets[i] = budget * weights[i] / weight_sum;
            }
        }
        targets
    }

    fn name(&self) -> &str {
        "weight"
    }
}

/// Board-lot allocation: proportional budget rounded down to whole lots.
///
/// Allocates like [`WeightSizer`], then converts each allocation into a
/// share count at the execution price, rounds down to the lot granularity
/// and drops positions below the venue's minimum first buy (200 shares on
/// the STAR market, 100 elsewhere). Odd lots are never bought, so the total
/// stays within budget by construction.
#[derive(Debug, Clone)]
pub struct BoardLotSizer {
    inner: WeightSizer,
    /// Shares per lot. Venue minimums still apply on top.
    lot_size: u32,
}

impl BoardLotSizer {
    /// Board-lot sizer with the standard 100-share lot.
    pub fn new(commission_rate: f64) -> Self {
        Self::with_lot_size(commission_rate, 100)
    }

    /// Board-lot sizer with a custom lot granularity.
    pub fn with_lot_size(commission_rate: f64, lot_size: u32) -> Self {
        Self::with_sizer(WeightSizer::new(commission_rate), lot_size)
    }

    /// Board-lot rounding over an explicit allocation policy, so a custom
    /// exclusion set composes with lot granularity.
    pub fn with_sizer(inner: WeightSizer, lot_size: u32) -> Self {
        Self {
            inner,
            lot_size: lot_size.max(1),
        }
    }
}

impl LotSizer for BoardLotSizer {
    fn target_notional(
        &self,
        cash: f64,
        prices: &[f64],
        weights: &[f64],
        symbol_types: &[SymbolType],
    ) -> Vec<f64> {
        let mut targets = self.inner.target_notional(cash, prices, weights, symbol_types);

        for (i, target) in targets.iter_mut().enumerate() {
            if *target <= 0.0 {
                continue;
            }
            let lot = self.lot_size as f64;
            let shares = (*target / prices[i] / lot).floor() * lot;
            if shares < symbol_types[i].min_board_lot() as f64 {
                *target = 0.0;
            } else {
                *target = shares * prices[i];
            }
        }
        targets
    }

    fn name(&self) -> &str {
        "board_lot"
    }
}
