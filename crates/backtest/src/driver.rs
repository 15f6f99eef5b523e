//! Per-bar simulation driver.
//!
//! Drives the ledger through one deterministic state machine per bar:
//! preclose refresh, open mark-to-market, rebalance transition, close
//! mark-to-market, record. A rebalance signal dated at bar `t` sells at bar
//! `t`'s close and buys at bar `t+1`'s open, so the weight-determination
//! reference never sees the traded price (one-bar execution lag).

use tracing::{debug, warn};

use rebal_core::{Error, MarketDataPanel, RebalanceSchedule, Result, SimulationParams};

use crate::ledger::Ledger;
use crate::sizer::LotSizer;

/// Cash tolerance for the overspend invariant, covering f64 accumulation
/// noise over a multi-year run.
const CASH_TOLERANCE: f64 = 1e-6;

/// Raw per-bar output arrays, one value per bar.
#[derive(Debug, Clone, Default)]
pub struct RawBarSeries {
    /// End-of-bar cash.
    pub cash: Vec<f64>,
    /// End-of-bar total position notional.
    pub position_value: Vec<f64>,
    /// Stamp tax charged this bar (0.0 on non-trade bars).
    pub stamp_tax: Vec<f64>,
    /// Commission charged this bar (0.0 on non-trade bars).
    pub commission: Vec<f64>,
    /// Rebalances where a positively-weighted symbol had no tradeable
    /// execution price and was skipped with a warning.
    pub skipped_allocations: u64,
}

impl RawBarSeries {
    fn with_capacity(n_bars: usize) -> Self {
        Self {
            cash: Vec::with_capacity(n_bars),
            position_value: Vec::with_capacity(n_bars),
            stamp_tax: Vec::with_capacity(n_bars),
            commission: Vec::with_capacity(n_bars),
            skipped_allocations: 0,
        }
    }

    /// Number of recorded bars.
    pub fn len(&self) -> usize {
        self.cash.len()
    }

    /// Whether anything was recorded.
    pub fn is_empty(&self) -> bool {
        self.cash.is_empty()
    }
}

/// Deterministic per-bar simulation over a panel and a rebalance schedule.
#[derive(Debug)]
pub struct SimulationDriver<'a> {
    panel: &'a MarketDataPanel,
    params: SimulationParams,
    schedule: &'a RebalanceSchedule,
}

impl<'a> SimulationDriver<'a> {
    /// Validate all fatal preconditions and build a driver.
    ///
    /// Parameter ranges and schedule/panel alignment are checked here so the
    /// per-bar loop never has to: a misaligned schedule aborts the run
    /// before it starts instead of silently skipping rebalances.
    pub fn new(
        panel: &'a MarketDataPanel,
        params: SimulationParams,
        schedule: &'a RebalanceSchedule,
    ) -> Result<Self> {
        params.validate()?;
        schedule.validate_against(panel)?;
        Ok(Self {
            panel,
            params,
            schedule,
        })
    }

    /// Run the full simulation with the given lot sizer.
    ///
    /// Completes in time proportional to bars x symbols; no allocation
    /// happens inside the loop beyond the output arrays.
    pub fn run(&self, sizer: &dyn LotSizer) -> Result<RawBarSeries> {
        let n_bars = self.panel.n_bars();
        let mut out = RawBarSeries::with_capacity(n_bars);

        let mut ledger = Ledger::new(
            self.params.init_cash,
            self.params.commission_rate,
            self.params.stamp_tax_rate,
            self.panel.n_symbols(),
        );

        let mut idx_adj = 0usize;
        let mut buy_next_open = false;

        for bar in 0..n_bars {
            // Absorb corporate-action price discontinuities without moving
            // value, then realize the overnight gap at the open.
            ledger.refresh_last_prices(self.panel.preclose_row(bar));
            ledger.mark_to_market(self.panel.open_row(bar));
            ledger.refresh_last_prices(self.panel.open_row(bar));

            let mut stamp_tax = 0.0;
            let mut commission = 0.0;

            if buy_next_open {
                // Redeploy the previous bar's sale proceeds at this open.
                let open = self.panel.open_row(bar);
                let weights = self.schedule.weights(idx_adj);
                out.skipped_allocations += self.count_untradeable(bar, open, weights);

                let targets =
                    sizer.target_notional(ledger.cash(), open, weights, self.panel.symbol_types());
                idx_adj += 1;
                buy_next_open = false;

                commission = ledger
                    .enter_positions(open, &targets)
                    .map_err(|e| e.at_bar(bar))?;

                if ledger.cash() < -CASH_TOLERANCE {
                    return Err(Error::invariant(
                        bar,
                        format!("cash overdrawn after entry: {}", ledger.cash()),
                    ));
                }
            } else if idx_adj < self.schedule.len()
                && self.schedule.timestamp(idx_adj) == self.panel.timestamp(bar)
            {
                // Signal dated today: clear the book at the close, buy at
                // the next open.
                let (st, cm) = ledger.liquidate_all(self.panel.close_row(bar));
                stamp_tax = st;
                commission = cm;
                buy_next_open = true;
            }

            // Realize the intraday move (a no-op revaluation if the book
            // was just cleared).
            ledger.mark_to_market(self.panel.close_row(bar));

            let position_value = ledger.total_position_value();
            if !(ledger.cash() + position_value).is_finite() {
                return Err(Error::invariant(bar, "account value is not finite"));
            }

            out.stamp_tax.push(stamp_tax);
            out.commission.push(commission);
            out.position_value.push(position_value);
            out.cash.push(ledger.cash());
        }

        debug!(
            bars = n_bars,
            sizer = sizer.name(),
            skipped = out.skipped_allocations,
            "simulation complete"
        );
        Ok(out)
    }

    /// Count positively-weighted symbols with no tradeable execution price.
    ///
    /// Degraded-continuity policy: the run keeps going on last-known-price
    /// carry-forward, but each skip is surfaced for logging rather than
    /// silently dropped.
    fn count_untradeable(&self, bar: usize, exec_prices: &[f64], weights: &[f64]) -> u64 {
        let mut skipped = 0u64;
        for (sym, (&w, &px)) in weights.iter().zip(exec_prices).enumerate() {
            if w > 0.0 && !px.is_finite() {
                warn!(bar, symbol = sym, weight = w, "no tradeable price at rebalance, skipping");
                skipped += 1;
            }
        }
        skipped
    }
}
