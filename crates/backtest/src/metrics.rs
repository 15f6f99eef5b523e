//! Performance metrics over the account NAV series.
//!
//! Pure functions of the account curve: nothing here feeds back into the
//! simulation. Annualization assumes mainland daily bars.

use chrono::NaiveDate;
use serde::Serialize;

use crate::account::AccountCurve;

/// Trading days per year on the mainland exchanges.
const TRADING_DAYS_PER_YEAR: f64 = 245.0;

/// Performance summary for one simulation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PerformanceReport {
    /// Final NAV.
    pub cumulative_nav: f64,
    /// Geometric annualized return.
    pub annualized_return: f64,
    /// Annualized standard deviation of daily returns.
    pub annualized_volatility: f64,
    /// Annualized return over annualized volatility (0 risk-free rate).
    pub sharpe_ratio: f64,
    /// Deepest peak-to-trough NAV loss, as a fraction of the peak.
    pub max_drawdown: f64,
    /// Date of the peak preceding the deepest drawdown.
    pub max_drawdown_start: Option<NaiveDate>,
    /// Date of the trough of the deepest drawdown.
    pub max_drawdown_end: Option<NaiveDate>,
    /// Fraction of bars with a positive daily return.
    pub daily_win_rate: f64,
    /// Total frictions paid over the run.
    pub total_fees: f64,
}

impl PerformanceReport {
    /// Evaluate an account curve.
    pub fn from_curve(curve: &AccountCurve) -> Self {
        let nav = curve.nav_series();
        if nav.is_empty() {
            return Self::default();
        }

        let n_bars = nav.len() as f64;
        let cumulative_nav = *nav.last().unwrap();
        let annualized_return = if cumulative_nav > 0.0 {
            cumulative_nav.powf(TRADING_DAYS_PER_YEAR / n_bars) - 1.0
        } else {
            -1.0
        };

        // Daily returns skip the undefined first bar.
        let returns: Vec<f64> = curve
            .rows
            .iter()
            .map(|r| r.ret)
            .filter(|r| r.is_finite())
            .collect();

        let annualized_volatility = std_dev(&returns) * TRADING_DAYS_PER_YEAR.sqrt();
        let sharpe_ratio = if annualized_volatility > 0.0 {
            annualized_return / annualized_volatility
        } else {
            0.0
        };

        let wins = returns.iter().filter(|&&r| r > 0.0).count();
        let daily_win_rate = if returns.is_empty() {
            0.0
        } else {
            wins as f64 / returns.len() as f64
        };

        let (max_drawdown, max_drawdown_start, max_drawdown_end) = deepest_drawdown(curve);

        Self {
            cumulative_nav,
            annualized_return,
            annualized_volatility,
            sharpe_ratio,
            max_drawdown,
            max_drawdown_start,
            max_drawdown_end,
            daily_win_rate,
            total_fees: curve.total_fees(),
        }
    }
}

/// Deepest peak-to-trough loss with the dates of the peak and the trough.
fn deepest_drawdown(curve: &AccountCurve) -> (f64, Option<NaiveDate>, Option<NaiveDate>) {
    let mut peak = f64::MIN;
    let mut peak_date = None;
    let mut max_dd = 0.0;
    let mut dd_start = None;
    let mut dd_end = None;

    for row in &curve.rows {
        if row.nav > peak {
            peak = row.nav;
            peak_date = Some(row.date);
        }
        let dd = 1.0 - row.nav / peak;
        if dd > max_dd {
            max_dd = dd;
            dd_start = peak_date;
            dd_end = Some(row.date);
        }
    }

    (max_dd, dd_start, dd_end)
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::RawBarSeries;
    use approx::assert_relative_eq;

    fn curve_from_navs(navs: &[f64]) -> AccountCurve {
        let init_cash = 1000.0;
        let raw = RawBarSeries {
            cash: navs.iter().map(|n| n * init_cash).collect(),
            position_value: vec![0.0; navs.len()],
            stamp_tax: vec![0.0; navs.len()],
            commission: vec![0.0; navs.len()],
            skipped_allocations: 0,
        };
        let ts: Vec<i64> = (1..=navs.len() as i64).map(|d| d * 86_400).collect();
        AccountCurve::build(&ts, &raw, init_cash).unwrap()
    }

    #[test]
    fn test_flat_curve() {
        let report = PerformanceReport::from_curve(&curve_from_navs(&[1.0, 1.0, 1.0]));
        assert_relative_eq!(report.cumulative_nav, 1.0, epsilon = 1e-12);
        assert_relative_eq!(report.annualized_return, 0.0, epsilon = 1e-12);
        assert_eq!(report.max_drawdown, 0.0);
        assert_eq!(report.max_drawdown_end, None);
        assert_eq!(report.daily_win_rate, 0.0);
    }

    #[test]
    fn test_annualized_return_compounds() {
        // One year of bars doubling the account.
        let mut navs = Vec::new();
        for i in 0..245 {
            navs.push(1.0 + (i as f64 + 1.0) / 245.0);
        }
        let report = PerformanceReport::from_curve(&curve_from_navs(&navs));
        assert_relative_eq!(report.annualized_return, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_drawdown_dates() {
        let curve = curve_from_navs(&[1.0, 1.2, 0.9, 1.3, 1.1]);
        let report = PerformanceReport::from_curve(&curve);

        // Deepest loss: 1.2 -> 0.9.
        assert_relative_eq!(report.max_drawdown, 1.0 - 0.9 / 1.2, epsilon = 1e-12);
        assert_eq!(report.max_drawdown_start, Some(curve.rows[1].date));
        assert_eq!(report.max_drawdown_end, Some(curve.rows[2].date));
    }

    #[test]
    fn test_win_rate() {
        let report = PerformanceReport::from_curve(&curve_from_navs(&[1.0, 1.1, 1.0, 1.2]));
        // Returns: +, -, + over three defined bars.
        assert_relative_eq!(report.daily_win_rate, 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_curve() {
        let report = PerformanceReport::from_curve(&curve_from_navs(&[]));
        assert_eq!(report.cumulative_nav, 0.0);
        assert_eq!(report.max_drawdown, 0.0);
    }
}
