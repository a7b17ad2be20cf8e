//! Calculator for per-market PnL and funding figures.

use chrono::{DateTime, Duration, Utc};

use crate::models::{MarketPnl, MarketSummary, FUNDING_WINDOW_SECS};

/// Computes `MarketPnl` figures against a fixed point in time.
#[derive(Debug, Clone, Copy)]
pub struct PnlCalculator {
    funding_window: Duration,
}

impl PnlCalculator {
    pub fn new(funding_window_secs: i64) -> Self {
        Self {
            funding_window: Duration::seconds(funding_window_secs),
        }
    }

    /// Figures for one market as of `now`.
    ///
    /// Recent funding covers payments with `time >= now - window`.
    pub fn calculate(&self, summary: &MarketSummary, now: DateTime<Utc>) -> MarketPnl {
        MarketPnl {
            market: summary.market.clone(),
            pnl: summary.compute_pnl(),
            funding_total: summary.compute_funding_payments(),
            funding_24h: summary.compute_funding_payments_since(now - self.funding_window),
        }
    }
}

impl Default for PnlCalculator {
    fn default() -> Self {
        Self::new(FUNDING_WINDOW_SECS)
    }
}
