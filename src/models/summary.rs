//! Per-market grouping of trades, open positions and funding payments.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{FundingPayment, OpenPosition, Trade};

/// Trailing window for recent funding.
pub const FUNDING_WINDOW_SECS: i64 = 86_400;

/// Everything the report knows about one market.
///
/// Only created from a trade, so `trades` is never empty.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSummary {
    pub market: String,
    pub trades: Vec<Trade>,
    pub open_positions: Vec<OpenPosition>,
    pub funding_payments: Vec<FundingPayment>,
}

impl MarketSummary {
    /// Seed a summary with the first trade seen for its market.
    pub fn from_trade(trade: Trade) -> Self {
        Self {
            market: trade.market.clone(),
            trades: vec![trade],
            open_positions: Vec::new(),
            funding_payments: Vec::new(),
        }
    }

    /// Cash flow of all trades, adjusted by the entry value of open positions.
    ///
    /// Open exposure is valued at entry price, not the live mark.
    pub fn compute_pnl(&self) -> Decimal {
        let realized: Decimal = self.trades.iter().map(Trade::cash_flow).sum();
        let open: Decimal = self
            .open_positions
            .iter()
            .map(OpenPosition::pnl_adjustment)
            .sum();
        realized + open
    }

    /// All funding fees ever paid in this market.
    pub fn compute_funding_payments(&self) -> Decimal {
        self.funding_payments.iter().map(|p| p.fee).sum()
    }

    /// Funding fees with `time >= cutoff`. The recent-funding figure passes
    /// `now - FUNDING_WINDOW_SECS`, so a payment exactly at the cutoff counts.
    pub fn compute_funding_payments_since(&self, cutoff: DateTime<Utc>) -> Decimal {
        self.funding_payments
            .iter()
            .filter(|p| p.time >= cutoff)
            .map(|p| p.fee)
            .sum()
    }
}
