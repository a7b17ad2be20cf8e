//! Groups trades, open positions and funding payments by market.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{FundingPayment, MarketSummary, OpenPosition, Trade};

/// Market summaries in order of each market's first trade.
///
/// A market exists only once a trade has been added for it. Positions and
/// funding payments for unknown markets are dropped.
#[derive(Debug, Default)]
pub struct MarketSummaries {
    summaries: Vec<MarketSummary>,
    index: HashMap<String, usize>,
}

impl MarketSummaries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the full mapping. Trades go first since they gate the rest.
    pub fn summarize(
        trades: Vec<Trade>,
        positions: Vec<OpenPosition>,
        payments: Vec<FundingPayment>,
    ) -> Self {
        let mut summaries = Self::new();

        for trade in trades {
            summaries.add_trade(trade);
        }

        let mut dropped_positions = 0usize;
        for position in positions {
            if !summaries.attach_position(position) {
                dropped_positions += 1;
            }
        }

        let mut dropped_payments = 0usize;
        for payment in payments {
            if !summaries.attach_funding_payment(payment) {
                dropped_payments += 1;
            }
        }

        debug!(
            markets = summaries.len(),
            dropped_positions, dropped_payments, "Markets aggregated"
        );

        summaries
    }

    pub fn add_trade(&mut self, trade: Trade) {
        match self.index.get(&trade.market) {
            Some(&i) => self.summaries[i].trades.push(trade),
            None => {
                self.index.insert(trade.market.clone(), self.summaries.len());
                self.summaries.push(MarketSummary::from_trade(trade));
            }
        }
    }

    /// Returns false when the position's market has no trades.
    pub fn attach_position(&mut self, position: OpenPosition) -> bool {
        match self.get_mut(&position.market) {
            Some(summary) => {
                summary.open_positions.push(position);
                true
            }
            None => {
                debug!(market = %position.market, "Dropping position for market without trades");
                false
            }
        }
    }

    /// Returns false when the payment's market has no trades.
    pub fn attach_funding_payment(&mut self, payment: FundingPayment) -> bool {
        match self.get_mut(&payment.market) {
            Some(summary) => {
                summary.funding_payments.push(payment);
                true
            }
            None => {
                debug!(
                    market = %payment.market,
                    id = payment.id,
                    "Dropping funding payment for market without trades"
                );
                false
            }
        }
    }

    fn get_mut(&mut self, market: &str) -> Option<&mut MarketSummary> {
        match self.index.get(market) {
            Some(&i) => self.summaries.get_mut(i),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    pub fn into_vec(self) -> Vec<MarketSummary> {
        self.summaries
    }
}
