//! Per-market aggregation and PnL computation.

mod aggregator;
mod calculator;

pub use aggregator::MarketSummaries;
pub use calculator::PnlCalculator;
