//! PnL figures for one market and for the whole account.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::Add;

/// Computed PnL figures for a single market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPnl {
    /// Market symbol
    pub market: String,

    /// Trade cash flow adjusted for open positions
    pub pnl: Decimal,

    /// Funding fees, all time
    pub funding_total: Decimal,

    /// Funding fees in the trailing window
    pub funding_24h: Decimal,
}

impl MarketPnl {
    /// PnL after funding fees.
    pub fn net_pnl(&self) -> Decimal {
        self.pnl - self.funding_total
    }
}

/// Account-wide sums of every market's figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PnlTotals {
    pub pnl: Decimal,
    pub funding_total: Decimal,
    pub funding_24h: Decimal,
}

impl PnlTotals {
    pub fn net_pnl(&self) -> Decimal {
        self.pnl - self.funding_total
    }
}

impl Add<&MarketPnl> for PnlTotals {
    type Output = PnlTotals;

    fn add(self, market: &MarketPnl) -> PnlTotals {
        PnlTotals {
            pnl: self.pnl + market.pnl,
            funding_total: self.funding_total + market.funding_total,
            funding_24h: self.funding_24h + market.funding_24h,
        }
    }
}

impl<'a> Sum<&'a MarketPnl> for PnlTotals {
    fn sum<I: Iterator<Item = &'a MarketPnl>>(iter: I) -> Self {
        iter.fold(PnlTotals::default(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn market(name: &str, pnl: Decimal, funding: Decimal, funding_24h: Decimal) -> MarketPnl {
        MarketPnl {
            market: name.to_string(),
            pnl,
            funding_total: funding,
            funding_24h,
        }
    }

    #[test]
    fn test_totals_are_elementwise_sums() {
        let markets = vec![
            market("BTC-PERP", dec!(-26), dec!(1), dec!(1)),
            market("ETH-PERP", dec!(100), dec!(-2.5), dec!(0.5)),
        ];

        let totals: PnlTotals = markets.iter().sum();
        assert_eq!(totals.pnl, dec!(74));
        assert_eq!(totals.funding_total, dec!(-1.5));
        assert_eq!(totals.funding_24h, dec!(1.5));
        assert_eq!(totals.net_pnl(), dec!(75.5));
    }

    #[test]
    fn test_no_markets_sum_to_zero() {
        let totals: PnlTotals = Vec::<MarketPnl>::new().iter().sum();
        assert_eq!(totals, PnlTotals::default());
        assert_eq!(totals.net_pnl(), Decimal::ZERO);
    }
}
