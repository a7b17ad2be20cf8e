//! Account PnL report: fetch everything, aggregate by market, compute, render.

use std::fmt;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::api::ExchangeApi;
use crate::config::ReportConfig;
use crate::fetch::{fetch_fills, fetch_funding_payments, fetch_open_positions};
use crate::metrics::{MarketSummaries, PnlCalculator};
use crate::models::{MarketPnl, MarketSummary, PnlTotals};

/// One market's records and the figures computed from them.
#[derive(Debug, Clone, Serialize)]
pub struct MarketReport {
    pub summary: MarketSummary,
    pub pnl: MarketPnl,
}

/// Result of a full report run.
#[derive(Debug, Clone, Serialize)]
pub struct AccountReport {
    /// Reference time for the recent-funding window
    pub generated_at: DateTime<Utc>,

    /// Markets in order of first trade
    pub markets: Vec<MarketReport>,

    pub totals: PnlTotals,
}

impl AccountReport {
    pub fn from_summaries(
        summaries: MarketSummaries,
        calculator: &PnlCalculator,
        now: DateTime<Utc>,
    ) -> Self {
        let markets: Vec<MarketReport> = summaries
            .into_vec()
            .into_iter()
            .map(|summary| {
                let pnl = calculator.calculate(&summary, now);
                MarketReport { summary, pnl }
            })
            .collect();

        let totals: PnlTotals = markets.iter().map(|m| &m.pnl).sum();

        Self {
            generated_at: now,
            markets,
            totals,
        }
    }
}

/// Run the whole report against `api`.
///
/// Fills, positions and funding payments are fetched one after another.
/// Any failure aborts the run.
pub async fn build_report<A>(api: &A, config: &ReportConfig, now: DateTime<Utc>) -> Result<AccountReport>
where
    A: ExchangeApi + ?Sized,
{
    let trades = fetch_fills(api, config).await?;
    info!(trades = trades.len(), "Trades loaded");

    let positions = fetch_open_positions(api).await?;
    info!(positions = positions.len(), "Open positions loaded");

    let payments = fetch_funding_payments(api, config).await?;
    info!(payments = payments.len(), "Funding payments loaded");

    let summaries = MarketSummaries::summarize(trades, positions, payments);
    if summaries.is_empty() {
        info!("No perpetual market trades found");
    }

    let calculator = PnlCalculator::new(config.funding_window_secs);
    let report = AccountReport::from_summaries(summaries, &calculator, now);

    info!(
        markets = report.markets.len(),
        net_pnl = %report.totals.net_pnl(),
        "Report computed"
    );

    Ok(report)
}

impl fmt::Display for MarketReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pnl = &self.pnl;
        writeln!(
            f,
            "{}: PnL {:.2} | Funding {:.2} (24h {:.2}) | Net {:.2}",
            pnl.market,
            pnl.pnl,
            pnl.funding_total,
            pnl.funding_24h,
            pnl.net_pnl()
        )?;

        for trade in &self.summary.trades {
            writeln!(
                f,
                "  {} {} @ {} ({:.2}) at {}",
                trade.side,
                trade.size,
                trade.price,
                trade.notional(),
                trade.time.format("%Y-%m-%d %H:%M:%S")
            )?;
        }

        if !self.summary.open_positions.is_empty() {
            writeln!(f, "  Open positions:")?;
            for position in &self.summary.open_positions {
                writeln!(
                    f,
                    "    {} {} @ {} ({:.2})",
                    position.side,
                    position.size,
                    position.entry_price,
                    position.cost_basis()
                )?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for AccountReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for market in &self.markets {
            write!(f, "{}", market)?;
        }
        write!(
            f,
            "TOTAL: PnL {:.2} | Funding {:.2} (24h {:.2}) | Net {:.2}",
            self.totals.pnl,
            self.totals.funding_total,
            self.totals.funding_24h,
            self.totals.net_pnl()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::simulated::{fill, payment, position, SimulatedExchange, BASE_TIME};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(BASE_TIME, 0).unwrap()
    }

    fn exchange() -> SimulatedExchange {
        let fills = vec![
            fill(1, "BTC-PERP", "buy", dec!(10), dec!(5), BASE_TIME - 7200),
            fill(2, "BTC-PERP", "sell", dec!(4), dec!(6), BASE_TIME - 3600),
            fill(3, "ETH-PERP", "sell", dec!(1), dec!(100), BASE_TIME - 10),
            fill(4, "ETH/USD", "buy", dec!(1), dec!(100), BASE_TIME - 5),
        ];
        let payments = vec![
            payment(1, "BTC-PERP", dec!(1), BASE_TIME - 1800),
            payment(2, "BTC-PERP", dec!(2), BASE_TIME - 3 * 86_400),
            payment(3, "SOL-PERP", dec!(9), BASE_TIME - 60),
        ];
        let positions = vec![
            position("ETH-PERP", "sell", dec!(1), dec!(100)),
            position("SOL-PERP", "buy", dec!(5), dec!(20)),
        ];
        SimulatedExchange::new(Vec::new(), fills, payments, positions)
    }

    #[tokio::test]
    async fn test_report_end_to_end() {
        let api = exchange();

        let report = build_report(&api, &ReportConfig::default(), now()).await.unwrap();

        let markets: Vec<&str> = report.markets.iter().map(|m| m.pnl.market.as_str()).collect();
        assert_eq!(markets, vec!["ETH-PERP", "BTC-PERP"]);

        let btc = &report.markets[1].pnl;
        assert_eq!(btc.pnl, dec!(-26));
        assert_eq!(btc.funding_total, dec!(3));
        assert_eq!(btc.funding_24h, dec!(1));
        assert_eq!(btc.net_pnl(), dec!(-29));

        let eth = &report.markets[0].pnl;
        assert_eq!(eth.pnl, Decimal::ZERO);

        assert_eq!(report.totals.pnl, dec!(-26));
        assert_eq!(report.totals.funding_total, dec!(3));
        assert_eq!(report.totals.net_pnl(), dec!(-29));
    }

    #[tokio::test]
    async fn test_fetches_run_in_sequence() {
        let api = exchange();

        build_report(&api, &ReportConfig::default(), now()).await.unwrap();

        let calls = api.calls();
        let positions_at = calls.iter().position(|c| c == "positions(true)").unwrap();
        let first_funding = calls
            .iter()
            .position(|c| c.starts_with("funding_payments("))
            .unwrap();

        assert!(calls[..positions_at].iter().all(|c| c.starts_with("fills(")));
        assert!(positions_at < first_funding);
        assert!(calls[first_funding..].iter().all(|c| c.starts_with("funding_payments(")));
    }

    #[tokio::test]
    async fn test_position_failure_aborts_report() {
        let mut api = exchange();
        api.positions_error = Some("Not logged in".to_string());

        let err = build_report(&api, &ReportConfig::default(), now()).await.unwrap_err();

        assert!(format!("{:#}", err).contains("Not logged in"));
        assert!(!api.calls().iter().any(|c| c.starts_with("funding_payments(")));
    }

    #[tokio::test]
    async fn test_empty_account_renders_zero_totals() {
        let api = SimulatedExchange::empty();

        let report = build_report(&api, &ReportConfig::default(), now()).await.unwrap();

        assert!(report.markets.is_empty());
        assert_eq!(report.totals, PnlTotals::default());
        assert_eq!(
            report.to_string(),
            "TOTAL: PnL 0.00 | Funding 0.00 (24h 0.00) | Net 0.00"
        );
    }

    #[tokio::test]
    async fn test_rendering_lists_trades_and_positions() {
        let api = exchange();

        let report = build_report(&api, &ReportConfig::default(), now()).await.unwrap();
        let text = report.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "ETH-PERP: PnL 0.00 | Funding 0.00 (24h 0.00) | Net 0.00");
        assert!(lines[1].starts_with("  sell 1 @ 100 (100.00) at "));
        assert_eq!(lines[2], "  Open positions:");
        assert_eq!(lines[3], "    sell 1 @ 100 (100.00)");
        assert_eq!(lines[4], "BTC-PERP: PnL -26.00 | Funding 3.00 (24h 1.00) | Net -29.00");
        assert_eq!(lines.last().copied(), Some("TOTAL: PnL -26.00 | Funding 3.00 (24h 1.00) | Net -29.00"));
    }
}
