//! Account history fetches: one paginated walk per endpoint, deduplicated.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::api::{ExchangeApi, RawFill, RawFundingPayment, RawOrder};
use crate::config::ReportConfig;
use crate::error::MalformedRecordError;
use crate::models::{FundingPayment, OpenPosition, Order, Trade};

use super::{dedup_by_id, fetch_all, PageRequest};

/// Closed, filled orders from the full order history.
pub async fn fetch_orders<A>(api: &A, config: &ReportConfig) -> Result<Vec<Order>>
where
    A: ExchangeApi + ?Sized,
{
    let orders = fetch_all(
        &config.order_policy(),
        |req: PageRequest| api.order_history(req.end_time, req.limit),
        |raw: RawOrder| {
            if Order::is_filled_and_closed(&raw) {
                Order::try_from(raw).map(Some)
            } else {
                Ok(None)
            }
        },
    )
    .await
    .context("Failed to fetch order history")?;

    Ok(dedup_by_id(orders))
}

/// Order fills in perpetual markets from the full fill history.
pub async fn fetch_fills<A>(api: &A, config: &ReportConfig) -> Result<Vec<Trade>>
where
    A: ExchangeApi + ?Sized,
{
    let suffix = config.perp_suffix.as_str();

    let trades = fetch_all(
        &config.fill_policy(),
        |req: PageRequest| api.fills(req.end_time, req.limit),
        |raw: RawFill| {
            if is_perp_order_fill(&raw, suffix)? {
                Trade::try_from(raw).map(Some)
            } else {
                Ok(None)
            }
        },
    )
    .await
    .context("Failed to fetch fills")?;

    Ok(dedup_by_id(trades))
}

/// Every funding payment the account has received or paid.
pub async fn fetch_funding_payments<A>(api: &A, config: &ReportConfig) -> Result<Vec<FundingPayment>>
where
    A: ExchangeApi + ?Sized,
{
    let payments = fetch_all(
        &config.funding_policy(),
        |req: PageRequest| api.funding_payments(req.end_time),
        |raw: RawFundingPayment| FundingPayment::try_from(raw).map(Some),
    )
    .await
    .context("Failed to fetch funding payments")?;

    Ok(dedup_by_id(payments))
}

/// Positions with non-zero size.
pub async fn fetch_open_positions<A>(api: &A) -> Result<Vec<OpenPosition>>
where
    A: ExchangeApi + ?Sized,
{
    info!("Fetching positions");

    let page = api
        .positions(true)
        .await
        .context("Failed to fetch open positions")?;

    let mut positions = Vec::new();
    for raw in page.result {
        if OpenPosition::is_open(&raw)? {
            positions.push(OpenPosition::try_from(raw)?);
        }
    }

    debug!(open = positions.len(), "Positions fetched");
    Ok(positions)
}

fn is_perp_order_fill(raw: &RawFill, suffix: &str) -> Result<bool, MalformedRecordError> {
    let market = raw
        .market
        .as_deref()
        .ok_or(MalformedRecordError::missing("fill", "market"))?;
    Ok(raw.fill_type.as_deref() == Some("order") && market.ends_with(suffix))
}
