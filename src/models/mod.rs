//! Typed account records built from raw API responses, and per-market summaries.

mod funding;
mod metrics;
mod order;
mod position;
mod summary;
mod trade;

use chrono::{DateTime, Utc};

use crate::error::MalformedRecordError;

pub use funding::FundingPayment;
pub use metrics::{MarketPnl, PnlTotals};
pub use order::Order;
pub use position::OpenPosition;
pub use summary::{MarketSummary, FUNDING_WINDOW_SECS};
pub use trade::{Side, Trade};

/// A record carrying an exchange-assigned identifier, unique within one fetch.
pub trait Identified {
    fn id(&self) -> u64;
}

/// Unwrap a required wire field or name it in the error.
pub(crate) fn required<T>(
    value: Option<T>,
    record: &'static str,
    field: &'static str,
) -> Result<T, MalformedRecordError> {
    value.ok_or(MalformedRecordError::missing(record, field))
}

/// Parse an ISO-8601 timestamp as sent by the exchange.
pub(crate) fn parse_time(record: &'static str, value: &str) -> Result<DateTime<Utc>, MalformedRecordError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| MalformedRecordError::InvalidTimestamp {
            record,
            value: value.to_string(),
        })
}
