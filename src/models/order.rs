//! Order model: a closed order from the account's order history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::RawOrder;
use crate::error::MalformedRecordError;

use super::{parse_time, required, Identified, Side};

/// Closed order with its filled size and average fill price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,

    /// Creation time, truncated to whole seconds
    pub time: DateTime<Utc>,

    pub market: String,

    /// Filled size
    pub size: Decimal,

    /// Average fill price
    pub price: Decimal,

    pub side: Side,
}

impl Order {
    const RECORD: &'static str = "order";

    /// Whether a raw order belongs in the closed-order history.
    ///
    /// Closed orders that never filled are cancellations and carry no fill
    /// price, so they are skipped rather than treated as malformed.
    pub fn is_filled_and_closed(raw: &RawOrder) -> bool {
        raw.status.as_deref() == Some("closed")
            && raw.filled_size.map_or(true, |size| !size.is_zero())
    }
}

impl Identified for Order {
    fn id(&self) -> u64 {
        self.id
    }
}

impl TryFrom<RawOrder> for Order {
    type Error = MalformedRecordError;

    fn try_from(raw: RawOrder) -> Result<Self, Self::Error> {
        let created_at = required(raw.created_at, Self::RECORD, "createdAt")?;
        let side = required(raw.side, Self::RECORD, "side")?;
        let time = parse_time(Self::RECORD, &created_at)?;

        Ok(Self {
            id: required(raw.id, Self::RECORD, "id")?,
            time: DateTime::from_timestamp(time.timestamp(), 0).unwrap_or(time),
            market: required(raw.market, Self::RECORD, "market")?,
            size: required(raw.filled_size, Self::RECORD, "filledSize")?,
            price: required(raw.avg_fill_price, Self::RECORD, "avgFillPrice")?,
            side: Side::parse(Self::RECORD, &side)?,
        })
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} @ {}", self.side, self.size, self.price)
    }
}
