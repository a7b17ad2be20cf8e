//! Trade model: one executed fill in a perpetual futures market.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::api::RawFill;
use crate::error::MalformedRecordError;

use super::{parse_time, required, Identified};

/// Direction of a fill, order or position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }

    /// Parse the exchange's side string, attributing failures to `record`.
    pub(crate) fn parse(record: &'static str, value: &str) -> Result<Self, MalformedRecordError> {
        value.parse().map_err(|_| MalformedRecordError::InvalidSide {
            record,
            value: value.to_string(),
        })
    }
}

impl FromStr for Side {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Individual fill from the account's trade history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Fill identifier
    pub id: u64,

    /// Market symbol (e.g. "SOL-PERP")
    pub market: String,

    /// Execution price
    pub price: Decimal,

    /// Trade direction
    pub side: Side,

    /// Executed size in contracts
    pub size: Decimal,

    /// When the fill happened
    pub time: DateTime<Utc>,

    /// Fee charged for the fill
    pub fee: Decimal,
}

impl Trade {
    const RECORD: &'static str = "fill";

    /// Size times price.
    pub fn notional(&self) -> Decimal {
        self.size * self.price
    }

    /// Cash moved by this fill: buys pay out, sells take in.
    pub fn cash_flow(&self) -> Decimal {
        match self.side {
            Side::Buy => -self.notional(),
            Side::Sell => self.notional(),
        }
    }
}

impl Identified for Trade {
    fn id(&self) -> u64 {
        self.id
    }
}

impl TryFrom<RawFill> for Trade {
    type Error = MalformedRecordError;

    fn try_from(raw: RawFill) -> Result<Self, Self::Error> {
        let side = required(raw.side, Self::RECORD, "side")?;
        let time = required(raw.time, Self::RECORD, "time")?;

        Ok(Self {
            id: required(raw.id, Self::RECORD, "id")?,
            market: required(raw.market, Self::RECORD, "market")?,
            price: required(raw.price, Self::RECORD, "price")?,
            side: Side::parse(Self::RECORD, &side)?,
            size: required(raw.size, Self::RECORD, "size")?,
            time: parse_time(Self::RECORD, &time)?,
            fee: required(raw.fee, Self::RECORD, "fee")?,
        })
    }
}
