//! Open position model: exposure still held in a market.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::RawPosition;
use crate::error::MalformedRecordError;

use super::{required, Side};

/// Currently open position, valued at its recent average open price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    /// Market symbol
    pub market: String,

    /// Long (buy) or short (sell)
    pub side: Side,

    /// Position size, always positive
    pub size: Decimal,

    /// Recent average open price
    pub entry_price: Decimal,
}

impl OpenPosition {
    const RECORD: &'static str = "position";

    /// Whether the raw position is actually open.
    pub fn is_open(raw: &RawPosition) -> Result<bool, MalformedRecordError> {
        let size = raw
            .size
            .ok_or(MalformedRecordError::missing(Self::RECORD, "size"))?;
        Ok(size > Decimal::ZERO)
    }

    /// Size times entry price.
    pub fn cost_basis(&self) -> Decimal {
        self.size * self.entry_price
    }

    /// Contribution of this position to a market's PnL: longs count as
    /// asset value held, shorts as a liability.
    pub fn pnl_adjustment(&self) -> Decimal {
        match self.side {
            Side::Buy => self.cost_basis(),
            Side::Sell => -self.cost_basis(),
        }
    }
}

impl TryFrom<RawPosition> for OpenPosition {
    type Error = MalformedRecordError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        let side = required(raw.side, Self::RECORD, "side")?;

        Ok(Self {
            market: required(raw.future, Self::RECORD, "future")?,
            side: Side::parse(Self::RECORD, &side)?,
            size: required(raw.size, Self::RECORD, "size")?,
            entry_price: required(
                raw.recent_average_open_price,
                Self::RECORD,
                "recentAverageOpenPrice",
            )?,
        })
    }
}
