//! Funding payment model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::RawFundingPayment;
use crate::error::MalformedRecordError;

use super::{parse_time, required, Identified};

/// Periodic funding cash flow on a perpetual position.
///
/// `fee` keeps the exchange's sign: positive means the account paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingPayment {
    pub id: u64,
    pub market: String,
    pub fee: Decimal,
    pub time: DateTime<Utc>,
}

impl FundingPayment {
    const RECORD: &'static str = "funding payment";
}

impl Identified for FundingPayment {
    fn id(&self) -> u64 {
        self.id
    }
}

impl TryFrom<RawFundingPayment> for FundingPayment {
    type Error = MalformedRecordError;

    fn try_from(raw: RawFundingPayment) -> Result<Self, Self::Error> {
        let time = required(raw.time, Self::RECORD, "time")?;

        Ok(Self {
            id: required(raw.id, Self::RECORD, "id")?,
            market: required(raw.future, Self::RECORD, "future")?,
            fee: required(raw.payment, Self::RECORD, "payment")?,
            time: parse_time(Self::RECORD, &time)?,
        })
    }
}
