//! Wire types for the exchange REST API.
//!
//! Every field the report reads is optional here so that a missing value
//! surfaces as a `MalformedRecordError` from the model conversion instead of
//! an opaque JSON error for the whole page.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Standard `{ success, result, error }` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub result: Option<T>,
    pub error: Option<String>,
}

/// One page of records returned by a listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub result: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(result: Vec<T>) -> Self {
        Self { result }
    }
}

/// Order from `/orders/history`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrder {
    pub id: Option<u64>,
    pub created_at: Option<String>,
    pub market: Option<String>,
    pub filled_size: Option<Decimal>,
    pub avg_fill_price: Option<Decimal>,
    pub side: Option<String>,
    pub status: Option<String>,
}

/// Fill from `/fills`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFill {
    pub id: Option<u64>,
    pub market: Option<String>,
    pub price: Option<Decimal>,
    pub side: Option<String>,
    pub size: Option<Decimal>,
    pub time: Option<String>,
    pub fee: Option<Decimal>,
    #[serde(rename = "type")]
    pub fill_type: Option<String>,
}

/// Funding payment from `/funding_payments`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFundingPayment {
    pub id: Option<u64>,
    pub future: Option<String>,
    pub payment: Option<Decimal>,
    pub time: Option<String>,
}

/// Position from `/positions?showAvgPrice=true`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPosition {
    pub future: Option<String>,
    pub side: Option<String>,
    pub size: Option<Decimal>,
    pub recent_average_open_price: Option<Decimal>,
}
