//! Exchange API access: wire types, the `ExchangeApi` seam and its REST client.

mod client;
mod types;

#[cfg(test)]
pub mod simulated;

use anyhow::Result;
use async_trait::async_trait;

pub use client::{mask, Credentials, FtxClient, DEFAULT_BASE_URL};
pub use types::*;

/// The four read-only listing operations the report needs.
///
/// `end_time` is an upper bound in unix seconds; `None` asks for the most
/// recent page.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    async fn order_history(&self, end_time: Option<i64>, limit: u32) -> Result<Page<RawOrder>>;

    async fn fills(&self, end_time: Option<i64>, limit: u32) -> Result<Page<RawFill>>;

    async fn funding_payments(&self, end_time: Option<i64>) -> Result<Page<RawFundingPayment>>;

    async fn positions(&self, show_avg_price: bool) -> Result<Page<RawPosition>>;
}
