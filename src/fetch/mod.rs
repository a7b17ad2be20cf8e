//! Complete, duplicate-free history retrieval from the exchange.

mod dedup;
mod history;
mod paginator;

pub use dedup::dedup_by_id;
pub use history::{fetch_fills, fetch_funding_payments, fetch_open_positions, fetch_orders};
pub use paginator::{fetch_all, PagePolicy, PageRequest, StopRule};
