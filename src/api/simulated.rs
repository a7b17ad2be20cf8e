//! In-memory exchange used by tests to exercise pagination and reports.

use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::DateTime;
use rust_decimal::Decimal;

use crate::fetch::PageRequest;

use super::types::*;
use super::ExchangeApi;

pub const BASE_TIME: i64 = 1_600_000_000;

/// How the simulated server treats `end_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Records with `time <= end_time`
    Inclusive,
    /// Records with `time < end_time`
    Exclusive,
}

/// Records served newest first, ties in insertion order.
pub struct SimulatedLedger<R = RawFill> {
    entries: Vec<(i64, R)>,
    boundary: Boundary,
}

impl<R: Clone> SimulatedLedger<R> {
    pub fn new(mut entries: Vec<(i64, R)>, boundary: Boundary) -> Self {
        entries.sort_by(|a, b| b.0.cmp(&a.0));
        Self { entries, boundary }
    }

    pub fn page(&self, end_time: Option<i64>, limit: u32) -> Page<R> {
        let result = self
            .entries
            .iter()
            .filter(|(t, _)| match (end_time, self.boundary) {
                (None, _) => true,
                (Some(end), Boundary::Inclusive) => *t <= end,
                (Some(end), Boundary::Exclusive) => *t < end,
            })
            .take(limit as usize)
            .map(|(_, r)| r.clone())
            .collect();
        Page::new(result)
    }

    pub fn fetch(&self, request: PageRequest) -> Result<Page<R>> {
        Ok(self.page(request.end_time, request.limit))
    }
}

impl SimulatedLedger<RawFill> {
    /// One group of fills per second, newest group first. Ids count up from 1.
    pub fn with_groups(groups: &[usize], boundary: Boundary) -> Self {
        let mut entries = Vec::new();
        let mut id = 1u64;
        for (age, count) in groups.iter().enumerate() {
            let secs = BASE_TIME - age as i64;
            for _ in 0..*count {
                entries.push((secs, fill(id, "BTC-PERP", "buy", Decimal::ONE, Decimal::ONE, secs)));
                id += 1;
            }
        }
        Self::new(entries, boundary)
    }

    pub fn all_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.entries.iter().filter_map(|(_, r)| r.id).collect();
        ids.sort_unstable();
        ids
    }

    pub fn newest_time(&self) -> i64 {
        self.entries.first().map_or(BASE_TIME, |(t, _)| *t)
    }

    pub fn corrupt_time(&mut self, index: usize) {
        self.entries[index].1.time = Some("not-a-time".to_string());
    }
}

/// RFC 3339 rendering of unix seconds, with the exchange's microsecond style.
pub fn iso(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string())
        .unwrap_or_default()
}

pub fn fill(id: u64, market: &str, side: &str, size: Decimal, price: Decimal, secs: i64) -> RawFill {
    RawFill {
        id: Some(id),
        market: Some(market.to_string()),
        price: Some(price),
        side: Some(side.to_string()),
        size: Some(size),
        time: Some(iso(secs)),
        fee: Some(Decimal::ZERO),
        fill_type: Some("order".to_string()),
    }
}

pub fn order(id: u64, market: &str, side: &str, size: Decimal, price: Decimal, secs: i64) -> RawOrder {
    RawOrder {
        id: Some(id),
        created_at: Some(iso(secs)),
        market: Some(market.to_string()),
        filled_size: Some(size),
        avg_fill_price: Some(price),
        side: Some(side.to_string()),
        status: Some("closed".to_string()),
    }
}

pub fn payment(id: u64, market: &str, fee: Decimal, secs: i64) -> RawFundingPayment {
    RawFundingPayment {
        id: Some(id),
        future: Some(market.to_string()),
        payment: Some(fee),
        time: Some(iso(secs)),
    }
}

pub fn position(market: &str, side: &str, size: Decimal, entry: Decimal) -> RawPosition {
    RawPosition {
        future: Some(market.to_string()),
        side: Some(side.to_string()),
        size: Some(size),
        recent_average_open_price: Some(entry),
    }
}

/// Exchange stand-in backed by ledgers, recording every call made to it.
pub struct SimulatedExchange {
    pub orders: SimulatedLedger<RawOrder>,
    pub fills: SimulatedLedger<RawFill>,
    pub funding: SimulatedLedger<RawFundingPayment>,
    pub positions: Vec<RawPosition>,

    /// Server-side page size of the funding endpoint, which takes no limit
    pub funding_page_limit: u32,

    /// Fail the positions call with this message
    pub positions_error: Option<String>,

    pub calls: Mutex<Vec<String>>,
}

impl SimulatedExchange {
    pub fn new(
        orders: Vec<RawOrder>,
        fills: Vec<RawFill>,
        funding: Vec<RawFundingPayment>,
        positions: Vec<RawPosition>,
    ) -> Self {
        let time_of = |value: &Option<String>| {
            value
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map_or(0, |t| t.timestamp())
        };

        Self {
            orders: SimulatedLedger::new(
                orders.into_iter().map(|o| (time_of(&o.created_at), o)).collect(),
                Boundary::Inclusive,
            ),
            fills: SimulatedLedger::new(
                fills.into_iter().map(|f| (time_of(&f.time), f)).collect(),
                Boundary::Inclusive,
            ),
            funding: SimulatedLedger::new(
                funding.into_iter().map(|p| (time_of(&p.time), p)).collect(),
                Boundary::Inclusive,
            ),
            positions,
            funding_page_limit: 50,
            positions_error: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new(), Vec::new())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl ExchangeApi for SimulatedExchange {
    async fn order_history(&self, end_time: Option<i64>, limit: u32) -> Result<Page<RawOrder>> {
        self.record(format!("order_history({:?}, {})", end_time, limit));
        Ok(self.orders.page(end_time, limit))
    }

    async fn fills(&self, end_time: Option<i64>, limit: u32) -> Result<Page<RawFill>> {
        self.record(format!("fills({:?}, {})", end_time, limit));
        Ok(self.fills.page(end_time, limit))
    }

    async fn funding_payments(&self, end_time: Option<i64>) -> Result<Page<RawFundingPayment>> {
        self.record(format!("funding_payments({:?})", end_time));
        Ok(self.funding.page(end_time, self.funding_page_limit))
    }

    async fn positions(&self, show_avg_price: bool) -> Result<Page<RawPosition>> {
        self.record(format!("positions({})", show_avg_price));
        if let Some(message) = &self.positions_error {
            return Err(anyhow!("{}", message));
        }
        Ok(Page::new(self.positions.clone()))
    }
}
