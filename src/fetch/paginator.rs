//! Backward time-cursor pagination over listing endpoints that only accept
//! an `end_time` bound.
//!
//! Each request after the first asks for records ending at the lowest
//! timestamp seen on the previous page (plus an optional offset), so the
//! boundary record is fetched twice on purpose. Callers dedup afterwards.

use std::collections::HashSet;
use std::future::Future;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::api::{Page, RawFill, RawFundingPayment, RawOrder};
use crate::error::MalformedRecordError;
use crate::models::{parse_time, required};

/// How an endpoint signals that no older history remains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRule {
    /// The page came back with fewer records than requested.
    ShortPage,
    /// The page held at most one record.
    AtMostOne,
}

impl StopRule {
    pub fn is_last_page(&self, len: usize, page_size: u32) -> bool {
        match self {
            StopRule::ShortPage => len < page_size as usize,
            StopRule::AtMostOne => len <= 1,
        }
    }
}

/// Per-endpoint pagination settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePolicy {
    /// Endpoint name used in logs and error context
    pub label: &'static str,

    /// Records requested per call
    pub page_size: u32,

    /// Added to the page's lowest timestamp to form the next `end_time`
    pub cursor_offset: i64,

    pub stop: StopRule,
}

/// Arguments for one page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Upper time bound in unix seconds, `None` for the newest page
    pub end_time: Option<i64>,
    pub limit: u32,
}

/// Raw record fields the cursor walk depends on.
pub trait PagedRecord {
    fn record_id(&self) -> Result<u64, MalformedRecordError>;
    fn record_time(&self) -> Result<DateTime<Utc>, MalformedRecordError>;
}

/// Walk an endpoint backwards in time until its stop rule fires.
///
/// `build` turns each raw record into an output record, or `None` to skip
/// it. Skipped records still move the cursor. The result is the plain
/// concatenation of every page, duplicates included.
///
/// A full page of already-seen records whose cursor cannot move (more
/// records share one timestamp than fit on a page) is requested again at the
/// same cursor with a doubled limit. The cursor only steps strictly below
/// its current value once a page comes back short with nothing new, or once
/// the endpoint ignores the larger limit. In that last case records beyond
/// the server's own page size at that timestamp cannot be reached and a
/// warning is logged.
pub async fn fetch_all<R, T, F, Fut, B>(
    policy: &PagePolicy,
    mut fetch_page: F,
    mut build: B,
) -> Result<Vec<T>>
where
    R: PagedRecord,
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<R>>>,
    B: FnMut(R) -> Result<Option<T>, MalformedRecordError>,
{
    let mut records = Vec::new();
    let mut seen: HashSet<u64> = HashSet::new();
    let mut cursor: Option<i64> = None;
    let mut limit = policy.page_size;
    // Length of the page that triggered the current widened request
    let mut widened_from: Option<usize> = None;
    let mut pages = 0usize;

    loop {
        let request = PageRequest {
            end_time: cursor,
            limit,
        };

        info!(
            endpoint = policy.label,
            cursor = ?cursor,
            limit,
            "Fetching page"
        );

        let page = fetch_page(request).await.with_context(|| {
            format!("Failed to fetch {} page ending at {:?}", policy.label, cursor)
        })?;
        pages += 1;

        let page_len = page.result.len();
        let mut lowest: Option<i64> = None;
        let mut fresh = 0usize;

        for raw in page.result {
            let id = raw.record_id()?;
            let secs = raw.record_time()?.timestamp();

            lowest = Some(lowest.map_or(secs, |low| low.min(secs)));
            if seen.insert(id) {
                fresh += 1;
            }

            if let Some(record) = build(raw)? {
                records.push(record);
            }
        }

        debug!(
            endpoint = policy.label,
            page_len,
            fresh,
            lowest = ?lowest,
            "Page received"
        );

        // A widened request answered with no more records than before means
        // the endpoint caps its page size; its length says nothing about the end.
        let capped = widened_from.is_some_and(|previous| page_len <= previous);
        widened_from = None;

        if !capped && policy.stop.is_last_page(page_len, limit) {
            break;
        }
        let Some(lowest) = lowest else {
            break;
        };

        let mut next = lowest + policy.cursor_offset;
        if let Some(current) = cursor {
            if fresh == 0 && next >= current {
                if !capped && page_len >= limit as usize {
                    debug!(
                        endpoint = policy.label,
                        cursor = current,
                        limit,
                        "Page filled by known records, widening"
                    );
                    widened_from = Some(page_len);
                    limit = limit.saturating_mul(2);
                    continue;
                }

                if capped {
                    warn!(
                        endpoint = policy.label,
                        cursor = current,
                        page_len,
                        "Endpoint ignored a larger limit, records at this timestamp may be missed"
                    );
                }
                debug!(endpoint = policy.label, cursor = current, "Stepping cursor back");
                next = current - 1;
            }
        }

        if cursor != Some(next) {
            limit = policy.page_size;
        }
        cursor = Some(next);
    }

    info!(
        endpoint = policy.label,
        pages,
        records = records.len(),
        unique = seen.len(),
        "Pagination complete"
    );

    Ok(records)
}

impl PagedRecord for RawOrder {
    fn record_id(&self) -> Result<u64, MalformedRecordError> {
        required(self.id, "order", "id")
    }

    fn record_time(&self) -> Result<DateTime<Utc>, MalformedRecordError> {
        let value = required(self.created_at.as_deref(), "order", "createdAt")?;
        parse_time("order", value)
    }
}

impl PagedRecord for RawFill {
    fn record_id(&self) -> Result<u64, MalformedRecordError> {
        required(self.id, "fill", "id")
    }

    fn record_time(&self) -> Result<DateTime<Utc>, MalformedRecordError> {
        let value = required(self.time.as_deref(), "fill", "time")?;
        parse_time("fill", value)
    }
}

impl PagedRecord for RawFundingPayment {
    fn record_id(&self) -> Result<u64, MalformedRecordError> {
        required(self.id, "funding payment", "id")
    }

    fn record_time(&self) -> Result<DateTime<Utc>, MalformedRecordError> {
        let value = required(self.time.as_deref(), "funding payment", "time")?;
        parse_time("funding payment", value)
    }
}
