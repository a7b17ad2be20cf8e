//! Report configuration.

use serde::{Deserialize, Serialize};

use crate::fetch::{PagePolicy, StopRule};
use crate::models::FUNDING_WINDOW_SECS;

/// Pagination and filtering knobs for one report run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Page size for order history requests
    pub order_page_size: u32,

    /// Page size for fill requests
    pub fill_page_size: u32,

    /// Page size for funding payment requests
    pub funding_page_size: u32,

    /// Only fills in markets ending with this suffix are kept
    pub perp_suffix: String,

    /// Trailing window for recent funding, in seconds
    pub funding_window_secs: i64,
}

impl ReportConfig {
    /// Order history signals its last page by coming back short.
    ///
    /// The next cursor is the page's lowest time with no offset, so records
    /// sharing that second are only seen again if this endpoint treats
    /// `end_time` as inclusive. It is assumed to.
    pub fn order_policy(&self) -> PagePolicy {
        PagePolicy {
            label: "order_history",
            page_size: self.order_page_size,
            cursor_offset: 0,
            stop: StopRule::ShortPage,
        }
    }

    /// Fills are walked with an overlapping `lowest + 1` cursor until a page
    /// holds at most one record.
    pub fn fill_policy(&self) -> PagePolicy {
        PagePolicy {
            label: "fills",
            page_size: self.fill_page_size,
            cursor_offset: 1,
            stop: StopRule::AtMostOne,
        }
    }

    pub fn funding_policy(&self) -> PagePolicy {
        PagePolicy {
            label: "funding_payments",
            page_size: self.funding_page_size,
            cursor_offset: 1,
            stop: StopRule::AtMostOne,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            order_page_size: 100,
            fill_page_size: 50,
            funding_page_size: 50,
            perp_suffix: "-PERP".to_string(),
            funding_window_secs: FUNDING_WINDOW_SECS,
        }
    }
}
