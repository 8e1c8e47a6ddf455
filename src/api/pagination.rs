//! Page-index pagination over the request executor
//!
//! Fetches pages 0, 1, 2, ... and concatenates their items until a stop rule
//! fires. Failures never escape: the pages gathered so far are returned.

use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use super::ApiOperation;
use crate::executor::RequestExecutor;

/// Maximum number of pages fetched for one listing.
const MAX_PAGES: u32 = 10_000;

/// When to stop fetching pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRule {
    /// Stop at the first empty page (top-level listings)
    Empty,
    /// Stop at the first page shorter than `page_size` (sub-resource listings)
    Short {
        /// Expected full page size
        page_size: u32,
    },
}

impl StopRule {
    fn is_last(&self, page_len: usize) -> bool {
        match self {
            Self::Empty => page_len == 0,
            Self::Short { page_size } => page_len < *page_size as usize,
        }
    }
}

/// Outcome of a pagination run.
#[derive(Debug, Clone, PartialEq)]
pub struct Paged<T> {
    /// Items in server order
    pub items: Vec<T>,
    /// Number of page requests issued
    pub pages_fetched: u32,
    /// Whether a failure cut the listing short
    pub truncated: bool,
}

/// Drives the executor across pages.
pub struct Paginator<'a> {
    executor: &'a RequestExecutor,
}

impl<'a> Paginator<'a> {
    /// Paginator over `executor`.
    pub fn new(executor: &'a RequestExecutor) -> Self {
        Self { executor }
    }

    /// Collect every page produced by `page_op`.
    ///
    /// `page_op` builds the operation for a 0-based page index. Items are read
    /// from the operation's items field. Errors are logged and the partial
    /// result is returned.
    pub async fn collect<T, F>(&self, label: &str, stop: StopRule, mut page_op: F) -> Paged<T>
    where
        T: DeserializeOwned,
        F: FnMut(u32) -> ApiOperation,
    {
        let mut items = Vec::new();
        let mut page = 0;
        let mut truncated = false;

        loop {
            if page >= MAX_PAGES {
                warn!(
                    "Stopping {} after {} pages; possible pagination loop",
                    label, MAX_PAGES
                );
                truncated = true;
                break;
            }

            let operation = page_op(page);
            let field = operation.items_field();

            let batch: Vec<T> = match self.executor.execute(&operation).await {
                Ok(response) => match response.into_items(field) {
                    Ok(batch) => batch,
                    Err(e) => {
                        error!("Error reading {} page {}: {}", label, page, e);
                        page += 1;
                        truncated = true;
                        break;
                    }
                },
                Err(e) => {
                    error!("Error fetching {} page {}: {}", label, page, e);
                    page += 1;
                    truncated = true;
                    break;
                }
            };

            page += 1;
            let batch_len = batch.len();
            items.extend(batch);
            debug!("Fetched {} {} so far (page {})", items.len(), label, page);

            if stop.is_last(batch_len) {
                break;
            }
        }

        Paged {
            items,
            pages_fetched: page,
            truncated,
        }
    }
}
