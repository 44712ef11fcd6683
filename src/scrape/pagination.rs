//! Generic "fetch every page until there is no next marker" protocol
//!
//! Listings are walked from page 1 and stop on the first page without a
//! next-page marker. The remote signal is the only natural bound, so a
//! ceiling guards against a page that always claims a successor.

use crate::scrape::html::{require, select_all, LayoutError};
use crate::scrape::layout::listing;
use crate::{AutopilotError, Result};
use async_trait::async_trait;
use scraper::Html;

/// One page of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next: bool,
}

/// Source of listing pages, numbered from 1
#[async_trait]
pub trait PageLoader: Send {
    type Item: Send;

    /// Fetches and parses page `page`
    async fn load_page(&mut self, page: u32) -> Result<Page<Self::Item>>;
}

/// Concatenates the items of every page, in page order
///
/// # Arguments
///
/// * `loader` - Fetches a single page
/// * `max_pages` - Ceiling on the number of pages fetched
///
/// # Returns
///
/// * `Ok(items)` - All items, once a page reported no successor
/// * `Err(AutopilotError::Protocol)` - The ceiling was reached first
/// * `Err(_)` - Any error from the loader, unchanged
pub async fn fetch_all_pages<L>(loader: &mut L, max_pages: u32) -> Result<Vec<L::Item>>
where
    L: PageLoader + ?Sized,
{
    let mut items = Vec::new();
    let mut page = 1;

    loop {
        if page > max_pages {
            return Err(AutopilotError::Protocol(format!(
                "pagination did not terminate within {} pages",
                max_pages
            )));
        }

        let fetched = loader.load_page(page).await?;
        tracing::debug!(
            "Page {}: {} items, next page: {}",
            page,
            fetched.items.len(),
            fetched.has_next
        );
        items.extend(fetched.items);

        if !fetched.has_next {
            break;
        }
        page += 1;
    }

    Ok(items)
}

/// Checks a listing page for a next-page marker
///
/// A page without the pagination container is malformed, not "last page".
pub fn has_next_page(document: &Html) -> std::result::Result<bool, LayoutError> {
    let pagination = require(document, listing::PAGINATION, "pagination_not_found")?;
    Ok(!select_all(pagination, listing::NEXT_MARKER)?.is_empty())
}
