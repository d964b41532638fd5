use crate::browser::Browser;
use crate::config::CrawlConfig;
use crate::error::Result;
use std::time::Duration;

/// Controls how the collector walks through listing pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Blind wait after clicking the next control
    pub settle: Duration,
    /// Stop after this many listing pages; `None` follows the next control until it disappears
    pub max_pages: Option<usize>,
}

impl From<&CrawlConfig> for Pagination {
    fn from(config: &CrawlConfig) -> Self {
        Self {
            settle: config.settle_delay(),
            max_pages: config.max_pages,
        }
    }
}

/// Collects link targets from a listing page and every page after it.
///
/// Starts at `start_url`, reads the `href` of each element matching
/// `link_selector` and, when `next_selector` is given, clicks the first element
/// it matches to move on. Stops when the next control is missing or the page
/// cap is reached. Links are returned in discovery order, duplicates included.
///
/// Without a page cap a next control that never disappears keeps this running
/// forever.
pub async fn collect<B: Browser>(
    browser: &mut B,
    start_url: &str,
    link_selector: &str,
    next_selector: Option<&str>,
    pagination: &Pagination,
) -> Result<Vec<String>> {
    ::log::info!("Collecting links from {}", start_url);
    browser.visit(start_url).await?;

    let mut links = Vec::new();
    let mut page = 1;

    loop {
        ::log::info!("Finding links on listing page {}", page);
        let found = harvest_links(browser, link_selector).await?;
        ::log::info!("Found {} links on listing page {}", found.len(), page);
        links.extend(found);

        // Single-page mode
        let Some(next_selector) = next_selector else {
            break;
        };

        if pagination.max_pages.is_some_and(|max| page >= max) {
            ::log::warn!(
                "Stopping pagination after {} pages (page limit reached)",
                page
            );
            break;
        }

        let next_controls = browser.find_by_css(next_selector).await?;
        ::log::info!("next links found: {}", next_controls.len());

        let Some(next) = next_controls.first() else {
            ::log::debug!("No next control on listing page {}, pagination done", page);
            break;
        };

        browser.click(next).await?;
        tokio::time::sleep(pagination.settle).await;
        page += 1;
    }

    ::log::info!("Collected {} links from {} listing pages", links.len(), page);
    Ok(links)
}

/// Reads the `href` of every element matching `selector` on the current page.
///
/// Elements without an `href` are skipped.
pub async fn harvest_links<B: Browser>(browser: &mut B, selector: &str) -> Result<Vec<String>> {
    let elements = browser.find_by_css(selector).await?;
    let mut links = Vec::with_capacity(elements.len());

    for (index, element) in elements.iter().enumerate() {
        match browser.attr(element, "href").await? {
            Some(href) => links.push(href),
            None => ::log::warn!(
                "Element {} matching `{}` has no href, skipping",
                index,
                selector
            ),
        }
    }

    ::log::debug!(
        "First few links: {:?}",
        links.iter().take(5).collect::<Vec<_>>()
    );
    Ok(links)
}
