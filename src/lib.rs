// Re-export modules
pub mod archiver;
pub mod browser;
pub mod collector;
pub mod config;
pub mod error;
pub mod results;
pub mod utils;

#[cfg(test)]
mod tests;

// Re-export commonly used types for convenience
pub use archiver::{ArchiveOptions, archive};
pub use browser::{Browser, MemoryBrowser, WebDriverBrowser};
pub use collector::{Pagination, collect};
pub use config::{CollisionPolicy, CrawlConfig, FilenameMode};
pub use error::{Error, Result};
pub use results::{ArchivedPage, RunSummary};

use std::future::Future;
use std::io::Write;

/// Prepares the output directory, opens a WebDriver session and runs both phases.
///
/// The session is closed before this returns, whether the run succeeds, fails
/// or is cut short by `shutdown`.
pub async fn execute<W, S>(config: &CrawlConfig, out: &mut W, shutdown: S) -> Result<RunSummary>
where
    W: Write,
    S: Future<Output = ()>,
{
    config.validate()?;
    utils::prepare_output_dir(&config.output_dir).await?;

    ::log::info!("Connecting to WebDriver at {}", config.webdriver_url);
    let browser = WebDriverBrowser::connect(&config.webdriver_url, config.headless).await?;

    run(config, browser, out, shutdown).await
}

/// Runs the collection and archiving phases on an open browser session, then closes it.
///
/// If `shutdown` completes first the run stops with [`Error::Interrupted`].
/// Files already written stay on disk.
pub async fn run<B, W, S>(
    config: &CrawlConfig,
    mut browser: B,
    out: &mut W,
    shutdown: S,
) -> Result<RunSummary>
where
    B: Browser,
    W: Write,
    S: Future<Output = ()>,
{
    let outcome = tokio::select! {
        result = crawl(config, &mut browser, out) => result,
        _ = shutdown => {
            ::log::warn!("Shutdown requested, stopping run");
            Err(Error::Interrupted)
        }
    };

    if let Err(e) = browser.close().await {
        ::log::warn!("Failed to close browser session: {}", e);
    }

    outcome
}

/// Collection followed by archiving
async fn crawl<B: Browser, W: Write>(
    config: &CrawlConfig,
    browser: &mut B,
    out: &mut W,
) -> Result<RunSummary> {
    let links = collect(
        browser,
        &config.url,
        &config.selector,
        config.next_selector.as_deref(),
        &Pagination::from(config),
    )
    .await?;

    let written = archive(browser, &links, &ArchiveOptions::from(config), out).await?;

    Ok(RunSummary {
        links: links.len(),
        written,
    })
}
