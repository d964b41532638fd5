pub mod memory;
pub mod webdriver;

pub use memory::{MemoryBrowser, MemoryElement};
pub use webdriver::WebDriverBrowser;

use crate::error::Result;

/// The browser capabilities the collector and archiver drive.
///
/// Implementations keep one session open until [`Browser::close`] is called.
/// Element handles are only valid for the page they were found on.
#[allow(async_fn_in_trait)]
pub trait Browser {
    /// Handle to an element on the current page
    type Element;

    /// Navigate to a URL and wait for the page to load
    async fn visit(&mut self, url: &str) -> Result<()>;

    /// All elements matching a CSS selector, in DOM order
    async fn find_by_css(&mut self, selector: &str) -> Result<Vec<Self::Element>>;

    /// Read an attribute of an element, `None` when it is absent.
    ///
    /// `href` comes back resolved against the page URL.
    async fn attr(&mut self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    /// Click or otherwise activate an element
    async fn click(&mut self, element: &Self::Element) -> Result<()>;

    /// Title of the current document
    async fn title(&mut self) -> Result<String>;

    /// Current URL, after any redirects
    async fn url(&mut self) -> Result<String>;

    /// Fully rendered source of the current document
    async fn html(&mut self) -> Result<String>;

    /// End the session
    async fn close(self) -> Result<()>;
}
