use super::Browser;
use crate::error::{Error, Result};
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use url::Url;

/// Element found on a [`MemoryBrowser`] page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryElement {
    attrs: HashMap<String, String>,
    href: Option<String>,
}

/// An offline browser serving fixture pages from memory.
///
/// Selectors are matched with `scraper`, so the collector and archiver run the
/// same code path they do against a real browser. Clicking an element with an
/// `href` follows it; clicking anything else does nothing.
#[derive(Debug, Default)]
pub struct MemoryBrowser {
    pages: HashMap<String, String>,
    redirects: HashMap<String, String>,
    current: Option<String>,
    history: Vec<String>,
    closed: Arc<AtomicBool>,
}

impl MemoryBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` at `url`
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Answer requests for `from` with the page at `to`
    pub fn with_redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    /// Every URL requested so far, in order (before redirects)
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Flag that flips once the session has been closed
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }

    fn current_page(&self) -> Result<(&str, &str)> {
        let url = self.current.as_deref().ok_or_else(|| Error::Navigation {
            url: "about:blank".to_string(),
            reason: "no page has been visited yet".to_string(),
        })?;
        let html = self.pages.get(url).map(String::as_str).unwrap_or_default();
        Ok((url, html))
    }
}

/// Resolves an href against the page it was found on
fn resolve(base: &str, href: &str) -> String {
    match Url::parse(base).and_then(|base| base.join(href)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => href.to_string(),
    }
}

impl Browser for MemoryBrowser {
    type Element = MemoryElement;

    async fn visit(&mut self, url: &str) -> Result<()> {
        self.history.push(url.to_string());
        let target = self.redirects.get(url).map(String::as_str).unwrap_or(url);
        if !self.pages.contains_key(target) {
            return Err(Error::Navigation {
                url: url.to_string(),
                reason: "no such page".to_string(),
            });
        }
        self.current = Some(target.to_string());
        Ok(())
    }

    async fn find_by_css(&mut self, selector: &str) -> Result<Vec<MemoryElement>> {
        let parsed =
            Selector::parse(selector).map_err(|e| Error::Selector(format!("{}: {:?}", selector, e)))?;
        let (url, html) = self.current_page()?;
        let doc = Html::parse_document(html);

        let elements = doc
            .select(&parsed)
            .map(|e| {
                let attrs = e
                    .value()
                    .attrs()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                let href = e.value().attr("href").map(|h| resolve(url, h));
                MemoryElement { attrs, href }
            })
            .collect::<Vec<_>>();

        ::log::trace!("{} elements match `{}` on {}", elements.len(), selector, url);
        Ok(elements)
    }

    async fn attr(&mut self, element: &MemoryElement, name: &str) -> Result<Option<String>> {
        if name == "href" {
            return Ok(element.href.clone());
        }
        Ok(element.attrs.get(name).cloned())
    }

    async fn click(&mut self, element: &MemoryElement) -> Result<()> {
        match element.href.clone() {
            Some(href) => self.visit(&href).await,
            None => Ok(()),
        }
    }

    async fn title(&mut self) -> Result<String> {
        let (_, html) = self.current_page()?;
        let doc = Html::parse_document(html);
        let title_selector = Selector::parse("title").expect("static selector is valid");
        Ok(doc
            .select(&title_selector)
            .next()
            .map(|t| t.text().collect::<String>())
            .unwrap_or_default())
    }

    async fn url(&mut self) -> Result<String> {
        let (url, _) = self.current_page()?;
        Ok(url.to_string())
    }

    async fn html(&mut self) -> Result<String> {
        let (_, html) = self.current_page()?;
        Ok(html.to_string())
    }

    async fn close(self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
