use super::Browser;
use crate::error::{Error, Result};
use fantoccini::elements::Element;
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;

/// Endpoints tried when the configured WebDriver URL refuses the session
const FALLBACK_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4444", // geckodriver / Selenium default
    "http://localhost:4723", // Appium default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// A browser session driven over the WebDriver protocol
pub struct WebDriverBrowser {
    client: Client,
}

impl WebDriverBrowser {
    /// Opens a session on the given WebDriver server, falling back to common local ports
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self> {
        let capabilities = session_capabilities(headless);

        match open_session(webdriver_url, &capabilities).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", webdriver_url);
                return Ok(Self { client });
            }
            Err(e) => {
                ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
            }
        }

        let mut tried = vec![webdriver_url.to_string()];
        for url in FALLBACK_URLS.iter() {
            if *url == webdriver_url {
                continue;
            }

            ::log::info!("Trying fallback WebDriver URL: {}", url);
            tried.push(url.to_string());
            // Don't log fallback errors to avoid log spam
            if let Ok(client) = open_session(url, &capabilities).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(Self { client });
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(Error::Connect(tried.join(", ")))
    }
}

async fn open_session(
    url: &str,
    capabilities: &Capabilities,
) -> std::result::Result<Client, fantoccini::error::NewSessionError> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities.clone());
    builder.connect(url).await
}

/// Capabilities requesting a headless window from Chrome and Firefox alike
fn session_capabilities(headless: bool) -> Capabilities {
    let mut capabilities = Capabilities::new();
    if headless {
        capabilities.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": ["--headless=new", "--disable-gpu"] }),
        );
        capabilities.insert(
            "moz:firefoxOptions".to_string(),
            json!({ "args": ["-headless"] }),
        );
    }
    capabilities
}

/// Maps a failed command to a navigation error when the session is gone
fn navigation_error(error: fantoccini::error::CmdError, url: &str) -> Error {
    if error.to_string().contains("Unable to find session") {
        ::log::warn!("Lost WebDriver session while loading {}", url);
    }
    Error::Navigation {
        url: url.to_string(),
        reason: error.to_string(),
    }
}

/// Chooses an element's value from its content attribute and DOM property.
///
/// The attribute decides whether there is a value at all: browsers report `""`
/// for the `href` property of an anchor without one. When present, the property
/// wins because it carries the resolved form (absolute href).
fn pick_value(attribute: Option<String>, property: Option<String>) -> Option<String> {
    let attribute = attribute?;
    match property {
        Some(property) if !property.is_empty() => Some(property),
        _ => Some(attribute),
    }
}

impl Browser for WebDriverBrowser {
    type Element = Element;

    async fn visit(&mut self, url: &str) -> Result<()> {
        ::log::debug!("VISIT: {}", url);
        self.client
            .goto(url)
            .await
            .map_err(|e| navigation_error(e, url))
    }

    async fn find_by_css(&mut self, selector: &str) -> Result<Vec<Element>> {
        self.client
            .find_all(Locator::Css(selector))
            .await
            .map_err(|e| Error::webdriver(format!("finding `{}`", selector), e))
    }

    async fn attr(&mut self, element: &Element, name: &str) -> Result<Option<String>> {
        let attribute = element
            .attr(name)
            .await
            .map_err(|e| Error::webdriver(format!("reading attribute `{}`", name), e))?;
        if attribute.is_none() {
            return Ok(None);
        }
        let property = element
            .prop(name)
            .await
            .map_err(|e| Error::webdriver(format!("reading property `{}`", name), e))?;
        Ok(pick_value(attribute, property))
    }

    async fn click(&mut self, element: &Element) -> Result<()> {
        element
            .click()
            .await
            .map_err(|e| Error::webdriver("clicking element", e))
    }

    async fn title(&mut self) -> Result<String> {
        self.client
            .title()
            .await
            .map_err(|e| Error::webdriver("reading title", e))
    }

    async fn url(&mut self) -> Result<String> {
        self.client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(|e| Error::webdriver("reading current URL", e))
    }

    async fn html(&mut self) -> Result<String> {
        self.client
            .source()
            .await
            .map_err(|e| Error::webdriver("getting page source", e))
    }

    async fn close(self) -> Result<()> {
        self.client
            .close()
            .await
            .map_err(|e| Error::webdriver("closing session", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_capabilities() {
        assert!(session_capabilities(false).is_empty());

        let caps = session_capabilities(true);
        assert_eq!(caps["moz:firefoxOptions"]["args"][0], "-headless");
        assert!(caps.contains_key("goog:chromeOptions"));
    }

    #[test]
    fn test_pick_value() {
        let some = |s: &str| Some(s.to_string());

        // Anchor without href: the property getter still answers ""
        assert_eq!(pick_value(None, some("")), None);
        assert_eq!(pick_value(None, None), None);

        // Relative href comes back resolved through the property
        assert_eq!(
            pick_value(some("/next"), some("http://example.com/next")),
            some("http://example.com/next")
        );

        // No matching property (e.g. `class` vs `className`): keep the attribute
        assert_eq!(pick_value(some("item"), None), some("item"));
        assert_eq!(pick_value(some(""), some("")), some(""));
    }
}
