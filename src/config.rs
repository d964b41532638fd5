use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// How the archiver names saved pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilenameMode {
    /// Last path segment of the resolved URL, with `.html` appended when missing
    #[default]
    Url,
    /// The rendered document title
    Title,
}

/// What to do when two pages in one run map to the same file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Later page replaces the earlier file
    #[default]
    Overwrite,
    /// Later page gets a `-N` suffix before the extension
    Rename,
    /// Abort the run
    Error,
}

/// Configuration for a single collect-and-archive run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Listing page to start from
    pub url: String,

    /// CSS selector of the links to collect
    pub selector: String,

    /// CSS selector of the "next page" control
    #[serde(default)]
    pub next_selector: Option<String>,

    /// Directory the pages are saved into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Visit and print links without saving anything
    #[serde(default)]
    pub no_save: bool,

    #[serde(default)]
    pub filename_mode: FilenameMode,

    /// Show informational logs
    #[serde(default)]
    pub debug: bool,

    /// Seconds to wait after clicking the next control
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,

    /// Stop paginating after this many listing pages
    #[serde(default)]
    pub max_pages: Option<usize>,

    /// Replace characters that are unsafe in filenames when naming by title
    #[serde(default)]
    pub sanitize_titles: bool,

    #[serde(default)]
    pub on_collision: CollisionPolicy,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Ask the browser to run without a window
    #[serde(default)]
    pub headless: bool,
}

/// Default output directory (the current directory)
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Default settling delay after clicking "next"
fn default_settle_secs() -> u64 {
    5
}

/// Default value for webdriver_url
pub(crate) fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

impl CrawlConfig {
    /// Create a new configuration with default values
    pub fn new(url: &str, selector: &str) -> Self {
        Self {
            url: url.to_string(),
            selector: selector.to_string(),
            next_selector: None,
            output_dir: default_output_dir(),
            no_save: false,
            filename_mode: FilenameMode::default(),
            debug: false,
            settle_secs: default_settle_secs(),
            max_pages: None,
            sanitize_titles: false,
            on_collision: CollisionPolicy::default(),
            webdriver_url: default_webdriver_url(),
            headless: false,
        }
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| Error::io(path, e))?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Checks the invariants every run relies on
    pub fn validate(&self) -> Result<()> {
        if self.selector.trim().is_empty() {
            return Err(Error::Config("link selector must not be empty".to_string()));
        }
        if let Some(next) = &self.next_selector {
            if next.trim().is_empty() {
                return Err(Error::Config(
                    "next-page selector must not be empty when given".to_string(),
                ));
            }
        }
        Url::parse(&self.url)
            .map_err(|e| Error::Config(format!("start URL {:?} is not valid: {}", self.url, e)))?;
        if self.max_pages == Some(0) {
            return Err(Error::Config("max pages must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Blind wait applied after each click on the next control
    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}
