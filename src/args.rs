use clap::{Parser, ValueEnum};
use multiscrape::{CollisionPolicy, CrawlConfig, Error, FilenameMode, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "multiscrape")]
#[command(about = "A simple tool to automate clicking on links and saving the webpages")]
#[command(version)]
pub struct Args {
    /// URL to visit
    #[arg(short, long, required_unless_present = "config")]
    pub url: Option<String>,

    /// CSS selector of links to visit and save
    #[arg(short, long, required_unless_present = "config")]
    pub selector: Option<String>,

    /// Don't save any webpages (also accepted as -ns)
    #[arg(long)]
    pub no_save: bool,

    /// Use webpage title as filename for saved webpages (also accepted as -st)
    #[arg(long)]
    pub save_as_title: bool,

    /// CSS selector of "Next" page to continually click on
    #[arg(short = 'n', long = "next-css")]
    pub next_css: Option<String>,

    /// Output directory. Default: current directory
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Show debug information
    #[arg(long)]
    pub debug: bool,

    /// JSON file with crawl settings; flags given on the command line take precedence
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seconds to wait after clicking "Next" (default 5)
    #[arg(long)]
    pub settle_secs: Option<u64>,

    /// Stop after this many listing pages
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Replace characters that are unsafe in filenames when saving by title
    #[arg(long)]
    pub sanitize_titles: bool,

    /// What to do when two pages map to the same filename
    #[arg(long, value_enum)]
    pub on_collision: Option<CollisionArg>,

    /// WebDriver server URL (default http://localhost:4444, or WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum CollisionArg {
    Overwrite,
    Rename,
    Error,
}

/// Convert from CLI collision argument to the library policy
pub fn convert_collision(arg: CollisionArg) -> CollisionPolicy {
    match arg {
        CollisionArg::Overwrite => CollisionPolicy::Overwrite,
        CollisionArg::Rename => CollisionPolicy::Rename,
        CollisionArg::Error => CollisionPolicy::Error,
    }
}

/// Options whose next argument is their value
const VALUE_FLAGS: [&str; 12] = [
    "-u",
    "--url",
    "-s",
    "--selector",
    "-n",
    "--next-css",
    "-c",
    "--config",
    "--settle-secs",
    "--max-pages",
    "--on-collision",
    "--webdriver-url",
];

/// Rewrites the two-letter short flags `-ns` and `-st`, which clap cannot
/// express, to their long forms.
///
/// Option values and everything after `--` are left untouched.
pub fn normalize_legacy_flags<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut is_value = false;
    let mut passthrough = false;

    args.into_iter()
        .map(|arg| {
            if passthrough || is_value {
                is_value = false;
                return arg;
            }
            match arg.as_str() {
                "-ns" => "--no-save".to_string(),
                "-st" => "--save-as-title".to_string(),
                "--" => {
                    passthrough = true;
                    arg
                }
                _ => {
                    is_value = VALUE_FLAGS.contains(&arg.as_str());
                    arg
                }
            }
        })
        .collect()
}

impl Args {
    /// Builds the run configuration.
    ///
    /// Precedence: defaults, then the config file, then `env_webdriver_url`
    /// (from `WEBDRIVER_URL`), then command-line flags.
    pub fn into_config(self, env_webdriver_url: Option<String>) -> Result<CrawlConfig> {
        let mut config = match &self.config {
            Some(path) => CrawlConfig::from_file(path)?,
            None => {
                let url = self
                    .url
                    .as_deref()
                    .ok_or_else(|| Error::Config("--url is required".to_string()))?;
                let selector = self
                    .selector
                    .as_deref()
                    .ok_or_else(|| Error::Config("--selector is required".to_string()))?;
                CrawlConfig::new(url, selector)
            }
        };

        if let Some(url) = self.url {
            config.url = url;
        }
        if let Some(selector) = self.selector {
            config.selector = selector;
        }
        if let Some(next) = self.next_css {
            config.next_selector = Some(next);
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(secs) = self.settle_secs {
            config.settle_secs = secs;
        }
        if let Some(max) = self.max_pages {
            config.max_pages = Some(max);
        }
        if let Some(policy) = self.on_collision {
            config.on_collision = convert_collision(policy);
        }

        // Override the WebDriver URL with an environment variable if provided
        if let Some(url) = env_webdriver_url.filter(|url| !url.is_empty()) {
            config.webdriver_url = url;
        }
        if let Some(url) = self.webdriver_url {
            config.webdriver_url = url;
        }

        config.no_save |= self.no_save;
        config.debug |= self.debug;
        config.sanitize_titles |= self.sanitize_titles;
        config.headless |= self.headless;
        if self.save_as_title {
            config.filename_mode = FilenameMode::Title;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let argv = std::iter::once("multiscrape")
            .chain(args.iter().copied())
            .map(String::from);
        Args::try_parse_from(normalize_legacy_flags(argv)).unwrap()
    }

    #[test]
    fn test_minimal_invocation_uses_defaults() {
        let config = parse(&["-u", "https://example.com/list", "-s", "a.item"])
            .into_config(None)
            .unwrap();

        assert_eq!(config, CrawlConfig::new("https://example.com/list", "a.item"));
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.filename_mode, FilenameMode::Url);
    }

    #[test]
    fn test_full_invocation() {
        let config = parse(&[
            "--url",
            "https://example.com/list",
            "--selector",
            "a.item",
            "-n",
            "a.next",
            "--no-save",
            "--save-as-title",
            "--debug",
            "--settle-secs",
            "0",
            "--max-pages",
            "4",
            "--sanitize-titles",
            "--on-collision",
            "rename",
            "--headless",
            "pages",
        ])
        .into_config(None)
        .unwrap();

        assert_eq!(config.next_selector.as_deref(), Some("a.next"));
        assert!(config.no_save);
        assert!(config.debug);
        assert!(config.sanitize_titles);
        assert!(config.headless);
        assert_eq!(config.filename_mode, FilenameMode::Title);
        assert_eq!(config.settle_secs, 0);
        assert_eq!(config.max_pages, Some(4));
        assert_eq!(config.on_collision, CollisionPolicy::Rename);
        assert_eq!(config.output_dir, PathBuf::from("pages"));
    }

    #[test]
    fn test_legacy_short_flags() {
        let args = parse(&["-u", "https://example.com", "-s", "a", "-ns", "-st"]);
        assert!(args.no_save);
        assert!(args.save_as_title);
        assert_eq!(args.next_css, None);
    }

    #[test]
    fn test_legacy_flags_leave_values_alone() {
        let normalize = |args: &[&str]| {
            normalize_legacy_flags(args.iter().map(|a| a.to_string()))
        };

        assert_eq!(
            normalize(&["multiscrape", "-s", "-st", "-ns"]),
            ["multiscrape", "-s", "-st", "--no-save"]
        );
        assert_eq!(
            normalize(&["multiscrape", "--next-css", "-ns", "-st"]),
            ["multiscrape", "--next-css", "-ns", "--save-as-title"]
        );
        assert_eq!(
            normalize(&["multiscrape", "--selector=a", "-st"]),
            ["multiscrape", "--selector=a", "--save-as-title"]
        );
        assert_eq!(
            normalize(&["multiscrape", "-ns", "--", "-st"]),
            ["multiscrape", "--no-save", "--", "-st"]
        );
    }

    #[test]
    fn test_url_and_selector_required() {
        let argv = ["multiscrape", "-s", "a"].map(String::from);
        assert!(Args::try_parse_from(argv).is_err());

        let argv = ["multiscrape", "-u", "https://example.com"].map(String::from);
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_webdriver_url_precedence() {
        let config = parse(&["-u", "https://example.com", "-s", "a"])
            .into_config(Some("http://localhost:9515".to_string()))
            .unwrap();
        assert_eq!(config.webdriver_url, "http://localhost:9515");

        let config = parse(&["-u", "https://example.com", "-s", "a"])
            .into_config(Some(String::new()))
            .unwrap();
        assert_eq!(config.webdriver_url, "http://localhost:4444");

        let config = parse(&[
            "-u",
            "https://example.com",
            "-s",
            "a",
            "--webdriver-url",
            "http://grid:4444",
        ])
        .into_config(Some("http://localhost:9515".to_string()))
        .unwrap();
        assert_eq!(config.webdriver_url, "http://grid:4444");
    }

    #[test]
    fn test_config_file_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawl.json");
        std::fs::write(
            &path,
            r#"{"url": "https://example.com/a", "selector": "a.item", "next_selector": "a.next", "settle_secs": 2}"#,
        )
        .unwrap();
        let path = path.to_string_lossy().into_owned();

        let config = parse(&["--config", &path]).into_config(None).unwrap();
        assert_eq!(config.url, "https://example.com/a");
        assert_eq!(config.next_selector.as_deref(), Some("a.next"));
        assert_eq!(config.settle_secs, 2);

        let config = parse(&["--config", &path, "-s", "li a", "--settle-secs", "7"])
            .into_config(None)
            .unwrap();
        assert_eq!(config.selector, "li a");
        assert_eq!(config.settle_secs, 7);
    }

    #[test]
    fn test_invalid_start_url_rejected() {
        let result = parse(&["-u", "example.com/no-scheme", "-s", "a"]).into_config(None);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
