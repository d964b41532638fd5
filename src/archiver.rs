use crate::browser::Browser;
use crate::config::{CollisionPolicy, CrawlConfig, FilenameMode};
use crate::error::{Error, Result};
use crate::results::ArchivedPage;
use crate::utils::sanitize_filename;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Settings for the archiving pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOptions {
    pub output_dir: PathBuf,
    pub filename_mode: FilenameMode,
    /// Visit and print links without writing anything
    pub suppress_save: bool,
    pub sanitize_titles: bool,
    pub on_collision: CollisionPolicy,
}

impl From<&CrawlConfig> for ArchiveOptions {
    fn from(config: &CrawlConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            filename_mode: config.filename_mode,
            suppress_save: config.no_save,
            sanitize_titles: config.sanitize_titles,
            on_collision: config.on_collision,
        }
    }
}

/// Filename for a page named after its resolved URL: everything after the last
/// `/`, with `.html` appended unless already present
pub fn url_filename(current_url: &str) -> String {
    let tail = match current_url.rfind('/') {
        Some(idx) => &current_url[idx + 1..],
        None => current_url,
    };

    if tail.ends_with(".html") {
        tail.to_string()
    } else {
        format!("{}.html", tail)
    }
}

/// Filename for a page named after its title. Passed through untouched unless
/// `sanitize` is set.
pub fn title_filename(title: &str, sanitize: bool) -> String {
    if sanitize {
        sanitize_filename(title)
    } else {
        title.to_string()
    }
}

/// Visits each link in order and saves the rendered page into the output directory.
///
/// Every link is visited and then printed to `out`, one per line, whether or not
/// saving is suppressed. The first navigation, write or output failure aborts the
/// pass. Returns the paths written.
pub async fn archive<B: Browser, W: Write>(
    browser: &mut B,
    links: &[String],
    options: &ArchiveOptions,
    out: &mut W,
) -> Result<Vec<PathBuf>> {
    let mut tracker = CollisionTracker::new(options.on_collision);
    let mut written = Vec::new();

    for (index, link) in links.iter().enumerate() {
        ::log::debug!("Archiving {} of {}: {}", index + 1, links.len(), link);
        browser.visit(link).await?;

        if !options.suppress_save {
            let page = capture(browser, link, options).await?;
            let path = tracker.claim(options.output_dir.join(&page.filename))?;

            tokio::fs::write(&path, page.html.as_bytes())
                .await
                .map_err(|e| Error::io(&path, e))?;
            ::log::info!("Saved {} to {}", page.url, path.display());
            written.push(path);
        }

        writeln!(out, "{}", link).map_err(Error::Output)?;
    }

    out.flush().map_err(Error::Output)?;
    Ok(written)
}

/// Reads the current page and names it
async fn capture<B: Browser>(
    browser: &mut B,
    link: &str,
    options: &ArchiveOptions,
) -> Result<ArchivedPage> {
    let filename = match options.filename_mode {
        FilenameMode::Title => title_filename(&browser.title().await?, options.sanitize_titles),
        FilenameMode::Url => url_filename(&browser.url().await?),
    };
    let html = browser.html().await?;

    Ok(ArchivedPage {
        url: link.to_string(),
        html,
        filename,
    })
}

/// Remembers the paths written in this run and applies the collision policy
struct CollisionTracker {
    policy: CollisionPolicy,
    seen: HashSet<PathBuf>,
}

impl CollisionTracker {
    fn new(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            seen: HashSet::new(),
        }
    }

    /// Returns the path to write to, which differs from `path` only when renaming
    fn claim(&mut self, path: PathBuf) -> Result<PathBuf> {
        if !self.seen.contains(&path) {
            self.seen.insert(path.clone());
            return Ok(path);
        }

        match self.policy {
            CollisionPolicy::Overwrite => {
                ::log::warn!("Overwriting {} written earlier in this run", path.display());
                Ok(path)
            }
            CollisionPolicy::Error => Err(Error::Collision(path)),
            CollisionPolicy::Rename => {
                let renamed = (1..)
                    .map(|n| numbered(&path, n))
                    .find(|candidate| !self.seen.contains(candidate))
                    .unwrap_or_else(|| path.clone());
                ::log::warn!(
                    "{} already written in this run, saving as {}",
                    path.display(),
                    renamed.display()
                );
                self.seen.insert(renamed.clone());
                Ok(renamed)
            }
        }
    }
}

/// `dir/page.html` -> `dir/page-N.html`
fn numbered(path: &Path, n: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, n, ext.to_string_lossy()),
        None => format!("{}-{}", stem, n),
    };
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_filename() {
        assert_eq!(url_filename("http://example.com/foo/bar"), "bar.html");
        assert_eq!(url_filename("http://example.com/foo/bar.html"), "bar.html");
        assert_eq!(url_filename("http://example.com/foo/bar.htm"), "bar.htm.html");
        assert_eq!(url_filename("http://example.com/a/b?id=3"), "b?id=3.html");
        assert_eq!(url_filename("http://example.com/dir/"), ".html");
        assert_eq!(url_filename("page"), "page.html");
    }

    #[test]
    fn test_title_filename_is_verbatim() {
        let title = "Q&A: what/why? <draft> \u{1F600}";
        assert_eq!(title_filename(title, false).as_bytes(), title.as_bytes());
        assert_eq!(title_filename(title, true), "Q&A_ what_why_ _draft_ \u{1F600}");
    }

    #[test]
    fn test_numbered() {
        assert_eq!(
            numbered(Path::new("out/page.html"), 2),
            PathBuf::from("out/page-2.html")
        );
        assert_eq!(numbered(Path::new("out/Title"), 1), PathBuf::from("out/Title-1"));
    }

    #[test]
    fn test_collision_tracker_policies() {
        let path = PathBuf::from("out/page.html");

        let mut overwrite = CollisionTracker::new(CollisionPolicy::Overwrite);
        assert_eq!(overwrite.claim(path.clone()).unwrap(), path);
        assert_eq!(overwrite.claim(path.clone()).unwrap(), path);

        let mut rename = CollisionTracker::new(CollisionPolicy::Rename);
        assert_eq!(rename.claim(path.clone()).unwrap(), path);
        assert_eq!(
            rename.claim(path.clone()).unwrap(),
            PathBuf::from("out/page-1.html")
        );
        assert_eq!(
            rename.claim(path.clone()).unwrap(),
            PathBuf::from("out/page-2.html")
        );

        let mut error = CollisionTracker::new(CollisionPolicy::Error);
        assert_eq!(error.claim(path.clone()).unwrap(), path);
        assert!(matches!(error.claim(path), Err(Error::Collision(_))));
    }
}
