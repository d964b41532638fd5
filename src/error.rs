use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to connect to any WebDriver server (tried {0})")]
    Connect(String),

    #[error("WebDriver command failed while {context}: {source}")]
    WebDriver {
        context: String,
        #[source]
        source: fantoccini::error::CmdError,
    },

    #[error("failed to load {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("invalid CSS selector: {0}")]
    Selector(String),

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write link to output: {0}")]
    Output(#[source] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse configuration: {0}")]
    ConfigFile(#[from] serde_json::Error),

    #[error("filename collision: {} was already written in this run", .0.display())]
    Collision(PathBuf),

    #[error("interrupted")]
    Interrupted,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wraps a filesystem error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn webdriver(context: impl Into<String>, source: fantoccini::error::CmdError) -> Self {
        Error::WebDriver {
            context: context.into(),
            source,
        }
    }
}
