use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A page captured during the archiving pass, alive only until it is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedPage {
    /// Link the page was reached from
    pub url: String,

    /// Rendered HTML source
    pub html: String,

    /// Filename derived from the title or the resolved URL
    pub filename: String,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Links collected across all listing pages, duplicates included
    pub links: usize,

    /// Files written, in archiving order
    pub written: Vec<PathBuf>,
}
