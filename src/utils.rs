use crate::error::{Error, Result};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Makes sure the output directory exists, creating missing parents.
///
/// Existing directories and their contents are left alone.
pub async fn prepare_output_dir(path: &Path) -> Result<()> {
    ::log::debug!("Preparing output directory {}", path.display());
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| Error::io(path, e))
}

fn unsafe_filename_chars() -> &'static Regex {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    UNSAFE.get_or_init(|| {
        Regex::new(r#"[/\\:*?"<>|\x00-\x1f\x7f]"#).expect("filename regex should be valid")
    })
}

/// Longest sanitized name in bytes; filesystems cap names at 255, which leaves
/// room for a `-N` rename suffix
pub const MAX_FILENAME_BYTES: usize = 200;

/// Convert a page title to a filename that is safe on common filesystems
pub fn sanitize_filename(title: &str) -> String {
    let name = unsafe_filename_chars().replace_all(title.trim(), "_");

    if name.trim_matches('.').is_empty() {
        return "untitled".to_string();
    }

    let mut name = name.into_owned();
    if name.len() > MAX_FILENAME_BYTES {
        let mut end = MAX_FILENAME_BYTES;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        name.truncate(end);
    }
    name
}
