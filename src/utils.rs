//! Utility functions for text cleanup, log formatting, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Entity cleanup of extracted article text
//! - String truncation for logging subprocess output
//! - File system validation for output directories

use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Entity sequences replaced in article text, applied in this order.
pub const CLEAN_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("&lsquo;", "'"),
    ("&rsquo;", "'"),
    ("&#39;", "'"),
    ("&ldquo;", "\""),
    ("&rdquo;", "\""),
    ("&quot;", "\""),
    ("&nbsp;", " "),
    ("&mdash;", ", "),
    ("&amp;", "&"),
    ("&hellip;", "..."),
    ("&frac12;", ".5"),
];

/// The same replacements keyed on the characters those entities decode to.
///
/// The HTML parser hands back decoded text, so extracted bodies carry `’`
/// rather than `&rsquo;`. Straight quotes and `&` need no entry.
pub const DECODED_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("\u{2018}", "'"),
    ("\u{2019}", "'"),
    ("\u{201C}", "\""),
    ("\u{201D}", "\""),
    ("\u{A0}", " "),
    ("\u{2014}", ", "),
    ("\u{2026}", "..."),
    ("\u{BD}", ".5"),
];

/// Replace entity sequences with their plain-text equivalents.
///
/// Each pair in `substitutions` is a literal, whole-string replacement applied
/// to the output of the previous one. No regex, no unescaping beyond the table.
///
/// # Examples
///
/// ```ignore
/// let text = clean("Bob&rsquo;s hit&mdash;a home run", CLEAN_SUBSTITUTIONS);
/// assert_eq!(text, "Bob's hit, a home run");
/// ```
pub fn clean(text: &str, substitutions: &[(&str, &str)]) -> String {
    substitutions
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and a count of
/// the dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then writes and immediately
/// deletes a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = path.join("..__probe_write__");
    fs::File::create(&probe_path).await?;
    if let Err(e) = fs::remove_file(&probe_path).await {
        warn!(error = %e, probe = %probe_path.display(), "Failed to remove write probe");
    }
    info!("Output directory is writable");
    Ok(())
}
