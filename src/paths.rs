//! Path and URL conversion utilities.
//!
//! This module handles conversions between:
//! - Source file paths (relative paths within the content directory)
//! - URL paths (the URL at which content will be served)
//! - Output file paths (where files are written in the output directory)

use std::path::{Path, PathBuf};

/// Convert a content file path to a URL path.
///
/// # Examples
/// ```ignore
/// source_path_to_url("installation.md", None) => "/installation"
/// source_path_to_url("guides/quickstart.md", None) => "/guides/quickstart"
/// source_path_to_url("guides/intro.md", Some("start")) => "/guides/start"
/// source_path_to_url("index.md", None) => "/"
/// ```
pub fn source_path_to_url(path: &Path, slug: Option<&str>) -> String {
    // Apply the slug override to the final component, if any
    let path = match slug {
        Some(slug) => path.with_file_name(slug),
        None => path.with_extension(""),
    };

    let path_str = path.to_string_lossy().replace('\\', "/");

    // Index files become the directory URL
    let path_str = if path_str.ends_with("/index") || path_str == "index" {
        path_str
            .trim_end_matches("index")
            .trim_end_matches('/')
            .to_string()
    } else {
        path_str
    };

    let mut url = String::from("/");
    url.push_str(&path_str);

    // Normalize: remove trailing slash unless it's the root
    if url.len() > 1 && url.ends_with('/') {
        url.pop();
    }

    url
}

/// Convert a URL path to an output file path.
///
/// Documents (no extension) become `path/index.html`.
/// Paths that already carry an extension are kept as-is.
///
/// # Examples
/// ```ignore
/// url_to_output_path("/guides/intro", output_dir) => output_dir/guides/intro/index.html
/// url_to_output_path("/", output_dir) => output_dir/index.html
/// url_to_output_path("/site-index.json", output_dir) => output_dir/site-index.json
/// ```
pub fn url_to_output_path(url_path: &str, output_dir: &Path) -> PathBuf {
    let url_path = url_path.trim_start_matches('/');

    if url_path.is_empty() {
        output_dir.join("index.html")
    } else if url_path.contains('.') {
        output_dir.join(url_path)
    } else {
        output_dir.join(url_path).join("index.html")
    }
}

/// Get the base path from a config file path (its parent directory).
pub fn base_path_from_config(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
