//! Document types flowing through the build pipeline.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Template used when neither the front matter nor a plugin picks one.
pub const DEFAULT_TEMPLATE: &str = "page.html";

/// One content unit ("post") flowing through the pipeline.
///
/// Created during the load stage, mutated by every later stage, never
/// removed from the set mid-build. A document that should not be published
/// is flagged with `skip` instead of being dropped, so later stages can
/// still see it (e.g. for draft listings in dev mode).
#[derive(Debug, Clone)]
pub struct Document {
    /// Path relative to the content root. Stable identity for the whole
    /// build and the key into the incremental build cache.
    pub source_path: PathBuf,
    /// The URL path this document will be served at (e.g. "/guides/intro").
    pub url_path: String,
    /// blake3 hex digest of the raw input, set by the loader.
    pub input_hash: String,
    /// Raw file content as read from disk.
    pub raw: String,
    /// Front matter metadata parsed from the raw content.
    pub front_matter: FrontMatter,
    /// The working body: starts as markdown without front matter, becomes an
    /// HTML fragment after the transform stage.
    pub body: String,
    /// Complete page HTML, populated by the render stage.
    pub output_html: Option<String>,
    /// Template identity used to render this document. Part of the
    /// incremental cache key, so a template switch forces a rewrite.
    pub template: String,
    /// Excluded from published output (drafts, unlisted pages). The document
    /// stays in the set; the write stage filters on this flag.
    pub skip: bool,
    /// Open-ended plugin-contributed metadata. New plugins attach data here
    /// without any schema change.
    pub meta: HashMap<String, serde_json::Value>,
}

impl Document {
    /// Create a freshly discovered document; content not yet loaded.
    pub fn discovered(source_path: PathBuf, url_path: String) -> Self {
        Self {
            source_path,
            url_path,
            input_hash: String::new(),
            raw: String::new(),
            front_matter: FrontMatter::default(),
            body: String::new(),
            output_html: None,
            template: DEFAULT_TEMPLATE.to_string(),
            skip: false,
            meta: HashMap::new(),
        }
    }

    /// Cache key for the incremental build cache.
    pub fn cache_key(&self) -> String {
        self.source_path.to_string_lossy().replace('\\', "/")
    }

    /// Document title: front matter first, filename fallback.
    pub fn title(&self) -> String {
        self.front_matter.title.clone().unwrap_or_else(|| {
            self.source_path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(title_case)
                .unwrap_or_else(|| "Untitled".to_string())
        })
    }
}

/// Front matter metadata parsed from the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrontMatter {
    /// Page title (overrides the filename-derived title)
    pub title: Option<String>,
    /// Page description for SEO/previews
    pub description: Option<String>,
    /// Template to render with (defaults to `page.html`)
    pub template: Option<String>,
    /// Draft pages are skipped at write time unless drafts are enabled
    #[serde(default)]
    pub draft: bool,
    /// Custom slug override
    pub slug: Option<String>,
    /// Additional arbitrary metadata (available in templates at top level, e.g. `page.author`)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

/// Result of parsing front matter from raw content.
#[derive(Debug)]
pub struct ParsedContent {
    /// The parsed front matter (empty if none found)
    pub front_matter: FrontMatter,
    /// The content without the front matter block
    pub body: String,
    /// Set when a front matter block was present but unparseable; the
    /// document proceeds with defaults and this is surfaced as a warning.
    pub warning: Option<String>,
}

/// Parse front matter from raw content.
///
/// Front matter is a YAML block delimited by `---` at the start of the file:
///
/// ```markdown
/// ---
/// title: My Page
/// template: post.html
/// ---
///
/// # Content starts here
/// ```
pub fn parse_front_matter(content: &str) -> ParsedContent {
    let content = content.trim_start();

    if !content.starts_with("---") {
        return ParsedContent {
            front_matter: FrontMatter::default(),
            body: content.to_string(),
            warning: None,
        };
    }

    let after_opening = &content[3..];
    let Some(closing_pos) = after_opening.find("\n---") else {
        // No closing delimiter, treat the whole thing as body
        return ParsedContent {
            front_matter: FrontMatter::default(),
            body: content.to_string(),
            warning: None,
        };
    };

    let yaml_content = after_opening[..closing_pos].trim_start_matches('\n');

    // Skip past "---" + yaml + "\n---"
    let body_start = 3 + closing_pos + 4;
    let body = if body_start < content.len() {
        content[body_start..].trim_start_matches('\n').to_string()
    } else {
        String::new()
    };

    match serde_yaml::from_str(yaml_content) {
        Ok(front_matter) => ParsedContent {
            front_matter,
            body,
            warning: None,
        },
        Err(e) => ParsedContent {
            front_matter: FrontMatter::default(),
            body,
            warning: Some(format!("failed to parse front matter: {e}")),
        },
    }
}

/// Convert a filename slug to title case.
/// "getting-started" -> "Getting Started"
fn title_case(s: &str) -> String {
    s.split(['-', '_'])
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
