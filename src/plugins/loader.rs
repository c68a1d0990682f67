//! Content discovery and loading.
//!
//! Walks the content directory for markdown files, reads each one on the
//! worker pool, hashes the raw bytes for the incremental cache, and parses
//! front matter. Malformed front matter degrades to defaults with a warning
//! rather than failing the document.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::document::{parse_front_matter, Document};
use crate::engine::{LoadHook, Plugin, RunContext, Stage};
use crate::paths::source_path_to_url;

/// Meta key carrying a front matter parse warning out of the concurrent
/// pass; hoisted into the run warnings afterwards.
const WARNING_META_KEY: &str = "loader.warning";

pub struct LoaderPlugin;

impl LoaderPlugin {
    /// Recursively collect markdown files under `dir`, as paths relative to
    /// `root`, sorted so discovery order is stable across platforms.
    fn discover(root: &Path, dir: &Path, found: &mut Vec<PathBuf>) -> Result<(), anyhow::Error> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("failed to read content directory {}", dir.display()))?;

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                Self::discover(root, &path, found)?;
            } else if path.extension().is_some_and(|ext| ext == "md") {
                let relative = path
                    .strip_prefix(root)
                    .expect("discovered path is under the content root");
                found.push(relative.to_path_buf());
            }
        }
        Ok(())
    }
}

impl LoadHook for LoaderPlugin {
    fn load(&self, ctx: &mut RunContext) -> Result<(), anyhow::Error> {
        let content_dir = ctx.paths().content.clone();
        if !content_dir.is_dir() {
            anyhow::bail!(
                "content directory not found: {} (run `sitewright init` to scaffold a site)",
                content_dir.display()
            );
        }

        let mut sources = Vec::new();
        Self::discover(&content_dir, &content_dir, &mut sources)?;
        sources.sort();

        for source in sources {
            let url = source_path_to_url(&source, None);
            ctx.add_document(Document::discovered(source, url));
        }

        let publish_drafts = ctx.config().build.drafts;
        ctx.process_concurrently(|doc| {
            let path = content_dir.join(&doc.source_path);
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;

            doc.input_hash = blake3::hash(raw.as_bytes()).to_hex().to_string();

            let parsed = parse_front_matter(&raw);
            if let Some(warning) = parsed.warning {
                doc.meta.insert(
                    WARNING_META_KEY.to_string(),
                    serde_json::Value::String(format!("{}: {warning}", doc.source_path.display())),
                );
            }
            doc.raw = raw;
            doc.body = parsed.body;
            doc.front_matter = parsed.front_matter;

            if let Some(template) = &doc.front_matter.template {
                doc.template = template.clone();
            }
            if doc.front_matter.draft && !publish_drafts {
                doc.skip = true;
            }
            doc.url_path =
                source_path_to_url(&doc.source_path, doc.front_matter.slug.as_deref());
            Ok(())
        })?;

        // Surface parse warnings recorded inside the concurrent pass
        let warnings: Vec<String> = ctx
            .documents()
            .iter()
            .filter_map(|doc| doc.meta.get(WARNING_META_KEY))
            .filter_map(|value| value.as_str().map(String::from))
            .collect();
        for warning in warnings {
            ctx.warn(warning);
        }

        Ok(())
    }
}

impl Plugin for LoaderPlugin {
    fn name(&self) -> &'static str {
        "loader"
    }

    // Runs before other load-stage plugins so they see a populated set
    fn priority(&self, _stage: Stage) -> i32 {
        10
    }

    fn load_hook(&self) -> Option<&dyn LoadHook> {
        Some(self)
    }
}
