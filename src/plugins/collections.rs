//! Site-wide aggregation.
//!
//! The collect hook walks the finished document set sequentially and builds a
//! site index: every publishable page plus a grouping by top-level URL
//! section. The index is parked in the shared run cache for other plugins
//! (search, navigation) and written out as `site-index.json` after the pages
//! themselves, so a crashed write stage never leaves an index pointing at
//! pages that were not written.

use std::collections::BTreeMap;

use anyhow::Context as _;
use serde::Serialize;

use crate::engine::{CollectHook, Plugin, RunContext, Stage, WriteHook};

/// Shared cache key the finished index lives under.
pub const INDEX_CACHE_KEY: &str = "collections.index";

const INDEX_FILE_NAME: &str = "site-index.json";

/// One publishable page, in document insertion order.
#[derive(Debug, Clone, Serialize)]
pub struct PageEntry {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The aggregated site listing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteIndex {
    pub pages: Vec<PageEntry>,
    /// Pages grouped by the first URL segment; the root page lands under "".
    pub sections: BTreeMap<String, Vec<String>>,
    pub total_pages: usize,
    pub total_skipped: usize,
}

fn section_of(url_path: &str) -> String {
    url_path
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or("")
        .to_string()
}

pub struct CollectionsPlugin;

impl CollectHook for CollectionsPlugin {
    fn collect(&self, ctx: &mut RunContext) -> Result<(), anyhow::Error> {
        let mut index = SiteIndex {
            total_skipped: ctx.documents().iter().filter(|doc| doc.skip).count(),
            ..SiteIndex::default()
        };

        for doc in ctx.filter_documents(|doc| !doc.skip) {
            index.pages.push(PageEntry {
                title: doc.title(),
                url: doc.url_path.clone(),
                description: doc.front_matter.description.clone(),
            });
            index
                .sections
                .entry(section_of(&doc.url_path))
                .or_default()
                .push(doc.url_path.clone());
        }
        index.total_pages = index.pages.len();

        ctx.cache().set(INDEX_CACHE_KEY, index);
        Ok(())
    }
}

impl WriteHook for CollectionsPlugin {
    fn write(&self, ctx: &mut RunContext) -> Result<(), anyhow::Error> {
        let Some(index) = ctx.cache().get::<SiteIndex>(INDEX_CACHE_KEY) else {
            anyhow::bail!("site index missing from the run cache; was the collect stage run?");
        };

        let path = ctx.paths().output.join(INDEX_FILE_NAME);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&*index)?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

impl Plugin for CollectionsPlugin {
    fn name(&self) -> &'static str {
        "collections"
    }

    // The index file is written after the page writer has run
    fn priority(&self, stage: Stage) -> i32 {
        match stage {
            Stage::Write => 60,
            _ => crate::engine::DEFAULT_PRIORITY,
        }
    }

    fn collect_hook(&self) -> Option<&dyn CollectHook> {
        Some(self)
    }

    fn write_hook(&self) -> Option<&dyn WriteHook> {
        Some(self)
    }
}
