//! Output writing with incremental skipping.
//!
//! Writes each rendered page to its output path on the worker pool. With
//! incremental builds on, a document whose (input hash, template) pair still
//! matches the build cache and whose output file still exists is skipped
//! without touching disk.

use anyhow::Context as _;

use crate::engine::{Plugin, RunContext, WriteHook};
use crate::paths::url_to_output_path;

pub struct WriterPlugin;

impl WriteHook for WriterPlugin {
    fn write(&self, ctx: &mut RunContext) -> Result<(), anyhow::Error> {
        let output_dir = ctx.paths().output.clone();
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("failed to create {}", output_dir.display()))?;

        let incremental = ctx.config().build.incremental;
        let build_cache = ctx.build_cache().clone();

        ctx.process_matching(
            |doc| !doc.skip,
            |doc| {
                let html = doc
                    .output_html
                    .as_deref()
                    .context("document reached the write stage without rendered output")?;

                let key = doc.cache_key();
                if incremental && !build_cache.should_rebuild(&key, &doc.input_hash, &doc.template)
                {
                    build_cache.mark_skipped();
                    return Ok(());
                }

                let path = url_to_output_path(&doc.url_path, &output_dir);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, html)
                    .with_context(|| format!("failed to write {}", path.display()))?;

                build_cache.mark_rebuilt(&key, &doc.input_hash, path, &doc.template);
                Ok(())
            },
        )?;

        Ok(())
    }
}

impl Plugin for WriterPlugin {
    fn name(&self) -> &'static str {
        "writer"
    }

    fn write_hook(&self) -> Option<&dyn WriteHook> {
        Some(self)
    }
}
