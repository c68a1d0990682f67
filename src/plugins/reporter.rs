//! Build summary reporting.

use crate::engine::{CleanupHook, Plugin, RunContext, Stage};

pub struct ReporterPlugin;

impl CleanupHook for ReporterPlugin {
    fn cleanup(&self, ctx: &mut RunContext) -> Result<(), anyhow::Error> {
        let stats = ctx.build_cache().stats();
        let pages = ctx.filter_documents(|doc| !doc.skip).len();
        let drafts = ctx.documents().len() - pages;

        println!(
            "  {pages} page(s): {} written, {} unchanged",
            stats.rebuilt, stats.skipped
        );
        if drafts > 0 {
            println!("  {drafts} draft(s) held back");
        }
        for warning in ctx.warnings() {
            println!("  warning: {warning}");
        }
        Ok(())
    }
}

impl Plugin for ReporterPlugin {
    fn name(&self) -> &'static str {
        "reporter"
    }

    // After any other cleanup work, so the numbers it prints are final
    fn priority(&self, _stage: Stage) -> i32 {
        90
    }

    fn cleanup_hook(&self) -> Option<&dyn CleanupHook> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::document::Document;
    use crate::engine::test_context;

    #[test]
    fn test_cleanup_never_fails() {
        let mut ctx = test_context();
        ctx.add_document(Document::discovered(PathBuf::from("a.md"), "/a".into()));
        ctx.warn("example warning");
        assert!(ReporterPlugin.cleanup(&mut ctx).is_ok());
    }
}
