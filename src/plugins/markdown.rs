//! Markdown to HTML transformation.

use pulldown_cmark::{html, Options, Parser};

use crate::engine::{Plugin, RunContext, TransformHook};

pub struct MarkdownPlugin;

/// Map configured extension names to parser options.
///
/// Unknown names are a configuration error: silently ignoring one would
/// change page output with no visible signal.
fn options_from_config(extensions: &[String]) -> Result<Options, anyhow::Error> {
    let mut options = Options::empty();
    for extension in extensions {
        options.insert(match extension.as_str() {
            "footnotes" => Options::ENABLE_FOOTNOTES,
            "heading_attributes" => Options::ENABLE_HEADING_ATTRIBUTES,
            "smart_punctuation" => Options::ENABLE_SMART_PUNCTUATION,
            "strikethrough" => Options::ENABLE_STRIKETHROUGH,
            "tables" => Options::ENABLE_TABLES,
            "tasklists" => Options::ENABLE_TASKLISTS,
            other => anyhow::bail!("unknown markdown extension in config: {other}"),
        });
    }
    Ok(options)
}

impl TransformHook for MarkdownPlugin {
    fn transform(&self, ctx: &mut RunContext) -> Result<(), anyhow::Error> {
        let options = options_from_config(&ctx.config().markdown.extensions)?;

        ctx.process_concurrently(|doc| {
            let parser = Parser::new_ext(&doc.body, options);
            let mut rendered = String::with_capacity(doc.body.len() * 2);
            html::push_html(&mut rendered, parser);
            doc.body = rendered;
            Ok(())
        })?;

        Ok(())
    }
}

impl Plugin for MarkdownPlugin {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn transform_hook(&self) -> Option<&dyn TransformHook> {
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
    fn test_transform_renders_markdown_bodies() {
        let mut ctx = test_context();
        let mut doc = Document::discovered(PathBuf::from("a.md"), "/a".into());
        doc.body = "# Title\n\nSome *emphasis*.".to_string();
        ctx.add_document(doc);

        MarkdownPlugin.transform(&mut ctx).unwrap();

        let body = &ctx.documents()[0].body;
        assert!(body.contains("<h1>Title</h1>"));
        assert!(body.contains("<em>emphasis</em>"));
    }

    #[test]
    fn test_configured_extensions_apply() {
        let mut ctx = test_context();
        let mut doc = Document::discovered(PathBuf::from("a.md"), "/a".into());
        doc.body = "| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~".to_string();
        ctx.add_document(doc);

        MarkdownPlugin.transform(&mut ctx).unwrap();

        let body = &ctx.documents()[0].body;
        assert!(body.contains("<table>"));
        assert!(body.contains("<del>gone</del>"));
    }

    #[test]
    fn test_unknown_extension_is_an_error() {
        let error = options_from_config(&["tables".into(), "wikilinks".into()]).unwrap_err();
        assert!(error.to_string().contains("wikilinks"));
    }
}
