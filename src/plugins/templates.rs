//! Tera template compilation and page rendering.
//!
//! The configure hook compiles the template directory once and parks the
//! engine in the shared run cache; the render hook picks it up and wraps
//! every publishable document's HTML fragment into a full page.

use anyhow::Context as _;
use serde::Serialize;

use crate::engine::{ConfigureHook, Plugin, RenderHook, RunContext, Stage};

/// Shared cache key the compiled engine lives under. Other plugins can fetch
/// it to render their own output (feeds, redirects).
pub const TEMPLATES_CACHE_KEY: &str = "templates.engine";

/// Injected into rendered pages in dev mode so the browser reloads when the
/// serve loop finishes a rebuild.
const LIVE_RELOAD_SCRIPT: &str = r#"<script>
  new EventSource("/_sitewright/live-reload").onmessage = () => location.reload();
</script>"#;

#[derive(Serialize)]
struct PageContext<'a> {
    title: String,
    url: &'a str,
    description: &'a Option<String>,
    #[serde(flatten)]
    extra: &'a std::collections::HashMap<String, serde_yaml::Value>,
}

pub struct TemplatesPlugin;

impl ConfigureHook for TemplatesPlugin {
    fn configure(&self, ctx: &mut RunContext) -> Result<(), anyhow::Error> {
        let templates_dir = &ctx.paths().templates;
        if !templates_dir.is_dir() {
            anyhow::bail!(
                "templates directory not found: {}",
                templates_dir.display()
            );
        }

        let glob = templates_dir.join("**/*.html");
        let glob = glob
            .to_str()
            .with_context(|| format!("templates path is not unicode: {}", templates_dir.display()))?;
        let tera = tera::Tera::new(glob).context("failed to compile templates")?;

        ctx.cache().set(TEMPLATES_CACHE_KEY, tera);
        Ok(())
    }
}

impl RenderHook for TemplatesPlugin {
    fn render(&self, ctx: &mut RunContext) -> Result<(), anyhow::Error> {
        let Some(tera) = ctx.cache().get::<tera::Tera>(TEMPLATES_CACHE_KEY) else {
            anyhow::bail!("template engine missing from the run cache; was the configure stage run?");
        };

        let site = ctx.config().site.clone();
        let flags = ctx.flags();
        let inject_reload = flags.dev_mode && flags.live_reload;

        ctx.process_matching(
            |doc| !doc.skip,
            |doc| {
                let mut context = tera::Context::new();
                context.insert("site", &site);
                context.insert(
                    "page",
                    &PageContext {
                        title: doc.title(),
                        url: &doc.url_path,
                        description: &doc.front_matter.description,
                        extra: &doc.front_matter.extra,
                    },
                );
                context.insert("content", &doc.body);

                let mut page = tera
                    .render(&doc.template, &context)
                    .with_context(|| format!("failed to render template {}", doc.template))?;

                if inject_reload {
                    match page.rfind("</body>") {
                        Some(at) => page.insert_str(at, LIVE_RELOAD_SCRIPT),
                        None => page.push_str(LIVE_RELOAD_SCRIPT),
                    }
                }

                doc.output_html = Some(page);
                Ok(())
            },
        )?;

        Ok(())
    }
}

impl Plugin for TemplatesPlugin {
    fn name(&self) -> &'static str {
        "templates"
    }

    // Compile early so other configure hooks can already use the engine
    fn priority(&self, stage: Stage) -> i32 {
        match stage {
            Stage::Configure => 10,
            _ => crate::engine::DEFAULT_PRIORITY,
        }
    }

    fn configure_hook(&self) -> Option<&dyn ConfigureHook> {
        Some(self)
    }

    fn render_hook(&self) -> Option<&dyn RenderHook> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::document::Document;
    use crate::engine::test_context_at;

    fn write_template(base: &Path, name: &str, content: &str) {
        let path = base.join("templates").join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn doc_with_body(path: &str, url: &str, body: &str) -> Document {
        let mut doc = Document::discovered(PathBuf::from(path), url.to_string());
        doc.body = body.to_string();
        doc
    }

    #[test]
    fn test_configure_compiles_and_caches_the_engine() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "page.html", "<html>{{ content }}</html>");

        let mut ctx = test_context_at(dir.path());
        TemplatesPlugin.configure(&mut ctx).unwrap();

        assert!(ctx.cache().get::<tera::Tera>(TEMPLATES_CACHE_KEY).is_some());
    }

    #[test]
    fn test_configure_fails_without_templates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = test_context_at(dir.path());
        let error = TemplatesPlugin.configure(&mut ctx).unwrap_err();
        assert!(error.to_string().contains("templates directory not found"));
    }

    #[test]
    fn test_render_wraps_documents() {
        let dir = tempfile::tempdir().unwrap();
        write_template(
            dir.path(),
            "page.html",
            "<title>{{ page.title }} - {{ site.name }}</title><body>{{ content | safe }}</body>",
        );

        let mut ctx = test_context_at(dir.path());
        let mut doc = doc_with_body("intro.md", "/intro", "<p>hi</p>");
        doc.front_matter.title = Some("Intro".to_string());
        ctx.add_document(doc);

        TemplatesPlugin.configure(&mut ctx).unwrap();
        TemplatesPlugin.render(&mut ctx).unwrap();

        let html = ctx.documents()[0].output_html.as_deref().unwrap();
        assert!(html.contains("<title>Intro - Test Site</title>"));
        assert!(html.contains("<p>hi</p>"));
        assert!(!html.contains("live-reload"));
    }

    #[test]
    fn test_render_exposes_custom_front_matter() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "page.html", "by {{ page.author }}");

        let mut ctx = test_context_at(dir.path());
        let mut doc = doc_with_body("post.md", "/post", "");
        doc.front_matter
            .extra
            .insert("author".into(), serde_yaml::Value::String("Alex".into()));
        ctx.add_document(doc);

        TemplatesPlugin.configure(&mut ctx).unwrap();
        TemplatesPlugin.render(&mut ctx).unwrap();

        assert_eq!(
            ctx.documents()[0].output_html.as_deref().unwrap(),
            "by Alex"
        );
    }

    #[test]
    fn test_render_leaves_skipped_documents_alone() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "page.html", "{{ content }}");

        let mut ctx = test_context_at(dir.path());
        let mut doc = doc_with_body("draft.md", "/draft", "wip");
        doc.skip = true;
        ctx.add_document(doc);

        TemplatesPlugin.configure(&mut ctx).unwrap();
        TemplatesPlugin.render(&mut ctx).unwrap();

        assert!(ctx.documents()[0].output_html.is_none());
    }

    #[test]
    fn test_render_missing_template_fails_that_document() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "page.html", "{{ content }}");

        let mut ctx = test_context_at(dir.path());
        let mut doc = doc_with_body("odd.md", "/odd", "");
        doc.template = "nope.html".to_string();
        ctx.add_document(doc);
        ctx.add_document(doc_with_body("fine.md", "/fine", "ok"));

        TemplatesPlugin.configure(&mut ctx).unwrap();
        let errors = TemplatesPlugin.render(&mut ctx).unwrap_err();
        let failures = format!("{errors}");
        assert!(failures.contains("odd.md"));
        assert!(!failures.contains("fine.md"));
    }
}
