//! The per-build run context handed to every plugin hook.

use super::build_cache::BuildCache;
use super::concurrent;
use super::error::{DocumentErrors, EngineError};
use super::shared_cache::SharedCache;
use crate::config::{ProjectPaths, SiteConfig};
use crate::document::Document;

/// Runtime flags for one build invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunFlags {
    /// Built by `serve` rather than `build`.
    pub dev_mode: bool,
    /// Inject the live-reload script into rendered pages.
    pub live_reload: bool,
}

/// Everything one build run carries: the document set, effective
/// configuration, the shared run cache, the incremental build cache handle,
/// and the worker pool for concurrent document passes.
///
/// Constructed once per build and discarded at its end. The context owns the
/// document set; hooks borrow it for the duration of one call, so two hooks
/// can never fan out over the same documents simultaneously.
pub struct RunContext {
    documents: Vec<Document>,
    config: SiteConfig,
    paths: ProjectPaths,
    flags: RunFlags,
    cache: SharedCache,
    build_cache: BuildCache,
    warnings: Vec<String>,
    pool: rayon::ThreadPool,
}

impl RunContext {
    pub fn new(
        config: SiteConfig,
        paths: ProjectPaths,
        flags: RunFlags,
        build_cache: BuildCache,
    ) -> Result<Self, EngineError> {
        let pool = concurrent::build_pool(config.build.workers)?;
        Ok(Self {
            documents: Vec::new(),
            config,
            paths,
            flags,
            cache: SharedCache::new(),
            build_cache,
            warnings: Vec::new(),
            pool,
        })
    }

    // === Document set ===

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn documents_mut(&mut self) -> &mut [Document] {
        &mut self.documents
    }

    /// Replace the whole document set. Insertion order is meaningful: it is
    /// the default listing order for collection plugins.
    pub fn set_documents(&mut self, documents: Vec<Document>) {
        self.documents = documents;
    }

    pub fn add_document(&mut self, document: Document) {
        self.documents.push(document);
    }

    /// Borrowing filter over the document set, in insertion order.
    pub fn filter_documents<P>(&self, pred: P) -> Vec<&Document>
    where
        P: Fn(&Document) -> bool,
    {
        self.documents.iter().filter(|doc| pred(doc)).collect()
    }

    // === Concurrent passes ===

    /// Apply `f` to every document on the bounded worker pool.
    ///
    /// See [`concurrent::process_concurrently`] for the exact semantics.
    /// Closures needing the shared or build cache should clone those handles
    /// before the pass; both are cheap to clone and internally synchronized.
    pub fn process_concurrently<F>(&mut self, f: F) -> Result<(), DocumentErrors>
    where
        F: Fn(&mut Document) -> Result<(), anyhow::Error> + Send + Sync,
    {
        concurrent::process_concurrently(&self.pool, &mut self.documents, f)
    }

    /// Filtered variant of [`process_concurrently`](Self::process_concurrently).
    pub fn process_matching<P, F>(&mut self, pred: P, f: F) -> Result<(), DocumentErrors>
    where
        P: Fn(&Document) -> bool + Send + Sync,
        F: Fn(&mut Document) -> Result<(), anyhow::Error> + Send + Sync,
    {
        concurrent::process_matching(&self.pool, &mut self.documents, pred, f)
    }

    // === Shared state ===

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    pub fn build_cache(&self) -> &BuildCache {
        &self.build_cache
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    pub fn flags(&self) -> RunFlags {
        self.flags
    }

    // === Soft errors ===

    /// Record a warning to surface alongside a successful build.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Drain the warnings into the build report.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }
}

#[cfg(test)]
pub(crate) fn test_context() -> RunContext {
    test_context_at(std::path::Path::new("/tmp/test-site"))
}

#[cfg(test)]
pub(crate) fn test_context_at(base: &std::path::Path) -> RunContext {
    use crate::config::{BuildConfig, DevConfig, MarkdownConfig, SiteMeta};
    use std::path::PathBuf;

    let config = SiteConfig {
        site: SiteMeta {
            name: "Test Site".into(),
            url: None,
            output: PathBuf::from("_site"),
        },
        content: PathBuf::from("content"),
        templates: PathBuf::from("templates"),
        plugins: None,
        build: BuildConfig {
            workers: Some(2),
            ..BuildConfig::default()
        },
        markdown: MarkdownConfig::default(),
        dev: DevConfig::default(),
    };
    let paths = ProjectPaths::resolve(&config, base);
    RunContext::new(config, paths, RunFlags::default(), BuildCache::new())
        .expect("test context construction")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_document_set_accessors() {
        let mut ctx = test_context();
        assert!(ctx.documents().is_empty());

        ctx.add_document(Document::discovered(PathBuf::from("a.md"), "/a".into()));
        ctx.add_document(Document::discovered(PathBuf::from("b.md"), "/b".into()));
        assert_eq!(ctx.documents().len(), 2);

        ctx.documents_mut()[0].skip = true;
        let published = ctx.filter_documents(|doc| !doc.skip);
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].source_path, PathBuf::from("b.md"));
    }

    #[test]
    fn test_process_concurrently_uses_context_documents() {
        let mut ctx = test_context();
        for i in 0..10 {
            ctx.add_document(Document::discovered(
                PathBuf::from(format!("{i}.md")),
                format!("/{i}"),
            ));
        }

        ctx.process_concurrently(|doc| {
            doc.body = doc.url_path.clone();
            Ok(())
        })
        .unwrap();

        assert!(ctx.documents().iter().all(|d| d.body == d.url_path));
    }

    #[test]
    fn test_warnings_accumulate_and_drain() {
        let mut ctx = test_context();
        ctx.warn("first");
        ctx.warn("second");
        assert_eq!(ctx.warnings().len(), 2);
        let drained = ctx.take_warnings();
        assert_eq!(drained, vec!["first".to_string(), "second".to_string()]);
        assert!(ctx.warnings().is_empty());
    }
}
