//! The top-level build orchestration.
//!
//! Owns everything one build needs: plugin selection, incremental cache
//! loading, run context construction, the engine run itself, and cache
//! persistence afterwards. Commands construct a [`Builder`] and call
//! [`build`](Builder::build); the serve loop calls it again on every change.

use std::path::PathBuf;

use anyhow::Context as _;

use crate::config::{ProjectPaths, SiteConfig};
use crate::engine::{BuildCache, CacheStats, Engine, RunContext, RunFlags};
use crate::plugins::{default_registry, DEFAULT_PLUGINS};

/// Summary of a finished build.
#[derive(Debug)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    /// Publishable documents that went through the pipeline.
    pub pages: usize,
    /// Documents held back (drafts, unlisted).
    pub skipped_documents: usize,
    pub cache: CacheStats,
    /// Soft problems the build worked around.
    pub warnings: Vec<String>,
}

pub struct Builder {
    config: SiteConfig,
    base_path: PathBuf,
    dev_mode: bool,
    live_reload: bool,
}

impl Builder {
    pub fn new(config: SiteConfig, base_path: PathBuf) -> Self {
        Self {
            config,
            base_path,
            dev_mode: false,
            live_reload: false,
        }
    }

    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    pub fn with_live_reload(mut self, live_reload: bool) -> Self {
        self.live_reload = live_reload;
        self
    }

    /// The plugin names this build will run, config selection first.
    fn plugin_names(&self) -> Vec<String> {
        match &self.config.plugins {
            Some(names) => names.clone(),
            None => DEFAULT_PLUGINS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Run one complete build.
    ///
    /// CPU-bound and synchronous; async callers should wrap it in
    /// `spawn_blocking` when they cannot afford to block.
    pub fn build(&self) -> Result<BuildReport, anyhow::Error> {
        let paths = ProjectPaths::resolve(&self.config, &self.base_path);

        let registry = default_registry();
        let (plugins, plugin_warnings) = registry.by_names(&self.plugin_names());
        if plugins.is_empty() {
            anyhow::bail!("no known plugins selected; nothing to run");
        }

        let incremental = self.config.build.incremental;
        let (build_cache, cache_warning) = if incremental {
            BuildCache::load(&paths.cache_file)
        } else {
            (BuildCache::new(), None)
        };

        let flags = RunFlags {
            dev_mode: self.dev_mode,
            live_reload: self.live_reload,
        };
        let mut ctx = RunContext::new(self.config.clone(), paths.clone(), flags, build_cache)?;
        for warning in plugin_warnings {
            ctx.warn(warning);
        }
        if let Some(warning) = cache_warning {
            ctx.warn(warning);
        }

        Engine::new(plugins).run(&mut ctx)?;

        if incremental {
            ctx.build_cache()
                .save(&paths.cache_file)
                .with_context(|| {
                    format!("failed to save build cache {}", paths.cache_file.display())
                })?;
        }

        let pages = ctx.filter_documents(|doc| !doc.skip).len();
        let skipped_documents = ctx.documents().len() - pages;
        Ok(BuildReport {
            output_dir: paths.output,
            pages,
            skipped_documents,
            cache: ctx.build_cache().stats(),
            warnings: ctx.take_warnings(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::config::{BuildConfig, DevConfig, MarkdownConfig, SiteMeta};

    fn site_config() -> SiteConfig {
        SiteConfig {
            site: SiteMeta {
                name: "Builder Test".into(),
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
        }
    }

    fn scaffold_site(base: &Path) {
        std::fs::create_dir_all(base.join("content/guides")).unwrap();
        std::fs::create_dir_all(base.join("templates")).unwrap();
        std::fs::write(base.join("content/index.md"), "# Home\n").unwrap();
        std::fs::write(
            base.join("content/guides/intro.md"),
            "---\ntitle: Intro\n---\n\nWelcome\n",
        )
        .unwrap();
        std::fs::write(
            base.join("templates/page.html"),
            "<html><title>{{ page.title }}</title><body>{{ content | safe }}</body></html>",
        )
        .unwrap();
    }

    #[test]
    fn test_full_build_produces_site() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_site(dir.path());

        let builder = Builder::new(site_config(), dir.path().to_path_buf());
        let report = builder.build().unwrap();

        assert_eq!(report.pages, 2);
        assert_eq!(report.cache.rebuilt, 2);
        assert!(report.warnings.is_empty());

        let home = std::fs::read_to_string(dir.path().join("_site/index.html")).unwrap();
        assert!(home.contains("<h1>Home</h1>"));
        let intro =
            std::fs::read_to_string(dir.path().join("_site/guides/intro/index.html")).unwrap();
        assert!(intro.contains("<title>Intro</title>"));

        // Site index and persisted build cache came along
        assert!(dir.path().join("_site/site-index.json").exists());
        assert!(dir.path().join(".sitewright/cache/build.json").exists());
    }

    #[test]
    fn test_second_build_skips_unchanged_documents() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_site(dir.path());
        let builder = Builder::new(site_config(), dir.path().to_path_buf());

        builder.build().unwrap();
        let second = Builder::new(site_config(), dir.path().to_path_buf())
            .build()
            .unwrap();

        assert_eq!(second.cache.rebuilt, 0);
        assert_eq!(second.cache.skipped, 2);
    }

    #[test]
    fn test_changed_document_rebuilds_alone() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_site(dir.path());
        Builder::new(site_config(), dir.path().to_path_buf())
            .build()
            .unwrap();

        std::fs::write(dir.path().join("content/index.md"), "# New Home\n").unwrap();
        let report = Builder::new(site_config(), dir.path().to_path_buf())
            .build()
            .unwrap();

        assert_eq!(report.cache.rebuilt, 1);
        assert_eq!(report.cache.skipped, 1);
        let home = std::fs::read_to_string(dir.path().join("_site/index.html")).unwrap();
        assert!(home.contains("New Home"));
    }

    #[test]
    fn test_unknown_plugin_selection_warns_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_site(dir.path());
        let mut config = site_config();
        let mut names: Vec<String> = DEFAULT_PLUGINS.iter().map(|s| s.to_string()).collect();
        names.push("imaginary".to_string());
        config.plugins = Some(names);

        let report = Builder::new(config, dir.path().to_path_buf()).build().unwrap();

        assert_eq!(report.pages, 2);
        assert!(report.warnings.iter().any(|w| w.contains("imaginary")));
    }

    #[test]
    fn test_all_unknown_plugins_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_site(dir.path());
        let mut config = site_config();
        config.plugins = Some(vec!["nope".to_string()]);

        let error = Builder::new(config, dir.path().to_path_buf())
            .build()
            .unwrap_err();
        assert!(error.to_string().contains("no known plugins"));
    }

    #[test]
    fn test_non_incremental_build_always_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_site(dir.path());
        let mut config = site_config();
        config.build.incremental = false;

        Builder::new(config.clone(), dir.path().to_path_buf())
            .build()
            .unwrap();
        let second = Builder::new(config, dir.path().to_path_buf())
            .build()
            .unwrap();

        assert_eq!(second.cache.rebuilt, 2);
        assert_eq!(second.cache.skipped, 0);
        assert!(!dir.path().join(".sitewright/cache/build.json").exists());
    }
}
