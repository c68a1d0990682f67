//! Built-in plugins.
//!
//! Each of these is an ordinary plugin going through the same capability
//! interfaces a third-party plugin would; nothing in the engine knows about
//! them specifically. Together they cover every stage of the default build:
//!
//! 1. **loader** (load) - discover and read content files
//! 2. **markdown** (transform) - render markdown bodies to HTML
//! 3. **templates** (configure, render) - compile Tera and wrap pages
//! 4. **collections** (collect, write) - aggregate site-wide listings
//! 5. **writer** (write) - write pages, skipping unchanged ones
//! 6. **reporter** (cleanup) - print the build summary

pub mod collections;
pub mod loader;
pub mod markdown;
pub mod reporter;
pub mod templates;
pub mod writer;

pub use collections::CollectionsPlugin;
pub use loader::LoaderPlugin;
pub use markdown::MarkdownPlugin;
pub use reporter::ReporterPlugin;
pub use templates::TemplatesPlugin;
pub use writer::WriterPlugin;

use crate::engine::PluginRegistry;

/// The curated default build order, used when the config names no plugins.
pub const DEFAULT_PLUGINS: &[&str] = &[
    "loader",
    "markdown",
    "templates",
    "collections",
    "writer",
    "reporter",
];

/// Registry with every built-in plugin registered.
pub fn default_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry
        .register("loader", || Box::new(LoaderPlugin))
        .expect("built-in plugin names are unique");
    registry
        .register("markdown", || Box::new(MarkdownPlugin))
        .expect("built-in plugin names are unique");
    registry
        .register("templates", || Box::new(TemplatesPlugin))
        .expect("built-in plugin names are unique");
    registry
        .register("collections", || Box::new(CollectionsPlugin))
        .expect("built-in plugin names are unique");
    registry
        .register("writer", || Box::new(WriterPlugin))
        .expect("built-in plugin names are unique");
    registry
        .register("reporter", || Box::new(ReporterPlugin))
        .expect("built-in plugin names are unique");
    registry
}
