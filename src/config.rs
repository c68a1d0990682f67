//! Configuration loading and types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to encode config file path as a unicode string: {0}")]
    EncodePath(PathBuf),

    #[error("failed to deserialize config: {0}")]
    Deserialize(#[from] config::ConfigError),

    #[error("failed to get current working directory: {0}")]
    CwdFailure(std::io::Error),
}

/// The site configuration, loaded from `sitewright.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub site: SiteMeta,
    /// Content directory, relative to the config file
    #[serde(default = "default_content_dir")]
    pub content: PathBuf,
    /// Tera templates directory, relative to the config file
    #[serde(default = "default_templates_dir")]
    pub templates: PathBuf,
    /// Explicit plugin selection. When omitted, the curated default list runs.
    pub plugins: Option<Vec<String>>,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub markdown: MarkdownConfig,
    /// Development-specific settings (watch mode, live reload)
    #[serde(default)]
    pub dev: DevConfig,
}

/// Site-level metadata exposed to templates as `site.*`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteMeta {
    pub name: String,
    pub url: Option<String>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_output() -> PathBuf {
    PathBuf::from("_site")
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("content")
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

// =============================================================================
// Build configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Worker pool size for concurrent document passes.
    /// Defaults to the number of logical CPUs when omitted.
    pub workers: Option<usize>,
    /// Skip unchanged documents using the persisted build cache.
    #[serde(default = "default_incremental")]
    pub incremental: bool,
    /// Publish documents marked `draft: true` in their front matter.
    #[serde(default)]
    pub drafts: bool,
}

fn default_incremental() -> bool {
    true
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            workers: None,
            incremental: default_incremental(),
            drafts: false,
        }
    }
}

// =============================================================================
// Markdown configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// Extensions to enable for markdown processing
    #[serde(default = "default_markdown_extensions")]
    pub extensions: Vec<String>,
}

fn default_markdown_extensions() -> Vec<String> {
    vec![
        "footnotes".to_string(),
        "heading_attributes".to_string(),
        "strikethrough".to_string(),
        "tables".to_string(),
        "tasklists".to_string(),
    ]
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            extensions: default_markdown_extensions(),
        }
    }
}

// =============================================================================
// Development configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevConfig {
    /// File watching configuration
    #[serde(default)]
    pub watch: WatchConfig,
    /// Enable live reload in the browser when files change (default: true)
    #[serde(default = "default_live_reload")]
    pub live_reload: bool,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            watch: WatchConfig::default(),
            live_reload: true,
        }
    }
}

fn default_live_reload() -> bool {
    true
}

/// Configuration for file watching during development.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Use polling-based watcher instead of native file system events.
    /// Useful for network filesystems, Docker volumes, or other situations
    /// where native events are unreliable.
    #[serde(default)]
    pub poll: bool,
    /// Poll interval in milliseconds (only used if poll=true).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Debounce timeout in milliseconds.
    /// Changes within this window are batched together.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_debounce_ms() -> u64 {
    100
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll: false,
            poll_interval_ms: default_poll_interval_ms(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

// =============================================================================
// Resolved project paths
// =============================================================================

/// Absolute paths for one build, resolved against the config file's directory.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    pub base: PathBuf,
    pub content: PathBuf,
    pub templates: PathBuf,
    pub output: PathBuf,
    pub cache_file: PathBuf,
}

impl ProjectPaths {
    pub fn resolve(config: &SiteConfig, base: &Path) -> Self {
        let join = |p: &Path| {
            if p.is_relative() {
                base.join(p)
            } else {
                p.to_path_buf()
            }
        };
        Self {
            base: base.to_path_buf(),
            content: join(&config.content),
            templates: join(&config.templates),
            output: join(&config.site.output),
            cache_file: base.join(".sitewright/cache/build.json"),
        }
    }
}

// =============================================================================
// Config loading
// =============================================================================

impl SiteConfig {
    /// Load the config from the command line argument, defaulting to `sitewright.yaml`
    pub async fn load_from_arg(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config_file = config_file.unwrap_or(Path::new("sitewright.yaml"));
        let config_file = if config_file.is_relative() {
            std::env::current_dir()
                .map_err(ConfigError::CwdFailure)?
                .join(config_file)
        } else {
            config_file.to_path_buf()
        };

        Self::load_from_file(&config_file).await
    }

    /// Load the config from a file path
    pub async fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let path_str = path
            .as_os_str()
            .to_str()
            .ok_or_else(|| ConfigError::EncodePath(path.to_path_buf()))?;

        Ok(config::Config::builder()
            .add_source(config::File::new(path_str, config::FileFormat::Yaml))
            .build()?
            .try_deserialize::<SiteConfig>()?)
    }
}
