//! File watching for automatic rebuilds.
//!
//! Uses `notify-debouncer-full` to watch the content directory, the template
//! directory, and the config file for changes.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{
    Config as NotifyConfig, EventKind, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher,
};
use notify_debouncer_full::{
    DebounceEventResult, Debouncer, RecommendedCache, new_debouncer, new_debouncer_opt,
};

use crate::config::WatchConfig;

#[derive(thiserror::Error, Debug)]
pub enum WatchError {
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),
}

/// What kind of input changed, decides how much to rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    /// A content file changed; an incremental rebuild suffices.
    Content { path: PathBuf, deleted: bool },
    /// A template changed; every page rendered with it is stale.
    Template { path: PathBuf },
    /// The config file changed; the effective configuration must be reloaded.
    Config,
}

/// Events sent from the file watcher.
#[derive(Debug)]
pub enum WatchEvent {
    /// Files changed, rebuild needed.
    FilesChanged(Vec<ChangeKind>),
    /// Watcher error occurred.
    Error(String),
}

/// Classifies changed paths into change kinds.
#[derive(Clone)]
pub struct PathClassifier {
    content_dir: PathBuf,
    templates_dir: PathBuf,
    config_path: PathBuf,
}

impl PathClassifier {
    pub fn new(content_dir: PathBuf, templates_dir: PathBuf, config_path: PathBuf) -> Self {
        Self {
            content_dir,
            templates_dir,
            config_path,
        }
    }

    pub fn classify(&self, path: &Path, deleted: bool) -> Option<ChangeKind> {
        // Skip hidden files and directories (editors' swap files, .git, the
        // cache directory itself)
        if path
            .components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
        {
            return None;
        }

        if path == self.config_path {
            return Some(ChangeKind::Config);
        }

        if path.starts_with(&self.templates_dir) {
            if path.extension().is_some_and(|e| e == "html") {
                return Some(ChangeKind::Template {
                    path: path.to_path_buf(),
                });
            }
            return None;
        }

        if path.starts_with(&self.content_dir) {
            if path.extension().is_some_and(|e| e == "md") {
                return Some(ChangeKind::Content {
                    path: path.to_path_buf(),
                    deleted,
                });
            }
            return None;
        }

        None // Unknown path, ignore
    }
}

/// A file watcher that can use either native or polling backend.
pub enum FileWatcher {
    /// Native file system watcher (recommended for local development).
    Native {
        _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
        rx: Receiver<WatchEvent>,
    },
    /// Polling-based watcher (for network filesystems, Docker, etc.).
    Polling {
        _debouncer: Debouncer<PollWatcher, RecommendedCache>,
        rx: Receiver<WatchEvent>,
    },
}

impl FileWatcher {
    pub fn new(config: &WatchConfig, classifier: PathClassifier) -> Result<Self, WatchError> {
        let debounce_timeout = Duration::from_millis(config.debounce_ms);
        let (tx, rx) = mpsc::channel();

        let event_classifier = classifier.clone();
        let callback = move |result: DebounceEventResult| match result {
            Ok(events) => {
                let changes: Vec<ChangeKind> = events
                    .iter()
                    .filter_map(|event| {
                        if !is_relevant_event(&event.kind) {
                            return None;
                        }
                        let deleted = matches!(event.kind, EventKind::Remove(_));
                        // Classify the first path (usually there's only one)
                        event
                            .paths
                            .first()
                            .and_then(|p| event_classifier.classify(p, deleted))
                    })
                    .collect();

                if !changes.is_empty() {
                    let _ = tx.send(WatchEvent::FilesChanged(changes));
                }
            }
            Err(errors) => {
                for e in errors {
                    let _ = tx.send(WatchEvent::Error(e.to_string()));
                }
            }
        };

        if config.poll {
            let poll_interval = Duration::from_millis(config.poll_interval_ms);
            let notify_config = NotifyConfig::default().with_poll_interval(poll_interval);

            let mut debouncer = new_debouncer_opt::<_, PollWatcher, RecommendedCache>(
                debounce_timeout,
                None,
                callback,
                RecommendedCache::default(),
                notify_config,
            )
            .map_err(WatchError::Notify)?;

            add_watch_paths(&mut debouncer, &classifier)?;

            Ok(FileWatcher::Polling {
                _debouncer: debouncer,
                rx,
            })
        } else {
            let mut debouncer =
                new_debouncer(debounce_timeout, None, callback).map_err(WatchError::Notify)?;

            add_watch_paths(&mut debouncer, &classifier)?;

            Ok(FileWatcher::Native {
                _debouncer: debouncer,
                rx,
            })
        }
    }

    /// Receive the next watch event (blocking).
    pub fn recv(&self) -> Option<WatchEvent> {
        match self {
            FileWatcher::Native { rx, .. } => rx.recv().ok(),
            FileWatcher::Polling { rx, .. } => rx.recv().ok(),
        }
    }
}

fn add_watch_paths<W: Watcher, C: notify_debouncer_full::FileIdCache>(
    debouncer: &mut Debouncer<W, C>,
    classifier: &PathClassifier,
) -> Result<(), WatchError> {
    if classifier.content_dir.exists() {
        debouncer.watch(&classifier.content_dir, RecursiveMode::Recursive)?;
    }
    if classifier.templates_dir.exists() {
        debouncer.watch(&classifier.templates_dir, RecursiveMode::Recursive)?;
    }
    // Watch the config file's parent directory to catch config rewrites
    if let Some(parent) = classifier.config_path.parent()
        && parent.exists()
    {
        debouncer.watch(parent, RecursiveMode::NonRecursive)?;
    }
    Ok(())
}

/// Check if an event kind is relevant for rebuilds.
fn is_relevant_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
    )
}
