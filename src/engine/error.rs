//! Engine error types.
//!
//! Two distinct failure granularities, kept separate on purpose:
//!
//! - [`EngineError::Hook`] is fatal: a stage hook failed, the build stops.
//! - [`DocumentErrors`] aggregates per-document failures from one concurrent
//!   pass; the calling hook decides whether to propagate it (making it fatal)
//!   or degrade it to warnings.

use std::fmt;
use std::path::PathBuf;

use super::stage::Stage;

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("plugin '{plugin}' failed in {stage} stage: {source}")]
    Hook {
        plugin: String,
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Documents(#[from] DocumentErrors),

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// One document's failure within a concurrent pass.
#[derive(Debug)]
pub struct DocumentFailure {
    /// Source path of the failing document.
    pub path: PathBuf,
    /// Rendered error chain.
    pub message: String,
}

/// Aggregate error from a concurrent pass over the document set.
///
/// Every document is attempted regardless of earlier failures; this collects
/// the ones that failed, in document order.
#[derive(Debug)]
pub struct DocumentErrors {
    failures: Vec<DocumentFailure>,
}

impl DocumentErrors {
    pub(crate) fn new(failures: Vec<DocumentFailure>) -> Self {
        Self { failures }
    }

    /// The individual failures, in document order.
    pub fn failures(&self) -> &[DocumentFailure] {
        &self.failures
    }

    /// Number of documents that failed.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for DocumentErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} document(s) failed", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n  {}: {}", failure.path.display(), failure.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for DocumentErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_errors_display_lists_each_failure() {
        let errors = DocumentErrors::new(vec![
            DocumentFailure {
                path: PathBuf::from("a.md"),
                message: "bad front matter".to_string(),
            },
            DocumentFailure {
                path: PathBuf::from("b.md"),
                message: "template missing".to_string(),
            },
        ]);

        let rendered = errors.to_string();
        assert!(rendered.starts_with("2 document(s) failed"));
        assert!(rendered.contains("a.md: bad front matter"));
        assert!(rendered.contains("b.md: template missing"));
    }

    #[test]
    fn test_hook_error_names_plugin_and_stage() {
        let error = EngineError::Hook {
            plugin: "writer".to_string(),
            stage: Stage::Write,
            source: anyhow::anyhow!("disk full"),
        };
        let rendered = error.to_string();
        assert!(rendered.contains("writer"));
        assert!(rendered.contains("write stage"));
        assert!(rendered.contains("disk full"));
    }
}
