//! Incremental build cache.
//!
//! Persists, per source document, the content hash and template identity the
//! last build used plus where the output landed. A rebuild can then be
//! skipped exactly when nothing relevant changed AND the recorded output
//! still exists on disk. Decisions are content-addressed, never mtime-based,
//! so a template change or an out-of-band deletion of output can never be
//! papered over by a stale record.
//!
//! Losing the cache file only costs a full rebuild; it never affects
//! correctness.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Persisted evidence that `output_path` was produced from exactly this
/// (input hash, template) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    pub input_hash: String,
    pub template: String,
    pub output_path: PathBuf,
}

/// Counters surfaced in the build summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Documents rewritten this build.
    pub rebuilt: usize,
    /// Documents skipped because their record was still valid.
    pub skipped: usize,
    /// Total records currently held.
    pub records: usize,
}

#[derive(Default)]
struct CacheState {
    records: HashMap<String, CacheRecord>,
    rebuilt: usize,
    skipped: usize,
}

/// Handle to the incremental build cache.
///
/// Clones share state through an internal mutex, so write-stage workers can
/// consult and update the cache concurrently without torn records.
#[derive(Clone, Default)]
pub struct BuildCache {
    state: Arc<Mutex<CacheState>>,
}

impl BuildCache {
    /// An empty cache; every document will rebuild.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load records from a cache file.
    ///
    /// A missing or unreadable file yields an empty cache and, for the
    /// unreadable case, a warning message the caller can surface.
    pub fn load(path: &Path) -> (Self, Option<String>) {
        let cache = Self::new();

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            // No cache yet is the normal first-build case
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return (cache, None),
            Err(e) => {
                return (
                    cache,
                    Some(format!(
                        "could not read build cache {}: {} (forcing full rebuild)",
                        path.display(),
                        e
                    )),
                );
            }
        };

        match serde_json::from_str::<HashMap<String, CacheRecord>>(&contents) {
            Ok(records) => {
                let mut state = cache.state.lock().expect("build cache lock poisoned");
                state.records = records;
                drop(state);
                (cache, None)
            }
            Err(e) => (
                cache,
                Some(format!(
                    "build cache {} is corrupt: {} (forcing full rebuild)",
                    path.display(),
                    e
                )),
            ),
        }
    }

    /// Whether a document must be rebuilt.
    ///
    /// Returns `false` only when a record for `path` matches both the input
    /// hash and the template identity, and the recorded output file still
    /// exists. Pure query: asking twice without an intervening
    /// [`mark_rebuilt`](Self::mark_rebuilt) gives the same answer.
    pub fn should_rebuild(&self, path: &str, input_hash: &str, template: &str) -> bool {
        let state = self.state.lock().expect("build cache lock poisoned");
        match state.records.get(path) {
            Some(record) => {
                record.input_hash != input_hash
                    || record.template != template
                    || !record.output_path.exists()
            }
            None => true,
        }
    }

    /// Record a successful (re)write, replacing any prior record for `path`.
    pub fn mark_rebuilt(&self, path: &str, input_hash: &str, output_path: PathBuf, template: &str) {
        let mut state = self.state.lock().expect("build cache lock poisoned");
        state.records.insert(
            path.to_string(),
            CacheRecord {
                input_hash: input_hash.to_string(),
                template: template.to_string(),
                output_path,
            },
        );
        state.rebuilt += 1;
    }

    /// Count a skipped document. Bookkeeping only.
    pub fn mark_skipped(&self) {
        let mut state = self.state.lock().expect("build cache lock poisoned");
        state.skipped += 1;
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock().expect("build cache lock poisoned");
        CacheStats {
            rebuilt: state.rebuilt,
            skipped: state.skipped,
            records: state.records.len(),
        }
    }

    /// Persist all records as JSON, atomically (write to a temp file in the
    /// same directory, then rename over the target).
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = {
            let state = self.state.lock().expect("build cache lock poisoned");
            serde_json::to_string_pretty(&state.records)?
        };

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}
