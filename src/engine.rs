//! The plugin lifecycle orchestration engine.
//!
//! Everything a build needs to run plugins lives here:
//! - `stage`: the fixed, ordered build stages
//! - `plugin`: the capability traits plugins implement
//! - `registry`: name -> constructor table for materializing plugin lists
//! - `scheduler`: the stage/priority orchestrator
//! - `context`: the per-build run context handed to every hook
//! - `concurrent`: bounded fan-out over the document set
//! - `shared_cache`: in-run key/value store for inter-plugin data passing
//! - `build_cache`: persisted content-hash cache for incremental rebuilds

pub mod build_cache;
pub mod concurrent;
mod context;
mod error;
mod plugin;
mod registry;
mod scheduler;
mod shared_cache;
mod stage;

pub use build_cache::{BuildCache, CacheStats};
#[cfg(test)]
pub(crate) use context::{test_context, test_context_at};
pub use context::{RunContext, RunFlags};
pub use error::{DocumentErrors, DocumentFailure, EngineError};
pub use plugin::{
    CleanupHook, CollectHook, ConfigureHook, LoadHook, Plugin, RenderHook, TransformHook,
    WriteHook, DEFAULT_PRIORITY,
};
pub use registry::{PluginRegistry, RegistryError};
pub use scheduler::Engine;
pub use shared_cache::SharedCache;
pub use stage::Stage;
