//! The plugin capability model.
//!
//! Each stage has one narrow trait with a single method. A plugin implements
//! whichever subset of those traits it cares about and advertises them
//! through the capability accessors on [`Plugin`] — this is how
//! independently-authored plugins compose without a shared base type, and
//! without runtime type inspection on every dispatch.
//!
//! A minimal plugin looks like this:
//!
//! ```ignore
//! struct Minifier;
//!
//! impl WriteHook for Minifier {
//!     fn write(&self, ctx: &mut RunContext) -> Result<(), anyhow::Error> {
//!         ctx.process_concurrently(|doc| { /* ... */ Ok(()) })?;
//!         Ok(())
//!     }
//! }
//!
//! impl Plugin for Minifier {
//!     fn name(&self) -> &'static str { "minifier" }
//!     fn priority(&self, _stage: Stage) -> i32 { 80 }
//!     fn write_hook(&self) -> Option<&dyn WriteHook> { Some(self) }
//! }
//! ```

use super::context::RunContext;
use super::stage::Stage;

/// Priority assigned to every stage a plugin does not explicitly rank.
///
/// Lower priorities run earlier; ties preserve registration order.
pub const DEFAULT_PRIORITY: i32 = 50;

/// Hook for the configure stage.
pub trait ConfigureHook: Send + Sync {
    fn configure(&self, ctx: &mut RunContext) -> Result<(), anyhow::Error>;
}

/// Hook for the load stage.
pub trait LoadHook: Send + Sync {
    fn load(&self, ctx: &mut RunContext) -> Result<(), anyhow::Error>;
}

/// Hook for the transform stage.
pub trait TransformHook: Send + Sync {
    fn transform(&self, ctx: &mut RunContext) -> Result<(), anyhow::Error>;
}

/// Hook for the render stage.
pub trait RenderHook: Send + Sync {
    fn render(&self, ctx: &mut RunContext) -> Result<(), anyhow::Error>;
}

/// Hook for the collect stage.
pub trait CollectHook: Send + Sync {
    fn collect(&self, ctx: &mut RunContext) -> Result<(), anyhow::Error>;
}

/// Hook for the write stage.
pub trait WriteHook: Send + Sync {
    fn write(&self, ctx: &mut RunContext) -> Result<(), anyhow::Error>;
}

/// Hook for the cleanup stage.
pub trait CleanupHook: Send + Sync {
    fn cleanup(&self, ctx: &mut RunContext) -> Result<(), anyhow::Error>;
}

/// A named build component, polymorphic over a subset of stage hooks.
///
/// The capability accessors default to `None`; a plugin overrides the ones
/// matching the hook traits it implements (returning `Some(self)`). The
/// scheduler queries them once at engine construction, so per-stage dispatch
/// is an O(1) table lookup during the build.
pub trait Plugin: Send + Sync {
    /// Unique name, used for registry lookup and error messages.
    fn name(&self) -> &'static str;

    /// Execution priority for a stage. Lower runs earlier.
    ///
    /// A plugin may rank stages differently; anything it doesn't rank gets
    /// [`DEFAULT_PRIORITY`].
    fn priority(&self, _stage: Stage) -> i32 {
        DEFAULT_PRIORITY
    }

    fn configure_hook(&self) -> Option<&dyn ConfigureHook> {
        None
    }

    fn load_hook(&self) -> Option<&dyn LoadHook> {
        None
    }

    fn transform_hook(&self) -> Option<&dyn TransformHook> {
        None
    }

    fn render_hook(&self) -> Option<&dyn RenderHook> {
        None
    }

    fn collect_hook(&self) -> Option<&dyn CollectHook> {
        None
    }

    fn write_hook(&self) -> Option<&dyn WriteHook> {
        None
    }

    fn cleanup_hook(&self) -> Option<&dyn CleanupHook> {
        None
    }
}

impl dyn Plugin {
    /// Whether this plugin implements the given stage's capability.
    pub fn implements(&self, stage: Stage) -> bool {
        match stage {
            Stage::Configure => self.configure_hook().is_some(),
            Stage::Load => self.load_hook().is_some(),
            Stage::Transform => self.transform_hook().is_some(),
            Stage::Render => self.render_hook().is_some(),
            Stage::Collect => self.collect_hook().is_some(),
            Stage::Write => self.write_hook().is_some(),
            Stage::Cleanup => self.cleanup_hook().is_some(),
        }
    }

    /// The stages this plugin implements, in stage order.
    pub fn stages(&self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|stage| self.implements(*stage))
            .collect()
    }

    /// Invoke this plugin's hook for a stage.
    ///
    /// A plugin without the capability is a no-op; the scheduler filters
    /// those out before ever getting here.
    pub fn invoke(&self, stage: Stage, ctx: &mut RunContext) -> Result<(), anyhow::Error> {
        match stage {
            Stage::Configure => match self.configure_hook() {
                Some(hook) => hook.configure(ctx),
                None => Ok(()),
            },
            Stage::Load => match self.load_hook() {
                Some(hook) => hook.load(ctx),
                None => Ok(()),
            },
            Stage::Transform => match self.transform_hook() {
                Some(hook) => hook.transform(ctx),
                None => Ok(()),
            },
            Stage::Render => match self.render_hook() {
                Some(hook) => hook.render(ctx),
                None => Ok(()),
            },
            Stage::Collect => match self.collect_hook() {
                Some(hook) => hook.collect(ctx),
                None => Ok(()),
            },
            Stage::Write => match self.write_hook() {
                Some(hook) => hook.write(ctx),
                None => Ok(()),
            },
            Stage::Cleanup => match self.cleanup_hook() {
                Some(hook) => hook.cleanup(ctx),
                None => Ok(()),
            },
        }
    }
}
