//! Build stages.
//!
//! A build walks a fixed, totally ordered list of stages. Stages carry no
//! state of their own; they only act as dispatch keys for plugin hooks.

use std::fmt;

/// One phase of the build pipeline.
///
/// The order of the variants is the order stages execute in. Later stages
/// may assume earlier stages fully completed for every document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Prepare shared resources (template engines, external data).
    Configure,
    /// Discover and read documents into the document set.
    Load,
    /// Transform document bodies (markdown to HTML, shortcodes, ...).
    Transform,
    /// Produce the final page output for each document.
    Render,
    /// Aggregate across documents (listings, feeds, statistics).
    Collect,
    /// Write output artifacts to disk.
    Write,
    /// Report, flush, and tidy up.
    Cleanup,
}

impl Stage {
    /// Every stage, in execution order.
    pub const ALL: [Stage; 7] = [
        Stage::Configure,
        Stage::Load,
        Stage::Transform,
        Stage::Render,
        Stage::Collect,
        Stage::Write,
        Stage::Cleanup,
    ];

    /// Lowercase stage name, as shown in error messages and `plugins` output.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Configure => "configure",
            Stage::Load => "load",
            Stage::Transform => "transform",
            Stage::Render => "render",
            Stage::Collect => "collect",
            Stage::Write => "write",
            Stage::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_is_fixed() {
        assert_eq!(
            Stage::ALL,
            [
                Stage::Configure,
                Stage::Load,
                Stage::Transform,
                Stage::Render,
                Stage::Collect,
                Stage::Write,
                Stage::Cleanup,
            ]
        );
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Configure.to_string(), "configure");
        assert_eq!(Stage::Write.to_string(), "write");
    }
}
