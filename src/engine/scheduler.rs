//! The stage/priority orchestrator.
//!
//! Walks the fixed stage order; within a stage, the plugins implementing
//! that stage's capability run sequentially, lowest priority first, ties in
//! registration order. Concurrency only ever happens inside a hook, through
//! the run context's worker pool.

use super::context::RunContext;
use super::error::EngineError;
use super::plugin::Plugin;
use super::stage::Stage;

/// The build engine: a plugin list plus its precomputed per-stage schedule.
pub struct Engine {
    plugins: Vec<Box<dyn Plugin>>,
    /// For each stage (indexed by position in `Stage::ALL`), the plugin
    /// indices that implement it, sorted by priority. Capability queries
    /// happen once, here, so dispatch during the run is a table walk.
    schedule: Vec<Vec<usize>>,
}

impl Engine {
    /// Build the engine and its schedule from an ordered plugin list.
    ///
    /// The list order is the registration order used for priority
    /// tie-breaking, so identical inputs always produce identical schedules.
    pub fn new(plugins: Vec<Box<dyn Plugin>>) -> Self {
        let schedule = Stage::ALL
            .iter()
            .map(|&stage| {
                let mut scheduled: Vec<usize> = plugins
                    .iter()
                    .enumerate()
                    .filter(|(_, plugin)| plugin.implements(stage))
                    .map(|(index, _)| index)
                    .collect();
                // Stable sort: ties keep registration order
                scheduled.sort_by_key(|&index| plugins[index].priority(stage));
                scheduled
            })
            .collect();

        Self { plugins, schedule }
    }

    /// Run every stage in order.
    ///
    /// A hook error aborts the remainder of its stage and all later stages;
    /// later stages assume earlier ones fully completed, so partial
    /// continuation would only compound the damage. The error is annotated
    /// with the failing plugin's name and the stage.
    pub fn run(&self, ctx: &mut RunContext) -> Result<(), EngineError> {
        for (position, &stage) in Stage::ALL.iter().enumerate() {
            for &index in &self.schedule[position] {
                let plugin = self.plugins[index].as_ref();
                plugin
                    .invoke(stage, ctx)
                    .map_err(|source| EngineError::Hook {
                        plugin: plugin.name().to_string(),
                        stage,
                        source,
                    })?;
            }
        }
        Ok(())
    }

    /// Plugin names scheduled for a stage, in execution order.
    pub fn schedule_for(&self, stage: Stage) -> Vec<&str> {
        let position = Stage::ALL
            .iter()
            .position(|&s| s == stage)
            .expect("stage is one of Stage::ALL");
        self.schedule[position]
            .iter()
            .map(|&index| self.plugins[index].name())
            .collect()
    }

    pub fn plugins(&self) -> &[Box<dyn Plugin>] {
        &self.plugins
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::super::context::test_context;
    use super::super::plugin::{
        CleanupHook, LoadHook, RenderHook, TransformHook, WriteHook, DEFAULT_PRIORITY,
    };
    use super::*;

    type CallLog = Arc<Mutex<Vec<String>>>;

    /// Test plugin that records its invocations and participates in a
    /// configurable subset of stages with configurable priorities.
    struct Recording {
        name: &'static str,
        stages: Vec<(Stage, i32)>,
        log: CallLog,
        fail_in: Option<Stage>,
    }

    impl Recording {
        fn new(name: &'static str, stages: Vec<(Stage, i32)>, log: CallLog) -> Self {
            Self {
                name,
                stages,
                log,
                fail_in: None,
            }
        }

        fn failing(mut self, stage: Stage) -> Self {
            self.fail_in = Some(stage);
            self
        }

        fn record(&self, stage: Stage) -> Result<(), anyhow::Error> {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.name, stage));
            if self.fail_in == Some(stage) {
                anyhow::bail!("deliberate failure");
            }
            Ok(())
        }

        fn in_stage(&self, stage: Stage) -> bool {
            self.stages.iter().any(|(s, _)| *s == stage)
        }
    }

    impl LoadHook for Recording {
        fn load(&self, _ctx: &mut RunContext) -> Result<(), anyhow::Error> {
            self.record(Stage::Load)
        }
    }

    impl TransformHook for Recording {
        fn transform(&self, _ctx: &mut RunContext) -> Result<(), anyhow::Error> {
            self.record(Stage::Transform)
        }
    }

    impl RenderHook for Recording {
        fn render(&self, _ctx: &mut RunContext) -> Result<(), anyhow::Error> {
            self.record(Stage::Render)
        }
    }

    impl WriteHook for Recording {
        fn write(&self, _ctx: &mut RunContext) -> Result<(), anyhow::Error> {
            self.record(Stage::Write)
        }
    }

    impl CleanupHook for Recording {
        fn cleanup(&self, _ctx: &mut RunContext) -> Result<(), anyhow::Error> {
            self.record(Stage::Cleanup)
        }
    }

    impl Plugin for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        fn priority(&self, stage: Stage) -> i32 {
            self.stages
                .iter()
                .find(|(s, _)| *s == stage)
                .map(|(_, priority)| *priority)
                .unwrap_or(DEFAULT_PRIORITY)
        }

        fn load_hook(&self) -> Option<&dyn LoadHook> {
            self.in_stage(Stage::Load).then_some(self as &dyn LoadHook)
        }

        fn transform_hook(&self) -> Option<&dyn TransformHook> {
            self.in_stage(Stage::Transform)
                .then_some(self as &dyn TransformHook)
        }

        fn render_hook(&self) -> Option<&dyn RenderHook> {
            self.in_stage(Stage::Render)
                .then_some(self as &dyn RenderHook)
        }

        fn write_hook(&self) -> Option<&dyn WriteHook> {
            self.in_stage(Stage::Write)
                .then_some(self as &dyn WriteHook)
        }

        fn cleanup_hook(&self) -> Option<&dyn CleanupHook> {
            self.in_stage(Stage::Cleanup)
                .then_some(self as &dyn CleanupHook)
        }
    }

    #[test]
    fn test_stages_run_in_fixed_order() {
        let log: CallLog = Arc::default();
        let plugin = Recording::new(
            "all",
            vec![
                (Stage::Cleanup, 1),
                (Stage::Load, 1),
                (Stage::Write, 1),
                (Stage::Transform, 1),
                (Stage::Render, 1),
            ],
            log.clone(),
        );

        let engine = Engine::new(vec![Box::new(plugin)]);
        engine.run(&mut test_context()).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "all:load",
                "all:transform",
                "all:render",
                "all:write",
                "all:cleanup"
            ]
        );
    }

    #[test]
    fn test_priority_orders_plugins_within_a_stage() {
        let log: CallLog = Arc::default();
        // Registered [a, b] but priorities say b first
        let a = Recording::new("a", vec![(Stage::Write, 10)], log.clone());
        let b = Recording::new("b", vec![(Stage::Write, 5)], log.clone());

        let engine = Engine::new(vec![Box::new(a), Box::new(b)]);
        engine.run(&mut test_context()).unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["b:write", "a:write"]);
    }

    #[test]
    fn test_priority_ties_keep_registration_order() {
        for _ in 0..5 {
            let log: CallLog = Arc::default();
            let plugins: Vec<Box<dyn Plugin>> = vec![
                Box::new(Recording::new("first", vec![(Stage::Render, 50)], log.clone())),
                Box::new(Recording::new("second", vec![(Stage::Render, 50)], log.clone())),
                Box::new(Recording::new("third", vec![(Stage::Render, 50)], log.clone())),
            ];

            let engine = Engine::new(plugins);
            engine.run(&mut test_context()).unwrap();

            // Reproducible across repeated runs with identical input
            assert_eq!(
                *log.lock().unwrap(),
                vec!["first:render", "second:render", "third:render"]
            );
        }
    }

    #[test]
    fn test_per_stage_priorities_are_independent() {
        let log: CallLog = Arc::default();
        // a runs first in load but last in write
        let a = Recording::new("a", vec![(Stage::Load, 1), (Stage::Write, 90)], log.clone());
        let b = Recording::new("b", vec![(Stage::Load, 2), (Stage::Write, 10)], log.clone());

        let engine = Engine::new(vec![Box::new(a), Box::new(b)]);
        engine.run(&mut test_context()).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:load", "b:load", "b:write", "a:write"]
        );
    }

    #[test]
    fn test_plugin_without_capability_is_never_invoked() {
        let log: CallLog = Arc::default();
        let active = Recording::new("active", vec![(Stage::Write, 1)], log.clone());
        let inert = Recording::new("inert", vec![], log.clone());

        let engine = Engine::new(vec![Box::new(inert), Box::new(active)]);
        assert!(engine.schedule_for(Stage::Write) == vec!["active"]);
        engine.run(&mut test_context()).unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["active:write"]);
    }

    #[test]
    fn test_stage_with_no_plugins_is_a_noop() {
        let engine = Engine::new(Vec::new());
        assert!(engine.schedule_for(Stage::Collect).is_empty());
        engine.run(&mut test_context()).unwrap();
    }

    #[test]
    fn test_hook_error_aborts_stage_and_later_stages() {
        let log: CallLog = Arc::default();
        let early = Recording::new(
            "early",
            vec![(Stage::Transform, 1), (Stage::Write, 1)],
            log.clone(),
        )
        .failing(Stage::Transform);
        let late = Recording::new(
            "late",
            vec![(Stage::Transform, 2), (Stage::Write, 2)],
            log.clone(),
        );

        let engine = Engine::new(vec![Box::new(early), Box::new(late)]);
        let error = engine.run(&mut test_context()).unwrap_err();

        // Error names the plugin and the stage
        let rendered = error.to_string();
        assert!(rendered.contains("early"));
        assert!(rendered.contains("transform stage"));

        // Neither the rest of the stage nor later stages ran
        assert_eq!(*log.lock().unwrap(), vec!["early:transform"]);
    }
}
