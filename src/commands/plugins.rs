use crate::{
    config::SiteConfig,
    engine::{Engine, Stage},
    plugins::{default_registry, DEFAULT_PLUGINS},
    PluginsArgs,
};

/// Show the plugins this site would run and the per-stage schedule.
pub async fn run(args: &PluginsArgs) -> Result<(), anyhow::Error> {
    // The config is optional here: without one, show the default selection
    let selection = match &args.config_file {
        Some(path) => SiteConfig::load_from_file(path).await?.plugins,
        None => match SiteConfig::load_from_arg(None).await {
            Ok(config) => config.plugins,
            Err(_) => None,
        },
    };
    let names: Vec<String> = match selection {
        Some(names) => names,
        None => DEFAULT_PLUGINS.iter().map(|s| s.to_string()).collect(),
    };

    let registry = default_registry();
    let (plugins, warnings) = registry.by_names(&names);
    for warning in &warnings {
        eprintln!("warning: {warning}");
    }

    let engine = Engine::new(plugins);

    println!("Plugins ({}):", engine.plugins().len());
    for plugin in engine.plugins() {
        let stages: Vec<String> = plugin
            .stages()
            .iter()
            .map(|&stage| format!("{stage}({})", plugin.priority(stage)))
            .collect();
        println!("  {:<14} {}", plugin.name(), stages.join(", "));
    }

    println!("\nSchedule:");
    for stage in Stage::ALL {
        let scheduled = engine.schedule_for(stage);
        if !scheduled.is_empty() {
            println!("  {stage:<10} {}", scheduled.join(" -> "));
        }
    }

    Ok(())
}
