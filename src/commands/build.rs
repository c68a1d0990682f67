use crate::{builder::Builder, config::SiteConfig, paths::base_path_from_config, BuildArgs};

pub async fn run(args: &BuildArgs) -> Result<(), anyhow::Error> {
    // Determine the config file path
    let config_path = args
        .config_file
        .clone()
        .unwrap_or_else(|| "sitewright.yaml".into());
    let config_path = if config_path.is_relative() {
        std::env::current_dir()?.join(&config_path)
    } else {
        config_path
    };

    let mut config = SiteConfig::load_from_file(&config_path).await?;
    if args.full {
        config.build.incremental = false;
    }

    // Get the base path for resolving relative paths
    let base_path = base_path_from_config(&config_path);

    println!("Building site...");
    let builder = Builder::new(config, base_path);
    let report = tokio::task::spawn_blocking(move || builder.build()).await??;

    println!(
        "Built site to {} ({} page(s), {} unchanged)",
        report.output_dir.display(),
        report.pages,
        report.cache.skipped
    );

    Ok(())
}
