use crate::{config::SiteConfig, paths::base_path_from_config, CleanArgs};

pub async fn run(args: &CleanArgs) -> Result<(), anyhow::Error> {
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

    let config = SiteConfig::load_from_file(&config_path).await?;
    let base_path = base_path_from_config(&config_path);

    // Delete the generated site folder
    let site_path = base_path
        .join(&config.site.output)
        .canonicalize()
        .unwrap_or_else(|_| base_path.join(&config.site.output));
    if site_path.exists() {
        if args.dry_run {
            println!("Would delete {}", site_path.display());
        } else {
            tokio::fs::remove_dir_all(&site_path).await?;
            println!("Deleted {}", site_path.display());
        }
    }

    // Delete the cache folder
    let cache_path = base_path.join(".sitewright");
    if cache_path.exists() {
        if args.dry_run {
            println!("Would delete {}", cache_path.display());
        } else {
            tokio::fs::remove_dir_all(&cache_path).await?;
            println!("Deleted {}", cache_path.display());
        }
    }

    Ok(())
}
