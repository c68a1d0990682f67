use crate::InitArgs;

const STARTER_PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8" />
    <title>{{ page.title }} - {{ site.name }}</title>
  </head>
  <body>
    <main>{{ content | safe }}</main>
  </body>
</html>
"#;

const STARTER_INDEX: &str = r#"---
title: Home
---

# Welcome

Edit `content/index.md` to get started.
"#;

pub async fn run(args: &InitArgs) -> Result<(), anyhow::Error> {
    let path = if args.path.is_relative() {
        std::env::current_dir()?.join(&args.path)
    } else {
        args.path.clone()
    };

    if !path.exists() {
        if args.create {
            tokio::fs::create_dir_all(&path).await?;
            println!("Created directory {path}", path = path.display());
        } else {
            return Err(anyhow::anyhow!(
                "Directory does not exist: {path}",
                path = path.display()
            ));
        }
    }

    let config_file = path.join("sitewright.yaml");
    if config_file.exists() {
        return Err(anyhow::anyhow!(
            "{config_file} already exists, refusing to overwrite",
            config_file = config_file.display()
        ));
    }

    println!("Initializing project in {}", path.display());

    let default_config = crate::config::SiteConfig {
        site: crate::config::SiteMeta {
            name: "My Site".into(),
            url: Some("https://example.com".into()),
            output: "_site".into(),
        },
        content: "content".into(),
        templates: "templates".into(),
        plugins: None,
        build: Default::default(),
        markdown: Default::default(),
        dev: Default::default(),
    };
    let config_text = serde_yaml::to_string(&default_config)?;
    tokio::fs::write(&config_file, config_text).await?;
    println!(
        "Created config file {config_file}",
        config_file = config_file.display()
    );

    tokio::fs::create_dir_all(path.join("content")).await?;
    tokio::fs::write(path.join("content/index.md"), STARTER_INDEX).await?;
    tokio::fs::create_dir_all(path.join("templates")).await?;
    tokio::fs::write(path.join("templates/page.html"), STARTER_PAGE_TEMPLATE).await?;
    println!("Created starter content and templates");
    println!("\nRun `sitewright build` in {} to build it", path.display());

    Ok(())
}
