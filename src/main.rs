use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod builder;
mod commands;
mod config;
mod document;
mod engine;
mod paths;
mod plugins;
mod watch;

#[derive(Parser)]
struct Args {
    /// The command to execute
    #[command(subcommand)]
    command: SitewrightCommand,
}

#[derive(Parser)]
struct InitArgs {
    /// The path to initialize the project in
    path: PathBuf,

    /// Whether to create the directory if it doesn't exist
    #[arg(short, long, default_value = "false")]
    create: bool,
}

#[derive(Parser)]
struct BuildArgs {
    /// The path to the configuration file
    #[arg(short, long, default_value = "sitewright.yaml")]
    config_file: Option<PathBuf>,

    /// Ignore the incremental build cache and rewrite everything
    #[arg(short, long, default_value = "false")]
    full: bool,
}

#[derive(Parser)]
struct ServeArgs {
    /// The address to bind to
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// The port to bind to
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Open the site in the default browser
    #[arg(short, long, default_value = "false")]
    open: bool,

    /// The path to the configuration file
    #[arg(short, long, default_value = "sitewright.yaml")]
    config_file: Option<PathBuf>,

    /// Whether to watch for changes and rebuild automatically
    #[arg(short, long, default_value = "true")]
    watch: bool,
}

#[derive(Parser)]
struct CleanArgs {
    /// The path to the configuration file
    #[arg(short, long, default_value = "sitewright.yaml")]
    config_file: Option<PathBuf>,

    /// Show what would be deleted without deleting it
    #[arg(short, long, default_value = "false")]
    dry_run: bool,
}

#[derive(Parser)]
struct PluginsArgs {
    /// The path to the configuration file
    #[arg(short, long)]
    config_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum SitewrightCommand {
    /// Initialize a new site
    Init(InitArgs),

    /// Build the site
    Build(BuildArgs),

    /// Serve the site on a local port, rebuilding on changes
    Serve(ServeArgs),

    /// Delete the generated site and build cache
    Clean(CleanArgs),

    /// Show the configured plugins and the stage schedule
    Plugins(PluginsArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    match args.command {
        SitewrightCommand::Init(args) => {
            commands::init::run(&args).await?;
        }
        SitewrightCommand::Build(args) => {
            commands::build::run(&args).await?;
        }
        SitewrightCommand::Serve(args) => {
            commands::serve::run(&args).await?;
        }
        SitewrightCommand::Clean(args) => {
            commands::clean::run(&args).await?;
        }
        SitewrightCommand::Plugins(args) => {
            commands::plugins::run(&args).await?;
        }
    }

    Ok(())
}
