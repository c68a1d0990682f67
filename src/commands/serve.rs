use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use futures_util::stream::Stream;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

use crate::{
    builder::Builder,
    config::{ProjectPaths, SiteConfig},
    paths::base_path_from_config,
    watch::{ChangeKind, FileWatcher, PathClassifier, WatchEvent},
    ServeArgs,
};

/// SSE handler for live reload notifications.
async fn live_reload_handler(
    State(tx): State<broadcast::Sender<()>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = tx.subscribe();
    let stream = async_stream::stream! {
        let mut rx = rx;
        loop {
            match rx.recv().await {
                Ok(_) => {
                    yield Ok(Event::default().event("reload").data("reload"));
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    // Missed some messages, but that's fine - we just need the latest
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    break;
                }
            }
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn dev_builder(config: &SiteConfig, base_path: PathBuf) -> Builder {
    Builder::new(config.clone(), base_path)
        .with_dev_mode(true)
        .with_live_reload(config.dev.live_reload)
}

pub async fn run(args: &ServeArgs) -> Result<(), anyhow::Error> {
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
    let paths = ProjectPaths::resolve(&config, &base_path);

    // Create broadcast channel for live reload
    let (reload_tx, _) = broadcast::channel::<()>(16);

    // Build the site first
    println!("Building site...");
    let initial_builder = dev_builder(&config, base_path.clone());
    let report = tokio::task::spawn_blocking(move || initial_builder.build()).await??;
    println!(
        "Built {} page(s), {} unchanged",
        report.pages, report.cache.skipped
    );

    // Set up file watcher if enabled
    let _watcher_handle = if args.watch {
        let classifier = PathClassifier::new(
            paths.content.clone(),
            paths.templates.clone(),
            config_path.clone(),
        );

        match FileWatcher::new(&config.dev.watch, classifier) {
            Ok(watcher) => {
                println!("Watching for changes...");

                let mut rebuild_config = config.clone();
                let rebuild_base = base_path.clone();
                let rebuild_config_path = config_path.clone();
                let watcher_reload_tx = reload_tx.clone();

                Some(tokio::task::spawn_blocking(move || {
                    while let Some(event) = watcher.recv() {
                        match event {
                            WatchEvent::FilesChanged(changes) => {
                                println!("\nDetected {} change(s), rebuilding...", changes.len());

                                // A config change invalidates the effective
                                // configuration; reload before rebuilding
                                if changes.iter().any(|c| matches!(c, ChangeKind::Config)) {
                                    let rt = tokio::runtime::Builder::new_current_thread()
                                        .enable_all()
                                        .build()
                                        .expect("Failed to create runtime");
                                    match rt
                                        .block_on(SiteConfig::load_from_file(&rebuild_config_path))
                                    {
                                        Ok(reloaded) => rebuild_config = reloaded,
                                        Err(e) => {
                                            eprintln!("Config reload error: {}", e);
                                            continue;
                                        }
                                    }
                                }

                                let builder =
                                    dev_builder(&rebuild_config, rebuild_base.clone());
                                match builder.build() {
                                    Ok(report) => {
                                        println!(
                                            "Rebuilt {} page(s), {} unchanged",
                                            report.pages, report.cache.skipped
                                        );
                                        // Notify connected browsers to reload
                                        let _ = watcher_reload_tx.send(());
                                    }
                                    Err(e) => {
                                        eprintln!("Build error: {:#}", e);
                                    }
                                }
                            }
                            WatchEvent::Error(e) => {
                                eprintln!("Watch error: {}", e);
                            }
                        }
                    }
                }))
            }
            Err(e) => {
                eprintln!("Warning: Failed to start file watcher: {}", e);
                None
            }
        }
    } else {
        None
    };

    // Create the static file server
    let serve_dir = ServeDir::new(&report.output_dir).append_index_html_on_directories(true);

    // Build router with SSE endpoint for live reload
    let app = Router::new()
        .route("/_sitewright/live-reload", get(live_reload_handler))
        .with_state(reload_tx)
        .fallback_service(serve_dir);

    // Parse the address
    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;

    // Determine the URL to display
    let display_host = if args.bind == "0.0.0.0" {
        "localhost"
    } else {
        &args.bind
    };
    let url = format!("http://{}:{}", display_host, args.port);

    println!("\nServing site at {}", url);
    println!("Press Ctrl+C to stop\n");

    // Open browser if requested
    if args.open
        && let Err(e) = open::that(&url)
    {
        eprintln!("Failed to open browser: {}", e);
    }

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
