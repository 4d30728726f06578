use std::path::{Path, PathBuf};
use std::sync::Arc;

mod backup;
mod config;
mod db;
mod enrich;
mod error;
mod models;
mod producer;
mod store;
mod vault;
mod web;

use backup::BackupService;
use config::Config;
use enrich::ProductEnricher;
use producer::Journalist;
use store::ArticleStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Load configuration
    let config = Config::load()?;

    // The enricher is a standalone tool, no store or vault involved
    if args.len() >= 2 && args[1] == "--enrich" {
        if args.len() < 4 {
            anyhow::bail!("usage: newsstand --enrich <seed.csv> <output.csv>");
        }
        let api_key = config
            .gemini_api_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("gemini_api_key is not configured"))?;
        let enricher = ProductEnricher::new(api_key);
        let count = enricher.run(Path::new(&args[2]), Path::new(&args[3])).await?;
        println!("Enriched {} products into {}", count, args[3]);
        return Ok(());
    }

    let backup = Arc::new(BackupService::from_config(&config));
    let store = Arc::new(ArticleStore::new(
        PathBuf::from(&config.db_path),
        backup.clone(),
    ));

    match args.get(1).map(String::as_str) {
        Some("--backup") => {
            backup.backup().await;
            return Ok(());
        }
        Some("--restore") => {
            backup.restore().await?;
            println!("Store restored from vault backup");
            return Ok(());
        }
        Some("--produce") => {
            let journalist = Journalist::from_config(&config).ok_or_else(|| {
                anyhow::anyhow!("news_api_key and completion_api_key must be configured")
            })?;
            let article = journalist.produce(&store).await?;
            println!("Stored article {}: {}", article.id, article.headline);
            return Ok(());
        }
        Some(flag) => anyhow::bail!("unknown flag: {}", flag),
        None => {}
    }

    // Default: serve the site
    let journalist = Journalist::from_config(&config).map(Arc::new);
    if journalist.is_none() {
        tracing::warn!("Producer API keys not configured, /jobs/produce will be unavailable");
    }

    let state = web::AppState {
        store,
        backup,
        journalist,
        job_token: config.job_token.clone(),
        page_size: config.page_size,
        site_url: config.site_url.clone(),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!("Listening on {}", config.bind_address);
    axum::serve(listener, web::router(state)).await?;

    Ok(())
}
