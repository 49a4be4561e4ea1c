use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bearbites::api::{create_router, AppState};
use bearbites::cache::{open_cache, Cache};
use bearbites::config::Config;
use bearbites::enrichment::{enrichment_channel, EnrichmentQueue, LlmSpicyClassifier, SpicyEnricher};
use bearbites::llm::LlmProvider;
use bearbites::services::{MenuService, PrewarmManager};
use bearbites::timezone::parse_iso_date;
use bearbites::upstream::HttpFetcher;

const CACHE_PURGE_INTERVAL_SECS: u64 = 3600;

#[derive(Parser)]
#[command(name = "bearbites")]
#[command(about = "Dining-hall menu scraper and cache with spicy classification")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API with background enrichment and pre-warming (default)
    Serve,
    /// Print one day's menu as JSON
    Menu {
        location_id: String,
        /// YYYY-MM-DD; defaults to today in the dining halls' timezone
        #[arg(long)]
        date: Option<String>,
        /// Classify spiciness before printing
        #[arg(long)]
        enrich: bool,
    },
    /// Print the range of dates with published menus
    Bounds { location_id: String },
    /// Print the nutrition label of one item
    Food { item_id: String, label_url: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bearbites=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("Opening cache...");
    let cache = open_cache(&config.cache).await?;

    let fetcher = HttpFetcher::new(&config.vendor)?;
    let menus = MenuService::new(cache.clone(), Arc::new(fetcher), &config.vendor.base_url)?;

    if let Some(llm_config) = &config.llm {
        tracing::info!("Initializing LLM provider: {}...", llm_config.model);
    }
    let llm = LlmProvider::new(config.llm.as_ref());
    if !llm.is_available() {
        tracing::warn!("LLM unavailable - spicy classification will be skipped");
    }

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, cache, menus, llm).await,
        Command::Menu {
            location_id,
            date,
            enrich,
        } => {
            let date = match date {
                Some(value) => parse_iso_date(&value)?,
                None => menus.today(),
            };
            let Some(mut menu) = menus.get_menu(&location_id, date).await else {
                anyhow::bail!("No menu available for location {location_id} on {date}");
            };
            if enrich {
                let report = build_enricher(&config, &menus, &llm).enrich(&mut menu).await;
                tracing::info!(?report, "Enrichment finished");
            }
            println!("{}", serde_json::to_string_pretty(&menu)?);
            Ok(())
        }
        Command::Bounds { location_id } => {
            let Some(bounds) = menus.get_date_bounds(&location_id).await else {
                anyhow::bail!("Unknown location: {location_id}");
            };
            println!("{}", serde_json::to_string_pretty(&bounds)?);
            Ok(())
        }
        Command::Food { item_id, label_url } => {
            let Some(detail) = menus.get_food_detail(&item_id, &label_url).await else {
                anyhow::bail!("No label available for item {item_id}");
            };
            println!("{}", serde_json::to_string_pretty(&detail)?);
            Ok(())
        }
    }
}

fn build_enricher(config: &Config, menus: &MenuService, llm: &LlmProvider) -> SpicyEnricher {
    let classifier = LlmSpicyClassifier::new(
        llm.clone(),
        Duration::from_secs(config.enrichment.call_timeout_secs),
    );
    SpicyEnricher::new(menus.clone(), Arc::new(classifier), config.enrichment.batch_size)
}

async fn serve(config: Config, cache: Cache, menus: MenuService, llm: LlmProvider) -> anyhow::Result<()> {
    let cancel_token = CancellationToken::new();

    let queue = if config.enrichment.enabled && llm.is_available() {
        tracing::info!(
            "Starting enrichment worker... (batch_size={}, queue_capacity={})",
            config.enrichment.batch_size,
            config.enrichment.queue_capacity
        );
        let (queue, worker) = enrichment_channel(
            build_enricher(&config, &menus, &llm),
            config.enrichment.queue_capacity,
            Duration::from_secs(config.enrichment.task_timeout_secs),
        );
        tokio::spawn(worker.run(cancel_token.child_token()));
        queue
    } else {
        tracing::info!("Spicy enrichment disabled");
        EnrichmentQueue::disabled()
    };

    if config.prewarm.enabled {
        tracing::info!(
            "Starting prewarm manager... (interval={}s)",
            config.prewarm.interval_secs
        );
        let manager = PrewarmManager::new(menus.clone(), queue.clone(), config.prewarm.interval_secs);
        let token = cancel_token.child_token();
        tokio::spawn(async move {
            loop {
                if let Err(e) = manager.run_once().await {
                    tracing::error!("Prewarm error: {}", e);
                }
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::info!("Prewarm manager shutting down...");
                        break;
                    }
                    _ = tokio::time::sleep(Duration::from_secs(manager.interval_secs())) => {}
                }
            }
        });
    }

    let store = cache.store().clone();
    let token = cancel_token.child_token();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("Cache purge shutting down...");
                    break;
                }
                _ = tokio::time::sleep(Duration::from_secs(CACHE_PURGE_INTERVAL_SECS)) => {
                    match store.purge_expired().await {
                        Ok(removed) => tracing::debug!(removed, "Cache purge complete"),
                        Err(e) => tracing::error!("Cache purge error: {}", e),
                    }
                }
            }
        }
    });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, menus, queue, llm);
    let app = create_router(state);

    tracing::info!("BearBites starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling background tasks...");
    cancel_token.cancel();
}
