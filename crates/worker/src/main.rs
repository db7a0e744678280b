use std::sync::Arc;

use pathwise_core::market_data::MarketDataTable;
use pathwise_db::{CourseStore, InMemoryStore, PgStore};
use pathwise_events::Broadcaster;
use pathwise_pipeline::{CourseFeed, JsonFileFeed, StaticFeed};
use pathwise_worker::config::{LogFormat, WorkerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match WorkerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("pathwise-worker: {e}");
            std::process::exit(2);
        }
    };

    init_tracing(config.log_format);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Worker exited with an error");
        std::process::exit(1);
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pathwise_worker=debug,pathwise_pipeline=info".into());

    match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn run(config: WorkerConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let courses: Arc<dyn CourseStore> = match &config.database_url {
        Some(url) => {
            let pool = pathwise_db::create_pool(url).await?;
            pathwise_db::health_check(&pool).await?;
            pathwise_db::run_migrations(&pool).await?;
            tracing::info!("Database connected and migrations applied");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            Arc::new(InMemoryStore::new())
        }
    };

    let feed: Arc<dyn CourseFeed> = match &config.course_feed_path {
        Some(path) => Arc::new(JsonFileFeed::new(path)),
        None => {
            tracing::info!("COURSE_FEED_PATH not set, refresh will see an empty feed");
            Arc::new(StaticFeed::empty())
        }
    };

    let market = Arc::new(MarketDataTable::standard());
    let broadcaster = Arc::new(Broadcaster::new());
    tracing::info!(
        market_data_version = %market.version,
        jobs = ?pathwise_worker::job_names(),
        batch_size = config.batch_size,
        "Worker starting",
    );

    let scheduler = pathwise_worker::build_scheduler(&config, courses, feed, broadcaster, market);
    scheduler.start();

    shutdown_signal().await;
    tracing::info!("Shutdown signal received");
    scheduler.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
}
