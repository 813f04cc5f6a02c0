//! RSS bot entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rssbot::api::{create_routes, AppState};
use rssbot::bot::{run_polling, run_schedule, BotSettings, PollSettings, RssBot, Schedule};
use rssbot::cli::{CliArgs, Commands};
use rssbot::config::{close_cache, init_cache, AppConfig, APP_CONFIG};
use rssbot::error::{AppError, AppResult};
use rssbot::feed::HttpFeedSource;
use rssbot::storage::{EntryStore, RedisStore};
use rssbot::telegram::TelegramClient;

// High-performance memory allocator for non-MSVC targets
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let args = CliArgs::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rssbot=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize Sentry
    let _guard = if APP_CONFIG.sentry_dsn.is_empty() {
        tracing::debug!("Sentry DSN not configured, error tracking disabled");
        None
    } else {
        Some(sentry::init((
            APP_CONFIG.sentry_dsn.clone(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                traces_sample_rate: APP_CONFIG.sentry_traces_sample_rate,
                sample_rate: 1.0, // Capture all errors
                ..Default::default()
            },
        )))
    };

    let result = match args.resolved_command() {
        Commands::Run => run(&APP_CONFIG).await,
        Commands::Clear => clear(&APP_CONFIG).await,
        Commands::Update => update_once(&APP_CONFIG).await,
    };

    close_cache();

    if let Err(e) = &result {
        tracing::error!(error = %e, "RSS bot failed");
        sentry::capture_error(e);
    }

    // Flush Sentry events before exit
    if let Some(client) = sentry::Hub::current().client() {
        client.flush(Some(Duration::from_secs(2)));
    }

    if result.is_err() {
        std::process::exit(1);
    }
}

/// Wires the bot to Redis, the Bot API and the feed.
async fn build_bot(config: &AppConfig) -> AppResult<Arc<RssBot>> {
    let pool = init_cache(config).await?;
    let store: Arc<dyn EntryStore> = Arc::new(RedisStore::new(pool));

    let timeout = Duration::from_secs(config.http_timeout_secs);
    let proxy = Some(config.bot_proxy.as_str()).filter(|p| !p.is_empty());
    if proxy.is_some() {
        tracing::info!("Bot API calls go through the configured proxy");
    }
    let chat = Arc::new(TelegramClient::new(
        &config.telegram_api_url,
        &config.bot_token,
        proxy,
        timeout,
    )?);
    let feed = Arc::new(HttpFeedSource::new(config.feed_url.clone(), timeout)?);

    Ok(Arc::new(RssBot::new(
        store,
        chat,
        feed,
        BotSettings::from_config(config),
    )))
}

/// Runs the scheduler, the update poller and the health server until a shutdown signal.
async fn run(config: &AppConfig) -> AppResult<()> {
    config.validate()?;
    let schedule = Schedule::new(config.first_update_at_hour, config.update_every_hours)?;
    let bot = build_bot(config).await?;

    tracing::info!(feed = %config.feed_url, chat_id = %config.chat_id, "Starting RSS bot");
    if bot.settings().blacklist.is_empty() {
        tracing::info!("No blacklist configured, every new entry is eligible");
    } else {
        tracing::info!(
            words = config.blacklist_words.len(),
            urls = config.blacklist_urls.len(),
            "Blacklist configured"
        );
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let scheduler = tokio::spawn(run_schedule(bot.clone(), schedule, shutdown_rx.clone()));
    let poller = tokio::spawn(run_polling(
        bot.clone(),
        PollSettings::from_config(config),
        shutdown_rx.clone(),
    ));

    let app = create_routes(AppState::new(bot.store().clone())).layer(TraceLayer::new_for_http());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {addr}: {e}")))?;
    tracing::info!(port = config.server_port, "Health server listening");

    let mut server_shutdown = shutdown_rx;
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                server_shutdown.changed().await.ok();
            })
            .await
    });

    shutdown_signal().await;
    tracing::info!("Shutting down...");
    shutdown_tx.send(true).ok();

    if let Err(e) = scheduler.await {
        tracing::error!(error = %e, "Scheduler task failed");
    }
    if let Err(e) = poller.await {
        tracing::error!(error = %e, "Polling task failed");
    }
    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "Health server failed"),
        Err(e) => tracing::error!(error = %e, "Health server task failed"),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Removes all info about posted entries from the storage.
async fn clear(config: &AppConfig) -> AppResult<()> {
    let bot = build_bot(config).await?;
    bot.clear().await?;
    Ok(())
}

/// Runs one feed update immediately.
async fn update_once(config: &AppConfig) -> AppResult<()> {
    config.validate()?;
    let bot = build_bot(config).await?;
    let outcome = bot.update().await?;

    match outcome.posted {
        Some(posted) => tracing::info!(url = %posted.url, message_id = posted.message_id, "Posted entry"),
        None => tracing::info!("Nothing new to post"),
    }
    Ok(())
}

/// Handles shutdown signals for graceful termination.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        },
    }
}
