//! # Reminder Bot Main Entry Point
//!
//! This is the main entry point for the Reminder Bot application. It
//! initializes logging, loads configuration, starts the health server, and
//! runs the Telegram bot over webhook or long polling.

use anyhow::Result;
use std::sync::Arc;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod bot;
mod config;
mod services;
mod utils;

use crate::bot::handlers;
use crate::config::Config;
use crate::services::health::HealthService;
use crate::services::keyboard::KeyboardRegistry;
use crate::services::scheduler::{TelegramSink, TimerScheduler};
use crate::utils::logging::log_system_event;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reminder_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Reminder Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Timezone: {}, HTTP Port: {}",
        config.timezone, config.http_port
    );

    // Initialize bot and services
    let bot = Bot::new(&config.telegram_bot_token);
    let scheduler = TimerScheduler::new(
        Arc::new(TelegramSink::new(bot.clone())),
        config.timezone,
    );
    let keyboards = KeyboardRegistry::new();

    // Health server
    let health_service = HealthService::new(scheduler.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("Health check server starting on port {}", config.http_port);

    let webhook_url = config.webhook_url.clone();
    let webhook_port = config.webhook_port;

    // Run both the bot and health server concurrently
    let bot_task = tokio::spawn(async move {
        let mut dispatcher = Dispatcher::builder(bot.clone(), handlers::schema())
            .dependencies(dptree::deps![scheduler, keyboards])
            .enable_ctrlc_handler()
            .build();

        match webhook_url {
            Some(url) => {
                log_system_event(
                    "bot starting",
                    Some(&format!("webhook mode on port {webhook_port}")),
                );
                let addr = ([0, 0, 0, 0], webhook_port).into();
                match webhooks::axum(bot, webhooks::Options::new(addr, url)).await {
                    Ok(update_listener) => {
                        dispatcher
                            .dispatch_with_listener(
                                update_listener,
                                LoggingErrorHandler::with_custom_text(
                                    "An error from the update listener",
                                ),
                            )
                            .await;
                    }
                    Err(e) => tracing::error!("Failed to set up webhook: {}", e),
                }
            }
            None => {
                log_system_event("bot starting", Some("long polling mode"));
                dispatcher.dispatch().await;
            }
        }
    });

    let health_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_service.router).await {
            tracing::error!("Health server error: {}", e);
        }
    });

    // Wait for either task to complete (which would indicate shutdown)
    tokio::select! {
        result1 = bot_task => {
            if let Err(e) = result1 {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result2 = health_task => {
            if let Err(e) = result2 {
                tracing::error!("Health task error: {}", e);
            }
        }
    }

    log_system_event("application stopped", None);
    Ok(())
}
