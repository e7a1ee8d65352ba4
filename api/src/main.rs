use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use sf_api::handlers::not_found;
use sf_api::middleware::{create_cors, SecurityHeaders};
use sf_api::{configure_app, AppState};
use sf_core::services::bootstrap::{seed_defaults, AdminSeed};
use sf_core::services::notification::{MailJobHandler, NotificationWorker, TemplateSettings, WorkerSettings};
use sf_core::services::CredentialService;
use sf_infra::database::{DatabasePool, MySqlAuthStore};
use sf_infra::mail::MailBackend;
use sf_infra::queue::RedisJobQueue;
use sf_shared::config::{AppConfig, LogFormat, LoggingConfig};

fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env();
    init_tracing(&config.logging);

    info!(
        event = "server_starting",
        environment = ?config.environment,
        "Starting Storefront API server"
    );
    if config.auth.jwt.is_using_default_secret() {
        warn!(event = "default_jwt_secret", "JWT secrets are using development defaults; set JWT_ACCESS_SECRET and JWT_REFRESH_SECRET");
    }

    let database = DatabasePool::new(&config.database)
        .await
        .context("failed to connect to MySQL")?;
    database
        .run_migrations()
        .await
        .context("failed to apply database migrations")?;
    let store = Arc::new(MySqlAuthStore::new(database.get_pool().clone()));

    let queue = Arc::new(
        RedisJobQueue::connect_with_retry(&config.cache, 5, 200)
            .await
            .context("failed to connect to Redis")?,
    );

    let credentials = CredentialService::new(config.auth.bcrypt_cost);
    seed_defaults(store.as_ref(), &credentials, AdminSeed::from_env().as_ref())
        .await
        .context("failed to seed default roles")?;

    let transport = Arc::new(MailBackend::from_config(&config.mail).context("invalid mail configuration")?);
    let handler = Arc::new(MailJobHandler::new(
        transport,
        TemplateSettings::new(config.mail.app_url.clone()),
    ));
    let worker = NotificationWorker::new(
        Arc::clone(&queue),
        handler,
        WorkerSettings::from(&config.worker),
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker_task = tokio::spawn(worker.run(shutdown_rx));

    let state = web::Data::new(AppState::new(Arc::clone(&store), queue, &config.auth));
    let cors_config = config.cors.clone();
    let environment = config.environment;
    let max_payload_size = config.server.max_payload_size;

    let bind_address = config.server.bind_address();
    info!(event = "server_binding", address = %bind_address, "HTTP server binding");

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(create_cors(&cors_config))
            .wrap(SecurityHeaders::for_environment(environment))
            .wrap(TracingLogger::default())
            .configure(configure_app(state.clone(), max_payload_size))
            .default_service(web::route().to(not_found))
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }
    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await?;

    info!(event = "server_stopped", "HTTP server stopped; draining notification worker");
    let _ = shutdown_tx.send(true);
    if let Err(e) = worker_task.await {
        warn!(event = "worker_join_failed", error = %e, "Notification worker did not shut down cleanly");
    }
    database.close().await;

    Ok(())
}
