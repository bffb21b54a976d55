use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use whaileys_client::{SessionApi, WhaileysApi};
use whaileys_db::repositories::ApiConfigRepo;

use whaileys_api::activity::DbActivitySink;
use whaileys_api::background::status_watch;
use whaileys_api::config::ServerConfig;
use whaileys_api::router::build_app_router;
use whaileys_api::seed::{seed_admin, AdminSeed};
use whaileys_api::state::AppState;
use whaileys_api::ws;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "whaileys_api=debug,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database (optional) ---
    let pool = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = whaileys_db::create_pool(&database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            whaileys_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            whaileys_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");
            Some(pool)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; running without users or activity log");
            None
        }
    };

    // --- Admin seed ---
    if let (Some(pool), Some(seed)) = (&pool, AdminSeed::from_env()) {
        seed_admin(pool, &seed)
            .await
            .expect("Failed to seed admin user");
    }

    // --- External session API ---
    let stored = match &pool {
        Some(pool) => match ApiConfigRepo::latest(pool).await {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read stored API configuration");
                None
            }
        },
        None => None,
    };
    let (api_config, source) = config.session_api.resolve(stored.as_ref());
    let session_api: Arc<dyn SessionApi> =
        Arc::new(WhaileysApi::new(api_config).expect("Invalid external API configuration"));
    tracing::info!(?source, "External session API configured");

    // --- Relay + heartbeat ---
    let relay = Arc::new(ws::Relay::new());
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&relay));

    // --- Status watcher ---
    let watch_cancel = tokio_util::sync::CancellationToken::new();
    let watch_handle = (config.status_poll_interval_secs > 0).then(|| {
        tokio::spawn(status_watch::run(
            Arc::clone(&session_api),
            Arc::clone(&relay),
            Duration::from_secs(config.status_poll_interval_secs),
            watch_cancel.clone(),
        ))
    });

    // --- App state ---
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        relay: Arc::clone(&relay),
        session_api,
        activity: Arc::new(DbActivitySink::new(pool)),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    watch_cancel.cancel();
    if let Some(handle) = watch_handle {
        let _ = tokio::time::timeout(Duration::from_secs(config.shutdown_timeout_secs), handle)
            .await;
        tracing::info!("Status watcher stopped");
    }

    let ws_count = relay.connection_count().await;
    tracing::info!(ws_count, "Closing remaining live connections");
    relay.shutdown_all().await;

    heartbeat_handle.abort();
    tracing::info!("Heartbeat task stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
