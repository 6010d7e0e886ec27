//! The binary entry point for the application.

use std::sync::Arc;
use std::time::Duration;

use app_core::config::Config;
use app_core::crypto::{AesSecretCipher, SecretCipher};
use app_core::jwt::{JwtConfig, JwtService, TokenManager};
use app_core::middleware::{AuthContext, request_response_logger};
use app_core::oauth::{DEFAULT_SCOPES, IdentityProvider, UsosProvider};
use app_core::session::SessionManager;
use axum::http::StatusCode;
use axum::{Json, Router, middleware};
use base64::Engine as _;
use base64::engine::general_purpose;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::Pool;
use sea_orm::{ConnectOptions, Database};
use tokio::signal;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_cookies::{CookieManagerLayer, Key};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(fmt::format::FmtSpan::CLOSE),
        )
        .init();

    if let Err(err) = run().await {
        panic!("❌ Application failed to start: {err}");
    }
}

/// Initializes all dependencies and starts the web server.
async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Reloaded every few seconds when the file changes.
    let config = Arc::new(
        Config::builder("config/config.yaml")
            .watch_interval(Duration::from_secs(5))
            .watch()
            .build()?,
    );

    let mut db_opt = ConnectOptions::new(config.get::<String>("database.url")?);
    db_opt
        .min_connections(config.get("database.min_connections")?)
        .max_connections(config.get("database.max_connections")?)
        .connect_timeout(Duration::from_secs(config.get("database.connect_timeout_secs")?))
        .acquire_timeout(Duration::from_secs(config.get("database.acquire_timeout_secs")?))
        .idle_timeout(Duration::from_secs(config.get("database.idle_timeout_secs")?))
        .max_lifetime(Duration::from_secs(config.get("database.max_lifetime_secs")?))
        .sqlx_logging(config.get("database.sqlx_logging")?)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db_pool = Arc::new(Database::connect(db_opt).await?);

    // Redis is only needed when pending login tokens are shared between instances.
    let rds_pool = match config.get_or("pending_tokens.backend", "memory".to_string()).as_str() {
        "redis" => {
            let rds_manager = RedisConnectionManager::new(config.get::<String>("redis.url")?)?;
            let pool = Pool::builder()
                .max_size(config.get_or::<u32>("redis.max_connections", 10))
                .build(rds_manager)
                .await?;
            Some(pool)
        },
        _ => None,
    };

    let cipher: Arc<dyn SecretCipher> = Arc::new(AesSecretCipher::new(
        &config.get::<String>("crypto.secret")?,
        &config.get::<String>("crypto.salt")?,
    ));

    let token_manager: Arc<dyn TokenManager> = Arc::new(JwtService::new(JwtConfig {
        access_secret: config.get("jwt.access_secret")?,
        refresh_secret: config.get("jwt.refresh_secret")?,
        access_exp_secs: config.get("jwt.access_expiration_secs")?,
        refresh_exp_secs: config.get("jwt.refresh_expiration_secs")?,
        issuer: config.get("jwt.issuer")?,
        audience: config.get("jwt.audience")?,
    }));

    let default_scopes: Vec<String> = DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect();
    let provider: Arc<dyn IdentityProvider> = Arc::new(UsosProvider::new(
        &config.get::<String>("usos.base_url")?,
        config.get("usos.consumer_key")?,
        config.get("usos.consumer_secret")?,
        &config.get_or("usos.scopes", default_scopes),
    )?);

    // Session cookies are private: encrypted and authenticated with this key.
    let cookie_key = Key::from(&general_purpose::STANDARD.decode(config.get::<String>("session.secret")?)?);
    let public_url = config.get::<String>("server.public_url")?;
    let sessions = SessionManager::new(cookie_key, config.get("session.ttl_secs")?, public_url.starts_with("https://"));

    let auth_ctx = AuthContext { token: token_manager.clone(), sessions: sessions.clone() };
    let users_state = users::new(users::Dependency {
        db: db_pool,
        rds: rds_pool,
        config: config.clone(),
        token: token_manager,
        cipher,
        provider,
        sessions,
    })?;

    let timeout_secs = Duration::from_secs(config.get::<u64>("server.timeout_secs")?);
    let app = Router::new()
        .merge(users::create_router(users_state, auth_ctx))
        .fallback(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"message": "Endpoint not found"})),
            )
        })
        .method_not_allowed_fallback(|| async {
            (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(serde_json::json!({"message": "Method not allowed"})),
            )
        })
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_response_logger))
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
                .layer(RequestDecompressionLayer::new())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(timeout_secs)),
        );

    let server_address = config.get::<String>("server.address")?;
    let listener = tokio::net::TcpListener::bind(&server_address).await?;

    tracing::info!("🚀 listening on {}", listener.local_addr()?);

    let (shutdown_tx, _) = broadcast::channel(1);
    spawn_shutdown_listener(shutdown_tx.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_tx.subscribe().recv().await.ok();
            tracing::info!("🛑 Server is shutting down gracefully...");
        })
        .await?;

    Ok(())
}

/// Spawns a background task to listen for system shutdown signals.
fn spawn_shutdown_listener(shutdown_tx: broadcast::Sender<()>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => { tracing::info!("🔻 Received SIGINT (Ctrl+C)")},
            _ = terminate => { tracing::info!("🔻 Received SIGTERM")},
        }

        if shutdown_tx.send(()).is_err() {
            tracing::error!("Failed to send shutdown signal");
        }
    });
}
