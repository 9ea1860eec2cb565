use axum::http::HeaderValue;
use safari_core::handlers::realtime::ChannelSigner;
use safari_core::services::stats_cache::{StatsCache, SystemClock};
use safari_core::{config, db, handlers};
use sqlx::migrate::Migrator;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

/// OpenAPI schema for the Safari Core API
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
    ),
    components(
        schemas(
            handlers::HealthResponse,
            handlers::DependencyStatus,
        )
    ),
    info(
        title = "Safari Core API",
        version = "0.1.0",
        description = "Booking and commission management API for the safari tour marketplace",
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = db::create_pool(&config).await?;

    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("Database migrations completed");

    let state = safari_core::AppState {
        db: pool,
        stats_cache: Arc::new(StatsCache::new(Arc::new(SystemClock))),
        signer: ChannelSigner::new(
            config.realtime_app_key.clone(),
            config.realtime_app_secret.clone(),
        ),
        start_time: std::time::Instant::now(),
    };

    let cors = match &config.cors_allowed_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    };

    let app = safari_core::create_app(state)
        .route(
            "/api-docs/openapi.json",
            axum::routing::get(|| async { axum::Json(ApiDoc::openapi()) }),
        )
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
