use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, Method};
use sqlx::postgres::PgPoolOptions;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use circle_api::config::{Config, DatastoreBackend};
use circle_api::routes::app_router;
use circle_api::{Datastore, MemoryDatastore, PgDatastore, RequestExecutor};

/// Build the CORS layer based on configuration.
///
/// In production mode:
/// - If `CORS_ORIGINS` is set, only those origins are allowed
/// - If `CORS_ORIGINS` is not set, CORS requests are rejected (no origins allowed)
///
/// In development mode:
/// - If `CORS_ORIGINS` is set, those origins are used
/// - If `CORS_ORIGINS` is not set, permissive CORS is used for convenience
fn build_cors_layer(config: &Config) -> CorsLayer {
    let is_production = config.is_production();

    match &config.cors_allowed_origins {
        Some(origins) if !origins.is_empty() => {
            let allowed_origins: Vec<_> = origins
                .iter()
                .filter_map(|origin| {
                    origin.parse().ok().or_else(|| {
                        tracing::warn!("Invalid CORS origin '{}', skipping", origin);
                        None
                    })
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::error!("No valid CORS origins configured, CORS requests will be rejected");
                CorsLayer::new()
            } else {
                tracing::info!(
                    "CORS configured with {} allowed origin(s): {:?}",
                    allowed_origins.len(),
                    origins
                );
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
                    .max_age(std::time::Duration::from_secs(3600))
            }
        }
        _ if is_production => {
            tracing::warn!(
                "CORS_ORIGINS not configured in production mode. \
                 CORS requests will be rejected. Set CORS_ORIGINS to allow cross-origin requests."
            );
            CorsLayer::new()
        }
        _ => {
            tracing::warn!(
                "Using permissive CORS in development mode. \
                 Set CORS_ORIGINS for production-like behavior."
            );
            CorsLayer::permissive()
        }
    }
}

/// Connect the configured datastore, running migrations for PostgreSQL
async fn connect_datastore(config: &Config) -> anyhow::Result<Arc<dyn Datastore>> {
    match config.datastore {
        DatastoreBackend::Postgres => {
            let database = config.database();
            tracing::info!("Connecting to database...");

            let pool = PgPoolOptions::new()
                .max_connections(database.max_connections)
                .min_connections(database.min_connections)
                .acquire_timeout(std::time::Duration::from_secs(database.connect_timeout_secs))
                .idle_timeout(std::time::Duration::from_secs(database.idle_timeout_secs))
                .connect(&database.url)
                .await?;

            tracing::info!("Database connection established");

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Migrations completed successfully");

            Ok(Arc::new(PgDatastore::new(pool)))
        }
        DatastoreBackend::Memory => {
            tracing::info!("In-memory datastore initialized");
            Ok(Arc::new(MemoryDatastore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before the filter reads RUST_LOG
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "circle_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!(
        environment = %config.environment(),
        datastore = %config.datastore,
        max_query_depth = config.max_query_depth,
        "Starting Circle API server on port {}",
        config.port
    );

    let store = connect_datastore(&config).await?;
    let executor = RequestExecutor::new(store, config.max_query_depth);
    tracing::info!("GraphQL schema built");

    let app = app_router(executor)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    tracing::info!(
        "GraphQL Playground available at http://{}:{}/graphql/playground",
        addr.ip(),
        addr.port()
    );

    axum::serve(listener, app).await?;

    Ok(())
}
