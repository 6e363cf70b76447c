mod config;
mod db;
mod errors;
mod jobs;
mod models;
mod records;
mod routes;
mod sessions;
mod state;
mod storage;
mod store;
#[cfg(test)]
mod testing;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::jobs::SampleJobSource;
use crate::records::PgRecordStore;
use crate::routes::build_router;
use crate::sessions::SessionRegistry;
use crate::state::AppState;
use crate::storage::S3ObjectStorage;
use crate::store::StoreSettings;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Store v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    let jobs = SampleJobSource::new()?;

    let sessions = SessionRegistry::new(
        Arc::new(S3ObjectStorage::new(
            s3,
            config.s3_bucket.clone(),
            config.s3_public_url.clone(),
        )),
        Arc::new(PgRecordStore::new(db)),
        Arc::new(jobs),
        StoreSettings {
            upload_policy: config.upload_policy,
            ..StoreSettings::default()
        },
        config.session_limits,
    );
    info!("Upload policy: {:?}", config.upload_policy);
    info!("Session limits: {:?}", config.session_limits);

    let state = AppState {
        sessions: Arc::new(sessions),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "resume-store-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.s3_region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    // MinIO serves buckets under the path, not as subdomains.
    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
