use anyhow::{Context, Result};

use std::time::Duration;

use crate::sessions::SessionLimits;
use crate::store::UploadPolicy;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub s3_region: String,
    /// Base of the publicly resolvable object URLs, e.g. a CDN in front of the bucket.
    pub s3_public_url: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub upload_policy: UploadPolicy,
    pub session_limits: SessionLimits,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            s3_region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            s3_public_url: require_env("S3_PUBLIC_URL")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            upload_policy: std::env::var("UPLOAD_POLICY")
                .ok()
                .map(|v| v.parse::<UploadPolicy>())
                .transpose()
                .context("UPLOAD_POLICY is invalid")?
                .unwrap_or_default(),
            session_limits: session_limits_from_env()?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn session_limits_from_env() -> Result<SessionLimits> {
    let defaults = SessionLimits::default();
    let capacity = match std::env::var("SESSION_CAPACITY") {
        Ok(v) => v
            .parse::<usize>()
            .context("SESSION_CAPACITY must be a positive integer")?,
        Err(_) => defaults.capacity,
    };
    let idle_timeout = match std::env::var("SESSION_IDLE_SECS") {
        Ok(v) => Duration::from_secs(
            v.parse::<u64>()
                .context("SESSION_IDLE_SECS must be a number of seconds")?,
        ),
        Err(_) => defaults.idle_timeout,
    };
    Ok(SessionLimits {
        capacity,
        idle_timeout,
    })
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
