#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use std::env;

use dotenvy::dotenv;
use scanned_cases_stub::{server, stores::Stores, utils::GlobalConfig};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv().ok();

    let environment = Environment::from_env()?;

    tracing_subscriber::fmt()
        .with_max_level(environment.log_level())
        .json()
        .with_target(false)
        .flatten_event(true)
        .without_time()
        .init();

    tracing::info!("Starting scanned cases stub...");

    let global_config = GlobalConfig::from_env()?;

    let stores = match &global_config.redis_url {
        Some(redis_url) => {
            let stores = Stores::redis(redis_url).await?;
            tracing::info!("✅ Connection to Redis established.");
            stores
        }
        None => {
            tracing::info!("No `REDIS_URL` set, stores are kept in memory.");
            Stores::in_memory()
        }
    };

    server::start(stores, global_config).await
}

#[derive(Debug, PartialEq, Eq)]
enum Environment {
    Production,
    Development,
}

impl TryFrom<&str> for Environment {
    type Error = eyre::Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "production" => Ok(Self::Production),
            "development" => Ok(Self::Development),
            _ => Err(eyre::eyre!("invalid `APP_ENV` environment variable: {s}")),
        }
    }
}

impl Environment {
    pub fn from_env() -> eyre::Result<Self> {
        env::var("APP_ENV")
            .unwrap_or_else(|_| "production".to_string())
            .trim()
            .try_into()
    }

    pub const fn log_level(&self) -> tracing::Level {
        match self {
            Self::Development => tracing::Level::DEBUG,
            Self::Production => tracing::Level::INFO,
        }
    }
}
