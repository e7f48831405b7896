use axum_helpers::BasicAuthConfig;
use core_config::{AppInfo, FromEnv, app_info, env_optional, server::ServerConfig};
use database::postgres::PostgresConfig;
use domain_notifications::NotificationConfig;

pub use core_config::Environment;

/// Registry API configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    /// `None` when `DATABASE_URL` is unset; users then live in memory
    pub database: Option<PostgresConfig>,
    pub auth: BasicAuthConfig,
    pub notifications: NotificationConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let database = match env_optional("DATABASE_URL") {
            Some(_) => Some(PostgresConfig::from_env()?),
            None => None,
        };

        Ok(Self {
            app: app_info!(),
            server: ServerConfig::from_env()?, // HOST=0.0.0.0, PORT=8080
            environment: Environment::from_env(),
            database,
            auth: BasicAuthConfig::from_env()?,
            notifications: NotificationConfig::from_env()?,
        })
    }
}
