use anyhow::{Context, Result};
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub db_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let server = ServerConfig {
            host: env::var("AGENCY_SERVICE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("AGENCY_SERVICE_PORT")
                .unwrap_or_else(|_| "3010".to_string())
                .parse()
                .context("AGENCY_SERVICE_PORT must be a valid port number")?,
        };

        let database = DatabaseConfig {
            url: Secret::new(
                env::var("AGENCY_DATABASE_URL").context("AGENCY_DATABASE_URL must be set")?,
            ),
            db_name: env::var("AGENCY_DATABASE_NAME").unwrap_or_else(|_| "agency".to_string()),
        };

        Ok(Config {
            server,
            database,
            service_name: "agency-service".to_string(),
        })
    }
}
