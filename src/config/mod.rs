use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub public_base_url: String,
    pub cors_allowed_origins: Option<String>,
    pub realtime_app_key: String,
    pub realtime_app_secret: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        dotenv().ok();

        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", server_port));

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS").ok();

        let realtime_app_key = env::var("REALTIME_APP_KEY")
            .unwrap_or_else(|_| "local-app-key".to_string());
        let realtime_app_secret = env::var("REALTIME_APP_SECRET")
            .unwrap_or_else(|_| "local-app-secret".to_string());

        Ok(Config {
            server_port,
            database_url,
            public_base_url,
            cors_allowed_origins,
            realtime_app_key,
            realtime_app_secret,
        })
    }
}
