use crate::error::{Error, Result};
use dotenvy::dotenv;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: Option<String>,
    pub pg_host: String,
    pub pg_user: String,
    pub pg_password: Option<String>,
    pub pg_database: String,
    pub pg_port: u16,
    pub pg_ssl_mode: PgSslMode,
    pub static_dir: String,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let pg_port = match get("PGPORT") {
            Some(raw) => parse_var("PGPORT", &raw)?,
            None => 5432,
        };
        let pg_ssl_mode = match get("PGSSLMODE") {
            Some(raw) => parse_var("PGSSLMODE", &raw)?,
            None => PgSslMode::Prefer,
        };
        let log_format = match get("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(Error::Config(format!(
                    "Invalid value for LOG_FORMAT: {}",
                    other
                )))
            }
        };

        Ok(Self {
            server_address: get("SERVER_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            database_url: get("DATABASE_URL"),
            pg_host: get("PGHOST").unwrap_or_else(|| "localhost".to_string()),
            pg_user: get("PGUSER").unwrap_or_else(|| "postgres".to_string()),
            pg_password: get("PGPASSWORD"),
            pg_database: get("PGDATABASE").unwrap_or_else(|| "postgres".to_string()),
            pg_port,
            pg_ssl_mode,
            static_dir: get("STATIC_DIR").unwrap_or_else(|| "./static".to_string()),
            log_format,
        })
    }

    /// Connection options for the pool. `DATABASE_URL` wins over the `PG*` variables.
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        if let Some(url) = &self.database_url {
            return parse_var("DATABASE_URL", url);
        }

        let mut options = PgConnectOptions::new()
            .host(&self.pg_host)
            .port(self.pg_port)
            .username(&self.pg_user)
            .database(&self.pg_database)
            .ssl_mode(self.pg_ssl_mode);
        if let Some(password) = &self.pg_password {
            options = options.password(password);
        }
        Ok(options)
    }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}
