use std::env;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:ironlog.db?mode=rwc";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

/// Server settings read from the environment. User preferences such as the
/// rest-timer length live in the `settings` table instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unset, empty or unparsable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match get("PORT").map(|raw| raw.trim().parse::<u16>()) {
            Some(Ok(port)) => port,
            Some(Err(e)) => {
                tracing::warn!("Ignoring invalid PORT: {}", e);
                DEFAULT_PORT
            }
            None => DEFAULT_PORT,
        };

        Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
