use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields except the API token have defaults suitable for local
/// development. Without `API_TOKEN`, authentication fails closed.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Static bearer token expected in `Authorization: Token <value>`.
    pub api_token: Option<String>,
    /// Directory whose subdirectories are the known configurations.
    pub config_root: PathBuf,
    /// Single-flight dedup cooldown in seconds (default: `60`).
    pub dedup_cooldown_secs: u64,
    /// Heartbeat freshness window for "are workers reachable" checks.
    pub heartbeat_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default            |
    /// |--------------------------|--------------------|
    /// | `HOST`                   | `0.0.0.0`          |
    /// | `PORT`                   | `3000`             |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`               |
    /// | `API_TOKEN`              | unset              |
    /// | `CONFIG_ROOT`            | `./configurations` |
    /// | `DEDUP_COOLDOWN_SECS`    | `60`               |
    /// | `HEARTBEAT_TIMEOUT_SECS` | `120`              |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let api_token = std::env::var("API_TOKEN").ok().filter(|t| !t.is_empty());

        let config_root =
            PathBuf::from(std::env::var("CONFIG_ROOT").unwrap_or_else(|_| "./configurations".into()));

        let dedup_cooldown_secs: u64 = std::env::var("DEDUP_COOLDOWN_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("DEDUP_COOLDOWN_SECS must be a valid u64");

        let heartbeat_timeout_secs: u64 = std::env::var("HEARTBEAT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("HEARTBEAT_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            request_timeout_secs,
            api_token,
            config_root,
            dedup_cooldown_secs,
            heartbeat_timeout_secs,
        }
    }
}
