use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Where bearer tokens are verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// Asymmetric keys published by the identity provider.
    Jwks {
        url: String,
        api_key: Option<String>,
    },
    /// Shared HS256 secret.
    Secret(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub redis_url: Option<String>,
    pub token_source: TokenSource,
    pub run_migrations: bool,
    pub gig_cache_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any key lookup (the process env in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            None => 8080,
        };

        let token_source = match (get("JWKS_URL"), get("JWT_SECRET")) {
            (Some(url), _) => TokenSource::Jwks {
                url,
                api_key: get("JWKS_API_KEY"),
            },
            (None, Some(secret)) => TokenSource::Secret(secret),
            (None, None) => return Err(ConfigError::Missing("JWKS_URL or JWT_SECRET")),
        };

        let run_migrations = match get("RUN_MIGRATIONS") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid {
                name: "RUN_MIGRATIONS",
                value: raw,
            })?,
            None => false,
        };

        let gig_cache_ttl = match get("CACHE_TTL_GIG_DETAIL") {
            Some(raw) => raw
                .trim()
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid {
                    name: "CACHE_TTL_GIG_DETAIL",
                    value: raw,
                })?,
            None => Duration::from_secs(600),
        };

        Ok(Self {
            database_url,
            port,
            redis_url: get("REDIS_URL"),
            token_source,
            run_migrations,
            gig_cache_ttl,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
