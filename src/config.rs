//! Process configuration loaded from the environment

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Provider chat completion endpoint
    pub api_url: String,

    /// Bearer credential for the provider
    pub api_key: String,

    /// App identifier sent as `app_code`
    pub app_code: String,

    /// Address to listen on
    pub host: IpAddr,

    /// Port to listen on
    pub port: u16,

    /// Longest wait for the next upstream chunk while streaming
    pub stream_idle_timeout: Option<Duration>,

    /// Connect timeout for upstream requests
    pub connect_timeout: Duration,

    /// Tracing filter directive
    pub log_level: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            app_code: String::new(),
            host: IpAddr::from([0, 0, 0, 0]),
            port: 5008,
            stream_idle_timeout: None,
            connect_timeout: Duration::from_secs(10),
            log_level: "info".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let api_url = required("LINK_AI_API_URL")?;
        let api_key = required("LINK_AI_API_KEY")?;
        let app_code = required("LINK_AI_APP_CODE")?;

        let host = match lookup("HOST") {
            Some(value) => parse("HOST", value)?,
            None => defaults.host,
        };

        let port = match lookup("PORT") {
            Some(value) => parse("PORT", value)?,
            None => defaults.port,
        };

        let stream_idle_timeout = match lookup("STREAM_IDLE_TIMEOUT_SECS") {
            Some(value) => match parse::<u64>("STREAM_IDLE_TIMEOUT_SECS", value)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => defaults.stream_idle_timeout,
        };

        let connect_timeout = match lookup("UPSTREAM_CONNECT_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(parse("UPSTREAM_CONNECT_TIMEOUT_SECS", value)?),
            None => defaults.connect_timeout,
        };

        let log_level = lookup("LOG_LEVEL").unwrap_or(defaults.log_level);

        Ok(Self {
            api_url,
            api_key,
            app_code,
            host,
            port,
            stream_idle_timeout,
            connect_timeout,
            log_level,
        })
    }

    /// Socket address the server binds to
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
        value,
    })
}
