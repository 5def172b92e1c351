//! Server configuration loaded from environment variables.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid {expected}: `{value}`")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("BOOKSHELF_GREETING_INTERVAL_MS must be greater than zero")]
    ZeroGreetingInterval,
    #[error("{var} must start with `/`: `{value}`")]
    RelativePath { var: &'static str, value: String },
    #[error("the HTTP and subscription endpoints cannot share the path `{0}`")]
    PathConflict(String),
}

/// Which endpoints the gateway mounts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Transport {
    /// Queries and mutations over HTTP only.
    Single,
    /// HTTP plus subscriptions over a WebSocket on a second path.
    #[default]
    Dual,
}

impl FromStr for Transport {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "dual" => Ok(Self::Dual),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Address to listen on
    pub host: IpAddr,

    /// Port shared by both endpoints
    pub port: u16,

    /// Path of the query/mutation endpoint
    pub http_path: String,

    /// Path of the WebSocket subscription endpoint
    pub subscription_path: String,

    pub transport: Transport,

    /// Delay between two greetings of the `hello` subscription
    pub greeting_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 4000,
            http_path: "/graphql".into(),
            subscription_path: "/subscription".into(),
            transport: Transport::Dual,
            greeting_interval: Duration::from_secs(1),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Builds the configuration from an arbitrary variable source, falling
    /// back to the defaults for anything unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = parse(&lookup, "BOOKSHELF_HOST", "IP address")?.unwrap_or(defaults.host);
        let port = parse(&lookup, "BOOKSHELF_PORT", "port")?.unwrap_or(defaults.port);
        let transport = parse(&lookup, "BOOKSHELF_TRANSPORT", "transport (`single` or `dual`)")?
            .unwrap_or(defaults.transport);
        let greeting_interval = match parse::<u64>(
            &lookup,
            "BOOKSHELF_GREETING_INTERVAL_MS",
            "number of milliseconds",
        )? {
            Some(0) => return Err(ConfigError::ZeroGreetingInterval),
            Some(ms) => Duration::from_millis(ms),
            None => defaults.greeting_interval,
        };

        let http_path = path(&lookup, "BOOKSHELF_HTTP_PATH")?.unwrap_or(defaults.http_path);
        let subscription_path =
            path(&lookup, "BOOKSHELF_SUBSCRIPTION_PATH")?.unwrap_or(defaults.subscription_path);
        if transport == Transport::Dual && http_path == subscription_path {
            return Err(ConfigError::PathConflict(http_path));
        }

        Ok(Self {
            host,
            port,
            http_path,
            subscription_path,
            transport,
            greeting_interval,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(value) = lookup(var) else {
        return Ok(None);
    };

    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::Invalid {
            var,
            expected,
            value,
        })
}

fn path(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<String>, ConfigError> {
    match lookup(var) {
        Some(value) if !value.starts_with('/') => Err(ConfigError::RelativePath { var, value }),
        value => Ok(value),
    }
}
