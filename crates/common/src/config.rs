use std::{net::SocketAddr, num::NonZeroU64, path::PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

#[cfg(feature = "logging")]
use tracing_subscriber::filter::LevelFilter;

/// Database configuration.
#[derive(Deserialize)]
pub struct Database {
    /// Database URL string.
    pub url: String,
}

/// HTTP server configuration.
#[derive(Deserialize)]
pub struct Server {
    /// Address, that HTTP server will listen on.
    pub address: SocketAddr,
}

/// Implementation of [`serde`]'s deserializer for [`FromStr`] types.
#[cfg(feature = "logging")]
fn deserialize_from_str<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error,
    D: serde::de::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    std::str::FromStr::from_str(&s).map_err(serde::de::Error::custom)
}

/// Logging configuration.
#[cfg(feature = "logging")]
#[derive(Deserialize)]
pub struct Logging {
    /// Log level.
    #[serde(deserialize_with = "deserialize_from_str")]
    pub level: LevelFilter,
}

#[cfg(feature = "logging")]
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: LevelFilter::WARN,
        }
    }
}

/// Blockchain provider configuration.
#[derive(Deserialize)]
pub struct Chain {
    /// JSON-RPC URL of a wallet-backed provider or a node with unlocked accounts.
    pub rpc_url: String,

    /// Directory with Truffle build artifacts of the portal contracts.
    ///
    /// Deployed contract addresses are read from the `networks` section
    /// of `AdminPortal.json` and `UserPortal.json` files.
    pub artifacts: PathBuf,
}

/// Admin dashboard configuration.
#[derive(Deserialize)]
pub struct Dashboard {
    /// Dashboard metrics refresh interval, in seconds.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: NonZeroU64,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
        }
    }
}

fn default_refresh_interval() -> NonZeroU64 {
    NonZeroU64::new(10).unwrap_or(NonZeroU64::MIN)
}

/// Wallet session configuration.
#[derive(Deserialize)]
pub struct Session {
    /// Lifespan of a login challenge, in seconds.
    #[serde(default = "default_challenge_lifespan")]
    pub challenge_lifespan: i64,

    /// Lifespan of a session token, in seconds.
    #[serde(default = "default_token_lifespan")]
    pub token_lifespan: i64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            challenge_lifespan: default_challenge_lifespan(),
            token_lifespan: default_token_lifespan(),
        }
    }
}

fn default_challenge_lifespan() -> i64 {
    300
}

// One week.
fn default_token_lifespan() -> i64 {
    604800
}

/// General configuration.
#[derive(Deserialize)]
pub struct Config {
    /// General database configuration.
    pub database: Database,

    /// HTTP server configuration.
    #[serde(default)]
    pub server: Option<Server>,

    /// Logging configuration.
    #[cfg(feature = "logging")]
    #[serde(default)]
    pub logging: Logging,

    /// Blockchain provider configuration.
    pub chain: Chain,

    /// Admin dashboard configuration.
    #[serde(default)]
    pub dashboard: Dashboard,

    /// Wallet session configuration.
    #[serde(default)]
    pub session: Session,
}

impl Config {
    /// Create new config using default configuration file or environment variables.
    ///
    /// See [`Env`] for more details on how to use environment variables configuration.
    ///
    /// [`Env`]: figment::providers::Env
    pub fn new(path: Option<PathBuf>) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file(path.unwrap_or(PathBuf::from("Config.toml"))))
            .merge(Env::prefixed("CONFIG_").split("_"))
            .extract()
    }

    /// Create new config suitable for running unit tests.
    #[cfg(feature = "test-utils")]
    pub fn for_tests() -> Self {
        Self {
            database: Database {
                url: String::from("sqlite::memory:"),
            },
            server: Some(Server {
                address: "127.0.0.1:3000".parse().unwrap(),
            }),
            #[cfg(feature = "logging")]
            logging: Logging::default(),
            chain: Chain {
                rpc_url: String::from("http://127.0.0.1:7545"),
                artifacts: PathBuf::from("contracts/build/contracts"),
            },
            dashboard: Dashboard::default(),
            session: Session::default(),
        }
    }
}
