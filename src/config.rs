use log::warn;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::blockchain::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MINER_ADDRESS: &str = "miner_address";

/// Process configuration, read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub difficulty: u32,
    pub miner_address: String,
    /// `None` lets a proof search run until it finishes.
    pub mine_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            difficulty: DEFAULT_DIFFICULTY,
            miner_address: DEFAULT_MINER_ADDRESS.to_string(),
            mine_timeout: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; unparseable values fall back to
    /// the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timeout_secs: u64 =
            parse_or(text("MINE_TIMEOUT_SECS"), "MINE_TIMEOUT_SECS", 0, |_| true);

        Self {
            host: text("HOST").unwrap_or(defaults.host),
            port: parse_or(text("PORT"), "PORT", defaults.port, |_| true),
            difficulty: parse_or(
                text("POW_DIFFICULTY"),
                "POW_DIFFICULTY",
                defaults.difficulty,
                |d| *d <= MAX_DIFFICULTY,
            ),
            miner_address: text("MINER_ADDRESS").unwrap_or(defaults.miner_address),
            mine_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        }
    }
}

/// Parse `raw`, keeping it only if `accept` agrees; anything else logs a
/// warning and yields `default`.
fn parse_or<T>(raw: Option<String>, key: &str, default: T, accept: impl Fn(&T) -> bool) -> T
where
    T: FromStr + std::fmt::Display,
{
    let Some(v) = raw else {
        return default;
    };
    match v.parse() {
        Ok(parsed) if accept(&parsed) => parsed,
        _ => {
            warn!("ignoring invalid {key}={v:?}, using {default}");
            default
        }
    }
}
