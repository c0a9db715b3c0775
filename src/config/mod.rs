//! Configuration module - environment variable parsing

use std::env;
use std::str::FromStr;

use crate::strategy::StrategyKind;

/// Log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

/// Runner configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,

    /// Base seed; match `i` of a series uses `match_seed + i`
    pub match_seed: u64,
    /// Matches per series
    pub match_count: u32,
    /// One strategy per competitor slot
    pub competitors: Vec<StrategyKind>,
    /// Turn cap per match
    pub max_turns: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            match_seed: 1,
            match_count: 1,
            competitors: vec![StrategyKind::Chaser, StrategyKind::Chaser],
            max_turns: 2000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup; unset keys take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let defaults = Self::default();

        let competitors = match lookup("COMPETITORS") {
            Some(raw) => parse_competitors(&raw)?,
            None => defaults.competitors,
        };

        Ok(Self {
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: parse_var(&lookup, "LOG_FORMAT", defaults.log_format)?,
            match_seed: parse_var(&lookup, "MATCH_SEED", defaults.match_seed)?,
            match_count: parse_var(&lookup, "MATCH_COUNT", defaults.match_count)?,
            competitors,
            max_turns: parse_var(&lookup, "MAX_TURNS", defaults.max_turns)?,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn parse_competitors(raw: &str) -> Result<Vec<StrategyKind>, ConfigError> {
    let competitors = raw
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.parse().map_err(|_| ConfigError::Invalid {
                key: "COMPETITORS",
                value: raw.to_string(),
            })
        })
        .collect::<Result<Vec<StrategyKind>, _>>()?;

    if competitors.len() < 2 {
        return Err(ConfigError::NotEnoughCompetitors(competitors.len()));
    }
    Ok(competitors)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("COMPETITORS must name at least 2 strategies, got {0}")]
    NotEnoughCompetitors(usize),
}
