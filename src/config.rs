//! Process configuration, read from environment variables.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `DHAN_CLIENT_ID` | broker client ID | required |
//! | `DHAN_ACCESS_TOKENS` | comma separated access tokens, one session each | required |
//! | `DHAN_INSTRUMENTS` | comma separated `scrip_id:segment` rows | required |
//! | `NSE_HOLIDAYS` | comma separated `YYYY-MM-DD` dates | none |
//! | `RISK_FREE_RATE` | reversal ladder rate | `-0.067` |
//! | `MAX_CONCURRENT_WORKERS` | worker pool ceiling | `12` |
//! | `REDIS_URL` | full `redis://` URL | built from the parts below |
//! | `REDIS_HOST` / `REDIS_PORT` / `REDIS_DB` / `REDIS_PASSWORD` | Redis parts | `redis` / `6379` / `0` / none |
//! | `DHAN_BASE_URL` | broker API base URL | `https://api.dhan.co` |
//!
//! Instrument rows are kept unvalidated; the supervisor skips malformed ones.

use std::fmt;
use std::str::FromStr;

use crate::constants::{API_BASE_URL, DEFAULT_MAX_CONCURRENT_WORKERS, DEFAULT_RISK_FREE_RATE};
use crate::credentials::{Credential, CredentialPool};
use crate::error::{DhanError, Result};
use crate::gate::HolidayCalendar;
use crate::types::instrument::InstrumentRow;

/// Redis connection parameters.
#[derive(Clone, PartialEq, Eq)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub db: i64,
    pub password: Option<String>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "redis".into(),
            port: 6379,
            db: 0,
            password: None,
        }
    }
}

impl RedisConfig {
    /// `redis://[:password@]host:port/db`
    pub fn url(&self) -> String {
        match &self.password {
            Some(pw) => format!("redis://:{pw}@{}:{}/{}", self.host, self.port, self.db),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

impl fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db", &self.db)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Where the cache lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedisTarget {
    Url(String),
    Parts(RedisConfig),
}

impl RedisTarget {
    pub fn url(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Parts(config) => config.url(),
        }
    }
}

/// Everything the poller needs to start.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub credentials: CredentialPool,
    pub instruments: Vec<InstrumentRow>,
    pub holidays: HolidayCalendar,
    pub risk_free_rate: f64,
    pub max_concurrent_workers: usize,
    pub redis: RedisTarget,
    pub base_url: String,
}

impl PollerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration from any key→value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required =
            |key: &str| var(key).ok_or_else(|| DhanError::Config(format!("{key} is not set")));

        let client_id = required("DHAN_CLIENT_ID")?;
        let credentials = CredentialPool::new(
            split_list(&required("DHAN_ACCESS_TOKENS")?)
                .map(|token| Credential::new(client_id.trim(), token))
                .collect(),
        )?;

        // A row that does not split keeps its index with an empty segment;
        // the supervisor skips it.
        let instruments: Vec<InstrumentRow> = split_list(&required("DHAN_INSTRUMENTS")?)
            .map(|raw| {
                InstrumentRow::parse_pair(raw).unwrap_or_else(|_| InstrumentRow::new(raw, ""))
            })
            .collect();
        if instruments.is_empty() {
            return Err(DhanError::Config("DHAN_INSTRUMENTS lists no rows".into()));
        }

        let holidays = match var("NSE_HOLIDAYS") {
            Some(list) => HolidayCalendar::parse(&list)?,
            None => HolidayCalendar::default(),
        };

        let redis = match var("REDIS_URL") {
            Some(url) => RedisTarget::Url(url.trim().to_owned()),
            None => {
                let defaults = RedisConfig::default();
                RedisTarget::Parts(RedisConfig {
                    host: var("REDIS_HOST").unwrap_or(defaults.host),
                    port: parse_var(&var, "REDIS_PORT")?.unwrap_or(defaults.port),
                    db: parse_var(&var, "REDIS_DB")?.unwrap_or(defaults.db),
                    password: var("REDIS_PASSWORD"),
                })
            }
        };

        Ok(Self {
            credentials,
            instruments,
            holidays,
            risk_free_rate: parse_var(&var, "RISK_FREE_RATE")?.unwrap_or(DEFAULT_RISK_FREE_RATE),
            max_concurrent_workers: parse_var(&var, "MAX_CONCURRENT_WORKERS")?
                .unwrap_or(DEFAULT_MAX_CONCURRENT_WORKERS),
            redis,
            base_url: var("DHAN_BASE_URL").unwrap_or_else(|| API_BASE_URL.to_owned()),
        })
    }
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_var<T>(var: impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    var(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| DhanError::Config(format!("{key}={raw:?}: {e}")))
        })
        .transpose()
}
