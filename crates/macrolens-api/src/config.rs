//! Server configuration read from the environment.
//!
//! Every setting has a default in [`macrolens_core::defaults`]; a variable
//! that is present but unparseable is a startup error rather than a silent
//! fallback.

use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use macrolens_core::{defaults, Error, MatchStrategy, Result};

/// Global request quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests: NonZeroU32,
    pub period: Duration,
}

/// Everything the server reads at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<HeaderValue>,
    pub max_upload_bytes: usize,
    /// `None` when rate limiting is disabled.
    pub rate_limit: Option<RateLimitConfig>,
    /// Zero disables the budget.
    pub analysis_budget: Duration,
    /// Zero disables the response cache.
    pub response_cache_size: usize,
    pub synonym_strategy: MatchStrategy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
            allowed_origins: parse_allowed_origins(defaults::ALLOWED_ORIGINS),
            max_upload_bytes: defaults::MAX_UPLOAD_BYTES,
            rate_limit: None,
            analysis_budget: Duration::from_secs(defaults::ANALYSIS_BUDGET_SECS),
            response_cache_size: defaults::RESPONSE_CACHE_SIZE,
            synonym_strategy: MatchStrategy::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let rate_limit = if parse_or(&var, "RATE_LIMIT_ENABLED", true)? {
            let requests: u32 = parse_or(
                &var,
                "RATE_LIMIT_REQUESTS",
                defaults::RATE_LIMIT_REQUESTS as u32,
            )?;
            let period_secs: u64 =
                parse_or(&var, "RATE_LIMIT_PERIOD_SECS", defaults::RATE_LIMIT_PERIOD_SECS)?;
            let requests = NonZeroU32::new(requests)
                .ok_or_else(|| Error::Config("RATE_LIMIT_REQUESTS must be non-zero".into()))?;
            if period_secs == 0 {
                return Err(Error::Config("RATE_LIMIT_PERIOD_SECS must be non-zero".into()));
            }
            Some(RateLimitConfig {
                requests,
                period: Duration::from_secs(period_secs),
            })
        } else {
            None
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| defaults::SERVER_HOST.to_string()),
            port: parse_or(&var, "PORT", defaults::SERVER_PORT)?,
            allowed_origins: parse_allowed_origins(
                &var("ALLOWED_ORIGINS").unwrap_or_else(|| defaults::ALLOWED_ORIGINS.to_string()),
            ),
            max_upload_bytes: parse_or(&var, "MAX_UPLOAD_BYTES", defaults::MAX_UPLOAD_BYTES)?,
            rate_limit,
            analysis_budget: Duration::from_secs(parse_or(
                &var,
                "ANALYSIS_BUDGET_SECS",
                defaults::ANALYSIS_BUDGET_SECS,
            )?),
            response_cache_size: parse_or(
                &var,
                "RESPONSE_CACHE_SIZE",
                defaults::RESPONSE_CACHE_SIZE,
            )?,
            synonym_strategy: parse_or(
                &var,
                "SYNONYM_MATCH_STRATEGY",
                MatchStrategy::default(),
            )?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, F>(var: &F, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid {}={:?}: {}", name, raw, e))),
        None => Ok(default),
    }
}

/// Parse a comma-separated origin list, skipping invalid entries.
pub fn parse_allowed_origins(origins_str: &str) -> Vec<HeaderValue> {
    if origins_str.trim().is_empty() {
        return parse_allowed_origins(defaults::ALLOWED_ORIGINS);
    }

    origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}
