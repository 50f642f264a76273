//! Environment configuration for the keyholder API.
//!
//! Server settings and the limits lock and listing endpoints enforce are
//! read once at startup. Every variable has a local-development default
//! except `JWT_SECRET` (see [`JwtConfig::from_env`]).

use std::str::FromStr;

use keyholder_core::error::CoreError;
use keyholder_core::lock::MAX_LOCK_DURATION_SECS;
use keyholder_core::lock_stats::MAX_WINDOW_DAYS;
use keyholder_core::pagination::PageLimits;

use crate::auth::jwt::JwtConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// How long in-flight requests may drain after a shutdown signal.
    pub shutdown_timeout_secs: u64,
    pub limits: LimitsConfig,
    pub jwt: JwtConfig,
}

/// Operator-tunable bounds on locks, stats windows and list sizes.
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Longest lock a keyholder may create. Never above the hard ceiling of
    /// [`MAX_LOCK_DURATION_SECS`].
    pub max_lock_duration_secs: i64,
    /// Largest custom dashboard window, in days.
    pub max_stats_window_days: i64,
    pub notifications_page: PageLimits,
    pub admin_page: PageLimits,
    pub user_search_page: PageLimits,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_lock_duration_secs: MAX_LOCK_DURATION_SECS,
            max_stats_window_days: MAX_WINDOW_DAYS,
            notifications_page: PageLimits::new(50, 100),
            admin_page: PageLimits::new(50, 200),
            user_search_page: PageLimits::new(10, 50),
        }
    }
}

impl LimitsConfig {
    /// | Env Var                   | Default             |
    /// |---------------------------|---------------------|
    /// | `MAX_LOCK_DURATION_DAYS`  | `365`               |
    /// | `MAX_STATS_WINDOW_DAYS`   | `365`               |
    /// | `NOTIFICATIONS_PAGE_MAX`  | `100`               |
    /// | `ADMIN_PAGE_MAX`          | `200`               |
    /// | `USER_SEARCH_PAGE_MAX`    | `50`                |
    ///
    /// Values above the built-in ceilings are lowered to them.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_lock_days: i64 = env_or("MAX_LOCK_DURATION_DAYS", 365);
        let max_stats_window_days: i64 = env_or("MAX_STATS_WINDOW_DAYS", MAX_WINDOW_DAYS);

        Self {
            max_lock_duration_secs: (max_lock_days.max(1) * 86_400).min(MAX_LOCK_DURATION_SECS),
            max_stats_window_days: max_stats_window_days.clamp(1, MAX_WINDOW_DAYS),
            notifications_page: page_from_env(
                "NOTIFICATIONS_PAGE_MAX",
                defaults.notifications_page,
            ),
            admin_page: page_from_env("ADMIN_PAGE_MAX", defaults.admin_page),
            user_search_page: page_from_env("USER_SEARCH_PAGE_MAX", defaults.user_search_page),
        }
    }

    pub fn ensure_lock_duration(&self, seconds: i64) -> Result<(), CoreError> {
        if seconds > self.max_lock_duration_secs {
            return Err(CoreError::Validation(format!(
                "Lock duration must not exceed {} days",
                self.max_lock_duration_secs / 86_400
            )));
        }
        Ok(())
    }

    /// Clamp a requested dashboard window into `1..=max_stats_window_days`.
    pub fn stats_window_days(&self, days: i64) -> i64 {
        days.clamp(1, self.max_stats_window_days)
    }
}

impl ServerConfig {
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3001`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    ///
    /// plus [`LimitsConfig::from_env`] and [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3001".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            limits: LimitsConfig::from_env(),
            jwt: JwtConfig::from_env(),
        }
    }
}

/// Read and parse `name`, falling back to `default` when unset.
///
/// Panics on a value that does not parse; configuration errors should stop
/// startup.
fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} must be a valid {}: {e}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}

fn page_from_env(max_var: &str, defaults: PageLimits) -> PageLimits {
    let max: i64 = env_or(max_var, defaults.max).max(1);
    PageLimits::new(defaults.default.min(max), max)
}
