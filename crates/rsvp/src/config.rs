use std::{env, path::PathBuf, str::FromStr, time::Duration};

use chrono_tz::Tz;

use rsvp_core::friday::DEFAULT_MAX_GUESTS;
use rsvp_core::schedule::DEFAULT_TIMEZONE;

use crate::engine::EngineConfig;
use crate::gateway::google::DEFAULT_API_URL;
use crate::storage::CacheTtls;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file (default: "rsvp.db")
    pub sqlite_path: String,
    /// Whether the remote calendar is used at all (default: false)
    pub calendar_enabled: bool,
    /// Remote calendar id (default: "primary")
    pub calendar_id: String,
    /// Calendar REST base URL
    pub calendar_api_url: String,
    /// JSON file holding the OAuth `access_token` (default: "token.json")
    pub calendar_token_file: PathBuf,
    /// Timezone of the weekly slot and of remote events
    pub calendar_timezone: Tz,
    /// Per-call calendar timeout in seconds (default: 5)
    pub calendar_timeout_seconds: u64,
    /// Seconds between reconciliation passes (default: 3600)
    pub reconciliation_period_seconds: u64,
    /// Seconds before retrying a failed pass (default: 60)
    pub reconciliation_retry_seconds: u64,
    /// Days ahead covered by listing and reconciliation (default: 30)
    pub lookahead_days: u32,
    /// Capacity of newly scheduled Fridays (default: 10)
    pub default_max_guests: usize,
    /// Length of remote events in minutes (default: 240)
    pub event_duration_minutes: i64,
    pub friday_cache_ttl_seconds: u64,
    pub friend_cache_ttl_seconds: u64,
    pub negative_friend_cache_ttl_seconds: u64,
    /// Year in review cache (default: 86400)
    pub wrapped_cache_ttl_seconds: u64,
}

/// Parses `name` from `lookup`, falling back to `default` when unset or invalid.
fn parsed<T, F>(lookup: &F, name: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SQLITE_PATH`, `CALENDAR_ENABLED`, `CALENDAR_ID`, `CALENDAR_API_URL`,
    ///   `CALENDAR_TOKEN_FILE`, `CALENDAR_TIMEZONE`, `CALENDAR_TIMEOUT_SECONDS`
    /// - `RECONCILIATION_PERIOD_SECONDS`, `RECONCILIATION_RETRY_SECONDS`,
    ///   `LOOKAHEAD_DAYS`, `DEFAULT_MAX_GUESTS`, `EVENT_DURATION_MINUTES`
    /// - `FRIDAY_CACHE_TTL_SECONDS`, `FRIEND_CACHE_TTL_SECONDS`,
    ///   `NEGATIVE_FRIEND_CACHE_TTL_SECONDS`, `WRAPPED_CACHE_TTL_SECONDS`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        Self {
            sqlite_path: string("SQLITE_PATH", "rsvp.db"),
            calendar_enabled: parsed(&lookup, "CALENDAR_ENABLED", false),
            calendar_id: string("CALENDAR_ID", "primary"),
            calendar_api_url: string("CALENDAR_API_URL", DEFAULT_API_URL),
            calendar_token_file: PathBuf::from(string("CALENDAR_TOKEN_FILE", "token.json")),
            calendar_timezone: parsed(&lookup, "CALENDAR_TIMEZONE", DEFAULT_TIMEZONE),
            calendar_timeout_seconds: parsed(&lookup, "CALENDAR_TIMEOUT_SECONDS", 5),
            reconciliation_period_seconds: parsed(&lookup, "RECONCILIATION_PERIOD_SECONDS", 3600),
            reconciliation_retry_seconds: parsed(&lookup, "RECONCILIATION_RETRY_SECONDS", 60),
            lookahead_days: parsed(&lookup, "LOOKAHEAD_DAYS", 30),
            default_max_guests: parsed(&lookup, "DEFAULT_MAX_GUESTS", DEFAULT_MAX_GUESTS),
            event_duration_minutes: parsed(&lookup, "EVENT_DURATION_MINUTES", 240),
            friday_cache_ttl_seconds: parsed(&lookup, "FRIDAY_CACHE_TTL_SECONDS", 3600),
            friend_cache_ttl_seconds: parsed(&lookup, "FRIEND_CACHE_TTL_SECONDS", 86_400),
            negative_friend_cache_ttl_seconds: parsed(
                &lookup,
                "NEGATIVE_FRIEND_CACHE_TTL_SECONDS",
                300,
            ),
            wrapped_cache_ttl_seconds: parsed(&lookup, "WRAPPED_CACHE_TTL_SECONDS", 86_400),
        }
    }

    /// Get the per-call calendar timeout as a Duration.
    pub fn calendar_timeout(&self) -> Duration {
        Duration::from_secs(self.calendar_timeout_seconds)
    }

    /// Remote event length. Non-positive or out-of-range values fall back to
    /// the default.
    pub fn event_duration(&self) -> chrono::Duration {
        chrono::Duration::try_minutes(self.event_duration_minutes)
            .filter(|duration| *duration > chrono::Duration::zero())
            .unwrap_or_else(|| EngineConfig::default().event_duration)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            calendar_enabled: self.calendar_enabled,
            reconciliation_period: Duration::from_secs(self.reconciliation_period_seconds),
            retry_delay: Duration::from_secs(self.reconciliation_retry_seconds),
            lookahead_days: self.lookahead_days,
            default_max_guests: self.default_max_guests,
            event_duration: self.event_duration(),
            timezone: self.calendar_timezone,
            wrapped_ttl: Duration::from_secs(self.wrapped_cache_ttl_seconds),
            ..EngineConfig::default()
        }
    }

    pub fn cache_ttls(&self) -> CacheTtls {
        CacheTtls {
            fridays: Duration::from_secs(self.friday_cache_ttl_seconds),
            friends: Duration::from_secs(self.friend_cache_ttl_seconds),
            unknown_friends: Duration::from_secs(self.negative_friend_cache_ttl_seconds),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
