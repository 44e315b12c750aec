use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Value of the `iss` claim on every token this service signs.
pub const TOKEN_ISSUER: &str = "tour-booking-api";

pub const ACCESS_TOKEN_PREFIX: &str = "access_token";
pub const REFRESH_TOKEN_PREFIX: &str = "refresh_token";
pub const REFRESH_LOCK_PREFIX: &str = "refresh_lock";

/// Upper bound on how long one refresh rotation may hold its identity lock.
pub const REFRESH_LOCK_TTL_SECS: u64 = 10;

/// Bound on store health pings.
pub const STORE_PING_TIMEOUT_SECS: u64 = 5;

/// How often the in-memory session store sweeps expired entries.
pub const MEMORY_PURGE_INTERVAL_SECS: u64 = 60;
