//! Constants for the option chain poller.
//!
//! Contains the DhanHQ base URL, rate limit values, cache TTLs and the
//! market-calendar numbers the opening window and the reversal ladder use.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Base URLs
// ---------------------------------------------------------------------------

/// Base URL for the DhanHQ REST API v2.
pub const API_BASE_URL: &str = "https://api.dhan.co";

/// Path of the option chain endpoint.
pub const OPTION_CHAIN_PATH: &str = "/v2/optionchain";

/// Path of the expiry list endpoint.
pub const EXPIRY_LIST_PATH: &str = "/v2/optionchain/expirylist";

/// Business status reported by a successful response envelope.
pub const STATUS_SUCCESS: &str = "success";

/// Per-request timeout of the broker HTTP client.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

// ---------------------------------------------------------------------------
// Rate Limits
// ---------------------------------------------------------------------------

/// Rate limit configuration for the option chain API.
pub mod rate_limits {
    /// Option chain API constraints.
    pub mod option_chain {
        /// Minimum interval between unique requests (in seconds).
        pub const MIN_INTERVAL_SECS: u32 = 3;
    }
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

/// Sleep between two successful polling iterations of one worker.
pub const RATE_LIMIT_DELAY: Duration =
    Duration::from_secs(rate_limits::option_chain::MIN_INTERVAL_SECS as u64);

/// Sleep after a failed polling iteration.
pub const BACKOFF_DELAY: Duration = Duration::from_secs(5);

/// Ceiling on concurrently running workers.
pub const DEFAULT_MAX_CONCURRENT_WORKERS: usize = 12;

// ---------------------------------------------------------------------------
// Cache keys & TTLs
// ---------------------------------------------------------------------------

/// Key prefix of cached option chain snapshots.
pub const OPTION_CHAIN_PREFIX: &str = "option_chain";

/// Key prefix of cached nearest expiries.
pub const EXPIRY_DATE_PREFIX: &str = "expiry_date";

/// Key prefix of cached opening snapshots.
pub const OPENING_PREFIX: &str = "nine_thirty_data";

/// TTL of an option chain snapshot.
pub const OPTION_CHAIN_TTL_SECS: u64 = 300;

/// TTL of the nearest expiry entry.
pub const EXPIRY_DATE_TTL_SECS: u64 = 300;

/// TTL of the opening snapshot: one trading day minus a minute.
pub const OPENING_TTL_SECS: u64 = 86_340;

// ---------------------------------------------------------------------------
// Market calendar
// ---------------------------------------------------------------------------

/// UTC offset of the exchange's wall clock (IST, +05:30).
pub const MARKET_UTC_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Market close on expiry day, `(hour, minute)`.
pub const MARKET_CLOSE: (u32, u32) = (15, 30);

/// Start of the opening window, seconds after midnight (09:30:00).
pub const OPENING_WINDOW_START_SECS: u32 = 9 * 3600 + 30 * 60;

/// End of the opening window, seconds after midnight (09:31:00), inclusive.
pub const OPENING_WINDOW_END_SECS: u32 = 9 * 3600 + 31 * 60;

/// Wire format of expiry and calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Reversal ladder
// ---------------------------------------------------------------------------

/// Annualized, continuously compounded rate used by the reversal formula.
pub const DEFAULT_RISK_FREE_RATE: f64 = -0.067;

/// Strike step assumed when the chain has a single strike.
pub const DEFAULT_STRIKE_STEP: f64 = 50.0;

/// Milliseconds in a day.
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Days in the year-fraction denominator.
pub const DAYS_PER_YEAR: f64 = 365.0;
