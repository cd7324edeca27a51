//! Timestamp handling for the store.
//!
//! DATETIME columns carry no offset. Values are written and read as wall-clock
//! time in Asia/Jakarta (UTC+07:00, no DST), matching the session time zone
//! set on every pooled connection.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, SubsecRound, TimeZone, Utc};

/// IANA name of the store's time zone.
pub const STORE_TIME_ZONE_NAME: &str = "Asia/Jakarta";

/// Session `time_zone` value for MySQL.
pub const STORE_TIME_ZONE_OFFSET: &str = "+07:00";

const STORE_OFFSET_SECS: i32 = 7 * 3600;

fn store_offset() -> FixedOffset {
    FixedOffset::east_opt(STORE_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Current time truncated to whole seconds (DATETIME precision).
pub fn now_truncated() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Convert a UTC instant to the naive wall-clock value stored in a DATETIME column.
pub fn to_store_naive(instant: DateTime<Utc>) -> NaiveDateTime {
    instant.with_timezone(&store_offset()).naive_local()
}

/// Interpret a stored DATETIME value as store-local time.
pub fn from_store_naive(naive: NaiveDateTime) -> DateTime<Utc> {
    // A fixed offset has exactly one mapping for every local time.
    naive
        .and_local_timezone(store_offset())
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}
