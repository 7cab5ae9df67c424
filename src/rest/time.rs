/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use chrono::{DateTime, Utc};

const ISO_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const SQL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn utc(unix_time: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(unix_time, 0)
}

/// Formats unix seconds as an ISO 8601 UTC timestamp, e.g. `2007-05-30T21:21:00Z`.
///
/// Returns `None` when the value is outside the representable range.
pub fn unixtime_to_isotime(unix_time: i64) -> Option<String> {
    utc(unix_time).map(|t| t.format(ISO_DATE_FORMAT).to_string())
}

/// Formats unix seconds as an SQL datetime in UTC, e.g. `2007-05-30 21:21:00`
pub fn unixtime_to_sqltimestamp(unix_time: i64) -> Option<String> {
    utc(unix_time).map(|t| t.format(SQL_DATETIME_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_epoch() {
        assert_eq!(unixtime_to_isotime(0).as_deref(), Some("1970-01-01T00:00:00Z"));
        assert_eq!(unixtime_to_sqltimestamp(0).as_deref(), Some("1970-01-01 00:00:00"));
    }

    #[test]
    fn formats_upload_date() {
        assert_eq!(
            unixtime_to_isotime(1180560060).as_deref(),
            Some("2007-05-30T21:21:00Z")
        );
    }

    #[test]
    fn out_of_range_is_none() {
        assert_eq!(unixtime_to_isotime(i64::MAX), None);
    }
}
