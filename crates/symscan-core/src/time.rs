// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Timestamp formats shared by the log and snapshot sinks.

use chrono::{DateTime, Local, TimeZone};

/// `YYYY-MM-DD HH:MM:SS`, used for log lines.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `YYYYMMDD-HHMMSS`, used in snapshot file names.
pub const SNAPSHOT_STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

pub fn log_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(LOG_TIMESTAMP_FORMAT).to_string()
}

pub fn snapshot_stamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(SNAPSHOT_STAMP_FORMAT).to_string()
}

/// Current local time as a log timestamp.
pub fn now_log_timestamp() -> String {
    log_timestamp(&Local::now())
}
