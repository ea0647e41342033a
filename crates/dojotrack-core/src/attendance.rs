//! Append-only attendance log.
//!
//! One record per accepted check-in. Records are immutable once created;
//! this core never updates or deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Storage-assigned rowid.
    pub id: i64,
    pub member_id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Derived `"YYYY-MM-DD"`, from the same instant as `timestamp`.
    pub date: String,
    /// Derived `"HH:mm"`, from the same instant as `timestamp`.
    pub time: String,
}

impl AttendanceRecord {
    /// Build a record for `timestamp`, deriving the display fields.
    pub fn stamp(id: i64, member_id: Uuid, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            member_id,
            timestamp,
            date: timestamp.format(DATE_FORMAT).to_string(),
            time: timestamp.format(TIME_FORMAT).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn derived_fields_match_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 3, 7, 18, 5, 42).unwrap();
        let rec = AttendanceRecord::stamp(1, Uuid::nil(), at);
        assert_eq!(rec.date, "2026-03-07");
        assert_eq!(rec.time, "18:05");
    }
}
