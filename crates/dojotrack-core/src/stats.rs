//! Attendance and membership statistics.
//!
//! Read-only aggregates over the attendance log and the members table,
//! consumed by dashboard frontends and the CLI.

use std::collections::HashMap;
use std::str::FromStr;

use rusqlite::params;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, DatabaseError};
use crate::progression::Belt;
use crate::storage::Database;

/// All-time attendance totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceStats {
    pub total_check_ins: u64,
    /// Members with at least one recorded check-in.
    pub active_members: u64,
    /// Distinct calendar months with at least one check-in.
    pub months_tracked: u64,
}

/// Attendance totals for one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthStats {
    /// `"YYYY-MM"`.
    pub month: String,
    pub check_ins: u64,
    pub active_members: u64,
}

/// Member head-count for one belt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeltCount {
    pub belt: Belt,
    pub members: u64,
}

impl Database {
    /// Attendance totals for a `"YYYY-MM"` month.
    pub fn stats_month(&self, month: &str) -> Result<MonthStats, CoreError> {
        let (check_ins, active_members) = self
            .conn()
            .query_row(
                "SELECT COUNT(*), COUNT(DISTINCT member_id)
                 FROM attendance WHERE substr(date, 1, 7) = ?1",
                params![month],
                |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
            )
            .map_err(DatabaseError::from)?;
        Ok(MonthStats {
            month: month.to_string(),
            check_ins,
            active_members,
        })
    }

    /// All-time attendance totals.
    pub fn stats_all(&self) -> Result<AttendanceStats, CoreError> {
        let stats = self
            .conn()
            .query_row(
                "SELECT COUNT(*), COUNT(DISTINCT member_id),
                        COUNT(DISTINCT substr(date, 1, 7))
                 FROM attendance",
                [],
                |row| {
                    Ok(AttendanceStats {
                        total_check_ins: row.get(0)?,
                        active_members: row.get(1)?,
                        months_tracked: row.get(2)?,
                    })
                },
            )
            .map_err(DatabaseError::from)?;
        Ok(stats)
    }

    /// Per-month attendance totals, oldest first.
    pub fn monthly_breakdown(&self) -> Result<Vec<MonthStats>, CoreError> {
        let mut stmt = self
            .conn()
            .prepare(
                "SELECT substr(date, 1, 7), COUNT(*), COUNT(DISTINCT member_id)
                 FROM attendance GROUP BY substr(date, 1, 7) ORDER BY 1",
            )
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(MonthStats {
                    month: row.get(0)?,
                    check_ins: row.get(1)?,
                    active_members: row.get(2)?,
                })
            })
            .map_err(DatabaseError::from)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(DatabaseError::from)?;
        Ok(rows)
    }

    /// Member head-count per belt, in progression order, zero counts
    /// included.
    pub fn belt_distribution(&self) -> Result<Vec<BeltCount>, CoreError> {
        let mut stmt = self
            .conn()
            .prepare("SELECT belt, COUNT(*) FROM members GROUP BY belt")
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
            })
            .map_err(DatabaseError::from)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(DatabaseError::from)?;

        let mut counts: HashMap<Belt, u64> = HashMap::new();
        for (raw, count) in rows {
            let belt = Belt::from_str(&raw).map_err(|_| {
                CoreError::Custom(format!("unknown belt '{raw}' in members table"))
            })?;
            counts.insert(belt, count);
        }

        Ok(Belt::ALL
            .iter()
            .map(|&belt| BeltCount {
                belt,
                members: counts.get(&belt).copied().unwrap_or(0),
            })
            .collect())
    }
}
