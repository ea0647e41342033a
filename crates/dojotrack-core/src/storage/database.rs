//! SQLite-based member and attendance storage.
//!
//! Member counters and belt are only ever mutated through the transactional
//! check-in path; this module deliberately exposes no other counter or belt
//! setter. Belt values read back from disk are parsed strictly -- an unknown
//! name surfaces as a data-integrity error instead of defaulting.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::attendance::AttendanceRecord;
use crate::error::{CheckInError, CoreError, DatabaseError};
use crate::member::Member;
use crate::progression::Belt;

use super::{data_dir, migrations};

pub(crate) const MEMBER_COLUMNS: &str =
    "name, belt, lifetime_training_count, monthly_training_count, last_check_in, joined_at";

/// SQLite database for member and attendance storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/dojotrack/dojotrack.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("dojotrack.db");
        Self::open_at(path)
    }

    /// Open (or create) the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: impl AsRef<std::path::Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (tests and ephemeral use).
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        migrations::migrate(&self.conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Insert a newly registered member.
    ///
    /// # Errors
    /// Returns an error if the insert fails (including a duplicate id).
    pub fn insert_member(&self, member: &Member) -> Result<(), CoreError> {
        let monthly = serde_json::to_string(&member.monthly_training_count)?;
        self.conn
            .execute(
                "INSERT INTO members
                 (id, name, belt, lifetime_training_count, monthly_training_count,
                  last_check_in, joined_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    member.id.to_string(),
                    member.name,
                    member.belt.as_str(),
                    member.lifetime_training_count,
                    monthly,
                    member.last_check_in.map(|t| t.to_rfc3339()),
                    member.joined_at.to_rfc3339(),
                ],
            )
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    /// Fetch one member by id, `None` if absent.
    ///
    /// # Errors
    /// Returns an error if the query fails or the stored row is corrupt.
    pub fn member(&self, id: Uuid) -> Result<Option<Member>, CoreError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {MEMBER_COLUMNS} FROM members WHERE id = ?1"),
                params![id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()
            .map_err(DatabaseError::from)?;

        match row {
            None => Ok(None),
            Some((name, belt, lifetime, monthly, last, joined)) => Ok(Some(
                member_from_columns(id, name, belt, lifetime, monthly, last, joined)?,
            )),
        }
    }

    /// All members, ordered by name.
    pub fn members(&self) -> Result<Vec<Member>, CoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT id, {MEMBER_COLUMNS} FROM members ORDER BY name"
            ))
            .map_err(DatabaseError::from)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })
            .map_err(DatabaseError::from)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(DatabaseError::from)?;

        let mut members = Vec::with_capacity(rows.len());
        for (id_raw, name, belt, lifetime, monthly, last, joined) in rows {
            let id = Uuid::parse_str(&id_raw).map_err(|_| CheckInError::DataIntegrity {
                member_id: Uuid::nil(),
                field: "id",
                value: id_raw,
            })?;
            members.push(member_from_columns(
                id, name, belt, lifetime, monthly, last, joined,
            )?);
        }
        Ok(members)
    }

    /// Most recent attendance records for one member, newest first.
    pub fn attendance_for_member(
        &self,
        member_id: Uuid,
        limit: u32,
    ) -> Result<Vec<AttendanceRecord>, CoreError> {
        self.attendance_query(
            "SELECT id, member_id, timestamp, date, time FROM attendance
             WHERE member_id = ?1 ORDER BY timestamp DESC LIMIT ?2",
            params![member_id.to_string(), limit],
        )
    }

    /// Most recent attendance records across all members, newest first.
    pub fn recent_attendance(&self, limit: u32) -> Result<Vec<AttendanceRecord>, CoreError> {
        self.attendance_query(
            "SELECT id, member_id, timestamp, date, time FROM attendance
             ORDER BY timestamp DESC LIMIT ?1",
            params![limit],
        )
    }

    fn attendance_query(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<AttendanceRecord>, CoreError> {
        let mut stmt = self.conn.prepare(sql).map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map(params, |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(DatabaseError::from)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(DatabaseError::from)?;

        let mut records = Vec::with_capacity(rows.len());
        for (id, member_raw, ts_raw, date, time) in rows {
            let member_id = Uuid::parse_str(&member_raw).map_err(|_| {
                DatabaseError::QueryFailed(format!("corrupt attendance row {id}: member_id"))
            })?;
            let timestamp = parse_utc(&ts_raw).ok_or_else(|| {
                DatabaseError::QueryFailed(format!("corrupt attendance row {id}: timestamp"))
            })?;
            records.push(AttendanceRecord {
                id,
                member_id,
                timestamp,
                date,
                time,
            });
        }
        Ok(records)
    }
}

fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Strict row-to-member conversion shared with the check-in path.
pub(crate) fn member_from_columns(
    id: Uuid,
    name: String,
    belt_raw: String,
    lifetime: i64,
    monthly_raw: String,
    last_raw: Option<String>,
    joined_raw: String,
) -> Result<Member, CheckInError> {
    let belt = Belt::from_str(&belt_raw).map_err(|_| CheckInError::DataIntegrity {
        member_id: id,
        field: "belt",
        value: belt_raw,
    })?;

    let lifetime_training_count =
        u32::try_from(lifetime).map_err(|_| CheckInError::DataIntegrity {
            member_id: id,
            field: "lifetime_training_count",
            value: lifetime.to_string(),
        })?;

    let monthly_training_count =
        serde_json::from_str(&monthly_raw).map_err(|_| CheckInError::DataIntegrity {
            member_id: id,
            field: "monthly_training_count",
            value: monthly_raw,
        })?;

    let last_check_in = match last_raw {
        None => None,
        Some(raw) => Some(parse_utc(&raw).ok_or(CheckInError::DataIntegrity {
            member_id: id,
            field: "last_check_in",
            value: raw,
        })?),
    };

    let joined_at = parse_utc(&joined_raw).ok_or(CheckInError::DataIntegrity {
        member_id: id,
        field: "joined_at",
        value: joined_raw,
    })?;

    Ok(Member {
        id,
        name,
        belt,
        lifetime_training_count,
        monthly_training_count,
        last_check_in,
        joined_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_fetch_roundtrip() {
        let db = Database::open_memory().unwrap();
        let mut m = Member::new("Ana");
        m.monthly_training_count.insert("2026-02".into(), 3);
        db.insert_member(&m).unwrap();

        let fetched = db.member(m.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Ana");
        assert_eq!(fetched.belt, Belt::White);
        assert_eq!(fetched.monthly_count("2026-02"), 3);
        assert_eq!(fetched.last_check_in, None);
    }

    #[test]
    fn missing_member_is_none() {
        let db = Database::open_memory().unwrap();
        assert!(db.member(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn unknown_belt_surfaces_as_data_integrity_error() {
        let db = Database::open_memory().unwrap();
        let m = Member::new("Ana");
        db.insert_member(&m).unwrap();
        // Corrupt the row behind the API's back.
        db.conn()
            .execute(
                "UPDATE members SET belt = 'crimson' WHERE id = ?1",
                params![m.id.to_string()],
            )
            .unwrap();

        let err = db.member(m.id).unwrap_err();
        assert!(matches!(
            err,
            CoreError::CheckIn(CheckInError::DataIntegrity { field: "belt", .. })
        ));
    }

    #[test]
    fn members_are_ordered_by_name() {
        let db = Database::open_memory().unwrap();
        db.insert_member(&Member::new("Zoe")).unwrap();
        db.insert_member(&Member::new("Ana")).unwrap();
        let names: Vec<_> = db.members().unwrap().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["Ana", "Zoe"]);
    }

    #[test]
    fn attendance_list_is_empty_for_fresh_member() {
        let db = Database::open_memory().unwrap();
        let m = Member::new("Ana");
        db.insert_member(&m).unwrap();
        assert!(db.attendance_for_member(m.id, 20).unwrap().is_empty());
    }
}
