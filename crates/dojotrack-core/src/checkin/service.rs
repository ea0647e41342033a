//! Transactional check-in application.
//!
//! The whole flow -- read member, run the gate, write the updated member
//! fields, append the attendance record -- runs inside one SQLite
//! transaction. A concurrent check-in for the same member serializes behind
//! it and re-reads `last_check_in`, so a stale timestamp can never
//! double-count a session. If anything fails before commit, nothing is
//! visible.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::attendance::AttendanceRecord;
use crate::checkin::{CheckInOutcome, CheckInPolicy};
use crate::error::{CheckInError, DatabaseError};
use crate::events::Event;
use crate::member::Member;
use crate::progression::Belt;
use crate::storage::database::{member_from_columns, Database, MEMBER_COLUMNS};

/// Applies accepted check-ins to storage.
pub struct CheckInService<'a> {
    db: &'a Database,
    policy: CheckInPolicy,
}

impl<'a> CheckInService<'a> {
    pub fn new(db: &'a Database, policy: CheckInPolicy) -> Self {
        Self { db, policy }
    }

    /// Gate and record one check-in for `member_id` at `now`.
    ///
    /// `now` is the caller's clock instant; the attendance record is stamped
    /// with the same instant the gate was checked against.
    ///
    /// # Errors
    /// - `CooldownActive` -- too soon since the previous check-in; no state
    ///   was touched.
    /// - `MemberNotFound` -- unknown member id; nothing is written.
    /// - `DataIntegrity` -- the stored member row failed strict parsing.
    /// - `WriteFailed` -- the transaction could not commit; the check-in is
    ///   not visible and may be retried from scratch.
    pub fn check_in(
        &self,
        member_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<CheckInReceipt, CheckInError> {
        let tx = self
            .db
            .conn()
            .unchecked_transaction()
            .map_err(|e| CheckInError::WriteFailed(e.into()))?;

        let row = tx
            .query_row(
                &format!("SELECT {MEMBER_COLUMNS} FROM members WHERE id = ?1"),
                params![member_id.to_string()],
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
            .map_err(|e| CheckInError::WriteFailed(e.into()))?;

        let Some((name, belt, lifetime, monthly, last, joined)) = row else {
            debug!(member_id = %member_id, "check-in refused: member not found");
            return Err(CheckInError::MemberNotFound(member_id));
        };
        let member = member_from_columns(member_id, name, belt, lifetime, monthly, last, joined)?;

        let update = match self.policy.evaluate(&member, now) {
            Ok(update) => update,
            Err(err) => {
                if let CheckInError::CooldownActive { remaining } = &err {
                    debug!(
                        member_id = %member_id,
                        remaining_min = remaining.num_minutes(),
                        "check-in rejected: cooldown active"
                    );
                }
                return Err(err);
            }
        };

        let mut monthly_map = member.monthly_training_count.clone();
        monthly_map.insert(update.month_key.clone(), update.monthly_count);
        let monthly_json = serde_json::to_string(&monthly_map)
            .map_err(|e| CheckInError::WriteFailed(DatabaseError::QueryFailed(e.to_string())))?;

        tx.execute(
            "UPDATE members
             SET belt = ?1, lifetime_training_count = ?2,
                 monthly_training_count = ?3, last_check_in = ?4
             WHERE id = ?5",
            params![
                update.belt.as_str(),
                update.lifetime_training_count,
                monthly_json,
                now.to_rfc3339(),
                member_id.to_string(),
            ],
        )
        .map_err(|e| CheckInError::WriteFailed(e.into()))?;

        let mut record = AttendanceRecord::stamp(0, member_id, now);
        tx.execute(
            "INSERT INTO attendance (member_id, timestamp, date, time)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                member_id.to_string(),
                now.to_rfc3339(),
                record.date,
                record.time,
            ],
        )
        .map_err(|e| CheckInError::WriteFailed(e.into()))?;
        record.id = tx.last_insert_rowid();

        tx.commit().map_err(|e| CheckInError::WriteFailed(e.into()))?;

        match update.outcome {
            CheckInOutcome::Promoted { to } => {
                info!(member_id = %member_id, from = %member.belt, to = %to, "member promoted");
            }
            CheckInOutcome::TierCompleted { tier } => {
                info!(member_id = %member_id, tier, "tier completed");
            }
            CheckInOutcome::Recorded => {
                info!(
                    member_id = %member_id,
                    lifetime = update.lifetime_training_count,
                    "check-in recorded"
                );
            }
        }

        let updated = Member {
            belt: update.belt,
            lifetime_training_count: update.lifetime_training_count,
            monthly_training_count: monthly_map,
            last_check_in: Some(now),
            ..member
        };

        Ok(CheckInReceipt {
            previous_belt: member.belt,
            member: updated,
            record,
            outcome: update.outcome,
        })
    }
}

/// Result of one accepted check-in: the updated member, the appended
/// attendance record, and the single reported outcome.
#[derive(Debug, Clone, Serialize)]
pub struct CheckInReceipt {
    pub previous_belt: Belt,
    pub member: Member,
    pub record: AttendanceRecord,
    pub outcome: CheckInOutcome,
}

impl CheckInReceipt {
    /// The event frontends see for this check-in.
    pub fn event(&self) -> Event {
        match self.outcome {
            CheckInOutcome::Promoted { to } => Event::MemberPromoted {
                member_id: self.member.id,
                from_belt: self.previous_belt,
                to_belt: to,
                at: self.record.timestamp,
            },
            CheckInOutcome::TierCompleted { tier } => Event::TierCompleted {
                member_id: self.member.id,
                belt: self.member.belt,
                tier,
                at: self.record.timestamp,
            },
            CheckInOutcome::Recorded => Event::CheckInRecorded {
                member_id: self.member.id,
                belt: self.member.belt,
                lifetime_training_count: self.member.lifetime_training_count,
                month_key: self.record.date[..7].to_string(),
                monthly_count: self.member.monthly_count(&self.record.date[..7]),
                at: self.record.timestamp,
            },
        }
    }
}
