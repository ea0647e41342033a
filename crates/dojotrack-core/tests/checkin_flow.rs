//! Integration tests for the transactional check-in flow.
//!
//! These run the full read-evaluate-persist path against real (in-memory or
//! temp-file) SQLite databases.

use chrono::{DateTime, Duration, TimeZone, Utc};
use dojotrack_core::checkin::{CheckInOutcome, CheckInPolicy, CheckInService};
use dojotrack_core::error::CheckInError;
use dojotrack_core::events::Event;
use dojotrack_core::member::Member;
use dojotrack_core::progression::Belt;
use dojotrack_core::storage::Database;
use rusqlite::params;

fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, minute, 0).unwrap()
}

fn seeded_member(db: &Database, belt: Belt, lifetime: u32) -> Member {
    let mut m = Member::new("Test Member");
    m.belt = belt;
    m.lifetime_training_count = lifetime;
    db.insert_member(&m).unwrap();
    m
}

#[test]
fn accepted_check_in_persists_member_and_attendance() {
    let db = Database::open_memory().unwrap();
    let m = seeded_member(&db, Belt::White, 0);
    let service = CheckInService::new(&db, CheckInPolicy::new());

    let receipt = service.check_in(m.id, at(7, 18, 30)).unwrap();
    assert_eq!(receipt.outcome, CheckInOutcome::Recorded);

    let stored = db.member(m.id).unwrap().unwrap();
    assert_eq!(stored.lifetime_training_count, 1);
    assert_eq!(stored.monthly_count("2026-03"), 1);
    assert_eq!(stored.last_check_in, Some(at(7, 18, 30)));

    let log = db.attendance_for_member(m.id, 10).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].date, "2026-03-07");
    assert_eq!(log[0].time, "18:30");
    assert_eq!(log[0].timestamp, at(7, 18, 30));
}

#[test]
fn second_check_in_within_six_hours_is_rejected_without_mutation() {
    let db = Database::open_memory().unwrap();
    let m = seeded_member(&db, Belt::White, 0);
    let service = CheckInService::new(&db, CheckInPolicy::new());

    service.check_in(m.id, at(7, 12, 1)).unwrap();
    // 5h59m later.
    let err = service.check_in(m.id, at(7, 18, 0)).unwrap_err();
    match err {
        CheckInError::CooldownActive { remaining } => {
            assert_eq!(remaining, Duration::minutes(1));
        }
        other => panic!("expected CooldownActive, got {other}"),
    }

    let stored = db.member(m.id).unwrap().unwrap();
    assert_eq!(stored.lifetime_training_count, 1);
    assert_eq!(stored.monthly_count("2026-03"), 1);
    assert_eq!(stored.last_check_in, Some(at(7, 12, 1)));
    assert_eq!(db.attendance_for_member(m.id, 10).unwrap().len(), 1);
}

#[test]
fn check_in_after_cooldown_elapses_is_accepted() {
    let db = Database::open_memory().unwrap();
    let m = seeded_member(&db, Belt::White, 0);
    let service = CheckInService::new(&db, CheckInPolicy::new());

    service.check_in(m.id, at(7, 11, 59)).unwrap();
    // 6h01m later.
    let receipt = service.check_in(m.id, at(7, 18, 0)).unwrap();
    assert_eq!(receipt.member.lifetime_training_count, 2);
    assert_eq!(db.attendance_for_member(m.id, 10).unwrap().len(), 2);
}

#[test]
fn fortieth_check_in_completes_the_first_tier() {
    let db = Database::open_memory().unwrap();
    let m = seeded_member(&db, Belt::White, 39);
    let service = CheckInService::new(&db, CheckInPolicy::new());

    let receipt = service.check_in(m.id, at(7, 18, 0)).unwrap();
    assert_eq!(receipt.outcome, CheckInOutcome::TierCompleted { tier: 1 });
    assert_eq!(receipt.member.lifetime_training_count, 40);
    assert_eq!(receipt.member.belt, Belt::White);
    assert!(matches!(
        receipt.event(),
        Event::TierCompleted { tier: 1, .. }
    ));
}

#[test]
fn white_belt_promotes_to_blue_at_160() {
    let db = Database::open_memory().unwrap();
    let m = seeded_member(&db, Belt::White, 159);
    let service = CheckInService::new(&db, CheckInPolicy::new());

    let receipt = service.check_in(m.id, at(7, 18, 0)).unwrap();
    assert_eq!(receipt.outcome, CheckInOutcome::Promoted { to: Belt::Blue });

    let stored = db.member(m.id).unwrap().unwrap();
    assert_eq!(stored.belt, Belt::Blue);
    assert_eq!(stored.lifetime_training_count, 0);
    // The monthly tally is untouched by the promotion reset.
    assert_eq!(stored.monthly_count("2026-03"), 1);

    match receipt.event() {
        Event::MemberPromoted {
            from_belt, to_belt, ..
        } => {
            assert_eq!(from_belt, Belt::White);
            assert_eq!(to_belt, Belt::Blue);
        }
        other => panic!("expected MemberPromoted, got {other:?}"),
    }
}

#[test]
fn blue_belt_promotes_to_purple_at_240() {
    let db = Database::open_memory().unwrap();
    let m = seeded_member(&db, Belt::Blue, 239);
    let service = CheckInService::new(&db, CheckInPolicy::new());

    let receipt = service.check_in(m.id, at(7, 18, 0)).unwrap();
    assert_eq!(receipt.outcome, CheckInOutcome::Promoted { to: Belt::Purple });
    assert_eq!(receipt.member.lifetime_training_count, 0);
}

#[test]
fn unknown_member_writes_nothing() {
    let db = Database::open_memory().unwrap();
    let service = CheckInService::new(&db, CheckInPolicy::new());

    let ghost = uuid::Uuid::new_v4();
    let err = service.check_in(ghost, at(7, 18, 0)).unwrap_err();
    assert!(matches!(err, CheckInError::MemberNotFound(id) if id == ghost));
    assert!(db.recent_attendance(10).unwrap().is_empty());
}

#[test]
fn corrupt_belt_value_blocks_the_check_in() {
    let db = Database::open_memory().unwrap();
    let m = seeded_member(&db, Belt::White, 5);
    db.conn()
        .execute(
            "UPDATE members SET belt = 'rainbow' WHERE id = ?1",
            params![m.id.to_string()],
        )
        .unwrap();

    let service = CheckInService::new(&db, CheckInPolicy::new());
    let err = service.check_in(m.id, at(7, 18, 0)).unwrap_err();
    assert!(matches!(
        err,
        CheckInError::DataIntegrity { field: "belt", .. }
    ));
    assert!(db.attendance_for_member(m.id, 10).unwrap().is_empty());
}

#[test]
fn monthly_counters_are_partitioned_by_calendar_month() {
    let db = Database::open_memory().unwrap();
    let m = seeded_member(&db, Belt::White, 0);
    let service = CheckInService::new(&db, CheckInPolicy::new());

    service
        .check_in(m.id, Utc.with_ymd_and_hms(2026, 2, 28, 20, 0, 0).unwrap())
        .unwrap();
    service
        .check_in(m.id, Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap())
        .unwrap();

    let stored = db.member(m.id).unwrap().unwrap();
    assert_eq!(stored.lifetime_training_count, 2);
    assert_eq!(stored.monthly_count("2026-02"), 1);
    assert_eq!(stored.monthly_count("2026-03"), 1);
}

#[test]
fn counters_only_grow_across_a_training_run() {
    let db = Database::open_memory().unwrap();
    let m = seeded_member(&db, Belt::White, 0);
    // Zero cooldown so the run can be driven hour by hour.
    let service = CheckInService::new(&db, CheckInPolicy::with_cooldown(Duration::zero()));

    let mut last_lifetime = 0;
    let mut last_monthly = 0;
    for i in 0..45u32 {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
            + Duration::hours(i64::from(i));
        let receipt = service.check_in(m.id, now).unwrap();
        let monthly = receipt.member.monthly_count("2026-03");
        assert!(receipt.member.lifetime_training_count > last_lifetime);
        assert!(monthly > last_monthly);
        last_lifetime = receipt.member.lifetime_training_count;
        last_monthly = monthly;
        if receipt.member.lifetime_training_count == 40 {
            assert_eq!(receipt.outcome, CheckInOutcome::TierCompleted { tier: 1 });
        }
    }
    assert_eq!(last_lifetime, 45);
    assert_eq!(last_monthly, 45);
}

#[test]
fn file_backed_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dojotrack.db");

    let m = {
        let db = Database::open_at(&path).unwrap();
        let m = seeded_member(&db, Belt::White, 0);
        let service = CheckInService::new(&db, CheckInPolicy::new());
        service.check_in(m.id, at(7, 18, 0)).unwrap();
        m
    };

    let db = Database::open_at(&path).unwrap();
    let stored = db.member(m.id).unwrap().unwrap();
    assert_eq!(stored.lifetime_training_count, 1);
    assert_eq!(db.attendance_for_member(m.id, 10).unwrap().len(), 1);
}
