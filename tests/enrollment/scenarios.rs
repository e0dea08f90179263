//! Canonical single-group scenarios

use crate::*;
use std::sync::{Arc, Barrier};
use std::thread;

/// Two optimistic calls with the same expected version: one wins
#[test]
fn test_same_version_race_has_one_winner() {
    for _ in 0..50 {
        let db = Arc::new(create_inmemory_db());
        let gid = create_group(&db, 1);
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = [1u64, 2]
            .into_iter()
            .map(|s| {
                let db = Arc::clone(&db);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    db.enroll_optimistic(gid, StudentId::new(s), Version::INITIAL)
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1, "results: {:?}", results);
        let loser = results.into_iter().find_map(Result::err).unwrap();
        assert_eq!(loser.code(), "Conflict");

        let group = db.group(gid).unwrap();
        assert_eq!(group.enrolled_count, 1);
        assert_eq!(group.version, Version::new(2));
    }
}

/// Sequential pessimistic calls on a one-seat group
#[test]
fn test_pessimistic_second_caller_sees_full_group() {
    let db = create_inmemory_db();
    let gid = create_group(&db, 1);

    db.enroll_pessimistic(gid, StudentId::new(1)).unwrap();
    assert_eq!(db.group(gid).unwrap().enrolled_count, 1);

    let err = db.enroll_pessimistic(gid, StudentId::new(2)).unwrap_err();
    assert!(matches!(
        err,
        EnrollError::CapacityExceeded {
            enrolled: 1,
            capacity: 1,
            ..
        }
    ));
    assert!(err.is_terminal());
    assert_eq!(db.group(gid).unwrap().version, Version::new(2));
}

/// A student cannot hold two active seats in one group, via either path
#[test]
fn test_duplicate_rejected_by_both_strategies() {
    let db = create_inmemory_db();
    let gid = create_group(&db, 5);
    let s1 = StudentId::new(1);
    let first = db.enroll_pessimistic(gid, s1).unwrap();
    let before = db.group(gid).unwrap();

    let err = db.enroll_pessimistic(gid, s1).unwrap_err();
    assert!(matches!(
        err,
        EnrollError::DuplicateEnrollment { existing, .. } if existing == first
    ));

    let err = db.enroll_optimistic(gid, s1, before.version).unwrap_err();
    assert_eq!(err.code(), "DuplicateEnrollment");

    assert_eq!(db.group(gid).unwrap(), before);
    assert_eq!(db.enrollments_for_student(s1).len(), 1);
}

/// Stale version fails even with seats free
#[test]
fn test_stale_version_conflicts() {
    let db = create_inmemory_db();
    let gid = create_group(&db, 10);
    db.enroll_pessimistic(gid, StudentId::new(1)).unwrap();
    let before = db.group(gid).unwrap();
    assert_eq!(before.version, Version::new(2));

    let err = db
        .enroll_optimistic(gid, StudentId::new(2), Version::INITIAL)
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(
        err,
        EnrollError::Conflict { expected, actual, .. }
            if expected == Version::INITIAL && actual == Version::new(2)
    ));
    assert_eq!(db.group(gid).unwrap(), before);
}

/// Unknown group is NotFound for both paths and for every query
#[test]
fn test_unknown_group() {
    let db = create_inmemory_db();
    let missing = GroupId::new(77);
    assert_eq!(
        db.enroll_pessimistic(missing, StudentId::new(1))
            .unwrap_err()
            .code(),
        "NotFound"
    );
    assert_eq!(
        db.enroll_optimistic(missing, StudentId::new(1), Version::INITIAL)
            .unwrap_err()
            .code(),
        "NotFound"
    );
    assert!(db.group(missing).is_none());
    assert!(db.availability(missing).is_none());
}

/// Student queries: active only, newest first; history covers everything
#[test]
fn test_student_enrollments_newest_first() {
    let db = create_inmemory_db();
    let student = StudentId::new(9);
    let groups: Vec<_> = (0..3).map(|_| create_group(&db, 2)).collect();
    let ids: Vec<_> = groups
        .iter()
        .map(|g| {
            let id = db.enroll_pessimistic(*g, student).unwrap();
            thread::sleep(std::time::Duration::from_millis(2));
            id
        })
        .collect();
    db.enroll_pessimistic(groups[0], StudentId::new(10)).unwrap();

    let mine: Vec<_> = db
        .enrollments_for_student(student)
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(mine, ids.iter().rev().copied().collect::<Vec<_>>());
    assert_eq!(db.enrollment_history().len(), 4);
    assert!(db
        .enrollment_history()
        .windows(2)
        .all(|w| w[0].created_at >= w[1].created_at));
}

/// The strategy enum routes to the matching path
#[test]
fn test_enroll_by_strategy() {
    use seatguard::Strategy;

    let db = create_inmemory_db();
    let gid = create_group(&db, 2);
    db.enroll(
        gid,
        StudentId::new(1),
        Strategy::Optimistic {
            expected: Version::INITIAL,
        },
    )
    .unwrap();
    db.enroll(gid, StudentId::new(2), Strategy::Pessimistic)
        .unwrap();
    assert_group_consistent(&db, gid);
    assert_eq!(db.availability(gid).unwrap().available, 0);
}
