//! Contention Tests
//!
//! Tests for thread safety on a single group:
//! - Pessimistic writers are serialized
//! - Mixed strategies never overbook
//! - Independent groups proceed in parallel
//! - Lock waiters are not starved

use crate::*;
use std::sync::{Arc, Barrier};
use std::thread;

fn run_threads<F>(db: &Arc<Database>, threads: usize, f: F) -> Vec<Result<(), EnrollError>>
where
    F: Fn(&Database, usize) -> Result<(), EnrollError> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let db = Arc::clone(db);
            let barrier = Arc::clone(&barrier);
            let f = Arc::clone(&f);
            thread::spawn(move || {
                barrier.wait();
                f(&db, i)
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

/// Purely pessimistic callers never see Conflict
#[test]
fn test_pessimistic_contention_admits_exactly_capacity() {
    const CAPACITY: u32 = 5;
    const THREADS: usize = 20;

    let db = Arc::new(create_inmemory_db());
    let gid = create_group(&db, CAPACITY);

    let results = run_threads(&db, THREADS, move |db, i| {
        db.enroll_pessimistic(gid, StudentId::new(i as u64)).map(|_| ())
    });

    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, CAPACITY as usize);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.code(), "CapacityExceeded", "unexpected {:?}", err);
    }
    assert_group_consistent(&db, gid);
}

/// Mixed strategies with caller-side retry fill the group exactly
#[test]
fn test_mixed_strategies_fill_exactly() {
    const CAPACITY: u32 = 8;
    const THREADS: usize = 32;

    for _ in 0..10 {
        let db = Arc::new(create_inmemory_db());
        let gid = create_group(&db, CAPACITY);

        let results = run_threads(&db, THREADS, move |db, i| {
            let student = StudentId::new(i as u64);
            if i % 2 == 0 {
                enroll_with_retry(db, gid, student)
            } else {
                db.enroll_pessimistic(gid, student).map(|_| ())
            }
        });

        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, CAPACITY as usize);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.code() == "CapacityExceeded"));
        assert_group_consistent(&db, gid);
        assert_eq!(db.group(gid).unwrap().version, Version::new(1 + CAPACITY as u64));
    }
}

/// Single-shot optimistic callers may lose, but never overbook
#[test]
fn test_mixed_strategies_without_retry_never_overbook() {
    const CAPACITY: u32 = 4;
    const THREADS: usize = 24;

    let db = Arc::new(create_inmemory_db());
    let gid = create_group(&db, CAPACITY);

    let results = run_threads(&db, THREADS, move |db, i| {
        let student = StudentId::new(i as u64);
        if i % 3 == 0 {
            db.enroll_pessimistic(gid, student).map(|_| ())
        } else {
            let seen = db.availability(gid).unwrap().version;
            db.enroll_optimistic(gid, student, seen).map(|_| ())
        }
    });

    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert!(wins <= CAPACITY as usize);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(
            matches!(err.code(), "CapacityExceeded" | "Conflict"),
            "unexpected {:?}",
            err
        );
    }
    assert_eq!(db.group(gid).unwrap().enrolled_count as usize, wins);
    assert_group_consistent(&db, gid);
}

/// The same student racing from many threads gets one seat
#[test]
fn test_same_student_races_once() {
    let db = Arc::new(create_inmemory_db());
    let gid = create_group(&db, 10);

    let results = run_threads(&db, 12, move |db, i| {
        let student = StudentId::new(1);
        if i % 2 == 0 {
            enroll_with_retry(db, gid, student)
        } else {
            db.enroll_pessimistic(gid, student).map(|_| ())
        }
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| e.code() == "DuplicateEnrollment"));
    assert_group_consistent(&db, gid);
}

/// Requests on different groups do not interfere
#[test]
fn test_independent_groups() {
    const GROUPS: usize = 8;
    const PER_GROUP: u32 = 25;

    let db = Arc::new(create_inmemory_db());
    let ids: Arc<Vec<GroupId>> =
        Arc::new((0..GROUPS).map(|_| create_group(&db, PER_GROUP)).collect());

    let groups = Arc::clone(&ids);
    let results = run_threads(&db, GROUPS, move |db, i| {
        for s in 0..PER_GROUP as u64 {
            db.enroll_pessimistic(groups[i], StudentId::new(s))?;
        }
        Ok(())
    });

    assert!(results.iter().all(|r| r.is_ok()));
    for gid in ids.iter() {
        assert_eq!(db.availability(*gid).unwrap().available, 0);
        assert_group_consistent(&db, *gid);
    }
}

/// Lock waiters complete under sustained optimistic pressure
#[test]
fn test_pessimistic_waiters_not_starved() {
    const WRITERS: usize = 8;
    const PER_WRITER: u64 = 25;

    let db = Arc::new(create_inmemory_db());
    let gid = create_group(&db, (WRITERS as u64 * PER_WRITER) as u32);

    let results = run_threads(&db, WRITERS, move |db, i| {
        for n in 0..PER_WRITER {
            let student = StudentId::new(i as u64 * 1_000 + n);
            if i % 2 == 0 {
                enroll_with_retry(db, gid, student)?;
            } else {
                db.enroll_pessimistic(gid, student)?;
            }
        }
        Ok(())
    });

    for r in &results {
        assert!(r.is_ok(), "writer failed: {:?}", r);
    }
    assert_eq!(db.availability(gid).unwrap().available, 0);
    assert_group_consistent(&db, gid);
}
