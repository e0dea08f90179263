//! Availability snapshot tests

use crate::*;
use seatguard::SeatStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn test_snapshot_rows() {
    let db = create_inmemory_db();
    assert!(db.snapshot().is_empty());

    let a = create_group(&db, 2);
    let b = create_group(&db, 1);
    db.enroll_pessimistic(b, StudentId::new(1)).unwrap();
    db.enroll_pessimistic(a, StudentId::new(1)).unwrap();

    let rows = db.snapshot();
    assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![a, b]);

    assert_eq!(rows[0].capacity, 2);
    assert_eq!(rows[0].enrolled, 1);
    assert_eq!(rows[0].available, 1);
    assert_eq!(rows[0].status, SeatStatus::Open);

    assert_eq!(rows[1].available, 0);
    assert_eq!(rows[1].status, SeatStatus::Full);
    assert_eq!(rows[1].version, Version::new(2));
}

/// A snapshot is advisory: its version goes stale
#[test]
fn test_snapshot_is_advisory() {
    let db = create_inmemory_db();
    let gid = create_group(&db, 1);
    let seen = db.snapshot()[0];
    assert_eq!(seen.status, SeatStatus::Open);

    db.enroll_pessimistic(gid, StudentId::new(1)).unwrap();

    let err = db
        .enroll_optimistic(gid, StudentId::new(2), seen.version)
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(db.snapshot()[0].status, SeatStatus::Full);
}

/// Reading never changes state
#[test]
fn test_snapshot_does_not_mutate() {
    let db = create_inmemory_db();
    let gid = create_group(&db, 3);
    db.enroll_pessimistic(gid, StudentId::new(1)).unwrap();
    let before = db.group(gid).unwrap();
    for _ in 0..100 {
        let _ = db.snapshot();
        let _ = db.availability(gid);
    }
    assert_eq!(db.group(gid).unwrap(), before);
}

/// Every row read during heavy writing is internally consistent
#[test]
fn test_snapshot_during_writes() {
    let db = Arc::new(create_inmemory_db());
    let groups: Vec<_> = (0..4).map(|_| create_group(&db, 50)).collect();
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
        let db = Arc::clone(&db);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut reads = 0usize;
            loop {
                let finished = done.load(Ordering::Acquire);
                for row in db.snapshot() {
                    assert!(row.enrolled <= row.capacity);
                    assert_eq!(row.available, row.capacity - row.enrolled);
                    assert_eq!(row.version.get(), 1 + row.enrolled as u64);
                    assert_eq!(row.status == SeatStatus::Full, row.available == 0);
                }
                reads += 1;
                if finished {
                    return reads;
                }
            }
        })
    };

    let writers: Vec<_> = groups
        .iter()
        .map(|&gid| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                for s in 0..50 {
                    db.enroll_pessimistic(gid, StudentId::new(s)).unwrap();
                }
            })
        })
        .collect();
    for w in writers {
        w.join().unwrap();
    }
    done.store(true, Ordering::Release);
    assert!(reader.join().unwrap() > 0);

    assert!(db.snapshot().iter().all(|r| r.status == SeatStatus::Full));
}
