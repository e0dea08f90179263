//! Durability and recovery tests

use crate::*;
use seatguard::{DurabilityMode, EngineConfig, Enrollment, RecoveryStats};
use seatguard_durability::{read_entries, WalEntry, WAL_FILE_NAME};
use std::fs::OpenOptions;
use std::io::Write;
use tempfile::TempDir;

fn populate(db: &Database) -> (GroupId, GroupId) {
    let a = db.register_group(2).unwrap();
    let b = db.register_group(3).unwrap();
    db.enroll_pessimistic(a, StudentId::new(1)).unwrap();
    db.enroll_optimistic(b, StudentId::new(1), Version::INITIAL)
        .unwrap();
    db.enroll_pessimistic(a, StudentId::new(2)).unwrap();
    (a, b)
}

fn by_id(mut list: Vec<Enrollment>) -> Vec<Enrollment> {
    list.sort_by_key(|e| *e.id.as_bytes());
    list
}

#[test]
fn test_reopen_restores_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db");

    let (a, b, snapshot, history) = {
        let db = Database::open(&path).unwrap();
        let (a, b) = populate(&db);
        (a, b, db.snapshot(), db.enrollment_history())
    };

    let db = Database::open(&path).unwrap();
    assert_eq!(db.snapshot(), snapshot);
    assert_eq!(by_id(db.enrollment_history()), by_id(history));

    let stats: RecoveryStats = db.recovery_stats();
    assert_eq!(stats.groups, 2);
    assert_eq!(stats.admissions, 3);
    assert!(stats.max_txn_id >= 3);
    assert_group_consistent(&db, a);
    assert_group_consistent(&db, b);

    // Constraints survive the restart
    assert_eq!(
        db.enroll_pessimistic(a, StudentId::new(3)).unwrap_err().code(),
        "CapacityExceeded"
    );
    assert_eq!(
        db.enroll_pessimistic(b, StudentId::new(1)).unwrap_err().code(),
        "DuplicateEnrollment"
    );

    // And new work continues from the recovered versions
    db.enroll_optimistic(b, StudentId::new(2), Version::new(2))
        .unwrap();
    assert_eq!(db.group(b).unwrap().version, Version::new(3));
}

#[test]
fn test_new_groups_do_not_reuse_recovered_ids() {
    let dir = TempDir::new().unwrap();
    let first = {
        let db = Database::open(dir.path()).unwrap();
        db.register_group(1).unwrap()
    };
    let db = Database::open(dir.path()).unwrap();
    let second = db.register_group(1).unwrap();
    assert!(second > first);
}

#[test]
fn test_failed_attempts_are_not_logged() {
    let dir = TempDir::new().unwrap();
    let db = Database::builder().path(dir.path()).strict().open().unwrap();
    let gid = db.register_group(1).unwrap();
    db.enroll_pessimistic(gid, StudentId::new(1)).unwrap();

    let _ = db.enroll_pessimistic(gid, StudentId::new(2)).unwrap_err();
    let _ = db.enroll_pessimistic(gid, StudentId::new(1)).unwrap_err();
    let _ = db
        .enroll_optimistic(gid, StudentId::new(3), Version::INITIAL)
        .unwrap_err();
    db.flush().unwrap();

    let entries = read_entries(dir.path().join(WAL_FILE_NAME)).unwrap();
    assert_eq!(entries.len(), 2);
    assert!(matches!(entries[0], WalEntry::GroupRegistered { .. }));
    assert!(matches!(entries[1], WalEntry::Admission { .. }));
}

#[test]
fn test_torn_tail_is_discarded() {
    let dir = TempDir::new().unwrap();
    let gid = {
        let db = Database::open(dir.path()).unwrap();
        let gid = db.register_group(4).unwrap();
        db.enroll_pessimistic(gid, StudentId::new(1)).unwrap();
        gid
    };

    // Half-written frame: header promises more bytes than exist
    {
        let mut file = OpenOptions::new()
            .append(true)
            .open(dir.path().join(WAL_FILE_NAME))
            .unwrap();
        file.write_all(&[0x40, 0, 0, 0, 0xde, 0xad, 0xbe, 0xef, 1, 2, 3])
            .unwrap();
    }

    {
        let db = Database::open(dir.path()).unwrap();
        assert_eq!(db.group(gid).unwrap().enrolled_count, 1);
        db.enroll_pessimistic(gid, StudentId::new(2)).unwrap();
    }

    let db = Database::open(dir.path()).unwrap();
    assert_eq!(db.group(gid).unwrap().enrolled_count, 2);
    assert_eq!(db.group(gid).unwrap().version, Version::new(3));
    assert_group_consistent(&db, gid);
}

#[test]
fn test_in_memory_writes_no_files() {
    let dir = TempDir::new().unwrap();
    let db = Database::builder()
        .path(dir.path())
        .durability(DurabilityMode::InMemory)
        .open()
        .unwrap();
    assert!(db.is_ephemeral());
    let gid = db.register_group(1).unwrap();
    db.enroll_pessimistic(gid, StudentId::new(1)).unwrap();
    assert!(!dir.path().join(WAL_FILE_NAME).exists());
}

#[test]
fn test_open_with_config_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("seatguard.toml");
    std::fs::write(
        &config_path,
        "durability = \"strict\"\nlock_timeout_ms = 750\n",
    )
    .unwrap();

    let config = EngineConfig::from_file(&config_path).unwrap();
    let db = Database::builder()
        .path(dir.path().join("db"))
        .config(config)
        .open()
        .unwrap();
    assert_eq!(db.durability_mode(), DurabilityMode::Strict);
    assert_eq!(db.config().lock_timeout_ms, 750);
}
