//! Database: the enrollment core's entry point
//!
//! Owns the Capacity Store, the Enrollment Ledger and the transaction
//! manager, and exposes the commands and queries the enclosing application
//! calls.

use crate::config::{ConfigError, EngineConfig};
use crate::enrollment::{optimistic, pessimistic, Strategy};
use crate::projection;
use crate::recovery::{self, RecoveryStats};
use seatguard_concurrency::TransactionManager;
use seatguard_core::{
    EnrollError, Enrollment, EnrollmentId, Group, GroupAvailability, GroupId, StoreError,
    StudentId, Version,
};
use seatguard_durability::{DurabilityMode, Wal, WAL_FILE_NAME};
use seatguard_storage::{CapacityStore, EnrollmentLedger};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Failure to open a database
#[derive(Debug, Error)]
pub enum OpenError {
    /// Configuration rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A durable mode was requested without a directory
    #[error("durability mode {0:?} requires a database path")]
    MissingPath(DurabilityMode),

    /// Log could not be opened or replayed
    #[error("cannot open store: {0}")]
    Store(#[from] StoreError),
}

impl From<std::io::Error> for OpenError {
    fn from(e: std::io::Error) -> Self {
        OpenError::Store(StoreError::Io(e))
    }
}

/// The enrollment database.
///
/// # Example
///
/// ```
/// use seatguard_engine::Database;
/// use seatguard_core::StudentId;
///
/// let db = Database::ephemeral();
/// let group = db.register_group(30).unwrap();
///
/// // Optimistic: pass back the version from the snapshot
/// let seen = db.availability(group).unwrap();
/// db.enroll_optimistic(group, StudentId::new(1), seen.version).unwrap();
///
/// // Pessimistic: no version needed
/// db.enroll_pessimistic(group, StudentId::new(2)).unwrap();
///
/// assert_eq!(db.availability(group).unwrap().enrolled, 2);
/// ```
pub struct Database {
    path: Option<PathBuf>,
    pub(crate) config: EngineConfig,
    pub(crate) groups: CapacityStore,
    pub(crate) ledger: EnrollmentLedger,
    pub(crate) txn_manager: TransactionManager,
    recovery: RecoveryStats,
}

impl Database {
    /// Open a database at the given path with default settings
    /// (buffered durability).
    pub fn open(path: impl AsRef<Path>) -> Result<Self, OpenError> {
        Self::builder().path(path).open()
    }

    /// Create an in-memory database with no disk I/O.
    ///
    /// All state is lost when the database is dropped.
    pub fn ephemeral() -> Self {
        Self::with_manager(
            None,
            EngineConfig {
                durability: DurabilityMode::InMemory,
                ..EngineConfig::default()
            },
            CapacityStore::new(),
            EnrollmentLedger::new(),
            TransactionManager::in_memory(),
            RecoveryStats::default(),
        )
    }

    /// Create a builder for database configuration.
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    fn with_manager(
        path: Option<PathBuf>,
        config: EngineConfig,
        groups: CapacityStore,
        ledger: EnrollmentLedger,
        txn_manager: TransactionManager,
        recovery: RecoveryStats,
    ) -> Self {
        Self {
            path,
            config,
            groups,
            ledger,
            txn_manager,
            recovery,
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Admit a student using version-based conflict detection.
    ///
    /// `expected` is the version the caller last observed (from
    /// [`snapshot`](Self::snapshot), [`availability`](Self::availability) or
    /// [`group`](Self::group)). On `Conflict` the caller must re-read before
    /// retrying; nothing is retried here. If another writer holds the row
    /// without having moved the version, this waits up to the lock timeout
    /// and then fails with `LockTimeout`.
    pub fn enroll_optimistic(
        &self,
        group_id: GroupId,
        student_id: StudentId,
        expected: Version,
    ) -> Result<EnrollmentId, EnrollError> {
        optimistic::enroll(self, group_id, student_id, expected)
    }

    /// Admit a student under the group's exclusive row lock.
    ///
    /// Waits at most the configured lock timeout, then fails with
    /// `LockTimeout`.
    pub fn enroll_pessimistic(
        &self,
        group_id: GroupId,
        student_id: StudentId,
    ) -> Result<EnrollmentId, EnrollError> {
        pessimistic::enroll(self, group_id, student_id)
    }

    /// Admit a student with the given strategy
    pub fn enroll(
        &self,
        group_id: GroupId,
        student_id: StudentId,
        strategy: Strategy,
    ) -> Result<EnrollmentId, EnrollError> {
        match strategy {
            Strategy::Optimistic { expected } => {
                self.enroll_optimistic(group_id, student_id, expected)
            }
            Strategy::Pessimistic => self.enroll_pessimistic(group_id, student_id),
        }
    }

    /// Provision a group with `capacity` seats.
    ///
    /// Catalog hook: the new group is empty and at the initial version.
    pub fn register_group(&self, capacity: u32) -> Result<GroupId, StoreError> {
        if capacity == 0 {
            return Err(StoreError::InvalidCapacity { capacity });
        }
        let id = self.groups.allocate_id();
        self.txn_manager.register(&self.groups, Group::new(id, capacity))?;
        info!(group_id = %id, capacity, "Group registered");
        Ok(id)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Availability of every group, ordered by id.
    ///
    /// Advisory only: the data may be stale by the time it is used.
    pub fn snapshot(&self) -> Vec<GroupAvailability> {
        projection::snapshot(&self.groups)
    }

    /// Availability of one group
    pub fn availability(&self, group_id: GroupId) -> Option<GroupAvailability> {
        projection::availability(&self.groups, group_id)
    }

    /// Committed state of one group, including its current version
    pub fn group(&self, group_id: GroupId) -> Option<Group> {
        self.groups.get(group_id)
    }

    /// A student's active enrollments, newest first
    pub fn enrollments_for_student(&self, student_id: StudentId) -> Vec<Enrollment> {
        self.ledger.for_student(student_id)
    }

    /// Every enrollment of every status, newest first
    pub fn enrollment_history(&self) -> Vec<Enrollment> {
        self.ledger.history()
    }

    /// Number of active ledger records for a group
    pub fn active_enrollments(&self, group_id: GroupId) -> usize {
        self.ledger.active_count(group_id)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Force the log to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        self.txn_manager.sync()
    }

    /// Database directory, if durable
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the current durability mode.
    pub fn durability_mode(&self) -> DurabilityMode {
        self.config.durability
    }

    /// Check if this database writes no files
    pub fn is_ephemeral(&self) -> bool {
        !self.txn_manager.is_durable()
    }

    /// What was replayed at open
    pub fn recovery_stats(&self) -> RecoveryStats {
        self.recovery
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .field("config", &self.config)
            .field("groups", &self.groups.len())
            .field("enrollments", &self.ledger.len())
            .finish()
    }
}

/// Builder for database configuration.
///
/// # Example
///
/// ```no_run
/// use seatguard_engine::Database;
/// use std::time::Duration;
///
/// let db = Database::builder()
///     .path("./enrollment-db")
///     .strict()
///     .lock_timeout(Duration::from_secs(2))
///     .open()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct DatabaseBuilder {
    path: Option<PathBuf>,
    config: EngineConfig,
}

impl DatabaseBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the database directory path.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the durability mode.
    pub fn durability(mut self, mode: DurabilityMode) -> Self {
        self.config.durability = mode;
        self
    }

    /// No log; nothing touches disk.
    pub fn in_memory(self) -> Self {
        self.durability(DurabilityMode::InMemory)
    }

    /// Flush each commit to the OS (default).
    pub fn buffered(self) -> Self {
        self.durability(DurabilityMode::Buffered)
    }

    /// Sync each commit to disk.
    pub fn strict(self) -> Self {
        self.durability(DurabilityMode::Strict)
    }

    /// Bounded wait for the row lock
    ///
    /// Whole milliseconds, rounded up; a zero duration is rejected at open.
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        let ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.config.lock_timeout_ms = if timeout > Duration::from_millis(ms) {
            ms.saturating_add(1)
        } else {
            ms
        };
        self
    }

    /// Open the database, replaying its log if durable.
    pub fn open(self) -> Result<Database, OpenError> {
        self.config.validate()?;

        if !self.config.durability.requires_wal() {
            let mut db = Database::ephemeral();
            db.config = self.config;
            return Ok(db);
        }

        let dir = self
            .path
            .ok_or(OpenError::MissingPath(self.config.durability))?;
        std::fs::create_dir_all(&dir)?;

        let (wal, entries) = Wal::open(dir.join(WAL_FILE_NAME), self.config.durability)?;
        let groups = CapacityStore::new();
        let ledger = EnrollmentLedger::new();
        let stats = recovery::replay(entries, &groups, &ledger)?;
        info!(path = %dir.display(), mode = ?self.config.durability, "{}", stats.summary());

        let txn_manager = TransactionManager::new(Some(wal), stats.max_txn_id);
        Ok(Database::with_manager(
            Some(dir),
            self.config,
            groups,
            ledger,
            txn_manager,
            stats,
        ))
    }
}
